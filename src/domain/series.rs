// Sensor series domain model - pivoted, time-ordered readings
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};

/// A single cell of a sensor table.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// No sample for this field at this timestamp
    Missing,
    Number(f64),
    /// Raw value the store returned that does not coerce to a number
    Text(String),
}

impl FieldValue {
    /// Coerce a raw store cell. Blank cells are `Missing`.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return FieldValue::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => FieldValue::Number(value),
            _ => FieldValue::Text(trimmed.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Missing)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SensorReading {
    pub time: DateTime<Utc>,
    /// One value per series column, same order as `SensorSeries::columns`
    pub values: Vec<FieldValue>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SeriesError {
    #[error("column {0} already exists in series")]
    DuplicateColumn(String),
    #[error("column {0} is not part of series")]
    UnknownColumn(String),
}

/// Rows sorted ascending by timestamp, one column per field.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SensorSeries {
    columns: Vec<String>,
    rows: Vec<SensorReading>,
}

/// Euclidean norm of a 3-axis sample
pub fn magnitude(x: f64, y: f64, z: f64) -> f64 {
    x.hypot(y).hypot(z)
}

impl SensorSeries {
    pub fn empty<S: AsRef<str>>(columns: &[S]) -> Self {
        Self {
            columns: dedup_columns(columns),
            rows: Vec::new(),
        }
    }

    /// Merge already-pivoted records into one row per timestamp.
    ///
    /// Records with none of the requested fields are dropped, the same way a
    /// store-side pivot never emits a timestamp without matching fields. When
    /// two records share a timestamp, the first non-missing value per column
    /// wins.
    pub fn from_pivoted<S, I>(columns: &[S], records: I) -> Self
    where
        S: AsRef<str>,
        I: IntoIterator<Item = (DateTime<Utc>, HashMap<String, FieldValue>)>,
    {
        let columns = dedup_columns(columns);
        let mut by_time: BTreeMap<DateTime<Utc>, Vec<FieldValue>> = BTreeMap::new();

        for (time, mut fields) in records {
            let values: Vec<FieldValue> = columns
                .iter()
                .map(|c| fields.remove(c).unwrap_or(FieldValue::Missing))
                .collect();

            if values.iter().all(FieldValue::is_missing) {
                continue;
            }

            let slot = by_time
                .entry(time)
                .or_insert_with(|| vec![FieldValue::Missing; columns.len()]);
            for (existing, incoming) in slot.iter_mut().zip(values) {
                if existing.is_missing() {
                    *existing = incoming;
                }
            }
        }

        let rows = by_time
            .into_iter()
            .map(|(time, values)| SensorReading { time, values })
            .collect();

        Self { columns, rows }
    }

    /// Collect one field sample by sample, keeping the first value seen for each
    /// timestamp and skipping samples with no value.
    pub fn from_samples<I>(field: &str, samples: I) -> Self
    where
        I: IntoIterator<Item = (DateTime<Utc>, FieldValue)>,
    {
        let mut rows: Vec<SensorReading> = Vec::new();
        for (time, value) in samples {
            if value.is_missing() {
                continue;
            }
            rows.push(SensorReading {
                time,
                values: vec![value],
            });
        }

        rows.sort_by_key(|r| r.time);
        rows.dedup_by_key(|r| r.time);

        Self {
            columns: vec![field.to_string()],
            rows,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[SensorReading] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Timestamped numeric values of one column; missing and non-numeric cells
    /// are skipped.
    pub fn numeric_points(&self, column: &str) -> Vec<(DateTime<Utc>, f64)> {
        let Some(idx) = self.column_index(column) else {
            return Vec::new();
        };
        self.rows
            .iter()
            .filter_map(|r| r.values[idx].as_f64().map(|v| (r.time, v)))
            .collect()
    }

    /// Most recent numeric value of a column
    pub fn latest(&self, column: &str) -> Option<f64> {
        let idx = self.column_index(column)?;
        self.rows.iter().rev().find_map(|r| r.values[idx].as_f64())
    }

    /// Append `output` as the magnitude of the three axis columns.
    ///
    /// Rows where any axis is missing or non-numeric cannot carry a magnitude
    /// and are dropped; the axis columns themselves are kept.
    pub fn with_magnitude(self, axes: [&str; 3], output: &str) -> Result<Self, SeriesError> {
        if self.has_column(output) {
            return Err(SeriesError::DuplicateColumn(output.to_string()));
        }

        let mut indices = [0usize; 3];
        for (slot, axis) in indices.iter_mut().zip(axes) {
            *slot = self
                .column_index(axis)
                .ok_or_else(|| SeriesError::UnknownColumn(axis.to_string()))?;
        }

        let mut columns = self.columns;
        columns.push(output.to_string());

        let rows = self
            .rows
            .into_iter()
            .filter_map(|mut row| {
                let x = row.values[indices[0]].as_f64()?;
                let y = row.values[indices[1]].as_f64()?;
                let z = row.values[indices[2]].as_f64()?;
                row.values.push(FieldValue::Number(magnitude(x, y, z)));
                Some(row)
            })
            .collect();

        Ok(Self { columns, rows })
    }

    /// Projection that drops the named columns.
    pub fn without_columns(self, drop: &[&str]) -> Self {
        let keep: Vec<bool> = self
            .columns
            .iter()
            .map(|c| !drop.contains(&c.as_str()))
            .collect();

        let columns = self
            .columns
            .into_iter()
            .zip(&keep)
            .filter_map(|(c, k)| k.then_some(c))
            .collect();

        let rows = self
            .rows
            .into_iter()
            .map(|row| SensorReading {
                time: row.time,
                values: row
                    .values
                    .into_iter()
                    .zip(&keep)
                    .filter_map(|(v, k)| k.then_some(v))
                    .collect(),
            })
            .collect();

        Self { columns, rows }
    }
}

fn dedup_columns<S: AsRef<str>>(columns: &[S]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(columns.len());
    for c in columns {
        let c = c.as_ref();
        if !out.iter().any(|existing| existing == c) {
            out.push(c.to_string());
        }
    }
    out
}
