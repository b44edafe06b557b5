// Descriptive statistics over a series column
use super::series::SensorSeries;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColumnStats {
    pub mean: f64,
    pub max: f64,
    pub min: f64,
    pub count: usize,
}

impl ColumnStats {
    /// Mean/max/min over the numeric cells of a column. `None` when the column
    /// is absent or has no numeric values.
    pub fn of(series: &SensorSeries, column: &str) -> Option<Self> {
        let values: Vec<f64> = series
            .numeric_points(column)
            .into_iter()
            .map(|(_, v)| v)
            .collect();
        Self::compute(&values)
    }

    pub fn compute(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let count = values.len();
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = values.iter().sum::<f64>() / count as f64;

        Some(Self {
            mean,
            max,
            min,
            count,
        })
    }
}
