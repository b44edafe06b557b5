// Flux query builder shared by every sensor fetch
use crate::application::error::FetchError;
use crate::domain::window::LookbackWindow;

#[derive(Debug, Clone)]
pub struct FluxQuery {
    bucket: String,
    measurement: String,
    fields: Vec<String>,
    window: LookbackWindow,
    pivot: bool,
}

impl FluxQuery {
    pub fn new(bucket: &str, measurement: &str, window: LookbackWindow) -> Self {
        Self {
            bucket: bucket.to_string(),
            measurement: measurement.to_string(),
            fields: Vec::new(),
            window,
            pivot: false,
        }
    }

    /// Restrict to these fields; duplicates keep their first position.
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for field in fields {
            let field = field.as_ref();
            if !self.fields.iter().any(|f| f == field) {
                self.fields.push(field.to_string());
            }
        }
        self
    }

    /// Pivot fields into columns keyed by `_time`
    pub fn pivoted(mut self, pivot: bool) -> Self {
        self.pivot = pivot;
        self
    }

    pub fn field_names(&self) -> &[String] {
        &self.fields
    }

    pub fn build(&self) -> Result<String, FetchError> {
        if self.fields.is_empty() {
            return Err(FetchError::Query("at least one field is required".to_string()));
        }
        if self.bucket.is_empty() || self.measurement.is_empty() {
            return Err(FetchError::Query("bucket and measurement are required".to_string()));
        }

        let field_filters = self
            .fields
            .iter()
            .map(|f| format!("r._field == \"{}\"", escape(f)))
            .collect::<Vec<_>>()
            .join(" or ");

        let mut query = format!(
            "from(bucket: \"{}\")\n  |> range(start: -{})\n  |> filter(fn: (r) => r._measurement == \"{}\")\n  |> filter(fn: (r) => {})\n",
            escape(&self.bucket),
            self.window.as_flux_duration(),
            escape(&self.measurement),
            field_filters
        );

        if self.pivot {
            query.push_str(
                "  |> pivot(rowKey:[\"_time\"], columnKey: [\"_field\"], valueColumn: \"_value\")\n",
            );
        }
        query.push_str("  |> sort(columns: [\"_time\"])");

        Ok(query)
    }
}

/// Escape a value for use inside a Flux string literal
fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
