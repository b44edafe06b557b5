// Repository trait for time-series store access
use crate::application::error::FetchError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

pub const TIME_COLUMN: &str = "_time";
pub const FIELD_COLUMN: &str = "_field";
pub const VALUE_COLUMN: &str = "_value";

/// One row of a query result, keyed by column name, cells still raw text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FluxRecord {
    pub values: HashMap<String, String>,
}

impl FluxRecord {
    pub fn new(values: HashMap<String, String>) -> Self {
        Self { values }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column).map(String::as_str)
    }

    /// `_time` parsed as RFC3339
    pub fn time(&self) -> Option<DateTime<Utc>> {
        let raw = self.get(TIME_COLUMN)?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }
}

#[async_trait]
pub trait SensorRepository: Send + Sync {
    /// Run a read-only Flux query and return its rows in store order
    async fn query(&self, flux: &str) -> Result<Vec<FluxRecord>, FetchError>;
}
