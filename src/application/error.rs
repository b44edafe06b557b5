// Fetch error taxonomy
use crate::domain::series::SeriesError;

/// Why a fetch produced no series.
///
/// An empty result is not an error: it comes back as an empty `SensorSeries`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
    /// Store unreachable, unauthorized, or slower than the query timeout
    #[error("time-series store unavailable: {0}")]
    Connection(String),
    /// Malformed query or a response that could not be decoded
    #[error("time-series query failed: {0}")]
    Query(String),
}

impl From<SeriesError> for FetchError {
    fn from(err: SeriesError) -> Self {
        FetchError::Query(err.to_string())
    }
}
