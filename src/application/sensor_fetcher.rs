// Sensor series fetcher - query, pivot, sort, derive
use crate::application::error::FetchError;
use crate::application::query_builder::FluxQuery;
use crate::application::sensor_repository::{
    FluxRecord, SensorRepository, FIELD_COLUMN, TIME_COLUMN, VALUE_COLUMN,
};
use crate::domain::series::{FieldValue, SensorSeries};
use crate::domain::window::LookbackWindow;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Turns (measurement, fields, window) requests into shaped series.
///
/// Stateless between calls: every fetch goes to the store, nothing is cached.
#[derive(Clone)]
pub struct SensorSeriesFetcher {
    repository: Arc<dyn SensorRepository>,
    bucket: String,
    timeout: Duration,
}

impl SensorSeriesFetcher {
    pub fn new(repository: Arc<dyn SensorRepository>, bucket: String) -> Self {
        Self {
            repository,
            bucket,
            timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Pivoted fetch: one row per timestamp, one column per requested field.
    pub async fn fetch_fields<S: AsRef<str>>(
        &self,
        measurement: &str,
        fields: &[S],
        window: LookbackWindow,
    ) -> Result<SensorSeries, FetchError> {
        let query = FluxQuery::new(&self.bucket, measurement, window)
            .fields(fields)
            .pivoted(true);
        let columns = query.field_names().to_vec();
        let records = self.run(&query).await?;

        let series = SensorSeries::from_pivoted(
            &columns,
            records.into_iter().filter_map(|record| {
                let time = timestamp_of(&record)?;
                let fields = columns
                    .iter()
                    .filter_map(|c| record.get(c).map(|raw| (c.clone(), FieldValue::parse(raw))))
                    .collect::<HashMap<_, _>>();
                Some((time, fields))
            }),
        );

        tracing::debug!(
            "Fetched {} rows of {:?} from {} over {}",
            series.len(),
            series.columns(),
            measurement,
            window
        );
        Ok(series)
    }

    /// Single-field fetch collected row by row from the unpivoted result.
    pub async fn fetch_single_field(
        &self,
        measurement: &str,
        field: &str,
        window: LookbackWindow,
    ) -> Result<SensorSeries, FetchError> {
        let query = FluxQuery::new(&self.bucket, measurement, window)
            .fields([field])
            .pivoted(false);
        let records = self.run(&query).await?;

        let mut samples = Vec::with_capacity(records.len());
        for record in &records {
            if record.get(FIELD_COLUMN).is_some_and(|f| f != field) {
                continue;
            }
            let Some(time) = timestamp_of(record) else {
                continue;
            };
            let value = record
                .get(VALUE_COLUMN)
                .map(FieldValue::parse)
                .unwrap_or(FieldValue::Missing);
            samples.push((time, value));
        }

        let series = SensorSeries::from_samples(field, samples);
        tracing::debug!(
            "Fetched {} rows of {} from {} over {}",
            series.len(),
            field,
            measurement,
            window
        );
        Ok(series)
    }

    /// Pivoted fetch of three axis fields plus their Euclidean magnitude.
    ///
    /// Rows lacking a numeric value on any axis are not part of the result;
    /// the axis columns are kept so the caller can chart or drop them.
    pub async fn fetch_with_magnitude(
        &self,
        measurement: &str,
        axis_fields: [&str; 3],
        window: LookbackWindow,
        output_column: &str,
    ) -> Result<SensorSeries, FetchError> {
        let base = self.fetch_fields(measurement, &axis_fields, window).await?;
        let base_rows = base.len();
        let series = base.with_magnitude(axis_fields, output_column)?;

        if series.len() < base_rows {
            tracing::debug!(
                "Dropped {} of {} {} rows with incomplete axes",
                base_rows - series.len(),
                base_rows,
                measurement
            );
        }
        Ok(series)
    }

    async fn run(&self, query: &FluxQuery) -> Result<Vec<FluxRecord>, FetchError> {
        let flux = query.build()?;
        tracing::debug!("Executing flux query: {}", flux);

        match tokio::time::timeout(self.timeout, self.repository.query(&flux)).await {
            Ok(Ok(records)) => Ok(records),
            Ok(Err(e)) => {
                tracing::warn!("Sensor query failed: {}", e);
                Err(e)
            }
            Err(_) => {
                tracing::warn!("Sensor query timed out after {:?}", self.timeout);
                Err(FetchError::Connection(format!(
                    "query timed out after {}s",
                    self.timeout.as_secs_f64()
                )))
            }
        }
    }
}

fn timestamp_of(record: &FluxRecord) -> Option<chrono::DateTime<chrono::Utc>> {
    let time = record.time();
    if time.is_none() {
        tracing::warn!("Skipping record without a valid _time: {:?}", record.get(TIME_COLUMN));
    }
    time
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// In-memory store: answers every query with canned rows and records the
    /// flux it was asked to run.
    pub(crate) struct FakeRepository {
        pub responses: Mutex<Vec<Result<Vec<FluxRecord>, FetchError>>>,
        pub queries: Mutex<Vec<String>>,
        pub delay: Option<Duration>,
    }

    impl FakeRepository {
        pub(crate) fn with_responses(responses: Vec<Result<Vec<FluxRecord>, FetchError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                queries: Mutex::new(Vec::new()),
                delay: None,
            }
        }

        pub(crate) fn returning(records: Vec<FluxRecord>) -> Self {
            Self::with_responses(vec![Ok(records)])
        }
    }

    #[async_trait]
    impl SensorRepository for FakeRepository {
        async fn query(&self, flux: &str) -> Result<Vec<FluxRecord>, FetchError> {
            self.queries.lock().unwrap().push(flux.to_string());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                Ok(Vec::new())
            } else if responses.len() == 1 {
                responses[0].clone()
            } else {
                responses.remove(0)
            }
        }
    }

    pub(crate) fn row(cells: &[(&str, &str)]) -> FluxRecord {
        FluxRecord::new(
            cells
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    fn window(minutes: u32) -> LookbackWindow {
        LookbackWindow::new(minutes).unwrap()
    }

    fn fetcher(repo: FakeRepository) -> (SensorSeriesFetcher, Arc<FakeRepository>) {
        let repo = Arc::new(repo);
        (SensorSeriesFetcher::new(repo.clone(), "homeiot".to_string()), repo)
    }

    #[tokio::test]
    async fn test_fetch_fields_pivots_and_sorts() {
        let (fetcher, repo) = fetcher(FakeRepository::returning(vec![
            row(&[("_time", "2024-05-01T10:02:00Z"), ("temperature", "22.5"), ("humidity", "")]),
            row(&[("_time", "2024-05-01T10:00:00Z"), ("temperature", "21.0"), ("humidity", "40")]),
            row(&[("_time", "2024-05-01T10:01:00Z"), ("temperature", "21.5"), ("humidity", "41")]),
        ]));

        let series = fetcher
            .fetch_fields("airSensor", &["temperature", "humidity"], window(60))
            .await
            .unwrap();

        assert_eq!(series.columns(), &["temperature", "humidity"]);
        assert_eq!(series.len(), 3);
        let times: Vec<_> = series.rows().iter().map(|r| r.time).collect();
        let mut sorted = times.clone();
        sorted.sort();
        assert_eq!(times, sorted);
        assert_eq!(series.rows()[2].values[1], FieldValue::Missing);

        let queries = repo.queries.lock().unwrap();
        assert_eq!(queries.len(), 1);
        assert!(queries[0].contains("from(bucket: \"homeiot\")"));
        assert!(queries[0].contains("r._measurement == \"airSensor\""));
        assert!(queries[0].contains("range(start: -60m)"));
        assert!(queries[0].contains("pivot("));
    }

    #[tokio::test]
    async fn test_no_rows_is_empty_series() {
        let (fetcher, _) = fetcher(FakeRepository::returning(Vec::new()));

        let series = fetcher
            .fetch_fields("airSensor", &["humidity"], window(10))
            .await
            .unwrap();

        assert!(series.is_empty());
        assert_eq!(series.columns(), &["humidity"]);
    }

    #[tokio::test]
    async fn test_repeated_fetch_is_identical() {
        let (fetcher, repo) = fetcher(FakeRepository::returning(vec![
            row(&[("_time", "2024-05-01T10:00:00Z"), ("uv_index", "3")]),
            row(&[("_time", "2024-05-01T10:05:00Z"), ("uv_index", "4")]),
        ]));

        let first = fetcher.fetch_fields("uv_sensor", &["uv_index"], window(30)).await.unwrap();
        let second = fetcher.fetch_fields("uv_sensor", &["uv_index"], window(30)).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(repo.queries.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_single_field_matches_pivoted_fetch() {
        let unpivoted = vec![
            row(&[("_time", "2024-05-01T10:05:00Z"), ("_field", "uv_index"), ("_value", "4")]),
            row(&[("_time", "2024-05-01T10:00:00Z"), ("_field", "uv_index"), ("_value", "3")]),
            row(&[("_time", "2024-05-01T10:03:00Z"), ("_field", "uv_raw"), ("_value", "812")]),
        ];
        let pivoted = vec![
            row(&[("_time", "2024-05-01T10:00:00Z"), ("uv_index", "3")]),
            row(&[("_time", "2024-05-01T10:05:00Z"), ("uv_index", "4")]),
        ];
        let (fetcher, repo) = fetcher(FakeRepository::with_responses(vec![
            Ok(unpivoted),
            Ok(pivoted),
        ]));

        let scanned = fetcher
            .fetch_single_field("uv_sensor", "uv_index", window(30))
            .await
            .unwrap();
        let pivoted = fetcher
            .fetch_fields("uv_sensor", &["uv_index"], window(30))
            .await
            .unwrap();

        assert_eq!(scanned, pivoted);
        assert!(!repo.queries.lock().unwrap()[0].contains("pivot("));
    }

    #[tokio::test]
    async fn test_magnitude_three_four_zero() {
        let (fetcher, _) = fetcher(FakeRepository::returning(vec![row(&[
            ("_time", "2024-05-01T10:00:00Z"),
            ("ax", "3"),
            ("ay", "4"),
            ("az", "0"),
        ])]));

        let series = fetcher
            .fetch_with_magnitude("accelerometer", ["ax", "ay", "az"], window(60), "accel_magnitude")
            .await
            .unwrap();

        let magnitude = series.latest("accel_magnitude").unwrap();
        assert!((magnitude - 5.0).abs() < 1e-9);
        assert_eq!(series.columns(), &["ax", "ay", "az", "accel_magnitude"]);
    }

    #[tokio::test]
    async fn test_magnitude_excludes_rows_missing_an_axis() {
        let (fetcher, _) = fetcher(FakeRepository::returning(vec![
            row(&[("_time", "2024-05-01T10:00:00Z"), ("gx", "1"), ("gy", "2"), ("gz", "2")]),
            row(&[("_time", "2024-05-01T10:01:00Z"), ("gx", "1"), ("gy", "2")]),
            row(&[("_time", "2024-05-01T10:02:00Z"), ("gx", "1"), ("gy", "bad"), ("gz", "2")]),
        ]));

        let series = fetcher
            .fetch_with_magnitude("gyroscope", ["gx", "gy", "gz"], window(60), "gyro_magnitude")
            .await
            .unwrap();

        assert_eq!(series.len(), 1);
        assert_eq!(series.numeric_points("gyro_magnitude")[0].1, 3.0);
    }

    #[tokio::test]
    async fn test_rows_with_bad_timestamps_are_skipped() {
        let (fetcher, _) = fetcher(FakeRepository::returning(vec![
            row(&[("_time", "not-a-time"), ("humidity", "40")]),
            row(&[("humidity", "41")]),
            row(&[("_time", "2024-05-01T10:00:00Z"), ("humidity", "42")]),
        ]));

        let series = fetcher
            .fetch_fields("airSensor", &["humidity"], window(60))
            .await
            .unwrap();

        assert_eq!(series.len(), 1);
        assert_eq!(series.latest("humidity"), Some(42.0));
    }

    #[tokio::test]
    async fn test_store_errors_propagate() {
        let (fetcher, _) = fetcher(FakeRepository::with_responses(vec![Err(
            FetchError::Connection("connection refused".to_string()),
        )]));

        let result = fetcher.fetch_fields("airSensor", &["humidity"], window(60)).await;
        assert_eq!(
            result,
            Err(FetchError::Connection("connection refused".to_string()))
        );
    }

    #[tokio::test]
    async fn test_timeout_is_connection_error() {
        let mut repo = FakeRepository::returning(Vec::new());
        repo.delay = Some(Duration::from_millis(500));
        let (fetcher, _) = fetcher(repo);
        let fetcher = fetcher.with_timeout(Duration::from_millis(20));

        let result = fetcher.fetch_fields("airSensor", &["humidity"], window(60)).await;
        assert!(matches!(result, Err(FetchError::Connection(_))));
    }

    #[tokio::test]
    async fn test_empty_field_set_is_query_error() {
        let (fetcher, repo) = fetcher(FakeRepository::returning(Vec::new()));
        let fields: [&str; 0] = [];

        let result = fetcher.fetch_fields("airSensor", &fields, window(60)).await;
        assert!(matches!(result, Err(FetchError::Query(_))));
        assert!(repo.queries.lock().unwrap().is_empty());
    }
}
