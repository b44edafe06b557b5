// Dashboard service - Use cases for the environment and motion pages
use crate::application::error::FetchError;
use crate::application::sensor_fetcher::SensorSeriesFetcher;
use crate::domain::advisory::{HumidityAdvisory, PlantMood, UvAdvisory};
use crate::domain::dashboard::{Conditions, EnvironmentDashboard, MotionDashboard};
use crate::domain::series::SensorSeries;
use crate::domain::telemetry::MetricPanel;
use crate::domain::window::{LookbackWindow, WindowError};
use crate::infrastructure::config::{DashboardConfig, MotionStream};

#[derive(Clone)]
pub struct DashboardService {
    fetcher: SensorSeriesFetcher,
    config: DashboardConfig,
}

impl DashboardService {
    pub fn new(fetcher: SensorSeriesFetcher, config: DashboardConfig) -> Self {
        Self { fetcher, config }
    }

    /// Resolve the requested window against the slider bounds
    pub fn window(&self, minutes: Option<u32>) -> Result<LookbackWindow, WindowError> {
        let bounds = &self.config.window;
        LookbackWindow::bounded(
            minutes.unwrap_or(bounds.default_minutes),
            bounds.min_minutes,
            bounds.max_minutes,
        )
    }

    pub async fn environment(&self, window: LookbackWindow) -> EnvironmentDashboard {
        let streams = &self.config.streams;
        let mut errors = Vec::new();

        let air_fields = [
            streams.air.temperature_field.as_str(),
            streams.air.humidity_field.as_str(),
        ];
        let air = degrade(
            self.fetcher
                .fetch_fields(&streams.air.measurement, &air_fields, window)
                .await,
            &air_fields,
            &mut errors,
        );

        let uv_fields = [streams.uv.index_field.as_str(), streams.uv.raw_field.as_str()];
        let uv = degrade(
            self.fetcher
                .fetch_fields(&streams.uv.measurement, &uv_fields, window)
                .await,
            &uv_fields,
            &mut errors,
        );

        let temperature = MetricPanel::from_column(
            "temperature",
            "Temperature",
            Some("°C"),
            &air,
            &streams.air.temperature_field,
        );
        let humidity = MetricPanel::from_column(
            "humidity",
            "Humidity",
            Some("%"),
            &air,
            &streams.air.humidity_field,
        );
        let uv_index = MetricPanel::from_column(
            "uv_index",
            "UV index",
            None,
            &uv,
            &streams.uv.index_field,
        );

        let conditions = self.conditions(
            air.latest(&streams.air.humidity_field),
            uv.latest(&streams.uv.index_field),
        );

        EnvironmentDashboard {
            window,
            temperature,
            humidity,
            uv_index,
            conditions,
            errors,
        }
    }

    pub async fn motion(&self, window: LookbackWindow) -> MotionDashboard {
        let streams = &self.config.streams;
        let mut errors = Vec::new();

        let acceleration = self
            .magnitude_panel("acceleration", "Acceleration magnitude", &streams.accelerometer, window, &mut errors)
            .await;
        let rotation = self
            .magnitude_panel("rotation", "Angular rate magnitude", &streams.gyroscope, window, &mut errors)
            .await;

        MotionDashboard {
            window,
            acceleration,
            rotation,
            errors,
        }
    }

    /// Chart a single field of any measurement
    pub async fn single_series(
        &self,
        measurement: &str,
        field: &str,
        window: LookbackWindow,
    ) -> (MetricPanel, Vec<String>) {
        let mut errors = Vec::new();
        let series = degrade(
            self.fetcher.fetch_single_field(measurement, field, window).await,
            &[field],
            &mut errors,
        );
        let panel = MetricPanel::from_column(field, field, None, &series, field);
        (panel, errors)
    }

    async fn magnitude_panel(
        &self,
        id: &str,
        title: &str,
        stream: &MotionStream,
        window: LookbackWindow,
        errors: &mut Vec<String>,
    ) -> MetricPanel {
        let series = degrade(
            self.fetcher
                .fetch_with_magnitude(&stream.measurement, stream.axis_refs(), window, &stream.output)
                .await,
            &[stream.output.as_str()],
            errors,
        )
        .without_columns(&stream.axis_refs());
        MetricPanel::from_column(id, title, None, &series, &stream.output)
    }

    fn conditions(&self, latest_humidity: Option<f64>, latest_uv: Option<f64>) -> Conditions {
        let thresholds = &self.config.thresholds;

        let humidity_overridden = self.config.humidity_override.is_some();
        let humidity = match self.config.humidity_override {
            Some(pinned) => {
                tracing::warn!(
                    "humidity_override is set: using {} instead of measured {:?}",
                    pinned,
                    latest_humidity
                );
                Some(pinned)
            }
            None => latest_humidity,
        };

        let humidity_advisory = humidity.map(|h| HumidityAdvisory::classify(h, thresholds));
        let uv_advisory = latest_uv.map(|uv| UvAdvisory::classify(uv, thresholds));

        Conditions {
            humidity,
            humidity_overridden,
            humidity_advisory,
            uv_index: latest_uv,
            uv_advisory,
            mood: PlantMood::from_humidity(humidity_advisory),
        }
    }
}

/// A failed fetch shows as an empty series; the message is kept for the page.
fn degrade(
    result: Result<SensorSeries, FetchError>,
    columns: &[&str],
    errors: &mut Vec<String>,
) -> SensorSeries {
    match result {
        Ok(series) => series,
        Err(e) => {
            tracing::warn!("Showing empty {:?} series: {}", columns, e);
            errors.push(e.to_string());
            SensorSeries::empty(columns)
        }
    }
}
