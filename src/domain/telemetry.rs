// Chart-ready telemetry models
use super::series::SensorSeries;
use super::summary::ColumnStats;

pub const NO_DATA_NOTICE: &str = "No data available for this range.";

#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesPoint {
    pub time_ms: i64,
    pub value: f64,
}

impl TimeSeriesPoint {
    pub fn new(time_ms: i64, value: f64) -> Self {
        Self { time_ms, value }
    }
}

/// One chart plus its summary figures
#[derive(Debug, Clone, PartialEq)]
pub struct MetricPanel {
    pub id: String,
    pub title: String,
    pub unit: Option<String>,
    pub points: Vec<TimeSeriesPoint>,
    pub stats: Option<ColumnStats>,
    /// Informational text shown instead of the chart
    pub notice: Option<String>,
}

impl MetricPanel {
    /// Chart one column of a series. Absent or empty columns yield a panel
    /// carrying the no-data notice.
    pub fn from_column(
        id: &str,
        title: &str,
        unit: Option<&str>,
        series: &SensorSeries,
        column: &str,
    ) -> Self {
        let points: Vec<TimeSeriesPoint> = series
            .numeric_points(column)
            .into_iter()
            .map(|(time, value)| TimeSeriesPoint::new(time.timestamp_millis(), value))
            .collect();
        let stats = ColumnStats::of(series, column);
        let notice = points.is_empty().then(|| NO_DATA_NOTICE.to_string());

        Self {
            id: id.to_string(),
            title: title.to_string(),
            unit: unit.map(str::to_string),
            points,
            stats,
            notice,
        }
    }

    pub fn has_data(&self) -> bool {
        !self.points.is_empty()
    }
}
