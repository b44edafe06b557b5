// Mapper to convert domain models to JSON response bodies
use crate::domain::advisory::{HumidityAdvisory, PlantMood, UvAdvisory};
use crate::domain::dashboard::{Conditions, EnvironmentDashboard, MotionDashboard};
use crate::domain::summary::ColumnStats;
use crate::domain::telemetry::{MetricPanel, TimeSeriesPoint};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct PointView {
    pub time_ms: i64,
    pub value: f64,
}

#[derive(Debug, Serialize)]
pub struct PanelView {
    pub id: String,
    pub title: String,
    pub unit: Option<String>,
    pub has_data: bool,
    pub points: Vec<PointView>,
    pub stats: Option<ColumnStats>,
    pub notice: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AdvisoryView<L: Serialize> {
    pub level: L,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ConditionsView {
    pub humidity: Option<f64>,
    pub humidity_overridden: bool,
    pub humidity_advisory: Option<AdvisoryView<HumidityAdvisory>>,
    pub uv_index: Option<f64>,
    pub uv_advisory: Option<AdvisoryView<UvAdvisory>>,
    pub mood: PlantMood,
}

#[derive(Debug, Serialize)]
pub struct EnvironmentView {
    pub window_minutes: u32,
    pub temperature: PanelView,
    pub humidity: PanelView,
    pub uv_index: PanelView,
    pub conditions: ConditionsView,
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct MotionView {
    pub window_minutes: u32,
    pub acceleration: PanelView,
    pub rotation: PanelView,
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SeriesView {
    pub measurement: String,
    pub window_minutes: u32,
    pub series: PanelView,
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorView {
    pub error: String,
}

impl From<TimeSeriesPoint> for PointView {
    fn from(point: TimeSeriesPoint) -> Self {
        Self {
            time_ms: point.time_ms,
            value: point.value,
        }
    }
}

impl From<MetricPanel> for PanelView {
    fn from(panel: MetricPanel) -> Self {
        Self {
            has_data: panel.has_data(),
            id: panel.id,
            title: panel.title,
            unit: panel.unit,
            points: panel.points.into_iter().map(PointView::from).collect(),
            stats: panel.stats,
            notice: panel.notice,
        }
    }
}

impl From<Conditions> for ConditionsView {
    fn from(conditions: Conditions) -> Self {
        Self {
            humidity: conditions.humidity,
            humidity_overridden: conditions.humidity_overridden,
            humidity_advisory: conditions.humidity_advisory.map(|level| AdvisoryView {
                message: level.message(),
                level,
            }),
            uv_index: conditions.uv_index,
            uv_advisory: conditions.uv_advisory.map(|level| AdvisoryView {
                message: level.message(),
                level,
            }),
            mood: conditions.mood,
        }
    }
}

impl From<EnvironmentDashboard> for EnvironmentView {
    fn from(page: EnvironmentDashboard) -> Self {
        Self {
            window_minutes: page.window.minutes(),
            temperature: page.temperature.into(),
            humidity: page.humidity.into(),
            uv_index: page.uv_index.into(),
            conditions: page.conditions.into(),
            errors: page.errors,
        }
    }
}

impl From<MotionDashboard> for MotionView {
    fn from(page: MotionDashboard) -> Self {
        Self {
            window_minutes: page.window.minutes(),
            acceleration: page.acceleration.into(),
            rotation: page.rotation.into(),
            errors: page.errors,
        }
    }
}
