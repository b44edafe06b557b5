// Dashboard domain models
use super::advisory::{HumidityAdvisory, PlantMood, UvAdvisory};
use super::telemetry::MetricPanel;
use super::window::LookbackWindow;

#[derive(Debug, Clone)]
pub struct EnvironmentDashboard {
    pub window: LookbackWindow,
    pub temperature: MetricPanel,
    pub humidity: MetricPanel,
    pub uv_index: MetricPanel,
    pub conditions: Conditions,
    /// Store failures encountered while building the page
    pub errors: Vec<String>,
}

/// Advisories computed from the latest readings
#[derive(Debug, Clone, PartialEq)]
pub struct Conditions {
    pub humidity: Option<f64>,
    pub humidity_overridden: bool,
    pub humidity_advisory: Option<HumidityAdvisory>,
    pub uv_index: Option<f64>,
    pub uv_advisory: Option<UvAdvisory>,
    pub mood: PlantMood,
}

#[derive(Debug, Clone)]
pub struct MotionDashboard {
    pub window: LookbackWindow,
    pub acceleration: MetricPanel,
    pub rotation: MetricPanel,
    pub errors: Vec<String>,
}
