// Threshold advisories derived from the latest readings
use serde::{Deserialize, Serialize};

/// Numeric cut-offs applied to the most recent reading.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Thresholds {
    /// Below this the plant needs water
    #[serde(default = "default_humidity_low")]
    pub humidity_low: f64,
    /// Above this conditions are optimal
    #[serde(default = "default_humidity_high")]
    pub humidity_high: f64,
    #[serde(default = "default_uv_moderate")]
    pub uv_moderate: f64,
    #[serde(default = "default_uv_high")]
    pub uv_high: f64,
}

fn default_humidity_low() -> f64 {
    30.0
}

fn default_humidity_high() -> f64 {
    60.0
}

fn default_uv_moderate() -> f64 {
    5.0
}

fn default_uv_high() -> f64 {
    8.0
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            humidity_low: default_humidity_low(),
            humidity_high: default_humidity_high(),
            uv_moderate: default_uv_moderate(),
            uv_high: default_uv_high(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HumidityAdvisory {
    Low,
    Moderate,
    Optimal,
}

impl HumidityAdvisory {
    pub fn classify(humidity: f64, thresholds: &Thresholds) -> Self {
        if humidity < thresholds.humidity_low {
            HumidityAdvisory::Low
        } else if humidity > thresholds.humidity_high {
            HumidityAdvisory::Optimal
        } else {
            HumidityAdvisory::Moderate
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            HumidityAdvisory::Low => "Humidity is low: water the plant.",
            HumidityAdvisory::Moderate => "Humidity is moderate: keep an eye on watering.",
            HumidityAdvisory::Optimal => "Humidity is optimal.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UvAdvisory {
    Safe,
    Moderate,
    High,
}

impl UvAdvisory {
    pub fn classify(uv_index: f64, thresholds: &Thresholds) -> Self {
        if uv_index > thresholds.uv_high {
            UvAdvisory::High
        } else if uv_index > thresholds.uv_moderate {
            UvAdvisory::Moderate
        } else {
            UvAdvisory::Safe
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            UvAdvisory::Safe => "UV level is safe.",
            UvAdvisory::Moderate => "Moderate UV: consider partial shade.",
            UvAdvisory::High => "High UV risk: move the plant out of direct sun.",
        }
    }
}

/// Decorative state shown next to the charts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlantMood {
    Happy,
    Neutral,
    Sad,
}

impl PlantMood {
    pub fn from_humidity(advisory: Option<HumidityAdvisory>) -> Self {
        match advisory {
            Some(HumidityAdvisory::Low) => PlantMood::Sad,
            Some(HumidityAdvisory::Optimal) => PlantMood::Happy,
            Some(HumidityAdvisory::Moderate) | None => PlantMood::Neutral,
        }
    }
}
