use crate::domain::advisory::Thresholds;
use serde::Deserialize;
use std::time::Duration;

const ENV_PREFIX: &str = "PLANTMON";

#[derive(Debug, Deserialize, Clone)]
pub struct InfluxConfig {
    pub influx: InfluxSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InfluxSettings {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub org: String,
    #[serde(default)]
    pub bucket: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("influx.{0} must be set")]
    Missing(&'static str),
    #[error("influx.timeout_secs must be greater than zero")]
    ZeroTimeout,
    #[error("window bounds must satisfy 1 <= min ({min}) <= default ({default}) <= max ({max})")]
    InvalidWindow { min: u32, max: u32, default: u32 },
}

impl InfluxSettings {
    /// Connection settings are only checked for presence
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("url", &self.url),
            ("token", &self.token),
            ("org", &self.org),
            ("bucket", &self.bucket),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Missing(name));
            }
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct DashboardConfig {
    pub server: ServerSettings,
    pub window: WindowSettings,
    pub streams: StreamsConfig,
    pub thresholds: Thresholds,
    /// Pins the humidity used for advisory and mood. Debug aid, leave unset.
    pub humidity_override: Option<f64>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSettings {
    pub bind_addr: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Slider bounds for the lookback window, in minutes
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct WindowSettings {
    pub min_minutes: u32,
    pub max_minutes: u32,
    pub default_minutes: u32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            min_minutes: 10,
            max_minutes: 180,
            default_minutes: 60,
        }
    }
}

impl WindowSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ok = self.min_minutes >= 1
            && self.min_minutes <= self.default_minutes
            && self.default_minutes <= self.max_minutes;
        if ok {
            Ok(())
        } else {
            Err(ConfigError::InvalidWindow {
                min: self.min_minutes,
                max: self.max_minutes,
                default: self.default_minutes,
            })
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(from = "StreamsOverrides")]
pub struct StreamsConfig {
    pub air: AirStream,
    pub uv: UvStream,
    pub accelerometer: MotionStream,
    pub gyroscope: MotionStream,
}

impl Default for StreamsConfig {
    fn default() -> Self {
        StreamsOverrides::default().into()
    }
}

/// Raw `[streams]` table; motion keys left out fall back one by one to the
/// stream's own defaults.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct StreamsOverrides {
    air: AirStream,
    uv: UvStream,
    accelerometer: MotionOverrides,
    gyroscope: MotionOverrides,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct MotionOverrides {
    measurement: Option<String>,
    axes: Option<[String; 3]>,
    output: Option<String>,
}

impl MotionOverrides {
    fn resolve(self, base: MotionStream) -> MotionStream {
        MotionStream {
            measurement: self.measurement.unwrap_or(base.measurement),
            axes: self.axes.unwrap_or(base.axes),
            output: self.output.unwrap_or(base.output),
        }
    }
}

impl From<StreamsOverrides> for StreamsConfig {
    fn from(raw: StreamsOverrides) -> Self {
        Self {
            air: raw.air,
            uv: raw.uv,
            accelerometer: raw.accelerometer.resolve(MotionStream::accelerometer()),
            gyroscope: raw.gyroscope.resolve(MotionStream::gyroscope()),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AirStream {
    pub measurement: String,
    pub temperature_field: String,
    pub humidity_field: String,
}

impl Default for AirStream {
    fn default() -> Self {
        Self {
            measurement: "airSensor".to_string(),
            temperature_field: "temperature".to_string(),
            humidity_field: "humidity".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct UvStream {
    pub measurement: String,
    pub index_field: String,
    pub raw_field: String,
}

impl Default for UvStream {
    fn default() -> Self {
        Self {
            measurement: "uv_sensor".to_string(),
            index_field: "uv_index".to_string(),
            raw_field: "uv_raw".to_string(),
        }
    }
}

/// Three-axis motion sensor and the magnitude column derived from it
#[derive(Debug, Clone, PartialEq)]
pub struct MotionStream {
    pub measurement: String,
    pub axes: [String; 3],
    pub output: String,
}

impl MotionStream {
    fn new(measurement: &str, axes: [&str; 3], output: &str) -> Self {
        Self {
            measurement: measurement.to_string(),
            axes: axes.map(str::to_string),
            output: output.to_string(),
        }
    }

    pub fn accelerometer() -> Self {
        Self::new("accelerometer", ["ax", "ay", "az"], "accel_magnitude")
    }

    pub fn gyroscope() -> Self {
        Self::new("gyroscope", ["gx", "gy", "gz"], "gyro_magnitude")
    }

    pub fn axis_refs(&self) -> [&str; 3] {
        [&self.axes[0], &self.axes[1], &self.axes[2]]
    }
}

pub fn load_influx_config() -> anyhow::Result<InfluxConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/influx").required(false))
        .add_source(env_source())
        .build()?;

    let config: InfluxConfig = settings.try_deserialize()?;
    config.influx.validate()?;
    Ok(config)
}

pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(env_source())
        .build()?;

    let config: DashboardConfig = settings.try_deserialize()?;
    config.window.validate()?;
    Ok(config)
}

/// `PLANTMON__INFLUX__TOKEN` overrides `influx.token`
fn env_source() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}
