// Lookback window domain model
use std::fmt;

/// Minutes of history to fetch, counted back from "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LookbackWindow {
    minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WindowError {
    #[error("lookback window must be at least one minute")]
    Zero,
    #[error("lookback window of {minutes} minutes is outside [{min}, {max}]")]
    OutOfBounds { minutes: u32, min: u32, max: u32 },
}

impl LookbackWindow {
    pub fn new(minutes: u32) -> Result<Self, WindowError> {
        if minutes == 0 {
            return Err(WindowError::Zero);
        }
        Ok(Self { minutes })
    }

    /// Build a window that must also fall inside the slider bounds.
    pub fn bounded(minutes: u32, min: u32, max: u32) -> Result<Self, WindowError> {
        if minutes < min || minutes > max {
            return Err(WindowError::OutOfBounds { minutes, min, max });
        }
        Self::new(minutes)
    }

    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    /// Flux duration literal, e.g. `60m`
    pub fn as_flux_duration(&self) -> String {
        format!("{}m", self.minutes)
    }
}

impl fmt::Display for LookbackWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} min", self.minutes)
    }
}
