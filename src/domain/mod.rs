// Domain layer - Sensor tables and the values derived from them
pub mod advisory;
pub mod dashboard;
pub mod series;
pub mod summary;
pub mod telemetry;
pub mod window;
