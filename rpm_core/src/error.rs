use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeterError {
    /// The sample source does not exist on this device. Not fatal: the
    /// session stays idle and keeps reporting zeros.
    #[error("sensor unavailable: {0}")]
    SensorUnavailable(String),
    #[error("sensor error: {0}")]
    Sensor(String),
    #[error("timeout waiting for sensor")]
    Timeout,
    #[error("configuration error: {0}")]
    Config(String),
    #[error("invalid state: {0}")]
    State(String),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BuildError {
    #[error("invalid target speed {0} (must be finite and > 0)")]
    InvalidTarget(f64),
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
