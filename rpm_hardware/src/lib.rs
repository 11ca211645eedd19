//! Concrete gyroscope sources for the rpm workspace.

pub mod error;
pub mod iio;
pub mod util;

pub use iio::IioGyro;
