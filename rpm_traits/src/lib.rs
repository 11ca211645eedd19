pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// A single-axis angular-velocity source (the turntable's rotation axis).
///
/// `read` blocks for at most `timeout` and returns the current rate in
/// radians per second. Sign follows the device convention; the pipeline only
/// relies on it for display counter-rotation.
pub trait Gyro {
    fn read(
        &mut self,
        timeout: std::time::Duration,
    ) -> Result<f64, Box<dyn std::error::Error + Send + Sync>>;

    /// Check that the sensor exists before a session is armed.
    /// Sources that are always present keep the default.
    fn probe(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }
}

impl<G: Gyro + ?Sized> Gyro for Box<G> {
    fn read(
        &mut self,
        timeout: std::time::Duration,
    ) -> Result<f64, Box<dyn std::error::Error + Send + Sync>> {
        (**self).read(timeout)
    }

    fn probe(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).probe()
    }
}
