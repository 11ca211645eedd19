//! Test and helper gyros for rpm_core

use rpm_traits::Gyro;
use std::time::Duration;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A gyro that always errors on read.
pub struct NoopGyro;

impl Gyro for NoopGyro {
    fn read(&mut self, _timeout: Duration) -> Result<f64, BoxError> {
        Err(Box::new(std::io::Error::other("noop gyro")))
    }
}

/// A gyro reporting a fixed angular velocity (rad/s).
#[derive(Debug, Clone, Copy)]
pub struct ConstantGyro(pub f64);

impl ConstantGyro {
    /// A gyro spinning at `rpm`.
    pub fn from_rpm(rpm: f64) -> Self {
        Self(crate::util::rpm_to_rad_per_s(rpm))
    }
}

impl Gyro for ConstantGyro {
    fn read(&mut self, _timeout: Duration) -> Result<f64, BoxError> {
        Ok(self.0)
    }
}

/// A gyro whose device is missing: `probe` and `read` both fail.
pub struct UnavailableGyro;

impl Gyro for UnavailableGyro {
    fn read(&mut self, _timeout: Duration) -> Result<f64, BoxError> {
        Err(Box::new(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "gyroscope not present",
        )))
    }

    fn probe(&mut self) -> Result<(), BoxError> {
        self.read(Duration::ZERO).map(|_| ())
    }
}
