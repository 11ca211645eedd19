//! Linux IIO gyroscope read through sysfs.
//!
//! Angular velocity is `(in_anglvel_z_raw + offset) * scale` in rad/s. The
//! scale comes from `in_anglvel_z_scale` or the shared `in_anglvel_scale`;
//! the offset is optional and defaults to 0. Both are read once at open.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rpm_traits::Gyro;
use tracing::trace;

use crate::error::{HwError, Result};
use crate::util::{find_gyro_device, read_attr_f64};

#[derive(Debug, Clone)]
pub struct IioGyro {
    dir: PathBuf,
    raw_path: PathBuf,
    scale: f64,
    offset: f64,
}

impl IioGyro {
    /// Open the IIO device directory `dir` (e.g. `/sys/bus/iio/devices/iio:device0`).
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        let raw_path = dir.join("in_anglvel_z_raw");
        if !raw_path.is_file() {
            return Err(HwError::Unavailable(format!(
                "{} has no in_anglvel_z_raw",
                dir.display()
            )));
        }
        let scale = first_attr(&dir, &["in_anglvel_z_scale", "in_anglvel_scale"])?
            .ok_or_else(|| HwError::Unavailable(format!("{} has no anglvel scale", dir.display())))?;
        if !(scale.is_finite() && scale != 0.0) {
            return Err(HwError::Parse(format!("anglvel scale {scale}")));
        }
        let offset = first_attr(&dir, &["in_anglvel_z_offset", "in_anglvel_offset"])?.unwrap_or(0.0);
        tracing::debug!(dir = %dir.display(), scale, offset, "iio gyroscope opened");
        Ok(Self {
            dir,
            raw_path,
            scale,
            offset,
        })
    }

    /// Open the first gyroscope found under `root` (normally
    /// `/sys/bus/iio/devices`).
    pub fn discover(root: impl AsRef<Path>) -> Result<Self> {
        Self::open(find_gyro_device(root.as_ref())?)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// One reading in rad/s.
    pub fn read_rad_per_s(&self, timeout: Duration) -> Result<f64> {
        let started = Instant::now();
        let raw = match read_attr_f64(&self.raw_path) {
            Err(HwError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(HwError::Unavailable(format!("{} disappeared", self.dir.display())));
            }
            other => other?,
        };
        if started.elapsed() > timeout {
            return Err(HwError::Timeout);
        }
        let rate = (raw + self.offset) * self.scale;
        trace!(raw, rate, "iio anglvel_z");
        Ok(rate)
    }
}

fn first_attr(dir: &Path, names: &[&str]) -> Result<Option<f64>> {
    for name in names {
        let p = dir.join(name);
        if p.is_file() {
            return read_attr_f64(&p).map(Some);
        }
    }
    Ok(None)
}

impl Gyro for IioGyro {
    fn read(&mut self, timeout: Duration) -> std::result::Result<f64, Box<dyn std::error::Error + Send + Sync>> {
        self.read_rad_per_s(timeout).map_err(Into::into)
    }

    fn probe(&mut self) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if self.raw_path.is_file() {
            Ok(())
        } else {
            Err(Box::new(HwError::Unavailable(format!(
                "{} is gone",
                self.dir.display()
            ))))
        }
    }
}
