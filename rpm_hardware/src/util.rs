use std::path::{Path, PathBuf};

use crate::error::{HwError, Result};

/// Default IIO device root on Linux.
pub const IIO_DEVICES: &str = "/sys/bus/iio/devices";

/// Read a sysfs attribute and parse it as `f64`, tolerating surrounding
/// whitespace.
pub fn read_attr_f64(path: &Path) -> Result<f64> {
    let text = std::fs::read_to_string(path)?;
    let trimmed = text.trim();
    trimmed
        .parse::<f64>()
        .map_err(|_| HwError::Parse(format!("{}: {trimmed:?}", path.display())))
}

/// First `iio:device*` under `root` exposing a z-axis angular velocity
/// channel, in name order.
pub fn find_gyro_device(root: &Path) -> Result<PathBuf> {
    let entries = match std::fs::read_dir(root) {
        Ok(e) => e,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(HwError::Unavailable(format!("{} does not exist", root.display())));
        }
        Err(e) => return Err(e.into()),
    };
    let mut candidates: Vec<PathBuf> = entries
        .filter_map(std::result::Result::ok)
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("iio:device"))
        })
        .filter(|p| p.join("in_anglvel_z_raw").is_file())
        .collect();
    candidates.sort();
    candidates
        .into_iter()
        .next()
        .ok_or_else(|| HwError::Unavailable(format!("no gyroscope under {}", root.display())))
}
