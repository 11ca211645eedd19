//! Maps `Box<dyn Error>` from the `Gyro` boundary to typed `MeterError`.
//!
//! `rpm_traits` uses `Box<dyn Error + Send + Sync>` so any source can plug
//! in; this module recovers a typed error, downcasting
//! `rpm_hardware::HwError` precisely when the `hardware-errors` feature is on.

use crate::error::MeterError;

/// Map a trait-boundary error to a typed `MeterError`.
///
/// Known hardware error types are downcast first, then string heuristics
/// apply.
pub fn map_sensor_error(e: &(dyn std::error::Error + 'static)) -> MeterError {
    #[cfg(feature = "hardware-errors")]
    {
        use rpm_hardware::error::HwError;
        if let Some(hw) = e.downcast_ref::<HwError>() {
            return match hw {
                HwError::Unavailable(what) => MeterError::SensorUnavailable(what.clone()),
                HwError::Timeout => MeterError::Timeout,
                other => MeterError::Sensor(other.to_string()),
            };
        }
    }

    if let Some(io) = e.downcast_ref::<std::io::Error>() {
        if io.kind() == std::io::ErrorKind::NotFound {
            return MeterError::SensorUnavailable(io.to_string());
        }
    }

    let s = e.to_string();
    let lower = s.to_lowercase();
    if lower.contains("timeout") || lower.contains("timed out") {
        MeterError::Timeout
    } else if lower.contains("unavailable") || lower.contains("not found") {
        MeterError::SensorUnavailable(s)
    } else {
        MeterError::Sensor(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_not_found_is_unavailable() {
        let e = std::io::Error::new(std::io::ErrorKind::NotFound, "no such device");
        assert!(matches!(map_sensor_error(&e), MeterError::SensorUnavailable(_)));
    }

    #[test]
    fn string_heuristics() {
        let e = std::io::Error::other("read timeout");
        assert_eq!(map_sensor_error(&e), MeterError::Timeout);
        let e = std::io::Error::other("checksum mismatch");
        assert_eq!(map_sensor_error(&e), MeterError::Sensor("checksum mismatch".into()));
    }

    #[cfg(feature = "hardware-errors")]
    #[test]
    fn downcasts_hw_error() {
        use rpm_hardware::error::HwError;
        let e = HwError::Unavailable("iio:device0".into());
        assert_eq!(
            map_sensor_error(&e),
            MeterError::SensorUnavailable("iio:device0".into())
        );
        assert_eq!(map_sensor_error(&HwError::Timeout), MeterError::Timeout);
    }
}
