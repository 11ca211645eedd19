//! Human-readable error descriptions and structured JSON error formatting.

use rpm_core::error::{BuildError, MeterError};

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::InvalidTarget(rpm) => format!(
                "What happened: Target speed {rpm} is not usable.\nLikely causes: A zero, negative or non-numeric entry in [targets] speeds.\nHow to fix: List positive RPM values, e.g. speeds = [33.33, 45.0, 78.0]."
            ),
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun. See etc/rpm_config.toml for a sample."
            ),
        };
    }

    if let Some(me) = err.downcast_ref::<MeterError>() {
        return match me {
            MeterError::SensorUnavailable(what) => format!(
                "What happened: No gyroscope is available ({what}).\nLikely causes: The device has no gyroscope, the IIO driver is not loaded, or the path is wrong.\nHow to fix: Check /sys/bus/iio/devices, pass --device, or use --synthetic."
            ),
            MeterError::Timeout => "What happened: Gyroscope read timed out.\nLikely causes: Sensor suspended or the timeout is too low.\nHow to fix: Raise sampling.read_timeout_ms in the config.".to_string(),
            MeterError::Config(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Malformed TOML or out-of-range values.\nHow to fix: Edit the config file, then rerun."
            ),
            other => format!(
                "What happened: {other}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    // Capture CSV header special-case
    if lower.contains("capture csv must have headers") {
        return "Invalid headers in capture CSV. Expected 'timestamp_s,angular_velocity_z'."
            .to_string();
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable process exit codes. Usage errors (2) are reported by clap itself.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if let Some(me) = err.downcast_ref::<MeterError>() {
        return match me {
            MeterError::SensorUnavailable(_) => 3,
            MeterError::Config(_) => 4,
            _ => 1,
        };
    }
    if err.downcast_ref::<BuildError>().is_some() {
        return 4;
    }
    1
}

fn reason_name(err: &eyre::Report) -> &'static str {
    if let Some(me) = err.downcast_ref::<MeterError>() {
        return match me {
            MeterError::SensorUnavailable(_) => "SensorUnavailable",
            MeterError::Sensor(_) => "Sensor",
            MeterError::Timeout => "Timeout",
            MeterError::Config(_) => "Config",
            MeterError::State(_) => "State",
        };
    }
    if err.downcast_ref::<BuildError>().is_some() {
        return "Config";
    }
    "Error"
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({
        "reason": reason_name(err),
        "exit_code": exit_code_for_error(err),
        "message": humanize(err),
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes() {
        let unavailable = eyre::Report::new(MeterError::SensorUnavailable("x".into()));
        assert_eq!(exit_code_for_error(&unavailable), 3);
        let bad_cfg = eyre::Report::new(BuildError::InvalidConfig("window"));
        assert_eq!(exit_code_for_error(&bad_cfg), 4);
        assert_eq!(exit_code_for_error(&eyre::eyre!("boom")), 1);
    }

    #[test]
    fn json_error_carries_reason() {
        let e = eyre::Report::new(MeterError::Timeout);
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&e)).unwrap();
        assert_eq!(v["reason"], "Timeout");
        assert_eq!(v["exit_code"], 1);
    }
}
