//! Common time and unit helpers for rpm_core.

use std::f64::consts::{PI, TAU};

/// Number of microseconds in one second.
pub const MICROS_PER_SEC: u64 = 1_000_000;
/// Number of milliseconds in one second.
pub const MILLIS_PER_SEC: u64 = 1_000;
/// Degrees per radian.
pub const DEG_PER_RAD: f64 = 180.0 / PI;

/// Compute the period in microseconds for a given sampling rate in Hz.
/// - Clamps `hz` to at least 1 to avoid division by zero.
/// - Ensures result is at least 1 microsecond.
#[inline]
pub fn period_us(hz: u32) -> u64 {
    (MICROS_PER_SEC / u64::from(hz.max(1))).max(1)
}

/// Compute the period in milliseconds for a given sampling rate in Hz.
/// - Clamps `hz` to at least 1 to avoid division by zero.
/// - Ensures result is at least 1 millisecond.
#[inline]
pub fn period_ms(hz: u32) -> u64 {
    (MILLIS_PER_SEC / u64::from(hz.max(1))).max(1)
}

/// Angular velocity (rad/s) to speed magnitude in RPM. Direction is discarded.
#[inline]
pub fn rad_per_s_to_rpm(omega: f64) -> f64 {
    omega.abs() * 60.0 / TAU
}

/// Speed in RPM to angular velocity (rad/s), sign preserved.
#[inline]
pub fn rpm_to_rad_per_s(rpm: f64) -> f64 {
    rpm * TAU / 60.0
}
