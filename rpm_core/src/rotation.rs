//! Accumulated rotation for display counter-rotation.
//!
//! Integrates the raw angular velocity directly. Differencing the smoothed
//! RPM would lag and amplify noise under fast transients. The angle is never
//! wrapped or clamped.

use crate::util::DEG_PER_RAD;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RotationAccumulator {
    degrees: f64,
}

impl RotationAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Integrate `angular_velocity` (rad/s) over `elapsed_s` seconds.
    ///
    /// The accumulator moves opposite to the measured rotation so an overlay
    /// rotated by it stays upright. Non-positive or non-finite steps leave
    /// the angle unchanged.
    pub fn integrate(&mut self, angular_velocity: f64, elapsed_s: f64) -> f64 {
        if angular_velocity.is_finite() && elapsed_s.is_finite() && elapsed_s > 0.0 {
            self.degrees -= angular_velocity * elapsed_s * DEG_PER_RAD;
        }
        self.degrees
    }

    #[inline]
    pub fn degrees(&self) -> f64 {
        self.degrees
    }

    pub fn reset(&mut self) {
        self.degrees = 0.0;
    }
}
