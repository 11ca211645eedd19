//! Lock detection over the raw per-sample RPM window.

use crate::window::RollingWindow;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StabilityClassifier {
    required_len: usize,
    tolerance_pct: f64,
}

impl StabilityClassifier {
    /// `required_len` is the configured smoothing window size. The band is
    /// `perfect_pct * multiplier` percent of the target on either side.
    pub fn new(required_len: usize, perfect_pct: f64, multiplier: f64) -> Self {
        Self {
            required_len: required_len.max(1),
            tolerance_pct: perfect_pct * multiplier,
        }
    }

    #[inline]
    pub fn tolerance_pct(&self) -> f64 {
        self.tolerance_pct
    }

    /// True once the window holds `required_len` readings and every one of
    /// them sits within the band around `target`.
    pub fn is_stable(&self, window: &RollingWindow, target: f64) -> bool {
        if window.len() < self.required_len {
            return false;
        }
        let band = target * self.tolerance_pct / 100.0;
        window.iter().all(|v| (v - target).abs() <= band)
    }
}
