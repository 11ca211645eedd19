//! Smoothing estimator: angular velocity in, smoothed RPM out.
//!
//! Each reading is converted to an RPM magnitude and pushed into a bounded
//! rolling window. The window is collapsed either by a plain mean or by a
//! robust mean that discards readings far from the median (hand jitter,
//! acceleration spikes). A minimum-detectable floor separates sensor noise
//! from a turntable that is actually stopped.

use crate::config::{SmoothingCfg, SmoothingPolicy};
use crate::util::rad_per_s_to_rpm;
use crate::window::RollingWindow;

/// Per-sample output of the estimator.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RpmEstimate {
    /// This sample's instantaneous RPM (always >= 0).
    pub raw_rpm: f64,
    /// Window-smoothed RPM.
    pub smoothed_rpm: f64,
    /// `smoothed_rpm`, or 0 when below the minimum detectable speed.
    pub display_rpm: f64,
}

#[derive(Debug, Clone)]
pub struct SmoothingEstimator {
    cfg: SmoothingCfg,
    window: RollingWindow,
    last: RpmEstimate,
    // Scratch buffers reused every tick for the median/MAD passes
    sorted: Vec<f64>,
    devs: Vec<f64>,
}

impl SmoothingEstimator {
    pub fn new(cfg: SmoothingCfg) -> Self {
        let n = cfg.window.max(1);
        Self {
            window: RollingWindow::new(n),
            last: RpmEstimate::default(),
            sorted: Vec::with_capacity(n),
            devs: Vec::with_capacity(n),
            cfg,
        }
    }

    pub fn cfg(&self) -> &SmoothingCfg {
        &self.cfg
    }

    /// Window of raw per-sample RPM readings (pre-smoothing).
    pub fn window(&self) -> &RollingWindow {
        &self.window
    }

    pub fn last(&self) -> RpmEstimate {
        self.last
    }

    /// Feed one angular-velocity reading in rad/s.
    pub fn ingest(&mut self, angular_velocity: f64) -> RpmEstimate {
        self.ingest_rpm(rad_per_s_to_rpm(angular_velocity))
    }

    /// Feed an RPM reading directly (synthetic sources). The sign is dropped.
    ///
    /// Non-finite readings are not admitted to the window; the previous
    /// estimate is returned unchanged.
    pub fn ingest_rpm(&mut self, rpm: f64) -> RpmEstimate {
        if !rpm.is_finite() {
            tracing::trace!(rpm, "dropping non-finite reading");
            return self.last;
        }
        let raw_rpm = rpm.abs();
        self.window.push(raw_rpm);

        let smoothed_rpm = self.smooth();
        let display_rpm = if smoothed_rpm < self.cfg.min_detectable_rpm {
            0.0
        } else {
            smoothed_rpm
        };
        self.last = RpmEstimate {
            raw_rpm,
            smoothed_rpm,
            display_rpm,
        };
        self.last
    }

    /// Drop all readings and zero the last estimate.
    pub fn reset(&mut self) {
        self.window.clear();
        self.last = RpmEstimate::default();
    }

    fn smooth(&mut self) -> f64 {
        match self.cfg.policy {
            SmoothingPolicy::Robust if self.window.len() >= self.cfg.robust_min_samples.max(1) => {
                self.sorted.clear();
                self.sorted.extend(self.window.iter());
                robust_mean_with(
                    &mut self.sorted,
                    &mut self.devs,
                    self.cfg.mad_multiplier,
                    self.cfg.min_rejection_rpm,
                )
            }
            _ => window_mean(&self.window),
        }
    }
}

/// Mean straight off the ring, no copy.
fn window_mean(window: &RollingWindow) -> f64 {
    if window.is_empty() {
        return 0.0;
    }
    window.iter().sum::<f64>() / window.len() as f64
}

/// Arithmetic mean; 0.0 for an empty slice.
pub fn simple_mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Median of an already sorted slice; 0.0 for an empty slice.
fn median_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    let mid = n / 2;
    if n.is_multiple_of(2) {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Outlier-rejecting mean.
///
/// Readings farther than `max(mad_multiplier * MAD, min_rejection)` from the
/// median are discarded and the rest averaged. Returns 0.0 when the input is
/// empty or every reading is rejected.
pub fn robust_mean(values: &[f64], mad_multiplier: f64, min_rejection: f64) -> f64 {
    let mut sorted = values.to_vec();
    let mut devs = Vec::with_capacity(values.len());
    robust_mean_with(&mut sorted, &mut devs, mad_multiplier, min_rejection)
}

// `values` is sorted in place; `devs` is scratch. Order of `values` does not
// matter for the result, so sorting the caller's copy is fine.
fn robust_mean_with(
    values: &mut [f64],
    devs: &mut Vec<f64>,
    mad_multiplier: f64,
    min_rejection: f64,
) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_unstable_by(f64::total_cmp);
    let median = median_sorted(values);

    devs.clear();
    devs.extend(values.iter().map(|v| (v - median).abs()));
    devs.sort_unstable_by(f64::total_cmp);
    let mad = median_sorted(devs);

    let radius = (mad_multiplier * mad).max(min_rejection);
    let (sum, kept) = values
        .iter()
        .filter(|v| (*v - median).abs() <= radius)
        .fold((0.0_f64, 0_usize), |(s, n), v| (s + v, n + 1));
    if kept == 0 { 0.0 } else { sum / kept as f64 }
}
