//! Runtime configuration for the measurement pipeline.
//!
//! These are the structs the session and generator consume. They are
//! separate from the TOML-deserialized config in `rpm_config`; see
//! `conversions` for the mapping.

/// How the rolling window is collapsed into one RPM figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SmoothingPolicy {
    /// Arithmetic mean of the window.
    #[default]
    Mean,
    /// Median/MAD outlier rejection, then mean of the survivors.
    Robust,
}

/// Smoothing estimator parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothingCfg {
    /// Rolling window length in samples (N).
    pub window: usize,
    pub policy: SmoothingPolicy,
    /// Smoothed readings strictly below this display as 0 RPM.
    pub min_detectable_rpm: f64,
    /// Robust policy: rejection radius is `mad_multiplier * MAD` ...
    pub mad_multiplier: f64,
    /// ... but never smaller than this many RPM.
    pub min_rejection_rpm: f64,
    /// Robust policy needs at least this many readings; below it the plain mean is used.
    pub robust_min_samples: usize,
}

impl Default for SmoothingCfg {
    fn default() -> Self {
        Self {
            window: 120,
            policy: SmoothingPolicy::Mean,
            min_detectable_rpm: 0.02,
            mad_multiplier: 2.0,
            min_rejection_rpm: 0.5,
            robust_min_samples: 3,
        }
    }
}

/// Target speeds and the percentage bands around them.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetCfg {
    /// Reference speeds in RPM, in tie-break order.
    pub speeds: Vec<f64>,
    /// Deviation (%) considered on-speed; also the stability band.
    pub perfect_pct: f64,
    /// Deviation (%) considered close.
    pub good_pct: f64,
    /// Deviation (%) at or beyond which no target is matched.
    pub max_pct: f64,
    /// Multiplier applied to `perfect_pct` for the stability band (1.0 = literal).
    pub stability_multiplier: f64,
}

impl Default for TargetCfg {
    fn default() -> Self {
        Self {
            speeds: vec![33.33, 45.0, 78.0],
            perfect_pct: 1.0,
            good_pct: 5.0,
            max_pct: 10.0,
            stability_multiplier: 1.0,
        }
    }
}

/// Deviation history parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryCfg {
    pub capacity: usize,
    /// Adjacent entries further apart than this (percentage points) mark a target change.
    pub jump_threshold_pct: f64,
}

impl Default for HistoryCfg {
    fn default() -> Self {
        Self {
            capacity: 100,
            jump_threshold_pct: 15.0,
        }
    }
}

/// Sample cadence and sensor timeouts.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingCfg {
    pub frequency_hz: u32,
    /// Max sensor wait per read (ms).
    pub read_timeout_ms: u64,
}

impl Default for SamplingCfg {
    fn default() -> Self {
        Self {
            frequency_hz: 120,
            read_timeout_ms: 50,
        }
    }
}

/// A sinusoidal speed perturbation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub freq_hz: f64,
    /// Peak amplitude as a percentage of the ramped RPM.
    pub amplitude_pct: f64,
}

impl Tone {
    pub const fn new(freq_hz: f64, amplitude_pct: f64) -> Self {
        Self {
            freq_hz,
            amplitude_pct,
        }
    }
}

/// Synthetic ramp + wow/flutter + noise generator parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticCfg {
    /// `None` seeds from OS entropy.
    pub seed: Option<u64>,
    pub start_rpm: f64,
    pub end_rpm: f64,
    pub ramp_rpm_per_s: f64,
    /// Uniform noise bound, percent of the ramped RPM.
    pub noise_pct: f64,
    /// Slow (sub-2 Hz) tones.
    pub wow: Vec<Tone>,
    /// Fast (>5 Hz) tones.
    pub flutter: Vec<Tone>,
}

impl Default for SyntheticCfg {
    fn default() -> Self {
        Self {
            seed: None,
            start_rpm: 30.0,
            end_rpm: 33.33,
            ramp_rpm_per_s: 1.0,
            noise_pct: 0.5,
            wow: vec![Tone::new(0.55, 0.20), Tone::new(1.3, 0.08)],
            flutter: vec![Tone::new(6.5, 0.05), Tone::new(14.0, 0.02)],
        }
    }
}
