//! `From` implementations bridging `rpm_config` types to `rpm_core` types.

use crate::config::{
    HistoryCfg, SamplingCfg, SmoothingCfg, SmoothingPolicy, SyntheticCfg, TargetCfg, Tone,
};

// ── SmoothingCfg ─────────────────────────────────────────────────────────────

impl From<rpm_config::SmoothingPolicy> for SmoothingPolicy {
    fn from(p: rpm_config::SmoothingPolicy) -> Self {
        match p {
            rpm_config::SmoothingPolicy::Mean => Self::Mean,
            rpm_config::SmoothingPolicy::Robust => Self::Robust,
        }
    }
}

impl From<&rpm_config::SmoothingCfg> for SmoothingCfg {
    fn from(c: &rpm_config::SmoothingCfg) -> Self {
        Self {
            window: c.window,
            policy: c.policy.into(),
            min_detectable_rpm: c.min_detectable_rpm,
            mad_multiplier: c.mad_multiplier,
            min_rejection_rpm: c.min_rejection_rpm,
            robust_min_samples: c.robust_min_samples,
        }
    }
}

// ── TargetCfg ────────────────────────────────────────────────────────────────

impl From<&rpm_config::TargetsCfg> for TargetCfg {
    fn from(c: &rpm_config::TargetsCfg) -> Self {
        Self {
            speeds: c.speeds.clone(),
            perfect_pct: c.perfect_pct,
            good_pct: c.good_pct,
            max_pct: c.max_pct,
            stability_multiplier: c.stability_multiplier,
        }
    }
}

// ── HistoryCfg ───────────────────────────────────────────────────────────────

impl From<&rpm_config::HistoryCfg> for HistoryCfg {
    fn from(c: &rpm_config::HistoryCfg) -> Self {
        Self {
            capacity: c.capacity,
            jump_threshold_pct: c.jump_threshold_pct,
        }
    }
}

// ── SamplingCfg ──────────────────────────────────────────────────────────────

impl From<&rpm_config::SamplingCfg> for SamplingCfg {
    fn from(c: &rpm_config::SamplingCfg) -> Self {
        Self {
            frequency_hz: c.frequency_hz,
            read_timeout_ms: c.read_timeout_ms,
        }
    }
}

// ── SyntheticCfg ─────────────────────────────────────────────────────────────

impl From<&rpm_config::ToneCfg> for Tone {
    fn from(t: &rpm_config::ToneCfg) -> Self {
        Tone::new(t.freq_hz, t.amplitude_pct)
    }
}

impl From<&rpm_config::SyntheticCfg> for SyntheticCfg {
    fn from(c: &rpm_config::SyntheticCfg) -> Self {
        Self {
            seed: c.seed,
            start_rpm: c.start_rpm,
            end_rpm: c.end_rpm,
            ramp_rpm_per_s: c.ramp_rpm_per_s,
            noise_pct: c.noise_pct,
            wow: c.wow.iter().map(Tone::from).collect(),
            flutter: c.flutter.iter().map(Tone::from).collect(),
        }
    }
}
