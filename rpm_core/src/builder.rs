//! Builder for `MeasurementSession`.
//!
//! Every setter is optional; `build()` validates the combined configuration
//! once so the per-sample path never has to.

use crate::config::{HistoryCfg, SmoothingCfg, TargetCfg};
use crate::error::{BuildError, Result};
use crate::estimator::SmoothingEstimator;
use crate::grade::GradeBands;
use crate::history::DeviationHistory;
use crate::matcher::{TargetMatcher, TargetSet};
use crate::rotation::RotationAccumulator;
use crate::session::MeasurementSession;
use crate::stability::StabilityClassifier;
use crate::status::SessionState;
use crate::types::Snapshot;

#[derive(Debug, Clone, Default)]
pub struct SessionBuilder {
    smoothing: Option<SmoothingCfg>,
    targets: Option<TargetCfg>,
    history: Option<HistoryCfg>,
}

impl SessionBuilder {
    pub fn with_smoothing(mut self, smoothing: SmoothingCfg) -> Self {
        self.smoothing = Some(smoothing);
        self
    }

    pub fn with_targets(mut self, targets: TargetCfg) -> Self {
        self.targets = Some(targets);
        self
    }

    /// Shorthand for replacing only the target speeds.
    pub fn with_target_speeds(mut self, speeds: impl Into<Vec<f64>>) -> Self {
        let mut t = self.targets.unwrap_or_default();
        t.speeds = speeds.into();
        self.targets = Some(t);
        self
    }

    pub fn with_history(mut self, history: HistoryCfg) -> Self {
        self.history = Some(history);
        self
    }

    pub fn build(self) -> Result<MeasurementSession> {
        validate_and_build(
            self.smoothing.unwrap_or_default(),
            self.targets.unwrap_or_default(),
            self.history.unwrap_or_default(),
        )
    }
}

fn invalid(msg: &'static str) -> eyre::Report {
    eyre::Report::new(BuildError::InvalidConfig(msg))
}

fn validate_and_build(
    smoothing: SmoothingCfg,
    targets: TargetCfg,
    history: HistoryCfg,
) -> Result<MeasurementSession> {
    // ── Validation ───────────────────────────────────────────────────────────
    let set = TargetSet::try_new(targets.speeds.clone()).map_err(eyre::Report::new)?;
    if smoothing.window == 0 {
        return Err(invalid("smoothing window must be >= 1"));
    }
    if !(smoothing.min_detectable_rpm.is_finite() && smoothing.min_detectable_rpm >= 0.0) {
        return Err(invalid("min_detectable_rpm must be finite and >= 0"));
    }
    if !(smoothing.mad_multiplier.is_finite() && smoothing.mad_multiplier > 0.0) {
        return Err(invalid("mad_multiplier must be > 0"));
    }
    if !(smoothing.min_rejection_rpm.is_finite() && smoothing.min_rejection_rpm >= 0.0) {
        return Err(invalid("min_rejection_rpm must be >= 0"));
    }
    if !(targets.perfect_pct.is_finite() && targets.perfect_pct > 0.0) {
        return Err(invalid("perfect_pct must be > 0"));
    }
    if !(targets.good_pct >= targets.perfect_pct && targets.max_pct >= targets.good_pct) {
        return Err(invalid("thresholds must satisfy perfect <= good <= max"));
    }
    if !targets.max_pct.is_finite() {
        return Err(invalid("max_pct must be finite"));
    }
    if !(targets.stability_multiplier.is_finite() && targets.stability_multiplier > 0.0) {
        return Err(invalid("stability_multiplier must be > 0"));
    }
    if history.capacity == 0 {
        return Err(invalid("history capacity must be >= 1"));
    }
    if !(history.jump_threshold_pct.is_finite() && history.jump_threshold_pct > 0.0) {
        return Err(invalid("jump_threshold_pct must be > 0"));
    }

    // ── Assemble ─────────────────────────────────────────────────────────────
    let bands = GradeBands {
        perfect_pct: targets.perfect_pct,
        good_pct: targets.good_pct,
        max_pct: targets.max_pct,
    };
    Ok(MeasurementSession {
        matcher: TargetMatcher::new(set, targets.max_pct, smoothing.min_detectable_rpm),
        stability: StabilityClassifier::new(
            smoothing.window,
            targets.perfect_pct,
            targets.stability_multiplier,
        ),
        estimator: SmoothingEstimator::new(smoothing),
        rotation: RotationAccumulator::new(),
        history: DeviationHistory::new(history.capacity, history.jump_threshold_pct),
        bands,
        state: SessionState::Idle,
        last_timestamp_s: None,
        samples: 0,
        last_target: None,
        snapshot: Snapshot::default(),
    })
}
