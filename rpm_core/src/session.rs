//! Measurement session: one sample in, one `Snapshot` out.
//!
//! Composes the estimator, rotation accumulator, matcher, stability
//! classifier and deviation history behind a start/stop lifecycle. All
//! work happens synchronously on the caller's thread.

use crate::estimator::SmoothingEstimator;
use crate::grade::{AccuracyGrade, GradeBands};
use crate::history::DeviationHistory;
use crate::matcher::TargetMatcher;
use crate::rotation::RotationAccumulator;
use crate::stability::StabilityClassifier;
use crate::status::SessionState;
use crate::types::{Sample, Snapshot};
use crate::util::rpm_to_rad_per_s;

#[derive(Debug, Clone)]
pub struct MeasurementSession {
    pub(crate) estimator: SmoothingEstimator,
    pub(crate) rotation: RotationAccumulator,
    pub(crate) matcher: TargetMatcher,
    pub(crate) stability: StabilityClassifier,
    pub(crate) history: DeviationHistory,
    pub(crate) bands: GradeBands,
    pub(crate) state: SessionState,
    pub(crate) last_timestamp_s: Option<f64>,
    pub(crate) samples: u64,
    pub(crate) last_target: Option<f64>,
    pub(crate) snapshot: Snapshot,
}

impl MeasurementSession {
    pub fn builder() -> crate::builder::SessionBuilder {
        crate::builder::SessionBuilder::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != SessionState::Idle
    }

    /// Latest snapshot; all zeros before the first sample.
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn estimator(&self) -> &SmoothingEstimator {
        &self.estimator
    }

    pub fn matcher(&self) -> &TargetMatcher {
        &self.matcher
    }

    pub fn history(&self) -> &DeviationHistory {
        &self.history
    }

    /// Arm the session. A running session is left as is.
    pub fn start(&mut self) {
        if self.is_active() {
            return;
        }
        self.state = SessionState::Armed;
        tracing::info!(
            window = self.estimator.cfg().window,
            targets = ?self.matcher.targets().speeds(),
            "measurement session started"
        );
    }

    /// Flush the window and history, zero RPM and rotation, return to idle.
    pub fn stop(&mut self) {
        if !self.is_active() {
            return;
        }
        let samples = self.samples;
        self.estimator.reset();
        self.rotation.reset();
        self.history.clear();
        self.state = SessionState::Idle;
        self.last_timestamp_s = None;
        self.samples = 0;
        self.last_target = None;
        self.snapshot = Snapshot::default();
        tracing::info!(samples, "measurement session stopped");
    }

    /// Process a timestamped angular-velocity sample.
    ///
    /// The first sample after `start` only fixes the time base. Samples that
    /// arrive while idle, carry non-finite values, or do not advance time are
    /// ignored and the previous snapshot is returned.
    pub fn ingest(&mut self, sample: Sample) -> &Snapshot {
        let Sample {
            timestamp_s,
            angular_velocity_z,
        } = sample;
        if !self.is_active() || !timestamp_s.is_finite() || !angular_velocity_z.is_finite() {
            tracing::trace!(timestamp_s, angular_velocity_z, "sample ignored");
            return &self.snapshot;
        }
        let elapsed_s = match self.last_timestamp_s {
            None => 0.0,
            Some(prev) if timestamp_s > prev => timestamp_s - prev,
            Some(prev) => {
                tracing::trace!(timestamp_s, prev, "non-advancing timestamp");
                return &self.snapshot;
            }
        };
        self.last_timestamp_s = Some(timestamp_s);
        let estimate = self.estimator.ingest(angular_velocity_z);
        self.rotation.integrate(angular_velocity_z, elapsed_s);
        self.finish(estimate)
    }

    /// Feed an RPM reading with an explicit elapsed time, bypassing the
    /// radian conversion. Rotation integrates the equivalent angular velocity.
    pub fn ingest_rpm(&mut self, rpm: f64, elapsed_s: f64) -> &Snapshot {
        if !self.is_active() || !rpm.is_finite() {
            tracing::trace!(rpm, "rpm reading ignored");
            return &self.snapshot;
        }
        let estimate = self.estimator.ingest_rpm(rpm);
        self.rotation.integrate(rpm_to_rad_per_s(rpm), elapsed_s);
        self.finish(estimate)
    }

    fn finish(&mut self, estimate: crate::estimator::RpmEstimate) -> &Snapshot {
        self.state = SessionState::Running;
        self.samples += 1;

        let display_rpm = estimate.display_rpm;
        let current_match = self.matcher.match_speed(display_rpm);
        let graph_match = self.matcher.match_for_graph(display_rpm);
        let is_stable = current_match
            .is_some_and(|m| self.stability.is_stable(self.estimator.window(), m.target));

        if let Some(g) = graph_match {
            self.history.append(g.percent_deviation);
        }
        let grade = AccuracyGrade::classify(display_rpm, graph_match, is_stable, &self.bands);

        let target = current_match.map(|m| m.target);
        if target != self.last_target {
            tracing::debug!(from = ?self.last_target, to = ?target, display_rpm, "target changed");
            self.last_target = target;
        }
        if is_stable != self.snapshot.is_stable {
            if is_stable {
                tracing::info!(target_rpm = ?target, display_rpm, "speed locked");
            } else {
                tracing::info!(display_rpm, "lock lost");
            }
        }
        tracing::trace!(
            raw_rpm = estimate.raw_rpm,
            display_rpm,
            grade = grade.as_str(),
            "sample"
        );

        self.snapshot = Snapshot {
            display_rpm,
            raw_rpm: estimate.raw_rpm,
            smoothed_rpm: estimate.smoothed_rpm,
            rotation_deg: self.rotation.degrees(),
            current_match,
            graph_match,
            is_stable,
            grade,
            deviation_history: self.history.values(),
            jump_index: self.history.last_jump_index(),
            samples: self.samples,
        };
        &self.snapshot
    }
}
