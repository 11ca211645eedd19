//! Nearest-target matching and signed percentage deviation.

use crate::error::BuildError;

/// Ordered set of reference speeds, validated once so deviation math never
/// divides by zero. Order is the tie-break order.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetSet(Vec<f64>);

impl TargetSet {
    pub fn try_new(speeds: impl Into<Vec<f64>>) -> Result<Self, BuildError> {
        let speeds = speeds.into();
        if let Some(bad) = speeds.iter().find(|s| !(s.is_finite() && **s > 0.0)) {
            return Err(BuildError::InvalidTarget(*bad));
        }
        Ok(Self(speeds))
    }

    pub fn speeds(&self) -> &[f64] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Target minimizing `|rpm - target|`; the first listed wins ties.
    pub fn nearest(&self, rpm: f64) -> Option<f64> {
        let rpm = rpm.abs();
        let mut best: Option<(f64, f64)> = None;
        for &t in &self.0 {
            let d = (rpm - t).abs();
            match best {
                Some((_, bd)) if d >= bd => {}
                _ => best = Some((t, d)),
            }
        }
        best.map(|(t, _)| t)
    }
}

impl Default for TargetSet {
    fn default() -> Self {
        Self(vec![33.33, 45.0, 78.0])
    }
}

/// A target and how far the measured speed sits from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetMatch {
    pub target: f64,
    /// `(|rpm| - target) / target * 100`; negative means running slow.
    pub percent_deviation: f64,
}

impl TargetMatch {
    fn against(rpm: f64, target: f64) -> Self {
        Self {
            target,
            percent_deviation: (rpm.abs() - target) / target * 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TargetMatcher {
    targets: TargetSet,
    max_pct: f64,
    min_detectable_rpm: f64,
}

impl TargetMatcher {
    pub fn new(targets: TargetSet, max_pct: f64, min_detectable_rpm: f64) -> Self {
        Self {
            targets,
            max_pct,
            min_detectable_rpm,
        }
    }

    pub fn targets(&self) -> &TargetSet {
        &self.targets
    }

    pub fn max_pct(&self) -> f64 {
        self.max_pct
    }

    /// Match against the nearest target; `None` when no target exists or the
    /// deviation reaches `max_pct`.
    pub fn match_speed(&self, display_rpm: f64) -> Option<TargetMatch> {
        let target = self.targets.nearest(display_rpm)?;
        let m = TargetMatch::against(display_rpm, target);
        (m.percent_deviation.abs() < self.max_pct).then_some(m)
    }

    /// Like `match_speed` without the `max_pct` cut-off, so a trend line stays
    /// continuous while off-target. `None` only at or below the detectable floor.
    pub fn match_for_graph(&self, display_rpm: f64) -> Option<TargetMatch> {
        if display_rpm.abs() <= self.min_detectable_rpm {
            return None;
        }
        let target = self.targets.nearest(display_rpm)?;
        Some(TargetMatch::against(display_rpm, target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> TargetMatcher {
        TargetMatcher::new(TargetSet::default(), 10.0, 0.02)
    }

    #[test]
    fn rejects_zero_and_negative_targets() {
        assert_eq!(
            TargetSet::try_new(vec![33.33, 0.0]),
            Err(BuildError::InvalidTarget(0.0))
        );
        assert!(TargetSet::try_new(vec![-1.0]).is_err());
        assert!(TargetSet::try_new(vec![f64::INFINITY]).is_err());
        assert!(TargetSet::try_new(Vec::new()).is_ok());
    }

    #[test]
    fn ties_go_to_first_listed() {
        let set = TargetSet::try_new(vec![40.0, 50.0]).unwrap();
        assert_eq!(set.nearest(45.0), Some(40.0));
        let set = TargetSet::try_new(vec![50.0, 40.0]).unwrap();
        assert_eq!(set.nearest(45.0), Some(50.0));
    }

    #[test]
    fn slow_33_is_within_band() {
        let m = matcher().match_speed(33.0).expect("match");
        assert_eq!(m.target, 33.33);
        assert!((m.percent_deviation - (-0.990_099)).abs() < 1e-4);
    }

    #[test]
    fn cut_off_is_exclusive() {
        // exactly 10% fast of 45 is 49.5
        let m = TargetMatcher::new(TargetSet::try_new(vec![45.0]).unwrap(), 10.0, 0.02);
        assert!(m.match_speed(49.5).is_none());
        assert!(m.match_speed(49.4).is_some());
    }

    #[test]
    fn graph_match_ignores_cut_off() {
        let m = matcher();
        assert!(m.match_speed(60.0).is_none());
        let g = m.match_for_graph(60.0).expect("graph match");
        // 60 is nearer 78 (18) than 45 (15)? no: 45 is nearer
        assert_eq!(g.target, 45.0);
        assert!((g.percent_deviation - 33.333_333).abs() < 1e-4);
    }

    #[test]
    fn graph_match_is_none_at_rest() {
        let m = matcher();
        assert!(m.match_for_graph(0.0).is_none());
        assert!(m.match_for_graph(0.02).is_none());
        assert!(m.match_for_graph(0.03).is_some());
    }

    #[test]
    fn no_targets_never_match() {
        let m = TargetMatcher::new(TargetSet::try_new(Vec::new()).unwrap(), 10.0, 0.02);
        assert!(m.match_speed(33.33).is_none());
        assert!(m.match_for_graph(33.33).is_none());
    }
}
