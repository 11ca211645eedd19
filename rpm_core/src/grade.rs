//! Accuracy grading derived from a match and the stability verdict.
//!
//! Presentation maps a grade to whatever colour scheme it likes; nothing here
//! recomputes matching.

use crate::matcher::TargetMatch;

/// Percentage bands used to grade a deviation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradeBands {
    pub perfect_pct: f64,
    pub good_pct: f64,
    pub max_pct: f64,
}

impl Default for GradeBands {
    fn default() -> Self {
        Self {
            perfect_pct: 1.0,
            good_pct: 5.0,
            max_pct: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum AccuracyGrade {
    /// Nothing detectable, or no target configured.
    #[default]
    Idle,
    /// On speed and the whole window agrees.
    Locked,
    /// On speed, window not yet settled.
    Perfect,
    /// Within `good_pct`. `blend` is on the same perfect-to-max scale as
    /// `Approaching`, so a colour ramp stays continuous across both.
    Good { blend: f64 },
    /// Closing in; `blend` runs 0 at `perfect_pct` to 1 at `max_pct`.
    Approaching { blend: f64 },
    OffTarget,
}

impl AccuracyGrade {
    pub fn classify(
        display_rpm: f64,
        graph_match: Option<TargetMatch>,
        stable: bool,
        bands: &GradeBands,
    ) -> Self {
        let Some(m) = graph_match else {
            return Self::Idle;
        };
        if display_rpm <= 0.0 {
            return Self::Idle;
        }
        let pct = m.percent_deviation.abs();
        if pct >= bands.max_pct {
            Self::OffTarget
        } else if pct <= bands.perfect_pct {
            if stable { Self::Locked } else { Self::Perfect }
        } else if pct <= bands.good_pct {
            Self::Good {
                blend: band_blend(pct, bands),
            }
        } else {
            Self::Approaching {
                blend: band_blend(pct, bands),
            }
        }
    }

    /// Position between `perfect_pct` (0) and `max_pct` (1) for the graded
    /// bands; `None` for the others.
    pub fn blend(&self) -> Option<f64> {
        match self {
            Self::Good { blend } | Self::Approaching { blend } => Some(*blend),
            _ => None,
        }
    }

    /// Stable lowercase label for logs and JSON output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Locked => "locked",
            Self::Perfect => "perfect",
            Self::Good { .. } => "good",
            Self::Approaching { .. } => "approaching",
            Self::OffTarget => "off_target",
        }
    }
}

fn band_blend(pct: f64, bands: &GradeBands) -> f64 {
    let span = bands.max_pct - bands.perfect_pct;
    if span > 0.0 {
        ((pct - bands.perfect_pct) / span).clamp(0.0, 1.0)
    } else {
        1.0
    }
}

impl std::fmt::Display for AccuracyGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(pct: f64) -> Option<TargetMatch> {
        Some(TargetMatch {
            target: 33.33,
            percent_deviation: pct,
        })
    }

    #[test]
    fn grades_by_band() {
        let b = GradeBands::default();
        assert_eq!(AccuracyGrade::classify(33.0, None, false, &b), AccuracyGrade::Idle);
        assert_eq!(AccuracyGrade::classify(0.0, at(-100.0), false, &b), AccuracyGrade::Idle);
        assert_eq!(AccuracyGrade::classify(33.3, at(-0.5), true, &b), AccuracyGrade::Locked);
        assert_eq!(AccuracyGrade::classify(33.3, at(-0.5), false, &b), AccuracyGrade::Perfect);
        assert_eq!(AccuracyGrade::classify(34.0, at(3.0), true, &b).as_str(), "good");
        assert_eq!(AccuracyGrade::classify(40.0, at(10.0), false, &b), AccuracyGrade::OffTarget);
    }

    #[test]
    fn approaching_blend_is_linear_between_perfect_and_max() {
        let b = GradeBands::default();
        match AccuracyGrade::classify(36.0, at(-5.5), false, &b) {
            AccuracyGrade::Approaching { blend } => assert!((blend - 0.5).abs() < 1e-12),
            g => panic!("unexpected grade {g:?}"),
        }
    }

    #[rstest::rstest]
    #[case(1.0, "perfect", None)]
    #[case(3.25, "good", Some(0.25))]
    #[case(5.0, "good", Some(4.0 / 9.0))]
    #[case(5.5, "approaching", Some(0.5))]
    fn blend_is_continuous_from_good_into_approaching(
        #[case] pct: f64,
        #[case] label: &str,
        #[case] expected: Option<f64>,
    ) {
        let g = AccuracyGrade::classify(33.33, at(pct), false, &GradeBands::default());
        assert_eq!(g.as_str(), label);
        match (g.blend(), expected) {
            (Some(got), Some(want)) => assert!((got - want).abs() < 1e-12, "{got} vs {want}"),
            (got, want) => assert_eq!(got, want),
        }
    }
}
