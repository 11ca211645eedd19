use rpm_core::error::BuildError;
use rpm_core::{HistoryCfg, MeasurementSession, SmoothingCfg, TargetCfg};
use rstest::rstest;

#[rstest]
#[case::zero(vec![33.33, 0.0], 0.0)]
#[case::negative(vec![-45.0], -45.0)]
fn zero_or_negative_target_is_rejected(#[case] speeds: Vec<f64>, #[case] bad: f64) {
    let err = MeasurementSession::builder()
        .with_target_speeds(speeds)
        .build()
        .expect_err("should reject target");
    match err.downcast_ref::<BuildError>() {
        Some(BuildError::InvalidTarget(v)) => assert_eq!(*v, bad),
        other => panic!("expected InvalidTarget, got: {other:?}"),
    }
}

#[test]
fn nan_target_is_rejected() {
    let err = MeasurementSession::builder()
        .with_target_speeds(vec![f64::NAN])
        .build()
        .expect_err("should reject NaN");
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::InvalidTarget(_))
    ));
}

fn assert_invalid_config(res: rpm_core::Result<MeasurementSession>) {
    match res {
        Err(e) => assert!(
            matches!(
                e.downcast_ref::<BuildError>(),
                Some(BuildError::InvalidConfig(_))
            ),
            "unexpected error: {e:?}"
        ),
        Ok(_) => panic!("expected InvalidConfig"),
    }
}

#[rstest]
#[case::zero_window(SmoothingCfg { window: 0, ..SmoothingCfg::default() })]
#[case::negative_floor(SmoothingCfg { min_detectable_rpm: -0.1, ..SmoothingCfg::default() })]
#[case::zero_mad(SmoothingCfg { mad_multiplier: 0.0, ..SmoothingCfg::default() })]
fn bad_smoothing_is_rejected(#[case] smoothing: SmoothingCfg) {
    assert_invalid_config(MeasurementSession::builder().with_smoothing(smoothing).build());
}

#[rstest]
#[case::zero_perfect(TargetCfg { perfect_pct: 0.0, ..TargetCfg::default() })]
#[case::good_below_perfect(TargetCfg { good_pct: 0.5, ..TargetCfg::default() })]
#[case::max_below_good(TargetCfg { max_pct: 4.0, ..TargetCfg::default() })]
#[case::zero_multiplier(TargetCfg { stability_multiplier: 0.0, ..TargetCfg::default() })]
fn bad_thresholds_are_rejected(#[case] targets: TargetCfg) {
    assert_invalid_config(MeasurementSession::builder().with_targets(targets).build());
}

#[test]
fn zero_history_capacity_is_rejected() {
    assert_invalid_config(
        MeasurementSession::builder()
            .with_history(HistoryCfg {
                capacity: 0,
                ..HistoryCfg::default()
            })
            .build(),
    );
}

#[test]
fn defaults_build() {
    let s = MeasurementSession::builder().build().expect("defaults valid");
    assert_eq!(s.matcher().targets().speeds(), &[33.33, 45.0, 78.0]);
    assert!(!s.is_active());
}

#[test]
fn target_config_reaches_the_matcher() {
    let session = MeasurementSession::builder()
        .with_targets(TargetCfg {
            speeds: vec![45.0],
            max_pct: 8.0,
            ..TargetCfg::default()
        })
        .build()
        .unwrap();
    assert_eq!(session.matcher().max_pct(), 8.0);
    assert_eq!(session.matcher().targets().speeds(), &[45.0]);
    // 8.5% off is past the configured cut-off but still graphed
    assert!(session.matcher().match_speed(48.825).is_none());
    assert!(session.matcher().match_for_graph(48.825).is_some());
}
