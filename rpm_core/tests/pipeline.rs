//! End-to-end checks of the individual pipeline stages.

use rpm_core::util::rpm_to_rad_per_s;
use rpm_core::{
    DeviationHistory, RollingWindow, RotationAccumulator, SmoothingCfg, SmoothingEstimator,
    StabilityClassifier, SyntheticCfg, SyntheticGenerator, TargetMatcher, TargetSet,
};
use rstest::rstest;
use std::f64::consts::TAU;

fn window_of(values: &[f64]) -> RollingWindow {
    let mut w = RollingWindow::new(values.len());
    for v in values {
        w.push(*v);
    }
    w
}

#[rstest]
#[case(33.0, 33.33, -0.990_099)]
#[case(45.5, 45.0, 1.111_111)]
#[case(77.0, 78.0, -1.282_051)]
#[case(39.0, 33.33, 17.011_701)]
fn nearest_target_and_deviation(#[case] rpm: f64, #[case] target: f64, #[case] pct: f64) {
    let m = TargetMatcher::new(TargetSet::default(), 10.0, 0.02);
    let g = m.match_for_graph(rpm).expect("graph match");
    assert_eq!(g.target, target);
    assert!((g.percent_deviation - pct).abs() < 1e-4);
    assert_eq!(m.match_speed(rpm).is_some(), pct.abs() < 10.0);
}

#[test]
fn window_of_exact_target_is_stable() {
    let c = StabilityClassifier::new(120, 1.0, 1.0);
    assert!(c.is_stable(&window_of(&[33.33; 120]), 33.33));

    let mut values = [33.33; 120];
    values[57] = 34.0;
    assert!(!c.is_stable(&window_of(&values), 33.33));
}

// The doubled "either side" tolerance is opt-in through the multiplier.
#[rstest]
#[case::literal(1.0, false)]
#[case::doubled(2.0, true)]
fn stability_multiplier_widens_band(#[case] multiplier: f64, #[case] stable: bool) {
    // 33.9 is 1.7% fast of 33.33
    let mut values = [33.33; 120];
    values[0] = 33.9;
    let c = StabilityClassifier::new(120, 1.0, multiplier);
    assert_eq!(c.is_stable(&window_of(&values), 33.33), stable);
}

#[rstest]
#[case(&[1.0, 1.0, 1.0, 20.0, 1.0, 1.0], Some(4))]
#[case(&[1.0, 1.0, 1.0, 20.0], Some(3))]
#[case(&[1.0, 2.0, 3.0, 4.0, 5.0], None)]
fn jump_detection(#[case] values: &[f64], #[case] expected: Option<usize>) {
    let mut h = DeviationHistory::new(100, 15.0);
    for v in values {
        h.append(*v);
    }
    assert_eq!(h.last_jump_index(), expected);
}

#[test]
fn rotation_is_path_independent_under_constant_rate() {
    let mut once = RotationAccumulator::new();
    once.integrate(TAU, 1.0);
    let mut stepped = RotationAccumulator::new();
    for _ in 0..10 {
        stepped.integrate(TAU, 0.1);
    }
    assert!((once.degrees() - stepped.degrees()).abs() < 1e-9);
    assert!((once.degrees() + 360.0).abs() < 1e-9);
}

#[test]
fn synthetic_generator_is_deterministic_for_a_seed() {
    let cfg = SyntheticCfg {
        seed: Some(42),
        ..SyntheticCfg::default()
    };
    let times: Vec<f64> = (0..500).map(|i| f64::from(i) / 120.0).collect();
    let mut a = SyntheticGenerator::new(cfg.clone());
    let mut b = SyntheticGenerator::new(cfg);
    let run_a: Vec<f64> = times.iter().map(|t| a.sample(*t)).collect();
    let run_b: Vec<f64> = times.iter().map(|t| b.sample(*t)).collect();
    assert_eq!(run_a, run_b);

    let mut c = SyntheticGenerator::new(SyntheticCfg {
        seed: Some(43),
        ..SyntheticCfg::default()
    });
    let run_c: Vec<f64> = times.iter().map(|t| c.sample(*t)).collect();
    assert_ne!(run_a, run_c);
}

#[test]
fn synthetic_signal_settles_near_end_speed() {
    let mut g = SyntheticGenerator::new(SyntheticCfg {
        seed: Some(9),
        ..SyntheticCfg::default()
    });
    let mut est = SmoothingEstimator::new(SmoothingCfg::default());
    let mut last = 0.0;
    for i in 0..1_200 {
        // past the 3.33 s ramp
        let t = 5.0 + f64::from(i) / 120.0;
        last = est.ingest(g.sample(t)).display_rpm;
    }
    assert!((last - 33.33).abs() < 0.33, "display {last}");
    assert!(g.sample(10.0) > rpm_to_rad_per_s(32.0));
}
