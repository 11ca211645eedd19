use rpm_config::{SamplingMode, SmoothingPolicy, load_toml};
use rstest::rstest;

const FULL: &str = r#"
[sampling]
frequency_hz = 100
read_timeout_ms = 20
mode = "direct"

[smoothing]
window = 60
policy = "robust"
min_detectable_rpm = 0.05

[targets]
speeds = [16.67, 33.33, 45.0, 78.0]
perfect_pct = 0.5
good_pct = 2.0
max_pct = 8.0
stability_multiplier = 2.0

[history]
capacity = 200
jump_threshold_pct = 12.5

[synthetic]
seed = 7
start_rpm = 40.0
end_rpm = 45.0
ramp_rpm_per_s = 2.0
noise_pct = 0.1
wow = [{ freq_hz = 0.5, amplitude_pct = 0.3 }]
flutter = [[8.0, 0.05], [16.0, 0.01]]

[sensor]
device = "/sys/bus/iio/devices/iio:device1"

[logging]
level = "debug"
rotation = "daily"
"#;

#[test]
fn empty_document_yields_defaults() {
    let cfg = load_toml("").expect("parse empty TOML");
    cfg.validate().expect("defaults must validate");
    assert_eq!(cfg.sampling.frequency_hz, 120);
    assert_eq!(cfg.sampling.mode, SamplingMode::Paced);
    assert_eq!(cfg.smoothing.window, 120);
    assert_eq!(cfg.smoothing.policy, SmoothingPolicy::Mean);
    assert!((cfg.smoothing.min_detectable_rpm - 0.02).abs() < 1e-12);
    assert_eq!(cfg.targets.speeds, vec![33.33, 45.0, 78.0]);
    assert!((cfg.targets.max_pct - 10.0).abs() < 1e-12);
    assert!((cfg.targets.stability_multiplier - 1.0).abs() < 1e-12);
    assert_eq!(cfg.history.capacity, 100);
    assert!((cfg.history.jump_threshold_pct - 15.0).abs() < 1e-12);
    assert_eq!(cfg.synthetic.wow.len(), 2);
    assert_eq!(cfg.synthetic.flutter.len(), 2);
    assert!(cfg.synthetic.seed.is_none());
}

#[test]
fn full_document_round_trips_fields() {
    let cfg = load_toml(FULL).expect("parse TOML");
    cfg.validate().expect("valid config should pass");
    assert_eq!(cfg.sampling.mode, SamplingMode::Direct);
    assert_eq!(cfg.smoothing.policy, SmoothingPolicy::Robust);
    assert_eq!(cfg.targets.speeds.len(), 4);
    assert_eq!(cfg.synthetic.seed, Some(7));
    // table and tuple tone syntaxes both accepted
    assert!((cfg.synthetic.wow[0].freq_hz - 0.5).abs() < 1e-12);
    assert!((cfg.synthetic.flutter[1].amplitude_pct - 0.01).abs() < 1e-12);
    assert_eq!(
        cfg.sensor.device.as_deref(),
        Some("/sys/bus/iio/devices/iio:device1")
    );
}

#[test]
fn sensor_ms_alias_is_accepted() {
    let cfg = load_toml("[sampling]\nsensor_ms = 33\n").expect("parse TOML");
    assert_eq!(cfg.sampling.read_timeout_ms, 33);
}

#[test]
fn unknown_policy_is_a_parse_error() {
    assert!(load_toml("[smoothing]\npolicy = \"kalman\"\n").is_err());
}

#[rstest]
#[case("[targets]\nspeeds = [33.33, 0.0]\n", "targets.speeds[1]")]
#[case("[targets]\nspeeds = [-45.0]\n", "targets.speeds[0]")]
#[case("[sampling]\nfrequency_hz = 0\n", "frequency_hz must be > 0")]
#[case("[sampling]\nread_timeout_ms = 0\n", "read_timeout_ms must be >= 1")]
#[case("[smoothing]\nwindow = 0\n", "smoothing.window must be >= 1")]
#[case("[smoothing]\nmad_multiplier = 0.0\n", "mad_multiplier must be > 0")]
#[case("[targets]\nperfect_pct = 3.0\ngood_pct = 2.0\n", "good_pct must be >=")]
#[case("[targets]\ngood_pct = 5.0\nmax_pct = 4.0\n", "max_pct must be >=")]
#[case("[targets]\nstability_multiplier = 0.0\n", "stability_multiplier must be > 0")]
#[case("[history]\ncapacity = 0\n", "history.capacity must be >= 1")]
#[case("[history]\njump_threshold_pct = -1.0\n", "jump_threshold_pct must be > 0")]
#[case("[synthetic]\nnoise_pct = -0.5\n", "noise_pct must be >= 0")]
#[case("[synthetic]\nwow = [[0.0, 0.1]]\n", "synthetic.wow[0].freq_hz")]
#[case("[synthetic]\nflutter = [[6.0, -0.1]]\n", "synthetic.flutter[0].amplitude_pct")]
#[case("[logging]\nrotation = \"weekly\"\n", "logging.rotation")]
fn rejects_invalid_values(#[case] toml: &str, #[case] needle: &str) {
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should be rejected");
    let msg = format!("{err}");
    assert!(msg.contains(needle), "expected '{needle}' in '{msg}'");
}

#[test]
fn empty_target_list_is_allowed() {
    // No targets simply means every match is "none".
    let cfg = load_toml("[targets]\nspeeds = []\n").expect("parse TOML");
    cfg.validate().expect("empty target set is valid");
}

#[test]
fn shipped_config_matches_defaults() {
    let cfg = load_toml(include_str!("../../etc/rpm_config.toml")).unwrap();
    cfg.validate().unwrap();
    let d = rpm_config::Config::default();
    assert_eq!(cfg.sampling.frequency_hz, d.sampling.frequency_hz);
    assert_eq!(cfg.smoothing.window, d.smoothing.window);
    assert_eq!(cfg.smoothing.policy, d.smoothing.policy);
    assert_eq!(cfg.targets.speeds, d.targets.speeds);
    assert_eq!(cfg.history.capacity, d.history.capacity);
    assert_eq!(cfg.synthetic.wow, d.synthetic.wow);
    assert_eq!(cfg.synthetic.flutter, d.synthetic.flutter);
    assert!(cfg.sensor.device.is_none());
}
