use std::fs;
use std::path::Path;
use std::time::Duration;

use rpm_hardware::IioGyro;
use rpm_hardware::error::HwError;
use rpm_traits::Gyro;
use rstest::rstest;

fn fake_device(root: &Path, name: &str, raw: &str, scale: Option<&str>) -> std::path::PathBuf {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("in_anglvel_z_raw"), raw).unwrap();
    if let Some(s) = scale {
        fs::write(dir.join("in_anglvel_scale"), s).unwrap();
    }
    dir
}

#[test]
fn reads_scaled_rate() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = fake_device(tmp.path(), "iio:device0", "-3490\n", Some("0.001000000\n"));
    let mut g = IioGyro::open(&dir).unwrap();
    let rate = g.read(Duration::from_millis(50)).unwrap();
    assert!((rate + 3.49).abs() < 1e-12);

    fs::write(dir.join("in_anglvel_z_raw"), "3490").unwrap();
    let rate = g.read(Duration::from_millis(50)).unwrap();
    assert!((rate - 3.49).abs() < 1e-12);
}

#[test]
fn per_axis_scale_and_offset_win() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = fake_device(tmp.path(), "iio:device0", "100", Some("1.0"));
    fs::write(dir.join("in_anglvel_z_scale"), "0.01").unwrap();
    fs::write(dir.join("in_anglvel_z_offset"), "-50").unwrap();
    let g = IioGyro::open(&dir).unwrap();
    assert!((g.read_rad_per_s(Duration::from_millis(50)).unwrap() - 0.5).abs() < 1e-12);
}

#[rstest]
#[case::no_raw(false, Some("0.001"))]
#[case::no_scale(true, None)]
fn missing_channel_is_unavailable(#[case] with_raw: bool, #[case] scale: Option<&str>) {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("iio:device0");
    fs::create_dir_all(&dir).unwrap();
    if with_raw {
        fs::write(dir.join("in_anglvel_z_raw"), "1").unwrap();
    }
    if let Some(s) = scale {
        fs::write(dir.join("in_anglvel_scale"), s).unwrap();
    }
    match IioGyro::open(&dir) {
        Err(HwError::Unavailable(_)) => {}
        other => panic!("expected Unavailable, got {other:?}"),
    }
}

#[test]
fn garbage_raw_is_parse_error() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = fake_device(tmp.path(), "iio:device0", "n/a", Some("0.001"));
    let g = IioGyro::open(&dir).unwrap();
    match g.read_rad_per_s(Duration::from_millis(50)) {
        Err(HwError::Parse(_)) => {}
        other => panic!("expected Parse, got {other:?}"),
    }
}

#[test]
fn discover_picks_first_gyro_and_probe_tracks_removal() {
    let tmp = tempfile::tempdir().unwrap();
    fs::create_dir_all(tmp.path().join("iio:device0")).unwrap(); // accelerometer only
    let dir = fake_device(tmp.path(), "iio:device2", "0", Some("0.001"));
    fake_device(tmp.path(), "iio:device3", "0", Some("0.001"));

    let mut g = IioGyro::discover(tmp.path()).unwrap();
    assert_eq!(g.dir(), dir.as_path());
    assert!(g.probe().is_ok());

    fs::remove_dir_all(&dir).unwrap();
    assert!(g.probe().is_err());
    let err = g.read(Duration::from_millis(50)).unwrap_err();
    assert!(matches!(err.downcast_ref::<HwError>(), Some(HwError::Unavailable(_))));
}

#[test]
fn discover_on_missing_root_is_unavailable() {
    let tmp = tempfile::tempdir().unwrap();
    match IioGyro::discover(tmp.path().join("nope")) {
        Err(HwError::Unavailable(_)) => {}
        other => panic!("expected Unavailable, got {other:?}"),
    }
}
