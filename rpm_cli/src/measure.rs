//! Measurement commands: config mapping, sensor assembly, and output.

use crate::cli::JSON_MODE;
use rpm_core::error::{MeterError, Result as CoreResult};
use rpm_core::hw_error::map_sensor_error;
use rpm_core::runner::{RunParams, RunSummary, SamplingMode};
use rpm_core::{MeasurementSession, Sample, Snapshot, SyntheticGyro};
use rpm_traits::{Gyro, MonotonicClock};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

type BoxedGyro = Box<dyn Gyro + Send>;

/// Where `measure` and `self-check` get their samples from.
#[derive(Debug, Clone)]
pub enum Source {
    Synthetic,
    /// Explicit IIO device directory, or `None` to use config then discovery.
    Device(Option<PathBuf>),
}

pub fn build_session(cfg: &rpm_config::Config) -> CoreResult<MeasurementSession> {
    MeasurementSession::builder()
        .with_smoothing((&cfg.smoothing).into())
        .with_targets((&cfg.targets).into())
        .with_history((&cfg.history).into())
        .build()
}

fn run_params(cfg: &rpm_config::Config, duration_ms: Option<u64>) -> RunParams {
    let sampling: rpm_core::SamplingCfg = (&cfg.sampling).into();
    let mode = match cfg.sampling.mode {
        rpm_config::SamplingMode::Direct => SamplingMode::Direct,
        rpm_config::SamplingMode::Paced => SamplingMode::Paced(sampling.frequency_hz),
    };
    RunParams {
        mode,
        frequency_hz: sampling.frequency_hz,
        read_timeout_ms: sampling.read_timeout_ms,
        max_run_ms: duration_ms,
        publish: None,
    }
}

/// Open the sample source. Device precedence: CLI path, then `[sensor] device`,
/// then the first gyro found under the IIO root.
fn open_gyro(cfg: &rpm_config::Config, source: &Source) -> CoreResult<BoxedGyro> {
    let dev = match source {
        Source::Synthetic => {
            tracing::info!("using synthetic sample source");
            let synth: rpm_core::SyntheticCfg = (&cfg.synthetic).into();
            return Ok(Box::new(SyntheticGyro::new(synth, MonotonicClock::new())));
        }
        Source::Device(dev) => dev,
    };
    let opened = match dev
        .clone()
        .or_else(|| cfg.sensor.device.as_ref().map(PathBuf::from))
    {
        Some(dir) => {
            tracing::info!(device = %dir.display(), "opening gyroscope");
            rpm_hardware::IioGyro::open(&dir)
        }
        None => {
            tracing::info!(root = rpm_hardware::util::IIO_DEVICES, "discovering gyroscope");
            rpm_hardware::IioGyro::discover(rpm_hardware::util::IIO_DEVICES)
        }
    };
    match opened {
        Ok(g) => {
            tracing::debug!(device = %g.dir().display(), scale = g.scale(), "gyroscope ready");
            Ok(Box::new(g))
        }
        Err(e) => Err(eyre::Report::new(map_sensor_error(&e))),
    }
}

fn is_unavailable(err: &eyre::Report) -> bool {
    matches!(
        err.downcast_ref::<MeterError>(),
        Some(MeterError::SensorUnavailable(_))
    )
}

fn json_mode() -> bool {
    JSON_MODE.get().copied().unwrap_or(false)
}

// ── Output ───────────────────────────────────────────────────────────────────

fn target_fields(snap: &Snapshot) -> (Option<f64>, Option<f64>) {
    snap.current_match
        .map_or((None, None), |m| (Some(m.target), Some(m.percent_deviation)))
}

fn print_snapshot(t_ms: u64, snap: &Snapshot) {
    let (target, dev) = target_fields(snap);
    if json_mode() {
        let line = json!({
            "t_ms": t_ms,
            "display_rpm": snap.display_rpm,
            "rotation_deg": snap.rotation_deg,
            "target_rpm": target,
            "deviation_pct": dev,
            "stable": snap.is_stable,
            "grade": snap.grade.as_str(),
            "blend": snap.grade.blend(),
        });
        println!("{line}");
    } else {
        let target = target.map_or_else(|| "--".to_string(), |t| format!("{t:.2}"));
        let dev = dev.map_or_else(String::new, |d| format!(" ({d:+.2}%)"));
        let lock = if snap.is_stable { " [locked]" } else { "" };
        println!(
            "{t_ms:>7} ms  {:>7.2} rpm  target {target}{dev}  {}{lock}",
            snap.display_rpm, snap.grade
        );
    }
}

fn print_summary(summary: &RunSummary, read_errors_hint: Option<&str>) {
    let snap = &summary.snapshot;
    let (target, dev) = target_fields(snap);
    if json_mode() {
        let mut obj = json!({
            "summary": true,
            "samples": summary.samples,
            "elapsed_ms": summary.elapsed_ms,
            "display_rpm": snap.display_rpm,
            "target_rpm": target,
            "deviation_pct": dev,
            "stable": snap.is_stable,
            "grade": snap.grade.as_str(),
        });
        if let Some(w) = read_errors_hint {
            obj["warning"] = json!(w);
        }
        println!("{obj}");
    } else {
        if let Some(w) = read_errors_hint {
            println!("warning: {w}");
        }
        println!(
            "samples: {}  elapsed: {} ms  final: {:.2} rpm  grade: {}",
            summary.samples, summary.elapsed_ms, snap.display_rpm, snap.grade
        );
    }
}

// ── Commands ─────────────────────────────────────────────────────────────────

pub fn run_measure(
    cfg: &rpm_config::Config,
    source: &Source,
    duration_ms: Option<u64>,
    every: u64,
    shutdown: &Arc<AtomicBool>,
) -> CoreResult<()> {
    let mut session = build_session(cfg)?;
    let params = run_params(cfg, duration_ms);
    let gyro = open_gyro(cfg, source);

    let result = gyro.and_then(|g| {
        let start = std::time::Instant::now();
        let every = every.max(1);
        rpm_core::runner::run(g, &mut session, &params, shutdown, |snap| {
            if snap.samples % every == 0 {
                let t_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                print_snapshot(t_ms, snap);
            }
        })
    });

    match result {
        Ok(summary) => {
            print_summary(&summary, None);
            Ok(())
        }
        Err(e) if is_unavailable(&e) => {
            tracing::warn!(error = %e, "no gyroscope; reporting idle");
            let idle = RunSummary {
                samples: 0,
                snapshot: Snapshot::default(),
                elapsed_ms: 0,
            };
            print_summary(&idle, Some("sensor unavailable"));
            Err(e)
        }
        Err(e) => Err(e),
    }
}

/// Feed a recorded capture through a fresh session and print the final state.
pub fn run_replay(cfg: &rpm_config::Config, file: &Path) -> CoreResult<()> {
    let rows = rpm_config::load_samples_csv(file)?;
    let mut session = build_session(cfg)?;
    session.start();
    for row in &rows {
        session.ingest(Sample::new(row.timestamp_s, row.angular_velocity_z));
    }
    let snap = session.snapshot().clone();
    let history_len = session.history().len();
    tracing::info!(rows = rows.len(), samples = snap.samples, "replay complete");
    session.stop();

    let (target, dev) = target_fields(&snap);
    if json_mode() {
        let obj = json!({
            "samples": snap.samples,
            "display_rpm": snap.display_rpm,
            "target_rpm": target,
            "deviation_pct": dev,
            "stable": snap.is_stable,
            "grade": snap.grade.as_str(),
            "jump_index": snap.jump_index,
            "history_len": history_len,
        });
        println!("{obj}");
    } else {
        println!("samples:      {}", snap.samples);
        println!("display rpm:  {:.2}", snap.display_rpm);
        match (target, dev) {
            (Some(t), Some(d)) => println!("target:       {t:.2} ({d:+.2}%)"),
            _ => println!("target:       --"),
        }
        println!("stable:       {}", snap.is_stable);
        println!("grade:        {}", snap.grade);
        println!("history:      {history_len} points");
        if let Some(j) = snap.jump_index {
            println!("last jump at: {j}");
        }
    }
    Ok(())
}

/// Validate that a session can be built and the sensor answers a probe and a read.
pub fn run_self_check(cfg: &rpm_config::Config, source: &Source) -> CoreResult<()> {
    build_session(cfg)?;
    let mut gyro = open_gyro(cfg, source)?;
    gyro.probe()
        .map_err(|e| eyre::Report::new(map_sensor_error(e.as_ref())))?;
    let timeout = std::time::Duration::from_millis(cfg.sampling.read_timeout_ms);
    let rate = gyro
        .read(timeout)
        .map_err(|e| eyre::Report::new(map_sensor_error(e.as_ref())))?;
    let rpm = rpm_core::util::rad_per_s_to_rpm(rate);
    if json_mode() {
        println!("{}", json!({ "ok": true, "rpm": rpm }));
    } else {
        println!("OK ({rpm:.2} rpm)");
    }
    Ok(())
}
