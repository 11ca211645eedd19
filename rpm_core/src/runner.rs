use crate::error::{MeterError, Result as CoreResult};
use crate::hw_error::map_sensor_error;
use crate::published::Published;
use crate::sampler::Sampler;
use crate::session::MeasurementSession;
use crate::types::{Sample, Snapshot};
use rpm_traits::clock::{Clock, MonotonicClock};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// How sampling should be orchestrated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingMode {
    /// Read inside the run loop using Gyro::read(timeout)
    Direct,
    /// Background sampler thread paced at the given Hz
    Paced(u32),
}

#[derive(Debug, Clone)]
pub struct RunParams {
    pub mode: SamplingMode,
    /// Loop cadence for direct mode and idle back-off in paced mode.
    pub frequency_hz: u32,
    pub read_timeout_ms: u64,
    /// Stop after this long; `None` runs until shutdown.
    pub max_run_ms: Option<u64>,
    /// Also publish every snapshot here for concurrent readers.
    pub publish: Option<Arc<Published<Snapshot>>>,
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            mode: SamplingMode::Paced(120),
            frequency_hz: 120,
            read_timeout_ms: 50,
            max_run_ms: None,
            publish: None,
        }
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub samples: u64,
    /// Last snapshot before the session was stopped.
    pub snapshot: Snapshot,
    pub elapsed_ms: u64,
}

/// Compute the stall diagnostic threshold in milliseconds.
///
/// Starts from four sensor timeouts, never shorter than two sampling periods
/// so a single missed sample does not trip it, and kept strictly below
/// `max_run_ms` so it can fire before the run ends.
#[inline]
fn compute_stall_threshold_ms(sensor_timeout_ms: u64, period_ms: u64, max_run_ms: u64) -> u64 {
    debug_assert!((1..=crate::util::MILLIS_PER_SEC).contains(&period_ms));

    let fast = fast_threshold_ms(sensor_timeout_ms);
    let two_p = two_periods_ms(period_ms);

    if max_run_ms < two_p {
        return cap_below_max_run(fast, max_run_ms);
    }

    let safe = std::cmp::max(fast, two_p);
    cap_below_max_run(safe, max_run_ms)
}

#[inline]
fn fast_threshold_ms(sensor_timeout_ms: u64) -> u64 {
    sensor_timeout_ms.saturating_mul(4)
}

#[inline]
fn two_periods_ms(period_ms: u64) -> u64 {
    period_ms.saturating_mul(2)
}

/// Cap a threshold to be strictly below `max_run_ms` and at least 1ms.
#[inline]
fn cap_below_max_run(threshold: u64, max_run_ms: u64) -> u64 {
    threshold.min(max_run_ms.saturating_sub(1)).max(1)
}

#[inline]
fn stalled_now(elapsed_ms: u64, stalled_ms: u64, threshold_ms: u64) -> bool {
    elapsed_ms >= threshold_ms && stalled_ms > threshold_ms
}

/// Warns once per stall episode; re-arms when samples resume.
#[derive(Debug, Default)]
struct StallWatch {
    warned: bool,
}

impl StallWatch {
    fn check(&mut self, elapsed_ms: u64, stalled_ms: u64, threshold_ms: u64) {
        if stalled_now(elapsed_ms, stalled_ms, threshold_ms) {
            if !self.warned {
                tracing::warn!(stalled_ms, threshold_ms, "no samples from sensor");
                self.warned = true;
            }
        } else if self.warned && stalled_ms <= threshold_ms {
            tracing::info!("samples resumed");
            self.warned = false;
        }
    }
}

/// Probe the gyro, run the session until `shutdown` is set or `max_run_ms`
/// elapses, and return a summary. The session is stopped on return.
///
/// A missing sensor returns `MeterError::SensorUnavailable` before the
/// session is touched. Stalls are logged, never fatal.
pub fn run<G, F>(
    gyro: G,
    session: &mut MeasurementSession,
    params: &RunParams,
    shutdown: &AtomicBool,
    sink: F,
) -> CoreResult<RunSummary>
where
    G: rpm_traits::Gyro + Send + 'static,
    F: FnMut(&Snapshot),
{
    run_with_clock(gyro, session, params, shutdown, sink, MonotonicClock::new())
}

/// `run` on an explicit clock.
pub fn run_with_clock<G, F, C>(
    mut gyro: G,
    session: &mut MeasurementSession,
    params: &RunParams,
    shutdown: &AtomicBool,
    sink: F,
    clock: C,
) -> CoreResult<RunSummary>
where
    G: rpm_traits::Gyro + Send + 'static,
    F: FnMut(&Snapshot),
    C: Clock + Clone + Send + Sync + 'static,
{
    if let Err(e) = gyro.probe() {
        let mapped = match map_sensor_error(e.as_ref()) {
            MeterError::SensorUnavailable(s) => MeterError::SensorUnavailable(s),
            other => MeterError::SensorUnavailable(other.to_string()),
        };
        tracing::warn!(error = %mapped, "sensor probe failed");
        return Err(crate::error::Report::new(mapped));
    }

    let mut pump = Pump {
        session,
        publish: params.publish.as_deref(),
        sink,
        samples: 0,
        last_snapshot: Snapshot::default(),
    };
    pump.session.start();

    let start = clock.now();
    match params.mode {
        SamplingMode::Direct => {
            tracing::info!(mode = "direct", hz = params.frequency_hz, "measurement run start");
            run_direct(gyro, &mut pump, params, shutdown, &clock, start);
        }
        SamplingMode::Paced(hz) => {
            tracing::info!(mode = "paced", hz, "measurement run start");
            run_with_sampler(gyro, hz, &mut pump, params, shutdown, &clock, start);
        }
    }

    let elapsed_ms = clock.ms_since(start);
    let summary = RunSummary {
        samples: pump.samples,
        snapshot: pump.last_snapshot,
        elapsed_ms,
    };
    pump.session.stop();
    // readers of the cell must see the flushed state, not the last live reading
    if let Some(p) = pump.publish {
        p.store(pump.session.snapshot().clone());
    }
    tracing::info!(
        samples = summary.samples,
        elapsed_ms,
        display_rpm = summary.snapshot.display_rpm,
        "measurement run complete"
    );
    Ok(summary)
}

struct Pump<'a, F> {
    session: &'a mut MeasurementSession,
    publish: Option<&'a Published<Snapshot>>,
    sink: F,
    samples: u64,
    last_snapshot: Snapshot,
}

impl<F: FnMut(&Snapshot)> Pump<'_, F> {
    fn feed(&mut self, sample: Sample) {
        let before = self.session.snapshot().samples;
        let snap = self.session.ingest(sample);
        if snap.samples == before {
            return;
        }
        self.samples += 1;
        (self.sink)(snap);
        if let Some(p) = self.publish {
            p.store(snap.clone());
        }
        self.last_snapshot.clone_from(snap);
    }
}

fn should_stop(shutdown: &AtomicBool, elapsed_ms: u64, max_run_ms: Option<u64>) -> bool {
    if shutdown.load(Ordering::Relaxed) {
        tracing::debug!("shutdown requested");
        return true;
    }
    if max_run_ms.is_some_and(|max| elapsed_ms >= max) {
        tracing::debug!(elapsed_ms, "max run time reached");
        return true;
    }
    false
}

fn stall_threshold(params: &RunParams, hz: u32) -> u64 {
    compute_stall_threshold_ms(
        params.read_timeout_ms,
        crate::util::period_ms(hz),
        params.max_run_ms.unwrap_or(u64::MAX),
    )
}

fn run_direct<G, F, C>(
    mut gyro: G,
    pump: &mut Pump<'_, F>,
    params: &RunParams,
    shutdown: &AtomicBool,
    clock: &C,
    start: Instant,
) where
    G: rpm_traits::Gyro,
    F: FnMut(&Snapshot),
    C: Clock,
{
    let period = Duration::from_micros(crate::util::period_us(params.frequency_hz));
    let timeout = Duration::from_millis(params.read_timeout_ms);
    let threshold_ms = stall_threshold(params, params.frequency_hz);
    let mut watch = StallWatch::default();
    let mut last_ok_ms = 0_u64;
    let mut failing = false;

    loop {
        let elapsed_ms = clock.ms_since(start);
        if should_stop(shutdown, elapsed_ms, params.max_run_ms) {
            break;
        }
        match gyro.read(timeout) {
            Ok(rate) => {
                failing = false;
                last_ok_ms = clock.ms_since(start);
                pump.feed(Sample::new(clock.secs_since(start), rate));
            }
            Err(e) => {
                let mapped = map_sensor_error(e.as_ref());
                if failing {
                    tracing::trace!(error = %mapped, "sensor read failed");
                } else {
                    tracing::warn!(error = %mapped, "sensor read failed");
                    failing = true;
                }
            }
        }
        let now_ms = clock.ms_since(start);
        watch.check(now_ms, now_ms.saturating_sub(last_ok_ms), threshold_ms);
        clock.sleep(period);
    }
}

fn run_with_sampler<G, F, C>(
    gyro: G,
    hz: u32,
    pump: &mut Pump<'_, F>,
    params: &RunParams,
    shutdown: &AtomicBool,
    clock: &C,
    start: Instant,
) where
    G: rpm_traits::Gyro + Send + 'static,
    F: FnMut(&Snapshot),
    C: Clock + Clone + Send + Sync + 'static,
{
    let period = Duration::from_micros(crate::util::period_us(hz));
    let threshold_ms = stall_threshold(params, hz);
    let sampler = Sampler::spawn(
        gyro,
        hz,
        Duration::from_millis(params.read_timeout_ms),
        clock.clone(),
    );
    let mut watch = StallWatch::default();

    loop {
        let elapsed_ms = clock.ms_since(start);
        if should_stop(shutdown, elapsed_ms, params.max_run_ms) {
            break;
        }
        let batch = sampler.drain();
        if batch.is_empty() {
            // avoid busy spin if no sample yet
            clock.sleep(period);
        }
        for sample in batch {
            pump.feed(sample);
        }
        watch.check(elapsed_ms, sampler.stalled_for_on(clock), threshold_ms);
    }
    tracing::debug!(read_errors = sampler.read_errors(), "sampler stopped");
}
