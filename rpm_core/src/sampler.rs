//! Background gyroscope sampling.
//!
//! Spawns a thread that owns the `Gyro`, stamps each reading with seconds
//! since the sampler epoch, pushes `Sample`s over a bounded channel, and
//! tracks the last-ok timestamp for stall diagnostics.
//!
//! Each `Sampler` spawns exactly one thread, shut down and joined when the
//! `Sampler` is dropped.
use crossbeam_channel as xch;
use rpm_traits::Gyro;
use rpm_traits::clock::Clock;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::types::Sample;

/// Pending samples buffered before the consumer must catch up.
const CHANNEL_CAPACITY: usize = 256;

pub struct Sampler {
    rx: xch::Receiver<Sample>,
    last_ok: Arc<AtomicU64>,
    read_errors: Arc<AtomicU64>,
    epoch: Instant,
    shutdown: Arc<AtomicBool>,
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl Sampler {
    pub fn spawn<G: Gyro + Send + 'static, C: Clock + Send + Sync + 'static>(
        mut gyro: G,
        hz: u32,
        timeout: Duration,
        clock: C,
    ) -> Self {
        let (tx, rx) = xch::bounded(CHANNEL_CAPACITY);
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();
        let last_ok = Arc::new(AtomicU64::new(0));
        let last_ok_clone = last_ok.clone();
        let read_errors = Arc::new(AtomicU64::new(0));
        let read_errors_clone = read_errors.clone();
        let period = Duration::from_micros(crate::util::period_us(hz));
        let epoch = clock.now();

        let join_handle = std::thread::spawn(move || {
            tracing::debug!(hz, "sampler thread started");
            let mut failing = false;
            loop {
                if shutdown_clone.load(Ordering::Relaxed) {
                    tracing::debug!("sampler thread received shutdown signal");
                    break;
                }

                match gyro.read(timeout) {
                    Ok(rate) => {
                        if failing {
                            tracing::info!("sensor reads recovered");
                            failing = false;
                        }
                        let sample = Sample::new(clock.secs_since(epoch), rate);
                        match tx.try_send(sample) {
                            Ok(()) => {}
                            Err(xch::TrySendError::Full(_)) => {
                                tracing::trace!("sampler channel full, dropping sample");
                            }
                            Err(xch::TrySendError::Disconnected(_)) => {
                                tracing::debug!("sampler consumer disconnected, exiting thread");
                                break;
                            }
                        }
                        last_ok_clone.store(clock.ms_since(epoch), Ordering::Relaxed);
                    }
                    Err(e) => {
                        read_errors_clone.fetch_add(1, Ordering::Relaxed);
                        if failing {
                            tracing::trace!(error = %e, "sensor read failed");
                        } else {
                            tracing::warn!(error = %e, "sensor read failed");
                            failing = true;
                        }
                    }
                }

                if shutdown_clone.load(Ordering::Relaxed) {
                    break;
                }
                clock.sleep(period);
            }
            tracing::trace!("sampler thread exiting cleanly");
        });

        Self {
            rx,
            last_ok,
            read_errors,
            epoch,
            shutdown,
            join_handle: Some(join_handle),
        }
    }

    /// Every pending sample, oldest first. Never blocks.
    pub fn drain(&self) -> Vec<Sample> {
        self.rx.try_iter().collect()
    }

    /// Wait up to `timeout` for the next sample.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Sample> {
        self.rx.recv_timeout(timeout).ok()
    }

    pub fn read_errors(&self) -> u64 {
        self.read_errors.load(Ordering::Relaxed)
    }

    pub fn stalled_for(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.last_ok.load(Ordering::Relaxed))
    }

    /// Stall duration measured against this sampler's epoch on the given clock.
    pub fn stalled_for_on<C: Clock>(&self, clock: &C) -> u64 {
        self.stalled_for(clock.ms_since(self.epoch))
    }
}

impl Drop for Sampler {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);

        // Exits after the in-flight read returns (bounded by the read timeout).
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(()) => {
                    tracing::trace!("sampler thread joined successfully");
                }
                Err(e) => {
                    tracing::warn!(?e, "sampler thread panicked during shutdown");
                }
            }
        }
    }
}
