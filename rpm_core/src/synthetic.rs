//! Synthetic turntable signal for demos and repeatable tests.
//!
//! A linear speed ramp with wow and flutter tones and bounded uniform noise
//! layered on top as fractional perturbations. Output is angular velocity so
//! it flows through the same conversion as a real sensor.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rpm_traits::{Clock, Gyro};

use crate::config::{SyntheticCfg, Tone};
use crate::util::rpm_to_rad_per_s;

#[derive(Debug, Clone)]
pub struct SyntheticGenerator {
    cfg: SyntheticCfg,
    rng: StdRng,
}

impl SyntheticGenerator {
    /// Seeds from `cfg.seed`, or from OS entropy when unset.
    pub fn new(cfg: SyntheticCfg) -> Self {
        let rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { cfg, rng }
    }

    pub fn cfg(&self) -> &SyntheticCfg {
        &self.cfg
    }

    /// Noise-free ramped RPM at `elapsed_s`, clamped at `end_rpm`.
    pub fn ramp_rpm(&self, elapsed_s: f64) -> f64 {
        let cfg = &self.cfg;
        let travel = cfg.ramp_rpm_per_s.abs() * elapsed_s.max(0.0);
        if cfg.end_rpm >= cfg.start_rpm {
            (cfg.start_rpm + travel).min(cfg.end_rpm)
        } else {
            (cfg.start_rpm - travel).max(cfg.end_rpm)
        }
    }

    /// Perturbed speed in RPM at `elapsed_s`.
    pub fn sample_rpm(&mut self, elapsed_s: f64) -> f64 {
        let base = self.ramp_rpm(elapsed_s);
        let tones: f64 = self
            .cfg
            .wow
            .iter()
            .chain(self.cfg.flutter.iter())
            .map(|t| tone_at(*t, elapsed_s))
            .sum();
        let bound = self.cfg.noise_pct.abs() / 100.0;
        let noise = if bound > 0.0 {
            self.rng.gen_range(-bound..=bound)
        } else {
            0.0
        };
        base * (1.0 + tones + noise)
    }

    /// Perturbed angular velocity in rad/s at `elapsed_s`.
    pub fn sample(&mut self, elapsed_s: f64) -> f64 {
        rpm_to_rad_per_s(self.sample_rpm(elapsed_s))
    }
}

fn tone_at(tone: Tone, t: f64) -> f64 {
    tone.amplitude_pct / 100.0 * (std::f64::consts::TAU * tone.freq_hz * t).sin()
}

/// A `Gyro` backed by `SyntheticGenerator`; elapsed time comes from the
/// clock, starting at the first read.
pub struct SyntheticGyro<C: Clock> {
    generator: SyntheticGenerator,
    clock: C,
    epoch: Option<Instant>,
}

impl<C: Clock> SyntheticGyro<C> {
    pub fn new(cfg: SyntheticCfg, clock: C) -> Self {
        Self {
            generator: SyntheticGenerator::new(cfg),
            clock,
            epoch: None,
        }
    }
}

impl<C: Clock> Gyro for SyntheticGyro<C> {
    fn read(&mut self, _timeout: Duration) -> Result<f64, Box<dyn std::error::Error + Send + Sync>> {
        let now = self.clock.now();
        let epoch = *self.epoch.get_or_insert(now);
        let elapsed = now.saturating_duration_since(epoch).as_secs_f64();
        Ok(self.generator.sample(elapsed))
    }
}
