#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema and capture parsing for the turntable speed meter.
//!
//! - `Config` and its sections are deserialized from TOML and validated.
//!   Every section is optional; an empty document yields the defaults.
//! - The capture CSV loader enforces headers and a strictly increasing
//!   timestamp column so replayed captures integrate cleanly.
use serde::Deserialize;
use serde::de::Deserializer;

/// Recorded gyroscope capture row.
///
/// Expected headers:
/// timestamp_s,angular_velocity_z
///
/// Example:
/// timestamp_s,angular_velocity_z
/// 0.000,3.4906
/// 0.008,3.4911
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct SampleRow {
    pub timestamp_s: f64,
    pub angular_velocity_z: f64,
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SamplingMode {
    /// Background sampler thread paced at `frequency_hz`
    #[default]
    Paced,
    /// Read the sensor inside the processing loop
    Direct,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SamplingCfg {
    pub frequency_hz: u32,
    /// Per-read sensor timeout (ms). Also accepts alias "sensor_ms".
    #[serde(alias = "sensor_ms")]
    pub read_timeout_ms: u64,
    pub mode: SamplingMode,
}

impl Default for SamplingCfg {
    fn default() -> Self {
        Self {
            frequency_hz: 120,
            read_timeout_ms: 50,
            mode: SamplingMode::Paced,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SmoothingPolicy {
    #[default]
    Mean,
    Robust,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SmoothingCfg {
    /// Rolling window length in samples
    pub window: usize,
    pub policy: SmoothingPolicy,
    /// Smoothed readings below this are reported as 0 RPM
    pub min_detectable_rpm: f64,
    /// Robust policy: reject entries farther than `mad_multiplier * MAD` from the median
    pub mad_multiplier: f64,
    /// Robust policy: the rejection radius never drops below this (RPM)
    pub min_rejection_rpm: f64,
    /// Robust policy: fewer samples than this fall back to the plain mean
    pub robust_min_samples: usize,
}

impl Default for SmoothingCfg {
    fn default() -> Self {
        Self {
            window: 120,
            policy: SmoothingPolicy::Mean,
            min_detectable_rpm: 0.02,
            mad_multiplier: 2.0,
            min_rejection_rpm: 0.5,
            robust_min_samples: 3,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TargetsCfg {
    pub speeds: Vec<f64>,
    pub perfect_pct: f64,
    pub good_pct: f64,
    pub max_pct: f64,
    /// Scales `perfect_pct` for the stability band. 2.0 reproduces the
    /// "within perfect_pct either side" reading of the tolerance.
    pub stability_multiplier: f64,
}

impl Default for TargetsCfg {
    fn default() -> Self {
        Self {
            speeds: vec![33.33, 45.0, 78.0],
            perfect_pct: 1.0,
            good_pct: 5.0,
            max_pct: 10.0,
            stability_multiplier: 1.0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HistoryCfg {
    pub capacity: usize,
    pub jump_threshold_pct: f64,
}

impl Default for HistoryCfg {
    fn default() -> Self {
        Self {
            capacity: 100,
            jump_threshold_pct: 15.0,
        }
    }
}

/// One sinusoidal speed perturbation, expressed as a percentage of the ramped RPM.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneCfg {
    pub freq_hz: f64,
    pub amplitude_pct: f64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SyntheticCfg {
    /// Fixed seed for repeatable runs; absent means seeded from entropy
    pub seed: Option<u64>,
    pub start_rpm: f64,
    pub end_rpm: f64,
    pub ramp_rpm_per_s: f64,
    /// Uniform noise bound, percent of the ramped RPM
    pub noise_pct: f64,
    /// Accepts either:
    /// - array of tables: [{ freq_hz = 0.55, amplitude_pct = 0.2 }, ...]
    /// - array of tuples: [[0.55, 0.2], ...]
    #[serde(deserialize_with = "de_tones")]
    pub wow: Vec<ToneCfg>,
    #[serde(deserialize_with = "de_tones")]
    pub flutter: Vec<ToneCfg>,
}

impl Default for SyntheticCfg {
    fn default() -> Self {
        Self {
            seed: None,
            start_rpm: 30.0,
            end_rpm: 33.33,
            ramp_rpm_per_s: 1.0,
            noise_pct: 0.5,
            wow: vec![
                ToneCfg {
                    freq_hz: 0.55,
                    amplitude_pct: 0.20,
                },
                ToneCfg {
                    freq_hz: 1.3,
                    amplitude_pct: 0.08,
                },
            ],
            flutter: vec![
                ToneCfg {
                    freq_hz: 6.5,
                    amplitude_pct: 0.05,
                },
                ToneCfg {
                    freq_hz: 14.0,
                    amplitude_pct: 0.02,
                },
            ],
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct SensorCfg {
    /// IIO device directory, e.g. /sys/bus/iio/devices/iio:device0
    pub device: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub sampling: SamplingCfg,
    pub smoothing: SmoothingCfg,
    pub targets: TargetsCfg,
    pub history: HistoryCfg,
    pub synthetic: SyntheticCfg,
    pub sensor: SensorCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ToneToml {
    Tuple((f64, f64)),
    Table { freq_hz: f64, amplitude_pct: f64 },
}

fn de_tones<'de, D>(deserializer: D) -> Result<Vec<ToneCfg>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<Vec<ToneToml>> = Option::deserialize(deserializer)?;
    let mut out = Vec::new();
    if let Some(items) = opt {
        for t in items {
            match t {
                ToneToml::Tuple((freq_hz, amplitude_pct)) => out.push(ToneCfg {
                    freq_hz,
                    amplitude_pct,
                }),
                ToneToml::Table {
                    freq_hz,
                    amplitude_pct,
                } => out.push(ToneCfg {
                    freq_hz,
                    amplitude_pct,
                }),
            }
        }
    }
    Ok(out)
}

/// Load a recorded capture. Timestamps must be finite and strictly increasing.
pub fn load_samples_csv(path: &std::path::Path) -> eyre::Result<Vec<SampleRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open capture CSV {:?}: {}", path, e))?;

    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let expected = ["timestamp_s", "angular_velocity_z"];
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != expected {
        eyre::bail!(
            "capture CSV must have headers 'timestamp_s,angular_velocity_z', got: {}",
            actual.join(",")
        );
    }

    let mut rows: Vec<SampleRow> = Vec::new();
    for (idx, rec) in rdr.deserialize::<SampleRow>().enumerate() {
        let row: SampleRow = match rec {
            Ok(row) => row,
            Err(e) => eyre::bail!("invalid CSV row {}: {}", idx + 2, e),
        };
        if !row.timestamp_s.is_finite() || !row.angular_velocity_z.is_finite() {
            eyre::bail!("non-finite value in CSV row {}", idx + 2);
        }
        if let Some(prev) = rows.last()
            && row.timestamp_s <= prev.timestamp_s
        {
            eyre::bail!(
                "capture timestamps must be strictly increasing (row {}: {} <= {})",
                idx + 2,
                row.timestamp_s,
                prev.timestamp_s
            );
        }
        rows.push(row);
    }
    Ok(rows)
}

fn check_tones(section: &str, tones: &[ToneCfg]) -> eyre::Result<()> {
    for (i, t) in tones.iter().enumerate() {
        if !(t.freq_hz.is_finite() && t.freq_hz > 0.0) {
            eyre::bail!("synthetic.{section}[{i}].freq_hz must be > 0");
        }
        if !(t.amplitude_pct.is_finite() && t.amplitude_pct >= 0.0) {
            eyre::bail!("synthetic.{section}[{i}].amplitude_pct must be >= 0");
        }
    }
    Ok(())
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Sampling
        if self.sampling.frequency_hz == 0 {
            eyre::bail!("sampling.frequency_hz must be > 0");
        }
        if self.sampling.frequency_hz > 10_000 {
            eyre::bail!("sampling.frequency_hz is unreasonably large (>10kHz)");
        }
        if self.sampling.read_timeout_ms == 0 {
            eyre::bail!("sampling.read_timeout_ms must be >= 1");
        }

        // Smoothing
        if self.smoothing.window == 0 {
            eyre::bail!("smoothing.window must be >= 1");
        }
        if !(self.smoothing.min_detectable_rpm.is_finite()
            && self.smoothing.min_detectable_rpm >= 0.0)
        {
            eyre::bail!("smoothing.min_detectable_rpm must be >= 0");
        }
        if !(self.smoothing.mad_multiplier.is_finite() && self.smoothing.mad_multiplier > 0.0) {
            eyre::bail!("smoothing.mad_multiplier must be > 0");
        }
        if !(self.smoothing.min_rejection_rpm.is_finite()
            && self.smoothing.min_rejection_rpm >= 0.0)
        {
            eyre::bail!("smoothing.min_rejection_rpm must be >= 0");
        }
        if self.smoothing.robust_min_samples == 0 {
            eyre::bail!("smoothing.robust_min_samples must be >= 1");
        }

        // Targets: a zero speed would divide by zero in every deviation
        for (i, s) in self.targets.speeds.iter().enumerate() {
            if !(s.is_finite() && *s > 0.0) {
                eyre::bail!("targets.speeds[{i}] must be a finite speed > 0 (got {s})");
            }
        }
        let t = &self.targets;
        if !(t.perfect_pct.is_finite() && t.perfect_pct > 0.0) {
            eyre::bail!("targets.perfect_pct must be > 0");
        }
        if !(t.good_pct.is_finite() && t.good_pct >= t.perfect_pct) {
            eyre::bail!("targets.good_pct must be >= targets.perfect_pct");
        }
        if !(t.max_pct.is_finite() && t.max_pct >= t.good_pct) {
            eyre::bail!("targets.max_pct must be >= targets.good_pct");
        }
        if !(t.stability_multiplier.is_finite() && t.stability_multiplier > 0.0) {
            eyre::bail!("targets.stability_multiplier must be > 0");
        }

        // History
        if self.history.capacity == 0 {
            eyre::bail!("history.capacity must be >= 1");
        }
        if !(self.history.jump_threshold_pct.is_finite() && self.history.jump_threshold_pct > 0.0)
        {
            eyre::bail!("history.jump_threshold_pct must be > 0");
        }

        // Synthetic
        let s = &self.synthetic;
        if !(s.start_rpm.is_finite() && s.start_rpm >= 0.0) {
            eyre::bail!("synthetic.start_rpm must be >= 0");
        }
        if !(s.end_rpm.is_finite() && s.end_rpm >= 0.0) {
            eyre::bail!("synthetic.end_rpm must be >= 0");
        }
        if !(s.ramp_rpm_per_s.is_finite() && s.ramp_rpm_per_s >= 0.0) {
            eyre::bail!("synthetic.ramp_rpm_per_s must be >= 0");
        }
        if !(s.noise_pct.is_finite() && s.noise_pct >= 0.0) {
            eyre::bail!("synthetic.noise_pct must be >= 0");
        }
        check_tones("wow", &s.wow)?;
        check_tones("flutter", &s.flutter)?;

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        Ok(())
    }
}
