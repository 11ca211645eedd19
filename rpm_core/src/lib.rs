#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cast_precision_loss
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Turntable speed measurement pipeline (hardware-agnostic).
//!
//! All sensor access goes through `rpm_traits::Gyro`; everything in here is
//! synchronous per-sample math plus the thread plumbing that feeds it.
//!
//! ## Pipeline
//!
//! - **Estimator**: rad/s to RPM, rolling window, mean or robust (MAD) smoothing
//!   and a minimum-detectable floor (`estimator`, `window`)
//! - **Rotation**: integrated angle for display counter-rotation (`rotation`)
//! - **Matching**: nearest target speed and signed deviation (`matcher`)
//! - **Stability**: lock detection over the raw window (`stability`)
//! - **History**: bounded deviation series with jump detection (`history`)
//! - **Session**: start/stop lifecycle producing one `Snapshot` per sample
//!
//! ## Driving it
//!
//! `runner::run` probes a `Gyro`, pumps samples (directly or through a
//! background `Sampler`) into a `MeasurementSession`, and hands every
//! snapshot to a sink and optionally to a `Published` cell.

pub mod builder;
pub mod config;
pub mod conversions;
pub mod error;
pub mod estimator;
pub mod grade;
pub mod history;
pub mod hw_error;
pub mod matcher;
pub mod mocks;
pub mod published;
pub mod rotation;
pub mod runner;
pub mod sampler;
pub mod session;
pub mod stability;
pub mod status;
pub mod synthetic;
pub mod types;
pub mod util;
pub mod window;

pub use builder::SessionBuilder;
pub use config::{
    HistoryCfg, SamplingCfg, SmoothingCfg, SmoothingPolicy, SyntheticCfg, TargetCfg, Tone,
};
pub use error::{BuildError, MeterError, Result};
pub use estimator::{RpmEstimate, SmoothingEstimator};
pub use grade::{AccuracyGrade, GradeBands};
pub use history::DeviationHistory;
pub use matcher::{TargetMatch, TargetMatcher, TargetSet};
pub use published::Published;
pub use rotation::RotationAccumulator;
pub use runner::{RunParams, RunSummary, SamplingMode};
pub use session::MeasurementSession;
pub use stability::StabilityClassifier;
pub use status::SessionState;
pub use synthetic::{SyntheticGenerator, SyntheticGyro};
pub use types::{Sample, Snapshot};
pub use window::RollingWindow;
