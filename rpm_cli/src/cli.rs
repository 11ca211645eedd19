//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "rpm", version, about = "Turntable speed meter")]
pub struct Cli {
    /// Path to config TOML; a missing file means built-in defaults
    #[arg(long, value_name = "FILE", default_value = "etc/rpm_config.toml")]
    pub config: PathBuf,

    /// Emit JSON lines instead of pretty text (output, logs and errors)
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); falls back to RUST_LOG,
    /// then [logging] level, then info
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Measure platter speed from the gyroscope (or the synthetic generator)
    Measure {
        /// Use the synthetic ramp + wow/flutter generator instead of a sensor
        #[arg(long, action = ArgAction::SetTrue)]
        synthetic: bool,
        /// IIO device directory (overrides [sensor] device)
        #[arg(long, value_name = "DIR", conflicts_with = "synthetic")]
        device: Option<PathBuf>,
        /// Stop after this many milliseconds (default: until Ctrl-C)
        #[arg(long, value_name = "MS")]
        duration_ms: Option<u64>,
        /// Print every Nth snapshot
        #[arg(long, value_name = "N", default_value_t = 12, value_parser = clap::value_parser!(u64).range(1..))]
        every: u64,
    },
    /// Run a recorded capture (timestamp_s,angular_velocity_z) through the pipeline
    Replay {
        #[arg(long, value_name = "CSV")]
        file: PathBuf,
    },
    /// Validate config and probe the sensor
    SelfCheck {
        #[arg(long, action = ArgAction::SetTrue)]
        synthetic: bool,
        #[arg(long, value_name = "DIR", conflicts_with = "synthetic")]
        device: Option<PathBuf>,
    },
}
