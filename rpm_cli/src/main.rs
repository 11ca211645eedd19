#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod cli;
mod error_fmt;
mod measure;

use clap::Parser;
use cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use eyre::WrapErr;
use rpm_core::error::MeterError;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    let _ = color_eyre::install();

    if let Err(e) = real_main(cli) {
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", error_fmt::format_error_json(&e));
        } else {
            eprintln!("{}", error_fmt::humanize(&e));
        }
        std::process::exit(error_fmt::exit_code_for_error(&e));
    }
}

fn real_main(cli: Cli) -> eyre::Result<()> {
    let cfg = load_config(&cli.config)?;
    init_tracing(cli.json, cli.log_level.as_deref(), &cfg.logging)?;
    tracing::debug!(config = %cli.config.display(), "config loaded");

    match cli.cmd {
        Commands::Measure {
            synthetic,
            device,
            duration_ms,
            every,
        } => {
            let shutdown = Arc::new(AtomicBool::new(false));
            {
                let flag = Arc::clone(&shutdown);
                ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
                    .wrap_err("install Ctrl-C handler")?;
            }
            let source = if synthetic {
                measure::Source::Synthetic
            } else {
                measure::Source::Device(device)
            };
            measure::run_measure(&cfg, &source, duration_ms, every, &shutdown)
        }
        Commands::Replay { file } => measure::run_replay(&cfg, &file),
        Commands::SelfCheck { synthetic, device } => {
            let source = if synthetic {
                measure::Source::Synthetic
            } else {
                measure::Source::Device(device)
            };
            measure::run_self_check(&cfg, &source)
        }
    }
}

/// Missing file means built-in defaults; anything unreadable or invalid is a
/// config error.
fn load_config(path: &Path) -> eyre::Result<rpm_config::Config> {
    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(rpm_config::Config::default());
        }
        Err(e) => {
            return Err(eyre::Report::new(MeterError::Config(format!(
                "read {}: {e}",
                path.display()
            ))));
        }
    };
    let cfg = rpm_config::load_toml(&text)
        .map_err(|e| eyre::Report::new(MeterError::Config(e.to_string())))?;
    cfg.validate()
        .map_err(|e| eyre::Report::new(MeterError::Config(e.to_string())))?;
    Ok(cfg)
}

/// Console logs go to stderr so stdout stays machine-readable. Level comes
/// from `--log-level`, then `RUST_LOG`, then `[logging] level`, then info.
fn init_tracing(
    json: bool,
    cli_level: Option<&str>,
    logging: &rpm_config::Logging,
) -> eyre::Result<()> {
    let filter = match cli_level {
        Some(level) => EnvFilter::try_new(level).wrap_err("invalid --log-level")?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(logging.level.as_deref().unwrap_or("info"))
        }),
    };

    let console = if json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed()
    };

    let file_layer = match logging.file.as_deref() {
        Some(file) => {
            let path = Path::new(file);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .map_or_else(|| "rpm.log".into(), |n| n.to_os_string());
            let appender = match logging.rotation.as_deref() {
                Some("daily") => tracing_appender::rolling::daily(dir, name),
                Some("hourly") => tracing_appender::rolling::hourly(dir, name),
                _ => tracing_appender::rolling::never(dir, name),
            };
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            Some(fmt::layer().json().with_ansi(false).with_writer(writer).boxed())
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init()
        .wrap_err("initialize logging")?;
    Ok(())
}
