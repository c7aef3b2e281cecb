#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
//! `lift`: run the elevator controller, its self-test, or a hardware self-check.

mod backend;
mod cli;
mod error_fmt;
mod run;
mod selftest;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use eyre::WrapErr;
use lift_core::error::LiftError;
use lift_traits::FLOOR_COUNT;

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    let _ = color_eyre::install();

    if let Err(e) = real_main(cli) {
        if cli::json_mode() {
            eprintln!("{}", format_error_json(&e));
        } else {
            eprintln!("{}", humanize(&e));
        }
        std::process::exit(exit_code_for_error(&e));
    }
}

fn real_main(cli: Cli) -> eyre::Result<()> {
    let cfg = load_config(&cli.config)?;

    let level = cli
        .log_level
        .as_deref()
        .or(cfg.logging.level.as_deref())
        .unwrap_or("info");
    init_tracing(cli.json, level, &cfg.logging);
    tracing::debug!(config = %cli.config.display(), "configuration loaded");

    match cli.cmd {
        Commands::Run { presses, max_ticks } => {
            let shutdown = Arc::new(AtomicBool::new(false));
            let flag = Arc::clone(&shutdown);
            ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
                .wrap_err("installing Ctrl-C handler")?;

            let out = run::run_lift(&cfg, &presses, max_ticks, &shutdown)?;
            run::print_summary(&out);
        }
        Commands::SelfTest => selftest::self_test(&cfg)?,
        Commands::SelfCheck => selftest::self_check(&cfg)?,
    }
    Ok(())
}

fn load_config(path: &Path) -> eyre::Result<lift_config::Config> {
    let cfg = lift_config::load_file(path)
        .map_err(|e| eyre::Report::new(LiftError::Config(e.to_string())))?;
    cfg.validate(FLOOR_COUNT)
        .map_err(|e| eyre::Report::new(LiftError::Config(e.to_string())))?;
    Ok(cfg)
}

/// Console layer on stderr (pretty or JSON) plus an optional JSON-lines file layer.
///
/// `RUST_LOG` takes precedence over `level`.
fn init_tracing(json: bool, level: &str, logging: &lift_config::Logging) {
    use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
    if json {
        layers.push(fmt::layer().json().with_writer(std::io::stderr).boxed());
    } else {
        layers.push(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .boxed(),
        );
    }

    if let Some(file) = logging.file.as_deref() {
        let path = Path::new(file);
        let dir = path
            .parent()
            .filter(|d| !d.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let name = path
            .file_name()
            .map_or_else(|| "lift.log".into(), |n| n.to_os_string());
        let appender = match logging.rotation.as_deref() {
            Some("daily") => tracing_appender::rolling::daily(dir, name),
            Some("hourly") => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        layers.push(
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer)
                .boxed(),
        );
    }

    let _ = tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init();
}
