//! Logging initialization

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Level used when `RUST_LOG` is not set
fn default_level(debug: bool, to_file: bool) -> &'static str {
    match (debug, to_file) {
        (true, _) => "debug",
        (false, true) => "info",
        (false, false) => "warn",
    }
}

/// Initialize logging based on the debug flag and optional log file
///
/// Warnings go to stderr by default, everything from `debug` up with
/// `--debug`. A log file receives `info` and above, or `debug` with
/// `--debug`. `RUST_LOG` overrides the level in every case.
pub fn init_logging(debug: bool, log_file: Option<&Path>) -> Result<()> {
    let level = default_level(debug, log_file.is_some());

    if let Some(path) = log_file {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file: {}", path.display()))?;

        tracing_subscriber::fmt()
            .with_writer(Mutex::new(file))
            .with_env_filter(env_filter(level))
            .with_ansi(false) // No ANSI codes in log file
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(env_filter(level))
            .with_target(debug)
            .init();
    }

    Ok(())
}
