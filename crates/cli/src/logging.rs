use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Prefix of the rotated log files, e.g. `wms.2026-10-16-09.log`.
const LOG_FILE_PREFIX: &str = "wms";

/// Filter used when `RUST_LOG` is unset.
fn default_directives(verbosity: u8) -> &'static str {
	match verbosity {
		0 => "warn,wms=info",
		1 => "info,wms=debug",
		_ => "debug,wms=trace",
	}
}

/// Hourly rotated, dated log files under `dir`.
pub fn rolling_appender(dir: &Path) -> Result<RollingFileAppender> {
	fs::create_dir_all(dir).with_context(|| format!("creating log directory {}", dir.display()))?;
	RollingFileAppender::builder()
		.rotation(Rotation::HOURLY)
		.filename_prefix(LOG_FILE_PREFIX)
		.filename_suffix("log")
		.build(dir)
		.with_context(|| format!("opening log files in {}", dir.display()))
}

/// Installs the global subscriber: stderr, plus a plain-text copy in hourly
/// files under `log_dir` when given. `RUST_LOG` overrides the verbosity flags.
pub fn init_logging(verbosity: u8, log_dir: Option<&Path>) -> Result<()> {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(verbosity)));

	let stderr = fmt::layer().with_writer(std::io::stderr).with_target(verbosity > 0);

	// Written synchronously: `main` exits the process on failure, which would
	// drop a non-blocking writer's buffered lines.
	let file = match log_dir {
		Some(dir) => Some(fmt::layer().with_ansi(false).with_writer(rolling_appender(dir)?)),
		None => None,
	};

	tracing_subscriber::registry()
		.with(filter)
		.with(stderr)
		.with(file)
		.try_init()
		.context("a global subscriber is already installed")
}
