//! Tracing setup for the SCloud server.
//!
//! Events go to stdout and, unless `logging.file` is empty, are appended to
//! a log file. `RUST_LOG` replaces the configured filter entirely when set.

use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::{Result, ScloudError};

/// Noisy dependencies held at `warn` regardless of the configured level.
const QUIET_TARGETS: &[&str] = &["sqlx", "hyper", "h2"];

fn parse_level(level: &str) -> Level {
    match level.trim().to_ascii_lowercase().as_str() {
        "warning" => Level::WARN,
        other => other.parse().unwrap_or(Level::INFO),
    }
}

/// Filter directives used when `RUST_LOG` is unset.
fn default_directives(level: Level) -> String {
    let mut directives = level.as_str().to_ascii_lowercase();
    for target in QUIET_TARGETS {
        directives.push_str(&format!(",{target}=warn"));
    }
    directives
}

fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(parse_level(level))))
}

/// Open `path` for appending, creating missing parent directories.
fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

/// Install the global subscriber described by `config`.
///
/// Fails if the log file cannot be opened or a subscriber is already set.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(&config.level);
    let stdout = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_target(true);

    let result = if config.file.trim().is_empty() {
        tracing_subscriber::registry()
            .with(stdout.with_writer(std::io::stdout))
            .with(filter)
            .try_init()
    } else {
        let log_file = Arc::new(open_log_file(Path::new(&config.file))?);
        tracing_subscriber::registry()
            .with(stdout.with_writer(std::io::stdout.and(log_file)))
            .with(filter)
            .try_init()
    };

    result.map_err(|e| ScloudError::Config(format!("logging init failed: {e}")))
}

/// Install a colored stdout-only subscriber.
///
/// Used when [`init`] fails; does nothing if a subscriber is already set.
pub fn init_console_only(level: &str) {
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_ansi(true).with_target(true))
        .with(build_filter(level))
        .try_init();
}
