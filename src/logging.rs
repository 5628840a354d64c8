//! # Logging
//!
//! The terminal belongs to the TUI, so log output goes to a daily rolling
//! file instead of stdout. The level is taken from `RUST_LOG` and defaults
//! to `info`.
//!
//! ```text
//! ~/.local/share/dirac-monitor/logs/dirac-monitor.log.2024-05-10
//! ```

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Registry};

pub const LOG_FILE_PREFIX: &str = "dirac-monitor.log";

/// Install the global subscriber writing to `log_dir` (or the default log
/// directory). Keep the returned guard alive until exit so buffered lines
/// are flushed.
pub fn init_logging(log_dir: Option<&Path>) -> Result<WorkerGuard> {
    let dir = match log_dir {
        Some(dir) => dir.to_path_buf(),
        None => default_log_dir()?,
    };
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (writer, guard) = tracing_appender::non_blocking(rolling::daily(&dir, LOG_FILE_PREFIX));

    Registry::default()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        )
        .try_init()
        .context("Failed to install log subscriber")?;

    tracing::info!(dir = %dir.display(), "logging initialized");
    Ok(guard)
}

pub fn default_log_dir() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "dirac-monitor")
        .context("Could not determine log directory")?;
    Ok(dirs.data_dir().join("logs"))
}
