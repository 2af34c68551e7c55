//! Logging setup for the binaries.
//!
//! Initializes a global tracing subscriber that writes to both stdout and a
//! log file inside the configured logs directory. The file is appended to
//! across runs so training history stays in one place.
//!
//! File output goes through a non-blocking writer. Buffered lines are only
//! flushed when the returned [`WorkerGuard`] is dropped, so binaries keep it
//! alive until they are done logging.

use std::{
    fs::OpenOptions,
    path::{Path, PathBuf},
};

use time::{UtcOffset, format_description::FormatItem, macros::format_description};
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*};

use crate::app_dirs;

/// Log file used by the training binary.
pub const TRAINING_LOG_FILE: &str = "training.log";
/// Log file used by the serving binary.
pub const SERVING_LOG_FILE: &str = "serving.log";

/// Errors that may occur while initializing logging.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// Failed to resolve or create the log directory.
    #[error("Failed to prepare log directory: {0}")]
    Dir(#[from] app_dirs::AppDirError),
    /// Failed to set the global tracing subscriber.
    #[error("Failed to install global tracing subscriber: {0}")]
    SetGlobal(tracing::subscriber::SetGlobalDefaultError),
    /// Failed to create the log file.
    #[error("Failed to create log file at {path}: {source}")]
    CreateLogFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Initialize tracing to write to stdout and `<log_dir>/<file_name>`.
///
/// Only the first call in a process can install the subscriber; later calls
/// return [`LoggingError::SetGlobal`]. Failures are returned so callers can
/// degrade gracefully without aborting startup.
pub fn init(log_dir: &Path, file_name: &str) -> Result<WorkerGuard, LoggingError> {
    let log_dir = app_dirs::resolve(log_dir)?;
    app_dirs::ensure_dir(&log_dir)?;
    let log_path = log_dir.join(file_name);
    ensure_file_exists(&log_path)?;

    let file_appender = rolling::never(&log_dir, file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let timer = build_timer();
    let env_filter = build_env_filter();
    let stdout_layer = fmt::layer()
        .with_timer(timer.clone())
        .with_writer(std::io::stdout);
    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_timer(timer)
        .with_writer(file_writer);

    let subscriber = Registry::default()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer);
    tracing::subscriber::set_global_default(subscriber).map_err(LoggingError::SetGlobal)?;

    tracing::info!("Logging initialized; log file at {}", log_path.display());
    Ok(guard)
}

fn ensure_file_exists(path: &Path) -> Result<(), LoggingError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map(|_| ())
        .map_err(|source| LoggingError::CreateLogFile {
            path: path.to_path_buf(),
            source,
        })
}

fn build_timer() -> fmt::time::OffsetTime<time::format_description::BorrowedFormatItem<'static>> {
    const DISPLAY_FORMAT: &[FormatItem<'static>] =
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    fmt::time::OffsetTime::new(offset, DISPLAY_FORMAT.into())
}

fn build_env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}
