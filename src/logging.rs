//! Structured logging for decalc using tracing.
//!
//! Logs to `~/.local/state/decalc/decalc.{date}.log` with daily rotation,
//! keeping 7 files. `RUST_LOG` overrides the configured filter.
//!
//! The terminal belongs to the UI, so if the log file cannot be created
//! logging stays off instead of falling back to stderr.

use crate::app_dirs::AppDirs;
use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber. Keep the returned guard alive until exit
/// so buffered lines are flushed.
pub fn init(default_filter: &str) -> Option<WorkerGuard> {
    let log_dir = AppDirs::log_dir()?;
    fs::create_dir_all(&log_dir).ok()?;
    let appender = create_file_appender(&log_dir).ok()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new(crate::config::DEFAULT_LOG_FILTER));

    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_ansi(false),
        )
        .try_init()
        .ok()?;

    Some(guard)
}

fn create_file_appender(
    log_dir: &Path,
) -> Result<RollingFileAppender, tracing_appender::rolling::InitError> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("decalc")
        .filename_suffix("log")
        .max_log_files(7)
        .build(log_dir)
}
