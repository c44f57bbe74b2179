//! Logging configuration using the tracing ecosystem.
//!
//! The library only emits `tracing` events; installing a subscriber is the
//! embedding application's choice. [`init`] is a ready-made setup that
//! writes to a daily-rotated file, for applications that want one.
//!
//! Request and response bodies are never logged unless [`DEBUG_ENV_VAR`] is
//! set, since they can carry issue content and credentials.

use std::path::{Path, PathBuf};

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Default log level if RUST_LOG is not set.
const DEFAULT_LOG_FILTER: &str = "jira_rest=info,warn";

/// Environment variable that turns on request/response body logging.
///
/// Any non-empty value other than `0` enables it. Read on every request.
pub const DEBUG_ENV_VAR: &str = "JIRA_REST_DEBUG";

/// Whether request/response bodies should be logged.
pub fn debug_http_enabled() -> bool {
    match std::env::var_os(DEBUG_ENV_VAR) {
        Some(value) => !value.is_empty() && value != "0",
        None => false,
    }
}

/// Initialize file logging for an application embedding the client.
///
/// Sets up tracing with:
/// - Daily rotating file appender under `<data_local_dir>/<app_name>/logs`
/// - Log level configuration via `RUST_LOG` environment variable
/// - Structured output with file/line numbers and thread IDs
///
/// # Errors
///
/// Returns an error if:
/// - The log directory cannot be determined or created
/// - A global tracing subscriber is already set
pub fn init(app_name: &str) -> anyhow::Result<PathBuf> {
    let log_dir = log_directory(app_name)?;
    init_in(&log_dir, app_name)?;
    Ok(log_dir)
}

/// Initialize file logging into an explicit directory.
pub fn init_in(log_dir: &Path, app_name: &str) -> anyhow::Result<()> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender =
        RollingFileAppender::new(Rotation::DAILY, log_dir, format!("{}.log", app_name));

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let subscriber = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter);

    tracing::subscriber::set_global_default(subscriber)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "jira-rest logging started");
    tracing::debug!(log_dir = %log_dir.display(), "Log directory");

    Ok(())
}

/// Get the log directory path for an application.
///
/// Returns the platform-specific local data directory with `<app_name>/logs` appended.
pub fn log_directory(app_name: &str) -> anyhow::Result<PathBuf> {
    let base_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine local data directory"))?;

    Ok(base_dir.join(app_name).join("logs"))
}
