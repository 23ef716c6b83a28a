//! Tracing subscriber installation and session log files.
//!
//! # Design
//! - One entry point installs the console layer (pretty or JSON) and, when
//!   requested, a plain-text session log file layer.
//! - Session log lines (target [`SESSION_TARGET`]) are already shown by the
//!   front-end, so the console layer skips them; the file layer keeps them.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, TimeZone};
use tracing::Subscriber;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{TelemetryError, TelemetryResult};

/// Default logging target when `RUST_LOG` is not provided.
pub const DEFAULT_LOG_LEVEL: &str = "info";
/// Directory below the home directory holding session log files.
pub const LOG_DIR_NAME: &str = "logs";
/// Tracing target used for lines mirrored from the session log view.
pub const SESSION_TARGET: &str = "patchdeck::session";

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig<'a> {
    /// Log level string (e.g., `info`, `debug`).
    pub level: &'a str,
    /// Output format selection for the console layer.
    pub format: LogFormat,
    /// Session log file to append a plain-text copy of every event to.
    pub log_file: Option<&'a Path>,
}

impl Default for LoggingConfig<'_> {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL,
            format: LogFormat::infer(),
            log_file: None,
        }
    }
}

/// Available output formats for the console logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Emit logs as structured JSON objects.
    Json,
    /// Emit human-readable, pretty-printed logs.
    Pretty,
}

impl LogFormat {
    /// Choose a sensible default for the current build.
    #[must_use]
    pub const fn infer() -> Self {
        if cfg!(debug_assertions) {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

/// `<home>/logs/patchdeck_<YYYYmmdd_HHMMSS>.log` for a session starting at `now`.
#[must_use]
pub fn session_log_path<Tz>(home: &Path, now: &DateTime<Tz>) -> PathBuf
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    home.join(LOG_DIR_NAME)
        .join(format!("patchdeck_{}.log", now.format("%Y%m%d_%H%M%S")))
}

/// Configure and install the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if the session log file cannot be created or the
/// subscriber cannot be installed (for example, because another subscriber
/// has already been set globally).
pub fn init_logging(config: &LoggingConfig<'_>) -> TelemetryResult<()> {
    let file = config.log_file.map(open_log_file).transpose()?;
    let console_filter = || filter_fn(|metadata| metadata.target() != SESSION_TARGET);

    match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(build_env_filter(config.level))
            .with(
                fmt::layer()
                    .json()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_writer(io::stderr)
                    .with_filter(console_filter()),
            )
            .with(file_layer(file))
            .try_init()
            .map_err(|source| TelemetryError::SubscriberInstall { source }),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(build_env_filter(config.level))
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_writer(io::stderr)
                    .with_filter(console_filter()),
            )
            .with(file_layer(file))
            .try_init()
            .map_err(|source| TelemetryError::SubscriberInstall { source }),
    }
}

fn open_log_file(path: &Path) -> TelemetryResult<File> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|source| TelemetryError::log_file("log.create_dir", parent, source))?;
    }
    File::create(path).map_err(|source| TelemetryError::log_file("log.create", path, source))
}

fn file_layer<S>(
    file: Option<File>,
) -> Option<fmt::Layer<S, fmt::format::DefaultFields, fmt::format::Format, Mutex<File>>>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    file.map(|file| {
        fmt::layer()
            .with_ansi(false)
            .with_target(false)
            .with_writer(Mutex::new(file))
    })
}

fn build_env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn session_log_path_uses_timestamp() {
        let now = Utc
            .with_ymd_and_hms(2024, 3, 5, 14, 7, 9)
            .single()
            .expect("valid timestamp");
        assert_eq!(
            session_log_path(Path::new("/home/p"), &now),
            PathBuf::from("/home/p/logs/patchdeck_20240305_140709.log")
        );
    }

    #[test]
    fn default_config_has_no_file() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, DEFAULT_LOG_LEVEL);
        assert!(config.log_file.is_none());
        assert_eq!(config.format, LogFormat::infer());
    }

    #[test]
    fn open_log_file_creates_log_directory() -> anyhow::Result<()> {
        let home = tempfile::tempdir()?;
        let path = home.path().join(LOG_DIR_NAME).join("session.log");
        open_log_file(&path)?;
        assert!(path.is_file());
        Ok(())
    }
}
