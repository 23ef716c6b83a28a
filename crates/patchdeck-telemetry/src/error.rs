//! Error types for telemetry operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by telemetry helpers.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Installing the tracing subscriber failed.
    #[error("failed to install tracing subscriber")]
    SubscriberInstall {
        /// Underlying tracing subscriber error.
        source: tracing_subscriber::util::TryInitError,
    },
    /// Creating, writing, or exporting a log file failed.
    #[error("log file operation failed")]
    LogFile {
        /// Operation identifier.
        operation: &'static str,
        /// File or directory involved in the failure.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// Starting the background monitor thread failed.
    #[error("failed to start system monitor")]
    MonitorSpawn {
        /// Underlying IO error.
        source: io::Error,
    },
}

impl TelemetryError {
    pub(crate) fn log_file(
        operation: &'static str,
        path: impl Into<PathBuf>,
        source: io::Error,
    ) -> Self {
        Self::LogFile {
            operation,
            path: path.into(),
            source,
        }
    }
}

/// Result alias for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
