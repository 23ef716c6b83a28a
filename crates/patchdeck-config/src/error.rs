//! Error types for preference operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for preference operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Field contained an invalid value.
    #[error("invalid preference value")]
    InvalidField {
        /// Field that failed validation.
        field: String,
        /// Machine-readable reason for the failure.
        reason: &'static str,
        /// Offending value when available.
        value: Option<String>,
    },
    /// Field does not exist in the preferences record.
    #[error("unknown preference field")]
    UnknownField {
        /// Name of the unexpected field.
        field: String,
    },
    /// A built-in validation pattern failed to compile.
    #[error("failed to compile validation pattern")]
    Pattern {
        /// Pattern source.
        pattern: &'static str,
        /// Source regex error.
        source: regex::Error,
    },
    /// Serialising or parsing the preferences document failed.
    #[error("preferences json failure")]
    Json {
        /// Operation identifier.
        operation: &'static str,
        /// File involved in the failure.
        path: PathBuf,
        /// Source serde error.
        source: serde_json::Error,
    },
    /// File system operation failed.
    #[error("preferences filesystem operation failed")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// File or directory involved in the failure.
        path: PathBuf,
        /// Source IO error.
        source: io::Error,
    },
}

impl ConfigError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(
        operation: &'static str,
        path: impl Into<PathBuf>,
        source: serde_json::Error,
    ) -> Self {
        Self::Json {
            operation,
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias for preference results.
pub type ConfigResult<T> = Result<T, ConfigError>;
