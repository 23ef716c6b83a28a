//! Error types for runtime detection and process launch.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures raised before or while the patch tool runs.
///
/// These never leave the crate as-is: the runner folds them into a
/// `JobOutcome::Failure` and the probe into its textual reason.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The runtime executable could not be found.
    #[error("Java not found in PATH")]
    RuntimeMissing {
        /// Program that was looked up.
        program: PathBuf,
    },
    /// The runtime did not answer the version query in time.
    #[error("Java check timeout")]
    ProbeTimeout,
    /// The runtime answered but no version could be extracted.
    #[error("Version format not recognized")]
    UnrecognizedVersion {
        /// First line of the runtime's answer.
        output: String,
    },
    /// The patch tool archive vanished between validation and launch.
    #[error("patch tool not found")]
    ToolMissing {
        /// Path that was checked.
        path: PathBuf,
    },
    /// A built-in pattern failed to compile.
    #[error("failed to compile version pattern")]
    Pattern {
        /// Pattern source.
        pattern: &'static str,
        /// Source regex error.
        source: regex::Error,
    },
    /// Spawning, reading from, or waiting on the child failed.
    #[error("process operation failed")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Source IO error.
        source: io::Error,
    },
}

impl RunnerError {
    pub(crate) const fn io(operation: &'static str, source: io::Error) -> Self {
        Self::Io { operation, source }
    }
}

/// Convenience alias for runner results.
pub type RunnerResult<T> = Result<T, RunnerError>;
