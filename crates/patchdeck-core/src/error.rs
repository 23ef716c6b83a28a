//! Failure taxonomy for patch jobs and the static remedy table.
//!
//! # Design
//! - Domain failures are values, not Rust errors: validation and job
//!   completion both report an `ErrorKind` plus a human-readable message.
//! - Every kind maps to exactly one suggested remedy shown to the user.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// Category of a failed validation check or patch job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The tool runtime is missing, too old, or the tool could not be launched.
    RuntimeNotFound,
    /// A required input file or directory does not exist.
    FileNotFound,
    /// The input package exists but cannot be a valid package.
    CorruptedInput,
    /// The patch tool exited with a non-zero status.
    PatchMismatch,
    /// Free space on the output volume is below the required headroom.
    InsufficientDiskSpace,
    /// Anything else raised while running the job.
    Unknown,
}

impl ErrorKind {
    /// Machine-readable identifier used in logs and serialised payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RuntimeNotFound => "runtime_not_found",
            Self::FileNotFound => "file_not_found",
            Self::CorruptedInput => "corrupted_input",
            Self::PatchMismatch => "patch_mismatch",
            Self::InsufficientDiskSpace => "insufficient_disk_space",
            Self::Unknown => "unknown",
        }
    }

    /// Suggested recovery step presented alongside the failure message.
    #[must_use]
    pub const fn remedy(self) -> &'static str {
        match self {
            Self::RuntimeNotFound => "Install Java 8+ and ensure it's in your PATH",
            Self::FileNotFound => "Check that all required files exist and are accessible",
            Self::CorruptedInput => "Use a different APK file or re-download the original",
            Self::PatchMismatch => "Ensure APK version matches the patches version",
            Self::InsufficientDiskSpace => "Free up disk space or use a smaller APK",
            Self::Unknown => "Check the log for detailed error information",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Render a failure as the two-line message shown to the user.
#[must_use]
pub fn describe_failure(kind: ErrorKind, details: &str) -> String {
    format!("Error: {details}\nSolution: {}", kind.remedy())
}

#[cfg(test)]
mod tests {
    use super::*;

    const KINDS: [ErrorKind; 6] = [
        ErrorKind::RuntimeNotFound,
        ErrorKind::FileNotFound,
        ErrorKind::CorruptedInput,
        ErrorKind::PatchMismatch,
        ErrorKind::InsufficientDiskSpace,
        ErrorKind::Unknown,
    ];

    #[test]
    fn display_matches_serde_identifier() -> anyhow::Result<()> {
        for kind in KINDS {
            assert_eq!(serde_json::to_string(&kind)?, format!("\"{kind}\""));
        }
        Ok(())
    }

    #[test]
    fn serde_uses_snake_case_identifiers() -> anyhow::Result<()> {
        let json = serde_json::to_string(&ErrorKind::InsufficientDiskSpace)?;
        assert_eq!(json, "\"insufficient_disk_space\"");
        let parsed: ErrorKind = serde_json::from_str("\"patch_mismatch\"")?;
        assert_eq!(parsed, ErrorKind::PatchMismatch);
        Ok(())
    }

    #[test]
    fn describe_failure_appends_remedy() {
        let message = describe_failure(ErrorKind::PatchMismatch, "exit code 1");
        assert_eq!(
            message,
            "Error: exit code 1\nSolution: Ensure APK version matches the patches version"
        );
    }

    #[test]
    fn every_kind_has_a_distinct_remedy() {
        let mut remedies: Vec<&str> = KINDS.iter().map(|kind| kind.remedy()).collect();
        remedies.sort_unstable();
        remedies.dedup();
        assert_eq!(remedies.len(), KINDS.len());
    }
}
