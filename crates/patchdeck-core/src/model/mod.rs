//! Patch job data carriers.
//!
//! # Design
//! - Pure data: no IO beyond the path helpers, so every crate can share it.
//! - Requests are built once per job and discarded with their outcome.

use std::ffi::OsStr;
use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;

/// Extension appended when the input package has none.
const DEFAULT_PACKAGE_EXTENSION: &str = "apk";

/// Everything needed to launch one patch job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchJobRequest {
    /// Patch tool archive passed to the runtime with `-jar`.
    pub tool_path: PathBuf,
    /// Patch bundle passed with `-p`.
    pub patches_path: PathBuf,
    /// Package to patch, passed as the trailing positional argument.
    pub input_path: PathBuf,
    /// Destination file passed with `-o`.
    pub output_path: PathBuf,
}

impl PatchJobRequest {
    /// Directory that will receive the patched package.
    #[must_use]
    pub fn output_dir(&self) -> Option<&Path> {
        self.output_path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
    }
}

/// Terminal state of a patch job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// The tool exited with status zero.
    Success {
        /// Wall-clock time since launch.
        elapsed: Duration,
    },
    /// The job could not be launched or the tool reported failure.
    Failure {
        /// Failure category.
        kind: ErrorKind,
        /// Human-readable detail.
        message: String,
    },
}

impl JobOutcome {
    /// Build a failure outcome.
    #[must_use]
    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::Failure {
            kind,
            message: message.into(),
        }
    }

    /// Whether the job succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Failure category, if the job failed.
    #[must_use]
    pub const fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { kind, .. } => Some(*kind),
        }
    }
}

/// A single pre-flight check failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Failure category.
    pub kind: ErrorKind,
    /// Human-readable detail.
    pub message: String,
}

impl ValidationIssue {
    /// Build an issue from its parts.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl Display for ValidationIssue {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}: {}", self.kind, self.message)
    }
}

/// Detected tool runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeInfo {
    /// Version string as reported by the runtime (e.g. `17.0.2`).
    pub version: String,
    /// Major version derived from `version`; `0` when unparseable.
    pub major: u32,
}

impl RuntimeInfo {
    /// One-line description used in status lines and job banners.
    #[must_use]
    pub fn summary(&self) -> String {
        format!("{} (Java {})", self.version, self.major)
    }
}

/// Which request slot a file belongs to, judged by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRole {
    /// `.jar`: the patch tool.
    Tool,
    /// `.rvp`: the patch bundle.
    Patches,
    /// `.apk`: the package to patch.
    InputPackage,
}

impl FileRole {
    /// Classify a path by its (case-insensitive) extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension().and_then(OsStr::to_str)?;
        match extension.to_ascii_lowercase().as_str() {
            "jar" => Some(Self::Tool),
            "rvp" => Some(Self::Patches),
            "apk" => Some(Self::InputPackage),
            _ => None,
        }
    }

    /// Label used in log lines.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Tool => "patch tool",
            Self::Patches => "patches",
            Self::InputPackage => "APK",
        }
    }
}

/// `<stem>-patched.<ext>` for an input package; `None` when the path has no file name.
#[must_use]
pub fn patched_file_name(input: &Path) -> Option<String> {
    let stem = input.file_stem()?.to_string_lossy();
    let extension = input
        .extension()
        .map_or_else(|| DEFAULT_PACKAGE_EXTENSION.into(), OsStr::to_string_lossy);
    Some(format!("{stem}-patched.{extension}"))
}

/// Default output file for `input` inside `output_dir`.
#[must_use]
pub fn default_output_file(input: &Path, output_dir: &Path) -> Option<PathBuf> {
    patched_file_name(input).map(|name| output_dir.join(name))
}

/// Render a byte count with a binary unit suffix (`B`, `KiB`, `MiB`, `GiB`).
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;
    const GIB: f64 = MIB * 1024.0;
    let value = bytes_to_f64(bytes);
    if value >= GIB {
        format!("{:.2} GiB", value / GIB)
    } else if value >= MIB {
        format!("{:.2} MiB", value / MIB)
    } else if value >= KIB {
        format!("{:.2} KiB", value / KIB)
    } else {
        format!("{bytes} B")
    }
}

#[allow(clippy::cast_precision_loss)]
const fn bytes_to_f64(value: u64) -> f64 {
    value as f64
}
