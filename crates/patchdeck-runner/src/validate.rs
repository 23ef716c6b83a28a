//! Ordered pre-flight checks for a patch request.
//!
//! # Design
//! - Every check runs; the caller receives all issues in a fixed order
//!   (runtime, tool, patches, input, output directory, disk space).
//! - Only filesystem metadata is read. Disk probing is optional and its
//!   failures are logged rather than reported.

use std::fs;
use std::path::Path;

use patchdeck_core::{DiskProbe, ErrorKind, PatchJobRequest, RuntimeInfo, ValidationIssue, format_bytes};
use tracing::{debug, warn};

use crate::runtime::{
    MINIMUM_MAJOR_VERSION, RECOMMENDED_MAJOR_VERSION, RuntimeCompatibility, check_compatibility,
};

/// Free space required on the output volume, as a multiple of the input size.
pub const DISK_SPACE_MULTIPLIER: u64 = 3;

/// Check `request` against the detected runtime and, optionally, free disk space.
///
/// An empty list means the job may start.
#[must_use]
pub fn validate(
    request: &PatchJobRequest,
    runtime: &Result<RuntimeInfo, String>,
    disk: Option<&dyn DiskProbe>,
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    match runtime {
        Err(reason) => issues.push(ValidationIssue::new(ErrorKind::RuntimeNotFound, reason.clone())),
        Ok(info) => match check_compatibility(info) {
            RuntimeCompatibility::Unsupported => issues.push(ValidationIssue::new(
                ErrorKind::RuntimeNotFound,
                format!(
                    "Unsupported: {} (need Java {MINIMUM_MAJOR_VERSION}+)",
                    info.version
                ),
            )),
            RuntimeCompatibility::Outdated => warn!(
                version = %info.version,
                major = info.major,
                "Java {RECOMMENDED_MAJOR_VERSION}+ recommended"
            ),
            RuntimeCompatibility::Supported => {}
        },
    }

    if !is_present(&request.tool_path) {
        issues.push(missing("Patch tool JAR file not found", &request.tool_path));
    }
    if !is_present(&request.patches_path) {
        issues.push(missing("Patches file not found", &request.patches_path));
    }

    let input_size = input_size(&request.input_path);
    match input_size {
        None => issues.push(missing("APK file not found", &request.input_path)),
        Some(0) => issues.push(ValidationIssue::new(
            ErrorKind::CorruptedInput,
            format!("APK file is empty: {}", request.input_path.display()),
        )),
        Some(_) => {}
    }

    let output_dir = request.output_dir().unwrap_or_else(|| Path::new("."));
    if request.output_path.as_os_str().is_empty() || !output_dir.is_dir() {
        issues.push(missing("Output directory not found", output_dir));
    }

    if let (Some(probe), Some(size)) = (disk, input_size.filter(|size| *size > 0)) {
        match probe.free_bytes(output_dir) {
            Ok(free) => {
                let needed = size.saturating_mul(DISK_SPACE_MULTIPLIER);
                debug!(free, needed, "disk space check");
                if free < needed {
                    issues.push(ValidationIssue::new(
                        ErrorKind::InsufficientDiskSpace,
                        format!(
                            "Need {}, only {} free",
                            format_bytes(needed),
                            format_bytes(free)
                        ),
                    ));
                }
            }
            Err(err) => warn!(
                path = %output_dir.display(),
                error = %err,
                "disk space check skipped"
            ),
        }
    }

    issues
}

fn is_present(path: &Path) -> bool {
    !path.as_os_str().is_empty() && path.is_file()
}

fn input_size(path: &Path) -> Option<u64> {
    if path.as_os_str().is_empty() {
        return None;
    }
    fs::metadata(path)
        .ok()
        .filter(fs::Metadata::is_file)
        .map(|metadata| metadata.len())
}

fn missing(label: &str, path: &Path) -> ValidationIssue {
    let message = if path.as_os_str().is_empty() {
        label.to_string()
    } else {
        format!("{label}: {}", path.display())
    };
    ValidationIssue::new(ErrorKind::FileNotFound, message)
}
