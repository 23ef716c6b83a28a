//! Tool runtime discovery and version parsing.
//!
//! # Design
//! - The probe runs `<runtime> -version` once and reads the first line the
//!   runtime prints; Java reports on stderr, so stdout is only a fallback.
//! - A runtime that hangs is killed after the probe timeout.
//! - Version parsing never fails: unrecognised strings report major `0`.

use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use once_cell::sync::Lazy;
use patchdeck_core::{RuntimeInfo, RuntimeProbe};
use regex::Regex;
use tracing::{debug, info, warn};

use crate::error::{RunnerError, RunnerResult};

/// Oldest major version the patch tool runs on.
pub const MINIMUM_MAJOR_VERSION: u32 = 8;
/// Major versions below this work but are reported as outdated.
pub const RECOMMENDED_MAJOR_VERSION: u32 = 11;

const DEFAULT_PROGRAM: &str = "java";
const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);
const POLL_INTERVAL: Duration = Duration::from_millis(25);
const VERSION_PATTERN: &str = r#"version\s+"([^"]+)""#;

static VERSION_REGEX: Lazy<Result<Regex, regex::Error>> = Lazy::new(|| Regex::new(VERSION_PATTERN));

/// Executable used to run the patch tool archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolRuntime {
    program: PathBuf,
}

impl ToolRuntime {
    /// Runtime launched through `program` (a bare name is resolved via `PATH`).
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Program path or name.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Default for ToolRuntime {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

/// How a detected runtime relates to the supported range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeCompatibility {
    /// At or above the recommended major version.
    Supported,
    /// Usable, but older than recommended.
    Outdated,
    /// Below the minimum major version.
    Unsupported,
}

/// Classify a detected runtime.
#[must_use]
pub const fn check_compatibility(info: &RuntimeInfo) -> RuntimeCompatibility {
    if info.major < MINIMUM_MAJOR_VERSION {
        RuntimeCompatibility::Unsupported
    } else if info.major < RECOMMENDED_MAJOR_VERSION {
        RuntimeCompatibility::Outdated
    } else {
        RuntimeCompatibility::Supported
    }
}

/// Major version of a Java version string.
///
/// Legacy `1.x` strings report `x`; newer strings report their leading
/// component. Anything unparseable reports `0`.
#[must_use]
pub fn parse_major_version(version: &str) -> u32 {
    let cleaned = version.trim().trim_matches('"');
    let component = cleaned
        .strip_prefix("1.")
        .map_or_else(|| cleaned.split('.').next(), |rest| rest.split('.').next());
    component.map_or(0, leading_number)
}

fn leading_number(component: &str) -> u32 {
    let end = component
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(component.len());
    component[..end].parse().unwrap_or(0)
}

fn extract_version(line: &str) -> RunnerResult<Option<String>> {
    let regex = VERSION_REGEX
        .as_ref()
        .map_err(|source| RunnerError::Pattern {
            pattern: VERSION_PATTERN,
            source: source.clone(),
        })?;
    Ok(regex
        .captures(line)
        .and_then(|captures| captures.get(1))
        .map(|version| version.as_str().to_string()))
}

/// Detects the runtime by asking it for its version.
#[derive(Debug, Clone)]
pub struct JavaRuntimeProbe {
    runtime: ToolRuntime,
    timeout: Duration,
}

impl JavaRuntimeProbe {
    /// Probe for `runtime` with the default five second timeout.
    #[must_use]
    pub const fn new(runtime: ToolRuntime) -> Self {
        Self {
            runtime,
            timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    /// Override the timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run the version query.
    ///
    /// # Errors
    ///
    /// Returns an error when the runtime is missing, hangs past the timeout,
    /// or answers without a recognisable version.
    pub fn probe(&self) -> RunnerResult<RuntimeInfo> {
        let program = self.runtime.program();
        let mut child = Command::new(program)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| {
                if source.kind() == IoErrorKind::NotFound {
                    RunnerError::RuntimeMissing {
                        program: program.to_path_buf(),
                    }
                } else {
                    RunnerError::io("runtime.spawn", source)
                }
            })?;

        let deadline = Instant::now() + self.timeout;
        loop {
            let exited = child
                .try_wait()
                .map_err(|source| RunnerError::io("runtime.wait", source))?;
            if exited.is_some() {
                break;
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                warn!(program = %program.display(), "runtime version check timed out");
                return Err(RunnerError::ProbeTimeout);
            }
            thread::sleep(POLL_INTERVAL);
        }

        let output = child
            .wait_with_output()
            .map_err(|source| RunnerError::io("runtime.read", source))?;
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let first_line = stderr
            .lines()
            .find(|line| !line.trim().is_empty())
            .or_else(|| stdout.lines().next())
            .unwrap_or_default();

        let version =
            extract_version(first_line)?.ok_or_else(|| RunnerError::UnrecognizedVersion {
                output: first_line.to_string(),
            })?;
        let major = parse_major_version(&version);
        info!(version = %version, major, "detected tool runtime");
        Ok(RuntimeInfo { version, major })
    }
}

impl RuntimeProbe for JavaRuntimeProbe {
    fn detect(&self) -> Result<RuntimeInfo, String> {
        self.probe().map_err(|err| {
            debug!(error = ?err, "runtime detection failed");
            match err {
                RunnerError::Io { source, .. } => format!("Error checking Java: {source}"),
                other => other.to_string(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_major_version_handles_legacy_and_modern_strings() {
        assert_eq!(parse_major_version("1.8.0_291"), 8);
        assert_eq!(parse_major_version("17.0.2"), 17);
        assert_eq!(parse_major_version("\"11.0.20\" "), 11);
        assert_eq!(parse_major_version("21"), 21);
        assert_eq!(parse_major_version("22-ea"), 22);
        assert_eq!(parse_major_version("garbage"), 0);
        assert_eq!(parse_major_version(""), 0);
    }

    #[test]
    fn extract_version_reads_quoted_value() -> RunnerResult<()> {
        assert_eq!(
            extract_version(r#"openjdk version "17.0.2" 2022-01-18"#)?.as_deref(),
            Some("17.0.2")
        );
        assert_eq!(
            extract_version(r#"java version  "1.8.0_291""#)?.as_deref(),
            Some("1.8.0_291")
        );
        assert!(extract_version("command not found")?.is_none());
        Ok(())
    }

    #[test]
    fn compatibility_tracks_thresholds() {
        let info = |major| RuntimeInfo {
            version: String::new(),
            major,
        };
        assert_eq!(check_compatibility(&info(7)), RuntimeCompatibility::Unsupported);
        assert_eq!(check_compatibility(&info(0)), RuntimeCompatibility::Unsupported);
        assert_eq!(check_compatibility(&info(8)), RuntimeCompatibility::Outdated);
        assert_eq!(check_compatibility(&info(10)), RuntimeCompatibility::Outdated);
        assert_eq!(check_compatibility(&info(11)), RuntimeCompatibility::Supported);
        assert_eq!(check_compatibility(&info(21)), RuntimeCompatibility::Supported);
    }

    #[test]
    fn missing_runtime_reports_not_found() {
        let probe = JavaRuntimeProbe::new(ToolRuntime::new(
            "/definitely/not/a/runtime/patchdeck-java",
        ));
        assert_eq!(probe.detect(), Err("Java not found in PATH".to_string()));
    }

    #[test]
    fn default_runtime_is_java() {
        assert_eq!(ToolRuntime::default().program(), Path::new("java"));
    }
}
