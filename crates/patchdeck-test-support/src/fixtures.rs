//! Test fixtures: throwaway patch workspaces and scripted stand-ins for the tool runtime.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use patchdeck_core::PatchJobRequest;
use tempfile::TempDir;

/// Bytes written into the fake input package.
pub const SAMPLE_PACKAGE_BYTES: &[u8] = b"PK\x03\x04 sample package";

/// Temp directory laid out like a real patch session.
#[derive(Debug)]
pub struct PatchWorkspace {
    root: TempDir,
    /// Fake patch tool archive.
    pub tool: PathBuf,
    /// Fake patch bundle.
    pub patches: PathBuf,
    /// Fake input package.
    pub input: PathBuf,
    /// Existing output directory.
    pub output_dir: PathBuf,
}

impl PatchWorkspace {
    /// Create the workspace with every file present.
    ///
    /// # Errors
    ///
    /// Returns an error if the temp directory or any fixture file cannot be created.
    pub fn new() -> Result<Self> {
        let root = tempfile::Builder::new().prefix("patchdeck-").tempdir()?;
        let tool = root.path().join("cli.jar");
        let patches = root.path().join("patches.rvp");
        let input = root.path().join("app.apk");
        let output_dir = root.path().join("out");
        fs::write(&tool, b"jar")?;
        fs::write(&patches, b"rvp")?;
        fs::write(&input, SAMPLE_PACKAGE_BYTES)?;
        fs::create_dir(&output_dir)?;
        Ok(Self {
            root,
            tool,
            patches,
            input,
            output_dir,
        })
    }

    /// Workspace root.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Request targeting `out/app-patched.apk`.
    #[must_use]
    pub fn request(&self) -> PatchJobRequest {
        PatchJobRequest {
            tool_path: self.tool.clone(),
            patches_path: self.patches.clone(),
            input_path: self.input.clone(),
            output_path: self.output_dir.join("app-patched.apk"),
        }
    }
}

/// Behaviour of a scripted runtime written by [`write_stub_runtime`].
#[derive(Debug, Clone)]
pub struct StubRuntime {
    /// Version reported on stderr for `-version`; `None` prints nothing.
    pub version: Option<String>,
    /// Seconds to sleep before answering `-version`.
    pub version_delay_secs: u32,
    /// Lines printed to stdout when launched as the patch tool.
    pub stdout_lines: Vec<String>,
    /// Lines printed to stderr after the stdout lines.
    pub stderr_lines: Vec<String>,
    /// Exit status of the patch invocation.
    pub exit_code: i32,
}

impl Default for StubRuntime {
    fn default() -> Self {
        Self {
            version: Some("17.0.2".to_string()),
            version_delay_secs: 0,
            stdout_lines: Vec::new(),
            stderr_lines: Vec::new(),
            exit_code: 0,
        }
    }
}

impl StubRuntime {
    /// Stub that prints `lines` to stdout and exits with `exit_code`.
    #[must_use]
    pub fn printing(lines: &[&str], exit_code: i32) -> Self {
        Self {
            stdout_lines: lines.iter().map(ToString::to_string).collect(),
            exit_code,
            ..Self::default()
        }
    }

    fn script(&self) -> String {
        let mut script = String::from("#!/bin/sh\nif [ \"$1\" = \"-version\" ]; then\n");
        if self.version_delay_secs > 0 {
            let _ = writeln!(script, "  exec sleep {}", self.version_delay_secs);
        }
        if let Some(version) = &self.version {
            let banner = format!("openjdk version \"{version}\" 2022-01-18");
            let _ = writeln!(script, "  printf '%s\\n' {} 1>&2", shell_quote(&banner));
        }
        script.push_str("  exit 0\nfi\n");
        for line in &self.stdout_lines {
            let _ = writeln!(script, "printf '%s\\n' {}", shell_quote(line));
        }
        for line in &self.stderr_lines {
            let _ = writeln!(script, "printf '%s\\n' {} 1>&2", shell_quote(line));
        }
        let _ = writeln!(script, "exit {}", self.exit_code);
        script
    }
}

fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Write an executable shell script standing in for the runtime and return its path.
///
/// Tests that execute the script must not run concurrently with other
/// process-spawning tests in the same binary.
///
/// # Errors
///
/// Returns an error if the script cannot be written or made executable.
pub fn write_stub_runtime(dir: &Path, stub: &StubRuntime) -> Result<PathBuf> {
    let path = dir.join("stub-java");
    fs::write(&path, stub.script())?;
    make_executable(&path)?;
    Ok(path)
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = fs::metadata(path)?.permissions();
    permissions.set_mode(0o755);
    fs::set_permissions(path, permissions)?;
    Ok(())
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}
