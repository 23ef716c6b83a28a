//! Application state owned by the front-end loop.
//!
//! # Design
//! - Only the loop mutates state. Worker results arrive as `AppEvent`s and
//!   are folded in by [`AppState::apply`].
//! - Every user-visible message goes through the session log, which the
//!   shell echoes as it grows.
//! - Path changes persist preferences immediately when saving is enabled.

use std::path::{Path, PathBuf};

use patchdeck_config::{PREFERENCES_VERSION, Preferences, PreferencesStore};
use patchdeck_core::{
    FileRole, JobOutcome, PatchJobRequest, RuntimeInfo, describe_failure, format_bytes,
    patched_file_name,
};
use patchdeck_runner::{RECOMMENDED_MAJOR_VERSION, RuntimeCompatibility, check_compatibility};
use patchdeck_telemetry::{DiskUsage, LogView};
use tracing::{debug, warn};

use crate::events::AppEvent;

/// Free space below which the startup check warns.
pub(crate) const LOW_DISK_THRESHOLD: u64 = 2 * 1024 * 1024 * 1024;

/// File name used when the output directory is known but no package is selected.
const FALLBACK_OUTPUT_NAME: &str = "patched.apk";

/// Job status shown in the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Status {
    Ready,
    Busy,
    Success,
    Failed,
}

impl Status {
    pub(crate) const fn label(self) -> &'static str {
        match self {
            Self::Ready => "Ready",
            Self::Busy => "Patching APK...",
            Self::Success => "Success!",
            Self::Failed => "Failed!",
        }
    }
}

#[derive(Debug)]
pub(crate) struct AppState {
    pub(crate) tool_path: Option<PathBuf>,
    pub(crate) patches_path: Option<PathBuf>,
    pub(crate) input_path: Option<PathBuf>,
    pub(crate) output_dir: Option<PathBuf>,
    pub(crate) output_filename: Option<String>,
    pub(crate) runtime: Option<RuntimeInfo>,
    pub(crate) runtime_status: String,
    pub(crate) system_status: String,
    pub(crate) status: Status,
    pub(crate) log: LogView,
    pub(crate) prefs: Preferences,
    store: PreferencesStore,
}

impl AppState {
    /// State restored from saved preferences: tool, patches, and output directory.
    pub(crate) fn new(prefs: Preferences, store: PreferencesStore) -> Self {
        Self {
            tool_path: non_empty(&prefs.last_cli_path),
            patches_path: non_empty(&prefs.last_patches_path),
            input_path: None,
            output_dir: non_empty(&prefs.last_output_dir),
            output_filename: None,
            runtime: None,
            runtime_status: "Checking...".to_string(),
            system_status: "Checking system requirements...".to_string(),
            status: Status::Ready,
            log: LogView::new(),
            prefs,
            store,
        }
    }

    pub(crate) fn log(&mut self, text: &str) {
        self.log.push(text);
    }

    pub(crate) fn set_tool(&mut self, path: PathBuf) {
        self.tool_path = Some(path);
        self.persist();
    }

    pub(crate) fn set_patches(&mut self, path: PathBuf) {
        self.patches_path = Some(path);
        self.persist();
    }

    /// Select the package; output goes next to it as `<stem>-patched<ext>`.
    pub(crate) fn set_input(&mut self, path: PathBuf) {
        self.output_dir = Some(
            path.parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf),
        );
        self.output_filename = patched_file_name(&path);
        self.input_path = Some(path);
        self.persist();
    }

    pub(crate) fn set_output_dir(&mut self, path: PathBuf) {
        self.output_dir = Some(path);
        self.persist();
    }

    /// Route a file to its slot by extension. Returns whether it was accepted.
    pub(crate) fn drop_file(&mut self, path: PathBuf) -> bool {
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned());
        let Some(role) = FileRole::from_path(&path) else {
            self.log(&format!(
                "Unsupported file type: {name} (expected .jar, .rvp or .apk)"
            ));
            return false;
        };
        debug!(role = role.label(), path = %path.display(), "file dropped");
        match role {
            FileRole::Tool => self.set_tool(path),
            FileRole::Patches => self.set_patches(path),
            FileRole::InputPackage => self.set_input(path),
        }
        self.log(&format!("Dropped file: {name}"));
        true
    }

    pub(crate) fn clear_all(&mut self) {
        self.tool_path = None;
        self.patches_path = None;
        self.input_path = None;
        self.output_dir = None;
        self.output_filename = None;
        self.status = Status::Ready;
        self.log.clear();
        self.persist();
        self.log("Interface reset - all paths cleared");
    }

    pub(crate) fn update_preferences(&mut self, save_logs: bool, save_config: bool) {
        self.prefs.save_logs_enabled = save_logs;
        self.prefs.save_config_enabled = save_config;
        self.persist();
        self.log(&format!(
            "Settings updated - Logs: {}, Config: {}",
            on_off(save_logs),
            on_off(save_config)
        ));
    }

    /// Output file the next job would write.
    pub(crate) fn output_path(&self) -> Option<PathBuf> {
        let dir = self.output_dir.as_ref()?;
        let name = self
            .output_filename
            .clone()
            .or_else(|| self.input_path.as_deref().and_then(patched_file_name))
            .unwrap_or_else(|| FALLBACK_OUTPUT_NAME.to_string());
        Some(dir.join(name))
    }

    /// Job request for the current selection; unset paths are empty.
    pub(crate) fn request(&self) -> PatchJobRequest {
        PatchJobRequest {
            tool_path: self.tool_path.clone().unwrap_or_default(),
            patches_path: self.patches_path.clone().unwrap_or_default(),
            input_path: self.input_path.clone().unwrap_or_default(),
            output_path: self.output_path().unwrap_or_default(),
        }
    }

    /// Mark a job as started and remember the paths it uses.
    pub(crate) fn begin_job(&mut self) {
        self.status = Status::Busy;
        self.persist();
    }

    pub(crate) fn apply(&mut self, event: AppEvent) {
        match event {
            AppEvent::Log(line) => self.log(&line),
            AppEvent::JobFinished(outcome) => self.finish_job(&outcome),
            AppEvent::RuntimeDetected(result) => self.runtime_detected(result),
            AppEvent::DiskChecked(result) => self.disk_checked(result),
        }
    }

    fn finish_job(&mut self, outcome: &JobOutcome) {
        match outcome {
            JobOutcome::Success { .. } => {
                self.status = Status::Success;
                self.log("Patching completed successfully!");
            }
            JobOutcome::Failure { kind, message } => {
                self.status = Status::Failed;
                self.log(&describe_failure(*kind, message));
            }
        }
    }

    fn runtime_detected(&mut self, result: Result<RuntimeInfo, String>) {
        match result {
            Ok(info) => {
                self.runtime_status = info.summary();
                match check_compatibility(&info) {
                    RuntimeCompatibility::Unsupported => {
                        self.system_status = "Java not found or incompatible".to_string();
                        self.log(&format!(
                            "ERROR: Java requirement not met: Unsupported: {} (need Java 8+)",
                            info.version
                        ));
                    }
                    RuntimeCompatibility::Outdated => {
                        self.log(&format!(
                            "WARNING: Java {} detected. The patch tool may require Java {RECOMMENDED_MAJOR_VERSION}+",
                            info.major
                        ));
                    }
                    RuntimeCompatibility::Supported => {}
                }
                self.log(&format!("System check: Java {}", info.summary()));
                self.runtime = Some(info);
            }
            Err(reason) => {
                self.runtime = None;
                self.system_status = "Java not found or incompatible".to_string();
                self.log(&format!("ERROR: Java requirement not met: {reason}"));
                self.runtime_status = reason;
            }
        }
    }

    fn disk_checked(&mut self, result: Result<DiskUsage, String>) {
        let runtime_ok = self
            .runtime
            .as_ref()
            .is_some_and(|info| check_compatibility(info) != RuntimeCompatibility::Unsupported);
        match result {
            Ok(usage) => {
                if usage.free < LOW_DISK_THRESHOLD {
                    self.system_status = format!("Low disk space: {} free", format_bytes(usage.free));
                    self.log(&format!(
                        "WARNING: Low disk space: {} of {} free",
                        format_bytes(usage.free),
                        format_bytes(usage.total)
                    ));
                } else if runtime_ok {
                    "System ready".clone_into(&mut self.system_status);
                }
                self.log(&format!(
                    "Disk: {} free of {}",
                    format_bytes(usage.free),
                    format_bytes(usage.total)
                ));
            }
            Err(reason) => {
                if runtime_ok {
                    "System ready (limited info)".clone_into(&mut self.system_status);
                }
                self.log(&format!("Warning: Could not check disk usage: {reason}"));
            }
        }
    }

    /// Copy the selection into the preferences record and save it when enabled.
    pub(crate) fn persist(&mut self) {
        self.prefs.last_cli_path = path_text(self.tool_path.as_deref());
        self.prefs.last_patches_path = path_text(self.patches_path.as_deref());
        self.prefs.last_output_dir = path_text(self.output_dir.as_deref());
        PREFERENCES_VERSION.clone_into(&mut self.prefs.version);
        if let Err(err) = self.store.save_if_enabled(&self.prefs) {
            warn!(error = ?err, path = %self.store.path().display(), "failed to save preferences");
        }
    }
}

fn non_empty(value: &str) -> Option<PathBuf> {
    (!value.trim().is_empty()).then(|| PathBuf::from(value))
}

fn path_text(path: Option<&Path>) -> String {
    path.map(|path| path.to_string_lossy().into_owned())
        .unwrap_or_default()
}

const fn on_off(value: bool) -> &'static str {
    if value { "ON" } else { "OFF" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use patchdeck_core::ErrorKind;
    use std::time::Duration;
    use tempfile::TempDir;

    fn state_in(home: &TempDir) -> AppState {
        let store = PreferencesStore::new(home.path());
        let (prefs, _) = store.load();
        AppState::new(prefs, store)
    }

    #[test]
    fn setting_input_derives_output() -> Result<()> {
        let home = tempfile::tempdir()?;
        let mut state = state_in(&home);
        state.set_input(PathBuf::from("/apks/YouTube.apk"));
        assert_eq!(state.output_dir, Some(PathBuf::from("/apks")));
        assert_eq!(state.output_filename.as_deref(), Some("YouTube-patched.apk"));
        assert_eq!(
            state.request().output_path,
            PathBuf::from("/apks/YouTube-patched.apk")
        );
        Ok(())
    }

    #[test]
    fn path_changes_are_persisted_and_restored() -> Result<()> {
        let home = tempfile::tempdir()?;
        let mut state = state_in(&home);
        state.set_tool(PathBuf::from("/tools/cli.jar"));
        state.set_patches(PathBuf::from("/tools/patches.rvp"));
        state.set_output_dir(PathBuf::from("/out"));

        let restored = state_in(&home);
        assert_eq!(restored.tool_path, Some(PathBuf::from("/tools/cli.jar")));
        assert_eq!(restored.patches_path, Some(PathBuf::from("/tools/patches.rvp")));
        assert_eq!(restored.output_dir, Some(PathBuf::from("/out")));
        assert!(restored.input_path.is_none());
        Ok(())
    }

    #[test]
    fn persist_restamps_the_writer_version() -> Result<()> {
        let home = tempfile::tempdir()?;
        std::fs::write(
            home.path().join(patchdeck_config::CONFIG_FILE_NAME),
            r#"{"version": "0.9.0", "last_cli_path": "/old/cli.jar"}"#,
        )?;
        let mut state = state_in(&home);
        assert_eq!(state.prefs.version, "0.9.0");
        state.set_patches(PathBuf::from("/tools/patches.rvp"));

        let restored = state_in(&home);
        assert_eq!(restored.prefs.version, PREFERENCES_VERSION);
        assert_eq!(restored.tool_path, Some(PathBuf::from("/old/cli.jar")));
        Ok(())
    }

    #[test]
    fn disabled_config_saving_skips_persist() -> Result<()> {
        let home = tempfile::tempdir()?;
        let mut state = state_in(&home);
        state.update_preferences(false, false);
        state.set_tool(PathBuf::from("/tools/cli.jar"));
        assert!(!home.path().join(patchdeck_config::CONFIG_FILE_NAME).exists());
        assert_eq!(
            state.log.entries().last().map(String::as_str),
            Some("Settings updated - Logs: OFF, Config: OFF")
        );
        Ok(())
    }

    #[test]
    fn drop_file_routes_by_extension() -> Result<()> {
        let home = tempfile::tempdir()?;
        let mut state = state_in(&home);
        assert!(state.drop_file(PathBuf::from("/dl/cli-5.0.jar")));
        assert!(state.drop_file(PathBuf::from("/dl/patches.RVP")));
        assert!(state.drop_file(PathBuf::from("/dl/app.apk")));
        assert!(!state.drop_file(PathBuf::from("/dl/readme.txt")));

        assert_eq!(state.tool_path, Some(PathBuf::from("/dl/cli-5.0.jar")));
        assert_eq!(state.patches_path, Some(PathBuf::from("/dl/patches.RVP")));
        assert_eq!(state.input_path, Some(PathBuf::from("/dl/app.apk")));
        assert_eq!(
            state.log.entries(),
            [
                "Dropped file: cli-5.0.jar",
                "Dropped file: patches.RVP",
                "Dropped file: app.apk",
                "Unsupported file type: readme.txt (expected .jar, .rvp or .apk)",
            ]
        );
        Ok(())
    }

    #[test]
    fn clear_all_resets_everything() -> Result<()> {
        let home = tempfile::tempdir()?;
        let mut state = state_in(&home);
        state.set_input(PathBuf::from("/apks/app.apk"));
        state.status = Status::Failed;
        state.log("noise");
        state.clear_all();

        assert!(state.input_path.is_none());
        assert!(state.output_dir.is_none());
        assert_eq!(state.status, Status::Ready);
        assert_eq!(state.log.entries(), ["Interface reset - all paths cleared"]);
        assert!(state.request().output_path.as_os_str().is_empty());
        Ok(())
    }

    #[test]
    fn job_events_update_status_and_log() -> Result<()> {
        let home = tempfile::tempdir()?;
        let mut state = state_in(&home);
        state.begin_job();
        assert_eq!(state.status, Status::Busy);

        state.apply(AppEvent::Log("Executing patch".to_string()));
        state.apply(AppEvent::JobFinished(JobOutcome::failure(
            ErrorKind::PatchMismatch,
            "Patching failed with return code 1",
        )));
        assert_eq!(state.status, Status::Failed);
        assert_eq!(
            state.log.entries(),
            [
                "Executing patch",
                "Error: Patching failed with return code 1",
                "Solution: Ensure APK version matches the patches version",
            ]
        );

        state.apply(AppEvent::JobFinished(JobOutcome::Success {
            elapsed: Duration::from_secs(3),
        }));
        assert_eq!(state.status, Status::Success);
        Ok(())
    }

    #[test]
    fn system_check_events_set_status_lines() -> Result<()> {
        let home = tempfile::tempdir()?;
        let mut state = state_in(&home);
        state.apply(AppEvent::RuntimeDetected(Ok(RuntimeInfo {
            version: "17.0.2".to_string(),
            major: 17,
        })));
        state.apply(AppEvent::DiskChecked(Ok(DiskUsage {
            free: 10 * LOW_DISK_THRESHOLD,
            total: 20 * LOW_DISK_THRESHOLD,
        })));
        assert_eq!(state.runtime_status, "17.0.2 (Java 17)");
        assert_eq!(state.system_status, "System ready");

        state.apply(AppEvent::DiskChecked(Ok(DiskUsage {
            free: LOW_DISK_THRESHOLD / 2,
            total: LOW_DISK_THRESHOLD * 4,
        })));
        assert_eq!(state.system_status, "Low disk space: 1.00 GiB free");
        assert!(state
            .log
            .entries()
            .iter()
            .any(|line| line == "WARNING: Low disk space: 1.00 GiB of 8.00 GiB free"));

        state.apply(AppEvent::RuntimeDetected(Err("Java not found in PATH".to_string())));
        assert!(state.runtime.is_none());
        assert_eq!(state.runtime_status, "Java not found in PATH");
        assert_eq!(state.system_status, "Java not found or incompatible");
        Ok(())
    }
}
