//! Host metrics: free disk space and a background CPU load monitor.
//!
//! # Design
//! - Disk queries pick the mount whose mount point is the longest prefix of
//!   the (resolved) path.
//! - The monitor samples aggregate CPU load on its own thread and only
//!   speaks when the load crosses the alert threshold. Stopping is advisory:
//!   the thread notices the flag at its next wake-up.

use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use patchdeck_core::{DiskProbe, LogSink};
use systemstat::{Platform, System};
use tracing::{debug, warn};

use crate::error::{TelemetryError, TelemetryResult};

const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);
const DEFAULT_WINDOW: Duration = Duration::from_secs(1);
const DEFAULT_CPU_THRESHOLD: f32 = 80.0;
const STOP_POLL: Duration = Duration::from_millis(100);

/// Free and total bytes of one volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiskUsage {
    /// Bytes available to unprivileged writers.
    pub free: u64,
    /// Volume capacity.
    pub total: u64,
}

/// [`DiskProbe`] backed by the operating system's mount table.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemDiskProbe;

impl SystemDiskProbe {
    /// Free and total space of the volume holding `path`.
    ///
    /// # Errors
    ///
    /// Returns an error when the mount table cannot be read or no mount
    /// covers the path.
    pub fn disk_usage(&self, path: &Path) -> io::Result<DiskUsage> {
        let resolved = resolve(path)?;
        let mounts = System::new().mounts()?;
        let mount = longest_mount(&resolved, &mounts, |fs| Path::new(&fs.fs_mounted_on))
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no mount point covers {}", resolved.display()),
                )
            })?;
        Ok(DiskUsage {
            free: mount.avail.as_u64(),
            total: mount.total.as_u64(),
        })
    }
}

impl DiskProbe for SystemDiskProbe {
    fn free_bytes(&self, path: &Path) -> io::Result<u64> {
        self.disk_usage(path).map(|usage| usage.free)
    }
}

/// Absolute, canonical form of the nearest existing ancestor of `path`.
fn resolve(path: &Path) -> io::Result<PathBuf> {
    let cwd = env::current_dir()?;
    let absolute = if path.as_os_str().is_empty() {
        cwd
    } else if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };
    let existing = absolute
        .ancestors()
        .find(|candidate| candidate.exists())
        .unwrap_or(&absolute);
    existing.canonicalize()
}

fn longest_mount<'a, T>(
    path: &Path,
    mounts: &'a [T],
    mount_point: impl Fn(&T) -> &Path,
) -> Option<&'a T> {
    mounts
        .iter()
        .filter(|mount| path.starts_with(mount_point(mount)))
        .max_by_key(|mount| mount_point(mount).as_os_str().len())
}

/// Timing and threshold for [`SystemMonitor`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonitorSettings {
    /// Pause between samples.
    pub interval: Duration,
    /// Measurement window of one CPU sample.
    pub window: Duration,
    /// Load percentage above which an alert line is posted.
    pub cpu_threshold: f32,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            window: DEFAULT_WINDOW,
            cpu_threshold: DEFAULT_CPU_THRESHOLD,
        }
    }
}

/// Background CPU load watcher posting alerts to a [`LogSink`].
#[derive(Debug)]
pub struct SystemMonitor {
    settings: MonitorSettings,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl SystemMonitor {
    /// Stopped monitor with the given settings.
    #[must_use]
    pub fn new(settings: MonitorSettings) -> Self {
        Self {
            settings,
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    /// Whether the sampling thread has been asked to run.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Start sampling; a no-op when already running.
    ///
    /// # Errors
    ///
    /// Returns an error if the sampling thread cannot be spawned.
    pub fn start(&mut self, sink: Arc<dyn LogSink>) -> TelemetryResult<()> {
        if self.running.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        let running = Arc::clone(&self.running);
        let settings = self.settings;
        let spawned = thread::Builder::new()
            .name("patchdeck-monitor".to_string())
            .spawn(move || run_monitor(&settings, &running, sink.as_ref()));
        match spawned {
            Ok(handle) => {
                self.handle = Some(handle);
                debug!("system monitor started");
                Ok(())
            }
            Err(source) => {
                self.running.store(false, Ordering::Release);
                Err(TelemetryError::MonitorSpawn { source })
            }
        }
    }

    /// Ask the sampling thread to exit. Does not wait for it.
    pub fn stop(&mut self) {
        if self.running.swap(false, Ordering::AcqRel) {
            debug!("system monitor stopping");
        }
        self.handle = None;
    }
}

impl Default for SystemMonitor {
    fn default() -> Self {
        Self::new(MonitorSettings::default())
    }
}

impl Drop for SystemMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_monitor(settings: &MonitorSettings, running: &AtomicBool, sink: &dyn LogSink) {
    let system = System::new();
    while running.load(Ordering::Acquire) {
        match sample_cpu(&system, settings.window) {
            Ok(usage) => {
                if let Some(alert) = cpu_alert(usage, settings.cpu_threshold) {
                    warn!(usage, "high cpu usage");
                    sink.line(&alert);
                }
            }
            Err(err) => debug!(error = %err, "cpu sample failed"),
        }
        pause(settings.interval, running);
    }
}

fn sample_cpu(system: &System, window: Duration) -> io::Result<f32> {
    let measurement = system.cpu_load_aggregate()?;
    thread::sleep(window);
    let load = measurement.done()?;
    Ok(usage_from_idle(load.idle))
}

fn pause(duration: Duration, running: &AtomicBool) {
    let deadline = Instant::now() + duration;
    while running.load(Ordering::Acquire) {
        let now = Instant::now();
        if now >= deadline {
            return;
        }
        thread::sleep(STOP_POLL.min(deadline - now));
    }
}

fn usage_from_idle(idle: f32) -> f32 {
    ((1.0 - idle) * 100.0).clamp(0.0, 100.0)
}

fn cpu_alert(usage: f32, threshold: f32) -> Option<String> {
    (usage > threshold).then(|| format!("High CPU usage: {usage:.0}%"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use patchdeck_test_support::mocks::RecordingSink;

    #[test]
    fn longest_mount_prefers_most_specific() {
        let mounts = [
            PathBuf::from("/"),
            PathBuf::from("/home"),
            PathBuf::from("/home/user/media"),
        ];
        let pick = |path: &str| {
            longest_mount(Path::new(path), &mounts, PathBuf::as_path).map(PathBuf::as_path)
        };
        assert_eq!(pick("/home/user/out"), Some(Path::new("/home")));
        assert_eq!(pick("/home/user/media/x"), Some(Path::new("/home/user/media")));
        assert_eq!(pick("/tmp"), Some(Path::new("/")));
        assert_eq!(pick("/homework"), Some(Path::new("/")));
    }

    #[test]
    fn resolve_walks_up_to_existing_ancestor() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let missing = dir.path().join("not").join("yet");
        assert_eq!(resolve(&missing)?, dir.path().canonicalize()?);
        assert_eq!(resolve(Path::new(""))?, env::current_dir()?.canonicalize()?);
        Ok(())
    }

    #[test]
    fn usage_and_alert_thresholds() {
        assert!((usage_from_idle(0.25) - 75.0).abs() < f32::EPSILON);
        assert!(usage_from_idle(1.5).abs() < f32::EPSILON);
        assert_eq!(cpu_alert(80.0, 80.0), None);
        assert_eq!(cpu_alert(91.4, 80.0).as_deref(), Some("High CPU usage: 91%"));
    }

    #[test]
    fn disk_usage_reports_space_for_temp_dir() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let usage = SystemDiskProbe.disk_usage(dir.path())?;
        assert!(usage.total >= usage.free);
        assert!(SystemDiskProbe.free_bytes(dir.path()).is_ok());
        Ok(())
    }

    #[test]
    fn monitor_start_stop_toggles_state() -> anyhow::Result<()> {
        let mut monitor = SystemMonitor::new(MonitorSettings {
            interval: Duration::from_millis(10),
            window: Duration::from_millis(10),
            cpu_threshold: 100.0,
        });
        let sink = Arc::new(RecordingSink::default());
        monitor.start(sink.clone())?;
        assert!(monitor.is_running());
        monitor.start(sink.clone())?;
        monitor.stop();
        assert!(!monitor.is_running());
        assert!(sink.lines().is_empty());
        Ok(())
    }
}
