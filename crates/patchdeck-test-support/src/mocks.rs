//! In-memory stand-ins for the capability traits.

use std::io;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use patchdeck_core::{DiskProbe, LogSink, RuntimeInfo, RuntimeProbe};

/// Sink that keeps every line it receives.
#[derive(Debug, Default)]
pub struct RecordingSink {
    lines: Mutex<Vec<String>>,
}

impl RecordingSink {
    /// Snapshot of the recorded lines.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl LogSink for RecordingSink {
    fn line(&self, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());
    }
}

/// Disk probe reporting a fixed amount of free space, or a fixed failure.
#[derive(Debug, Clone, Copy)]
pub enum FixedDiskProbe {
    /// Report this many free bytes for every path.
    Free(u64),
    /// Fail every query.
    Unavailable,
}

impl DiskProbe for FixedDiskProbe {
    fn free_bytes(&self, _path: &Path) -> io::Result<u64> {
        match self {
            Self::Free(bytes) => Ok(*bytes),
            Self::Unavailable => Err(io::Error::other("disk statistics unavailable")),
        }
    }
}

/// Runtime probe returning a canned result.
#[derive(Debug, Clone)]
pub struct FixedRuntimeProbe(pub Result<RuntimeInfo, String>);

impl FixedRuntimeProbe {
    /// Probe reporting a runtime with the given major version.
    #[must_use]
    pub fn major(major: u32) -> Self {
        Self(Ok(RuntimeInfo {
            version: format!("{major}.0.1"),
            major,
        }))
    }

    /// Probe reporting no runtime.
    #[must_use]
    pub fn missing() -> Self {
        Self(Err("Java not found in PATH".to_string()))
    }
}

impl RuntimeProbe for FixedRuntimeProbe {
    fn detect(&self) -> Result<RuntimeInfo, String> {
        self.0.clone()
    }
}
