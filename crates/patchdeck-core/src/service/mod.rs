//! Capability traits implemented by the runner, telemetry, and front-end crates.

use std::io;
use std::path::Path;

use crate::model::RuntimeInfo;

/// Receiver for log lines produced off the front-end's event loop.
///
/// Implementations must be callable from a worker thread; front-ends that
/// own non-thread-safe state forward each line to their own loop instead of
/// touching that state directly.
pub trait LogSink: Send + Sync {
    /// Record a single line (without trailing newline).
    fn line(&self, line: &str);
}

impl<F> LogSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn line(&self, line: &str) {
        self(line);
    }
}

/// Optional system-metrics capability reporting free space for a path.
pub trait DiskProbe: Send + Sync {
    /// Bytes available to unprivileged writers on the volume holding `path`.
    ///
    /// # Errors
    ///
    /// Returns an error when the volume cannot be resolved or queried.
    fn free_bytes(&self, path: &Path) -> io::Result<u64>;
}

/// Detection of the tool runtime.
pub trait RuntimeProbe: Send + Sync {
    /// Detect the installed runtime.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason when no usable runtime was found.
    fn detect(&self) -> Result<RuntimeInfo, String>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn closures_act_as_sinks() {
        let seen = Mutex::new(Vec::new());
        let sink = |line: &str| {
            if let Ok(mut guard) = seen.lock() {
                guard.push(line.to_string());
            }
        };
        sink.line("alpha");
        LogSink::line(&sink, "beta");
        let lines = seen.into_inner().unwrap_or_default();
        assert_eq!(lines, vec!["alpha".to_string(), "beta".to_string()]);
    }
}
