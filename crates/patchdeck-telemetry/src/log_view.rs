//! In-memory session log shown by the front-end.
//!
//! # Design
//! - Entries are single lines; multi-line pushes are split and CR/LF trimmed.
//! - Each entry is mirrored to tracing under [`SESSION_TARGET`] so the
//!   session log file captures it.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::error::{TelemetryError, TelemetryResult};
use crate::init::SESSION_TARGET;

/// Ordered log lines for the current session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogView {
    entries: Vec<String>,
}

impl LogView {
    /// Empty log.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append `text`, one entry per line. Returns how many entries were added.
    pub fn push(&mut self, text: &str) -> usize {
        let body = text.strip_suffix('\n').unwrap_or(text);
        let mut added = 0;
        for line in body.split('\n') {
            let line = trim_line(line);
            info!(target: SESSION_TARGET, "{line}");
            self.entries.push(line.to_string());
            added += 1;
        }
        added
    }

    /// Entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// The most recent `count` entries.
    #[must_use]
    pub fn tail(&self, count: usize) -> &[String] {
        let start = self.entries.len().saturating_sub(count);
        &self.entries[start..]
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the log to `path` as plain text, one newline-terminated line per entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn export(&self, path: &Path) -> TelemetryResult<()> {
        let file =
            File::create(path).map_err(|source| TelemetryError::log_file("log.export", path, source))?;
        let mut writer = BufWriter::new(file);
        for entry in &self.entries {
            writeln!(writer, "{entry}")
                .map_err(|source| TelemetryError::log_file("log.export", path, source))?;
        }
        writer
            .flush()
            .map_err(|source| TelemetryError::log_file("log.export", path, source))
    }
}

fn trim_line(line: &str) -> &str {
    line.trim_end_matches(['\r', '\n'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn push_splits_multi_line_text() {
        let mut log = LogView::new();
        assert_eq!(log.push("Error: boom\r\nSolution: retry\n"), 2);
        assert_eq!(log.entries(), ["Error: boom", "Solution: retry"]);
    }

    #[test]
    fn empty_push_records_blank_line() {
        let mut log = LogView::new();
        assert_eq!(log.push(""), 1);
        assert_eq!(log.entries(), [""]);
    }

    #[test]
    fn tail_and_clear() {
        let mut log = LogView::new();
        for line in ["a", "b", "c"] {
            log.push(line);
        }
        assert_eq!(log.tail(2), ["b", "c"]);
        assert_eq!(log.tail(10).len(), 3);
        log.clear();
        assert!(log.is_empty());
        assert_eq!(log.len(), 0);
    }

    #[test]
    fn export_writes_newline_terminated_lines() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("session.txt");
        let mut log = LogView::new();
        log.push("first");
        log.push("second");
        log.export(&path)?;
        assert_eq!(fs::read_to_string(&path)?, "first\nsecond\n");
        Ok(())
    }

    #[test]
    fn export_to_missing_directory_fails() {
        let log = LogView::new();
        let err = log
            .export(Path::new("/definitely/missing/dir/log.txt"))
            .unwrap_err();
        assert!(matches!(err, TelemetryError::LogFile { operation: "log.export", .. }));
    }
}
