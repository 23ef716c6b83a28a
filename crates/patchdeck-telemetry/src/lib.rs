#![forbid(unsafe_code)]
#![deny(unused_must_use, rustdoc::broken_intra_doc_links, rustdoc::bare_urls)]
#![warn(
    missing_docs,
    unreachable_pub,
    dead_code,
    unused,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]

//! Observability for Patchdeck: tracing setup, the session log, and host metrics.
//!
//! Layout: `init.rs` (subscriber installation and session log files),
//! `log_view.rs` (in-memory session log), `monitor.rs` (disk probe and CPU
//! monitor), `error.rs` (error types).

pub mod error;
pub mod init;
pub mod log_view;
pub mod monitor;

pub use error::{TelemetryError, TelemetryResult};
pub use init::{
    DEFAULT_LOG_LEVEL, LOG_DIR_NAME, LogFormat, LoggingConfig, SESSION_TARGET, init_logging,
    session_log_path,
};
pub use log_view::LogView;
pub use monitor::{DiskUsage, MonitorSettings, SystemDiskProbe, SystemMonitor};
