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

//! Tool-agnostic patch job model shared by the Patchdeck crates.
//!
//! Layout: `model/` (job request, outcome, validation issues, file routing),
//! `error.rs` (failure taxonomy and remedy table), `service/` (capability
//! traits implemented by the runner, telemetry, and front-end crates).

pub mod error;
pub mod model;
pub mod service;

pub use error::{ErrorKind, describe_failure};
pub use model::{
    FileRole, JobOutcome, PatchJobRequest, RuntimeInfo, ValidationIssue, default_output_file,
    format_bytes, patched_file_name,
};
pub use service::{DiskProbe, LogSink, RuntimeProbe};
