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

//! Everything between a filled-in request and a finished patch job.
//!
//! Layout: `runtime.rs` (runtime detection and version parsing),
//! `validate.rs` (ordered pre-flight checks), `command.rs` (argument vector),
//! `worker.rs` (process launch and output relay), `guard.rs` (single-job slot),
//! `error.rs` (launch error types).

pub mod command;
pub mod error;
pub mod guard;
pub mod runtime;
pub mod validate;
pub mod worker;

pub use command::PatchCommand;
pub use error::{RunnerError, RunnerResult};
pub use guard::{JobGuard, JobPermit};
pub use runtime::{
    JavaRuntimeProbe, MINIMUM_MAJOR_VERSION, RECOMMENDED_MAJOR_VERSION, RuntimeCompatibility,
    ToolRuntime, check_compatibility, parse_major_version,
};
pub use validate::{DISK_SPACE_MULTIPLIER, validate};
pub use worker::{ProcessRunner, RunnerOptions};
