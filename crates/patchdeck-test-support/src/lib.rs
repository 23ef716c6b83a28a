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

//! Shared test helpers used across integration suites.
//! Layout: fixtures.rs (temp workspaces and stub runtimes), mocks.rs (recording sinks and fixed probes).

pub mod fixtures;
pub mod mocks;
