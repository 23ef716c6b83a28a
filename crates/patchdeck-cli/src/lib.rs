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
#![allow(clippy::redundant_pub_crate)]

//! Terminal front-end for the APK patch tool.
//!
//! Layout:
//! - `cli.rs`: argument parsing, startup, and command dispatch
//! - `commands/`: command handlers (one-shot patch, check, prefs, interactive shell)
//! - `state.rs`: application state owned by the front-end loop
//! - `events.rs`: messages from worker threads back to the loop
//! - `output.rs`: renderers and help text
//! - `main.rs`: thin entrypoint delegating to `run()`

pub(crate) mod cli;
pub(crate) mod commands;
pub(crate) mod events;
pub(crate) mod output;
pub(crate) mod state;

pub use cli::run;
