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

//! File-backed user preferences.
//!
//! Layout: `model.rs` (preferences record and window geometry), `validate.rs`
//! (parsing helpers for user-supplied values), `store.rs` (JSON load and
//! atomic save), `defaults.rs` (file names and default values).

mod defaults;
pub mod error;
pub mod model;
pub mod store;
pub mod validate;

pub use defaults::{CONFIG_FILE_NAME, PREFERENCES_VERSION};
pub use error::{ConfigError, ConfigResult};
pub use model::{PreferenceKey, Preferences, WindowGeometry};
pub use store::{LoadOutcome, PreferencesStore};
