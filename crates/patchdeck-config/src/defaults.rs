//! Default file names and values for the preferences record.
//!
//! # Design
//! - Keep on-disk names in one place so the store and tests agree.

/// Preferences file name inside the Patchdeck home directory.
pub const CONFIG_FILE_NAME: &str = "config.json";
/// Sibling file written before the atomic rename.
pub(crate) const TEMP_FILE_EXTENSION: &str = "tmp";
/// Version recorded in newly created preferences.
pub const PREFERENCES_VERSION: &str = env!("CARGO_PKG_VERSION");
/// Session logs are not written to disk unless enabled.
pub(crate) const SAVE_LOGS_ENABLED: bool = false;
/// Preferences are persisted unless disabled.
pub(crate) const SAVE_CONFIG_ENABLED: bool = true;
