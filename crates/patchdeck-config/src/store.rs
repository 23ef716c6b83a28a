//! JSON-backed preferences store.
//!
//! # Design
//! - Loading never fails: a missing or malformed file yields defaults and the
//!   reason is reported through `LoadOutcome` and the log.
//! - Saving writes a sibling temp file, syncs it, and renames it over the
//!   target so readers only ever see a complete document.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::defaults::{CONFIG_FILE_NAME, TEMP_FILE_EXTENSION};
use crate::error::{ConfigError, ConfigResult};
use crate::model::{Preferences, PreferencesDocument};

/// How the last load resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The file was read and applied.
    Loaded,
    /// No preferences file exists yet; defaults were used.
    Missing,
    /// The file could not be used; defaults were used.
    Malformed {
        /// Why the file was rejected.
        reason: String,
    },
}

/// Reads and writes the preferences file inside a home directory.
#[derive(Debug, Clone)]
pub struct PreferencesStore {
    path: PathBuf,
}

impl PreferencesStore {
    /// Store rooted at `home`, using the default file name.
    #[must_use]
    pub fn new(home: impl AsRef<Path>) -> Self {
        Self {
            path: home.as_ref().join(CONFIG_FILE_NAME),
        }
    }

    /// Location of the preferences file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension(TEMP_FILE_EXTENSION)
    }

    /// Load preferences, falling back to defaults when the file is missing or unusable.
    #[must_use]
    pub fn load(&self) -> (Preferences, LoadOutcome) {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no preferences file; using defaults");
                return (Preferences::default(), LoadOutcome::Missing);
            }
            Err(err) => {
                return self.malformed(format!("failed to read preferences: {err}"));
            }
        };

        let value: Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => return self.malformed(format!("invalid JSON: {err}")),
        };

        if !value.is_object() {
            return self.malformed("invalid config format: expected a JSON object".to_string());
        }

        let document: PreferencesDocument = match serde_json::from_value(value) {
            Ok(document) => document,
            Err(err) => return self.malformed(format!("invalid field: {err}")),
        };

        let (preferences, discarded) = document.into_preferences();
        if let Some(geometry) = discarded {
            warn!(
                path = %self.path.display(),
                geometry = %geometry,
                "discarding invalid window geometry"
            );
        }
        info!(path = %self.path.display(), "configuration loaded successfully");
        (preferences, LoadOutcome::Loaded)
    }

    fn malformed(&self, reason: String) -> (Preferences, LoadOutcome) {
        warn!(
            path = %self.path.display(),
            reason = %reason,
            "config load error (using defaults)"
        );
        (Preferences::default(), LoadOutcome::Malformed { reason })
    }

    /// Atomically replace the preferences file with `preferences`.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be created, the document
    /// cannot be serialised, or the temp file cannot be written or renamed.
    pub fn save(&self, preferences: &Preferences) -> ConfigResult<()> {
        if let Some(parent) = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
        {
            fs::create_dir_all(parent)
                .map_err(|err| ConfigError::io("preferences.create_home", parent, err))?;
        }

        let document = PreferencesDocument::from(preferences);
        let mut payload = serde_json::to_vec_pretty(&document)
            .map_err(|err| ConfigError::json("preferences.serialize", &self.path, err))?;
        payload.push(b'\n');

        let temp_path = self.temp_path();
        if let Err(err) = write_synced(&temp_path, &payload) {
            let _ = fs::remove_file(&temp_path);
            return Err(ConfigError::io("preferences.write_temp", temp_path, err));
        }

        if let Err(err) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(ConfigError::io("preferences.rename", &self.path, err));
        }

        debug!(path = %self.path.display(), "preferences saved");
        Ok(())
    }

    /// Save only when the record itself has saving enabled.
    ///
    /// Returns whether the file was written.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`PreferencesStore::save`].
    pub fn save_if_enabled(&self, preferences: &Preferences) -> ConfigResult<bool> {
        if !preferences.save_config_enabled {
            return Ok(false);
        }
        self.save(preferences)?;
        Ok(true)
    }
}

fn write_synced(path: &Path, payload: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(payload)?;
    file.flush()?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WindowGeometry;
    use anyhow::Result;
    use tempfile::TempDir;

    fn temp_home() -> Result<TempDir> {
        Ok(tempfile::Builder::new()
            .prefix("patchdeck-config-")
            .tempdir()?)
    }

    fn sample_preferences() -> Preferences {
        Preferences {
            save_logs_enabled: true,
            save_config_enabled: true,
            last_cli_path: "/opt/patcher/cli.jar".to_string(),
            last_patches_path: "/opt/patcher/patches.rvp".to_string(),
            last_output_dir: "/home/user/out".to_string(),
            window_geometry: Some(WindowGeometry {
                width: 1000,
                height: 600,
                x: 40,
                y: 80,
            }),
            version: "1.3.1".to_string(),
        }
    }

    #[test]
    fn missing_file_yields_defaults() -> Result<()> {
        let home = temp_home()?;
        let store = PreferencesStore::new(home.path());
        let (prefs, outcome) = store.load();
        assert_eq!(outcome, LoadOutcome::Missing);
        assert_eq!(prefs, Preferences::default());
        Ok(())
    }

    #[test]
    fn save_then_load_round_trips() -> Result<()> {
        let home = temp_home()?;
        let store = PreferencesStore::new(home.path());
        let prefs = sample_preferences();
        store.save(&prefs)?;

        let (loaded, outcome) = store.load();
        assert_eq!(outcome, LoadOutcome::Loaded);
        assert_eq!(loaded, prefs);
        assert!(!store.temp_path().exists());
        Ok(())
    }

    #[test]
    fn save_writes_documented_keys() -> Result<()> {
        let home = temp_home()?;
        let store = PreferencesStore::new(home.path());
        store.save(&sample_preferences())?;

        let value: Value = serde_json::from_str(&fs::read_to_string(store.path())?)?;
        let object = value.as_object().expect("object document");
        let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "last_cli_path",
                "last_output_dir",
                "last_patches_path",
                "save_config_enabled",
                "save_logs_enabled",
                "version",
                "window_geometry",
            ]
        );
        assert_eq!(object["window_geometry"], "1000x600+40+80");
        Ok(())
    }

    #[test]
    fn malformed_json_yields_defaults() -> Result<()> {
        let home = temp_home()?;
        let store = PreferencesStore::new(home.path());
        fs::write(store.path(), "{ not json")?;
        let (prefs, outcome) = store.load();
        assert!(matches!(outcome, LoadOutcome::Malformed { .. }));
        assert_eq!(prefs, Preferences::default());
        Ok(())
    }

    #[test]
    fn non_object_document_is_malformed() -> Result<()> {
        let home = temp_home()?;
        let store = PreferencesStore::new(home.path());
        fs::write(store.path(), "[1, 2, 3]")?;
        let (prefs, outcome) = store.load();
        match outcome {
            LoadOutcome::Malformed { reason } => assert!(reason.contains("expected a JSON object")),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(prefs, Preferences::default());
        Ok(())
    }

    #[test]
    fn wrong_field_type_is_malformed() -> Result<()> {
        let home = temp_home()?;
        let store = PreferencesStore::new(home.path());
        fs::write(store.path(), r#"{"save_logs_enabled": "yes please"}"#)?;
        let (_, outcome) = store.load();
        assert!(matches!(outcome, LoadOutcome::Malformed { .. }));
        Ok(())
    }

    #[test]
    fn save_if_enabled_respects_toggle() -> Result<()> {
        let home = temp_home()?;
        let store = PreferencesStore::new(home.path());
        let mut prefs = sample_preferences();
        prefs.save_config_enabled = false;
        assert!(!store.save_if_enabled(&prefs)?);
        assert!(!store.path().exists());

        prefs.save_config_enabled = true;
        assert!(store.save_if_enabled(&prefs)?);
        assert!(store.path().exists());
        Ok(())
    }

    #[test]
    fn save_creates_missing_home_directory() -> Result<()> {
        let home = temp_home()?;
        let nested = home.path().join("nested").join("home");
        let store = PreferencesStore::new(&nested);
        store.save(&Preferences::default())?;
        assert!(nested.join(CONFIG_FILE_NAME).is_file());
        Ok(())
    }

    #[test]
    fn save_replaces_stale_temp_file() -> Result<()> {
        let home = temp_home()?;
        let store = PreferencesStore::new(home.path());
        fs::write(store.temp_path(), "partial")?;
        store.save(&sample_preferences())?;
        assert!(!store.temp_path().exists());
        let (loaded, outcome) = store.load();
        assert_eq!(outcome, LoadOutcome::Loaded);
        assert_eq!(loaded, sample_preferences());
        Ok(())
    }
}
