//! Typed preferences record and its on-disk document form.
//!
//! # Design
//! - `Preferences` is the in-memory record; `PreferencesDocument` mirrors the
//!   JSON keys exactly so unknown keys are ignored and missing keys default.
//! - Geometry is stored as a string on disk and typed in memory; invalid
//!   strings are dropped during conversion instead of failing the load.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::defaults::{PREFERENCES_VERSION, SAVE_CONFIG_ENABLED, SAVE_LOGS_ENABLED};
use crate::error::{ConfigError, ConfigResult};
use crate::validate::{parse_geometry, parse_toggle};

/// Saved window placement in `WIDTHxHEIGHT+X+Y` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowGeometry {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Horizontal offset in pixels.
    pub x: u32,
    /// Vertical offset in pixels.
    pub y: u32,
}

impl Display for WindowGeometry {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "{}x{}+{}+{}",
            self.width, self.height, self.x, self.y
        )
    }
}

impl FromStr for WindowGeometry {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        parse_geometry(value)
    }
}

/// User preferences persisted between sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preferences {
    /// Mirror the session log to a timestamped file.
    pub save_logs_enabled: bool,
    /// Persist preferences on change and on exit.
    pub save_config_enabled: bool,
    /// Last patch tool archive used.
    pub last_cli_path: String,
    /// Last patch bundle used.
    pub last_patches_path: String,
    /// Last output directory used.
    pub last_output_dir: String,
    /// Last window placement, if a valid one was recorded.
    pub window_geometry: Option<WindowGeometry>,
    /// Version of the application that wrote the record.
    pub version: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            save_logs_enabled: SAVE_LOGS_ENABLED,
            save_config_enabled: SAVE_CONFIG_ENABLED,
            last_cli_path: String::new(),
            last_patches_path: String::new(),
            last_output_dir: String::new(),
            window_geometry: None,
            version: PREFERENCES_VERSION.to_string(),
        }
    }
}

/// Keys accepted by [`Preferences::set`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceKey {
    /// `save_logs_enabled`
    SaveLogsEnabled,
    /// `save_config_enabled`
    SaveConfigEnabled,
    /// `last_cli_path`
    LastCliPath,
    /// `last_patches_path`
    LastPatchesPath,
    /// `last_output_dir`
    LastOutputDir,
    /// `window_geometry`
    WindowGeometry,
}

impl PreferenceKey {
    /// Every settable key in document order.
    pub const ALL: [Self; 6] = [
        Self::SaveLogsEnabled,
        Self::SaveConfigEnabled,
        Self::LastCliPath,
        Self::LastPatchesPath,
        Self::LastOutputDir,
        Self::WindowGeometry,
    ];

    /// JSON key name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SaveLogsEnabled => "save_logs_enabled",
            Self::SaveConfigEnabled => "save_config_enabled",
            Self::LastCliPath => "last_cli_path",
            Self::LastPatchesPath => "last_patches_path",
            Self::LastOutputDir => "last_output_dir",
            Self::WindowGeometry => "window_geometry",
        }
    }
}

impl FromStr for PreferenceKey {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == value)
            .ok_or_else(|| ConfigError::UnknownField {
                field: value.to_string(),
            })
    }
}

impl Preferences {
    /// Assign a single field from its textual form.
    ///
    /// An empty geometry clears the stored placement.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidField` when the value cannot be parsed
    /// for the given key.
    pub fn set(&mut self, key: PreferenceKey, value: &str) -> ConfigResult<()> {
        match key {
            PreferenceKey::SaveLogsEnabled => {
                self.save_logs_enabled = parse_toggle(key.as_str(), value)?;
            }
            PreferenceKey::SaveConfigEnabled => {
                self.save_config_enabled = parse_toggle(key.as_str(), value)?;
            }
            PreferenceKey::LastCliPath => value.clone_into(&mut self.last_cli_path),
            PreferenceKey::LastPatchesPath => value.clone_into(&mut self.last_patches_path),
            PreferenceKey::LastOutputDir => value.clone_into(&mut self.last_output_dir),
            PreferenceKey::WindowGeometry => {
                self.window_geometry = if value.trim().is_empty() {
                    None
                } else {
                    Some(parse_geometry(value)?)
                };
            }
        }
        Ok(())
    }

    /// Textual value of a single field, as it would appear in the document.
    #[must_use]
    pub fn get(&self, key: PreferenceKey) -> String {
        match key {
            PreferenceKey::SaveLogsEnabled => self.save_logs_enabled.to_string(),
            PreferenceKey::SaveConfigEnabled => self.save_config_enabled.to_string(),
            PreferenceKey::LastCliPath => self.last_cli_path.clone(),
            PreferenceKey::LastPatchesPath => self.last_patches_path.clone(),
            PreferenceKey::LastOutputDir => self.last_output_dir.clone(),
            PreferenceKey::WindowGeometry => self
                .window_geometry
                .map(|geometry| geometry.to_string())
                .unwrap_or_default(),
        }
    }
}

/// JSON shape of the preferences file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct PreferencesDocument {
    pub(crate) save_logs_enabled: bool,
    pub(crate) save_config_enabled: bool,
    pub(crate) last_cli_path: String,
    pub(crate) last_patches_path: String,
    pub(crate) last_output_dir: String,
    pub(crate) window_geometry: String,
    pub(crate) version: String,
}

impl Default for PreferencesDocument {
    fn default() -> Self {
        Self::from(&Preferences::default())
    }
}

impl From<&Preferences> for PreferencesDocument {
    fn from(preferences: &Preferences) -> Self {
        Self {
            save_logs_enabled: preferences.save_logs_enabled,
            save_config_enabled: preferences.save_config_enabled,
            last_cli_path: preferences.last_cli_path.clone(),
            last_patches_path: preferences.last_patches_path.clone(),
            last_output_dir: preferences.last_output_dir.clone(),
            window_geometry: preferences.get(PreferenceKey::WindowGeometry),
            version: preferences.version.clone(),
        }
    }
}

impl PreferencesDocument {
    /// Convert into the in-memory record, returning any geometry that was discarded.
    pub(crate) fn into_preferences(self) -> (Preferences, Option<String>) {
        let (window_geometry, discarded) = if self.window_geometry.trim().is_empty() {
            (None, None)
        } else {
            match parse_geometry(&self.window_geometry) {
                Ok(geometry) => (Some(geometry), None),
                Err(_) => (None, Some(self.window_geometry)),
            }
        };

        let preferences = Preferences {
            save_logs_enabled: self.save_logs_enabled,
            save_config_enabled: self.save_config_enabled,
            last_cli_path: self.last_cli_path,
            last_patches_path: self.last_patches_path,
            last_output_dir: self.last_output_dir,
            window_geometry,
            version: self.version,
        };
        (preferences, discarded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_match_documented_values() {
        let prefs = Preferences::default();
        assert!(!prefs.save_logs_enabled);
        assert!(prefs.save_config_enabled);
        assert!(prefs.last_cli_path.is_empty());
        assert!(prefs.window_geometry.is_none());
        assert_eq!(prefs.version, PREFERENCES_VERSION);
    }

    #[test]
    fn geometry_display_round_trips() {
        let geometry: WindowGeometry = "900x500+10+20".parse().expect("valid geometry");
        assert_eq!(geometry.to_string(), "900x500+10+20");
    }

    #[test]
    fn set_updates_fields_from_text() {
        let mut prefs = Preferences::default();
        prefs
            .set(PreferenceKey::SaveLogsEnabled, "on")
            .expect("toggle");
        prefs
            .set(PreferenceKey::LastCliPath, "/opt/tool/cli.jar")
            .expect("path");
        prefs
            .set(PreferenceKey::WindowGeometry, "1000x600+0+0")
            .expect("geometry");
        assert!(prefs.save_logs_enabled);
        assert_eq!(prefs.last_cli_path, "/opt/tool/cli.jar");
        assert_eq!(prefs.get(PreferenceKey::WindowGeometry), "1000x600+0+0");

        prefs
            .set(PreferenceKey::WindowGeometry, "")
            .expect("clear geometry");
        assert!(prefs.window_geometry.is_none());
        assert!(prefs.set(PreferenceKey::WindowGeometry, "wide").is_err());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = "theme".parse::<PreferenceKey>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownField { ref field } if field == "theme"));
    }

    #[test]
    fn document_defaults_missing_keys_and_ignores_unknown() {
        let document: PreferencesDocument = serde_json::from_value(json!({
            "last_cli_path": "/tmp/cli.jar",
            "theme": "dark"
        }))
        .expect("document should parse");
        let (prefs, discarded) = document.into_preferences();
        assert!(discarded.is_none());
        assert_eq!(prefs.last_cli_path, "/tmp/cli.jar");
        assert!(prefs.save_config_enabled);
        assert_eq!(prefs.version, PREFERENCES_VERSION);
    }

    #[test]
    fn document_discards_invalid_geometry() {
        let document: PreferencesDocument = serde_json::from_value(json!({
            "window_geometry": "not-a-geometry"
        }))
        .expect("document should parse");
        let (prefs, discarded) = document.into_preferences();
        assert!(prefs.window_geometry.is_none());
        assert_eq!(discarded.as_deref(), Some("not-a-geometry"));
    }
}
