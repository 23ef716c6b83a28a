//! `prefs` commands: show, set, and reset saved preferences.

use patchdeck_config::{ConfigError, PreferenceKey, Preferences};
use tracing::info;

use crate::cli::{AppContext, CliError, CliResult, PrefsSetArgs};
use crate::output::render_preferences;

pub(crate) fn handle_prefs_show(ctx: &AppContext) -> CliResult<()> {
    println!("{}", render_preferences(&ctx.prefs, ctx.store.path()));
    Ok(())
}

/// Explicit edits are saved even when `save_config_enabled` is off, so turning
/// it off here sticks.
pub(crate) fn handle_prefs_set(mut ctx: AppContext, args: &PrefsSetArgs) -> CliResult<()> {
    let key: PreferenceKey = args
        .key
        .parse()
        .map_err(|err| CliError::validation(format!("{err}: {}", args.key)))?;
    ctx.prefs.set(key, &args.value).map_err(|err| match err {
        ConfigError::InvalidField { reason, .. } => CliError::validation(format!(
            "invalid value for {}: {} ({reason})",
            key.as_str(),
            args.value
        )),
        other => CliError::failure(other),
    })?;
    ctx.store.save(&ctx.prefs).map_err(CliError::failure)?;
    info!(key = key.as_str(), value = %ctx.prefs.get(key), "preference updated");
    println!("{}: {}", key.as_str(), ctx.prefs.get(key));
    Ok(())
}

pub(crate) fn handle_prefs_reset(ctx: &AppContext) -> CliResult<()> {
    ctx.store
        .save(&Preferences::default())
        .map_err(CliError::failure)?;
    info!(path = %ctx.store.path().display(), "preferences reset to defaults");
    println!("preferences reset: {}", ctx.store.path().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use patchdeck_config::PreferencesStore;
    use patchdeck_runner::ToolRuntime;
    use std::path::Path;

    fn context(home: &Path) -> AppContext {
        let store = PreferencesStore::new(home);
        let (prefs, _) = store.load();
        AppContext {
            home: home.to_path_buf(),
            store,
            prefs,
            runtime: ToolRuntime::default(),
        }
    }

    fn set(key: &str, value: &str) -> PrefsSetArgs {
        PrefsSetArgs {
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn set_persists_even_when_saving_is_disabled() -> Result<()> {
        let home = tempfile::tempdir()?;
        handle_prefs_set(context(home.path()), &set("save_config_enabled", "off"))
            .map_err(|err| anyhow::anyhow!(err.display_message()))?;
        handle_prefs_set(context(home.path()), &set("last_output_dir", "/out"))
            .map_err(|err| anyhow::anyhow!(err.display_message()))?;

        let (prefs, _) = PreferencesStore::new(home.path()).load();
        assert!(!prefs.save_config_enabled);
        assert_eq!(prefs.last_output_dir, "/out");
        Ok(())
    }

    #[test]
    fn unknown_key_and_bad_value_are_validation_errors() -> Result<()> {
        let home = tempfile::tempdir()?;
        let err = handle_prefs_set(context(home.path()), &set("theme", "dark"))
            .expect_err("unknown key");
        assert_eq!(err.exit_code(), 2);
        let err = handle_prefs_set(context(home.path()), &set("window_geometry", "wide"))
            .expect_err("bad geometry");
        assert_eq!(err.exit_code(), 2);
        assert!(!home.path().join(patchdeck_config::CONFIG_FILE_NAME).exists());
        Ok(())
    }

    #[test]
    fn reset_restores_defaults() -> Result<()> {
        let home = tempfile::tempdir()?;
        handle_prefs_set(context(home.path()), &set("last_cli_path", "/tools/cli.jar"))
            .map_err(|err| anyhow::anyhow!(err.display_message()))?;
        handle_prefs_reset(&context(home.path()))
            .map_err(|err| anyhow::anyhow!(err.display_message()))?;
        let (prefs, _) = PreferencesStore::new(home.path()).load();
        assert_eq!(prefs, Preferences::default());
        Ok(())
    }
}
