//! `check` command: report the runtime and free disk space.

use patchdeck_core::{ErrorKind, describe_failure, format_bytes};
use patchdeck_runner::{
    MINIMUM_MAJOR_VERSION, RECOMMENDED_MAJOR_VERSION, RuntimeCompatibility, check_compatibility,
};
use patchdeck_telemetry::SystemDiskProbe;

use super::detect_runtime;
use crate::cli::{AppContext, CheckArgs, CliError, CliResult};
use crate::state::LOW_DISK_THRESHOLD;

pub(crate) async fn handle_check(ctx: &AppContext, args: CheckArgs) -> CliResult<()> {
    let runtime = detect_runtime(ctx.runtime.clone()).await;
    let path = args.path.unwrap_or_else(|| ctx.home.clone());
    let disk = tokio::task::spawn_blocking({
        let path = path.clone();
        move || SystemDiskProbe.disk_usage(&path)
    })
    .await
    .map_err(CliError::failure)?;

    match &disk {
        Ok(usage) => {
            let low = if usage.free < LOW_DISK_THRESHOLD { " (low)" } else { "" };
            println!(
                "disk:  {} free of {} at {}{low}",
                format_bytes(usage.free),
                format_bytes(usage.total),
                path.display()
            );
        }
        Err(err) => println!("disk:  unknown ({err})"),
    }

    let info = runtime.map_err(|reason| {
        CliError::validation(describe_failure(ErrorKind::RuntimeNotFound, &reason))
    })?;
    match check_compatibility(&info) {
        RuntimeCompatibility::Supported => println!("java:  {} (ok)", info.summary()),
        RuntimeCompatibility::Outdated => println!(
            "java:  {} (works, Java {RECOMMENDED_MAJOR_VERSION}+ recommended)",
            info.summary()
        ),
        RuntimeCompatibility::Unsupported => {
            return Err(CliError::validation(describe_failure(
                ErrorKind::RuntimeNotFound,
                &format!(
                    "Unsupported: {} (need Java {MINIMUM_MAJOR_VERSION}+)",
                    info.version
                ),
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use patchdeck_config::PreferencesStore;
    use patchdeck_runner::ToolRuntime;
    use patchdeck_test_support::fixtures::{StubRuntime, write_stub_runtime};
    use serial_test::serial;
    use std::path::Path;

    fn context(home: &Path, runtime: ToolRuntime) -> AppContext {
        let store = PreferencesStore::new(home);
        let (prefs, _) = store.load();
        AppContext {
            home: home.to_path_buf(),
            store,
            prefs,
            runtime,
        }
    }

    #[tokio::test]
    #[serial]
    async fn modern_runtime_passes() -> Result<()> {
        let home = tempfile::tempdir()?;
        let program = write_stub_runtime(home.path(), &StubRuntime::default())?;
        let ctx = context(home.path(), ToolRuntime::new(program));
        handle_check(&ctx, CheckArgs::default())
            .await
            .map_err(|err| anyhow::anyhow!(err.display_message()))?;
        Ok(())
    }

    #[tokio::test]
    #[serial]
    async fn ancient_runtime_is_rejected() -> Result<()> {
        let home = tempfile::tempdir()?;
        let stub = StubRuntime {
            version: Some("1.6.0_45".to_string()),
            ..StubRuntime::default()
        };
        let program = write_stub_runtime(home.path(), &stub)?;
        let ctx = context(home.path(), ToolRuntime::new(program));
        let err = handle_check(&ctx, CheckArgs::default())
            .await
            .expect_err("Java 6 is unsupported");
        assert_eq!(err.exit_code(), 2);
        assert!(err.display_message().contains("Unsupported: 1.6.0_45"));
        Ok(())
    }

    #[tokio::test]
    #[serial]
    async fn missing_runtime_is_rejected() -> Result<()> {
        let home = tempfile::tempdir()?;
        let ctx = context(
            home.path(),
            ToolRuntime::new(home.path().join("no-such-java")),
        );
        let err = handle_check(&ctx, CheckArgs::default())
            .await
            .expect_err("runtime is missing");
        assert!(err.display_message().starts_with("Error: "));
        assert!(err.display_message().contains("Install Java 8+"));
        Ok(())
    }
}
