//! Handlers for each CLI subcommand.

pub(crate) mod check;
pub(crate) mod patch;
pub(crate) mod prefs;
pub(crate) mod shell;

use patchdeck_core::{RuntimeInfo, RuntimeProbe};
use patchdeck_runner::{JavaRuntimeProbe, ToolRuntime};

/// Run the `-version` probe off the async runtime.
pub(crate) async fn detect_runtime(runtime: ToolRuntime) -> Result<RuntimeInfo, String> {
    tokio::task::spawn_blocking(move || JavaRuntimeProbe::new(runtime).detect())
        .await
        .unwrap_or_else(|err| Err(format!("Error checking Java: {err}")))
}
