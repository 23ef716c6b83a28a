//! One-shot `patch` command: validate, run, and report through the exit code.

use std::path::{Path, PathBuf};

use patchdeck_config::PREFERENCES_VERSION;
use patchdeck_core::{JobOutcome, PatchJobRequest, default_output_file, describe_failure};
use patchdeck_runner::{ProcessRunner, RunnerOptions, validate};
use patchdeck_telemetry::{SESSION_TARGET, SystemDiskProbe};
use tracing::{info, warn};

use super::detect_runtime;
use crate::cli::{AppContext, CliError, CliResult, PatchArgs};

pub(crate) async fn handle_patch(mut ctx: AppContext, args: PatchArgs) -> CliResult<()> {
    let request = build_request(&ctx, args)?;

    let runtime = detect_runtime(ctx.runtime.clone()).await;
    let issues = validate(&request, &runtime, Some(&SystemDiskProbe));
    if !issues.is_empty() {
        for issue in &issues {
            warn!(kind = %issue.kind, "{}", issue.message);
        }
        let report = issues
            .iter()
            .map(|issue| describe_failure(issue.kind, &issue.message))
            .collect::<Vec<_>>()
            .join("\n");
        return Err(CliError::validation(report));
    }

    remember_paths(&mut ctx, &request);

    let runner = ProcessRunner::new(ctx.runtime.clone(), RunnerOptions::default())
        .with_runtime_info(runtime.ok());
    let outcome = tokio::task::spawn_blocking(move || runner.run(&request, &relay_line))
    .await
    .map_err(CliError::failure)?;

    match outcome {
        JobOutcome::Success { elapsed } => {
            info!(elapsed_ms = elapsed.as_millis(), "patch job finished");
            Ok(())
        }
        JobOutcome::Failure { kind, message } => {
            Err(CliError::job(describe_failure(kind, &message)))
        }
    }
}

/// Print a tool line and mirror it into the session log.
fn relay_line(line: &str) {
    println!("{line}");
    info!(target: SESSION_TARGET, "{line}");
}

/// Fill unset arguments from saved preferences and derive the output file.
fn build_request(ctx: &AppContext, args: PatchArgs) -> CliResult<PatchJobRequest> {
    let tool_path = args
        .tool
        .or_else(|| saved_path(&ctx.prefs.last_cli_path))
        .ok_or_else(|| CliError::validation("no patch tool selected; pass --tool"))?;
    let patches_path = args
        .patches
        .or_else(|| saved_path(&ctx.prefs.last_patches_path))
        .ok_or_else(|| CliError::validation("no patches file selected; pass --patches"))?;
    let output_dir = args.output.unwrap_or_else(|| {
        args.input
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
    });
    let output_path = default_output_file(&args.input, &output_dir).ok_or_else(|| {
        CliError::validation(format!(
            "input has no file name: {}",
            args.input.display()
        ))
    })?;
    Ok(PatchJobRequest {
        tool_path,
        patches_path,
        input_path: args.input,
        output_path,
    })
}

fn remember_paths(ctx: &mut AppContext, request: &PatchJobRequest) {
    ctx.prefs.last_cli_path = request.tool_path.to_string_lossy().into_owned();
    ctx.prefs.last_patches_path = request.patches_path.to_string_lossy().into_owned();
    ctx.prefs.last_output_dir = request
        .output_dir()
        .map(|dir| dir.to_string_lossy().into_owned())
        .unwrap_or_default();
    PREFERENCES_VERSION.clone_into(&mut ctx.prefs.version);
    if let Err(err) = ctx.store.save_if_enabled(&ctx.prefs) {
        warn!(error = ?err, path = %ctx.store.path().display(), "failed to save preferences");
    }
}

fn saved_path(value: &str) -> Option<PathBuf> {
    (!value.trim().is_empty()).then(|| PathBuf::from(value))
}
