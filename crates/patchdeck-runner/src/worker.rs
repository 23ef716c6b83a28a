//! Launches the patch tool and relays its output line by line.
//!
//! # Design
//! - stdout and stderr share one pipe so the sink sees lines in the order the
//!   tool wrote them.
//! - The tool archive is re-checked right before launch; everything else was
//!   checked by the validator and may have changed since.
//! - No retries, timeouts or cancellation: the job runs until the tool exits.

use std::io::{self, BufRead, BufReader, ErrorKind as IoErrorKind, PipeReader};
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use patchdeck_core::{ErrorKind, JobOutcome, LogSink, PatchJobRequest, RuntimeInfo};
use tracing::{info, warn};

use crate::command::PatchCommand;
use crate::error::{RunnerError, RunnerResult};
use crate::runtime::ToolRuntime;

const BANNER_WIDTH: usize = 60;

/// Knobs for a [`ProcessRunner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerOptions {
    /// Write header and footer lines around the tool output.
    pub banner: bool,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self { banner: true }
    }
}

/// Runs one patch job at a time on the calling thread.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    runtime: ToolRuntime,
    options: RunnerOptions,
    runtime_info: Option<RuntimeInfo>,
}

impl ProcessRunner {
    /// Runner launching the tool through `runtime`.
    #[must_use]
    pub const fn new(runtime: ToolRuntime, options: RunnerOptions) -> Self {
        Self {
            runtime,
            options,
            runtime_info: None,
        }
    }

    /// Attach the detected runtime so the banner can name it.
    #[must_use]
    pub fn with_runtime_info(mut self, info: Option<RuntimeInfo>) -> Self {
        self.runtime_info = info;
        self
    }

    /// Run the tool for `request`, streaming every output line to `sink`.
    ///
    /// Blocks until the tool exits. Launch problems are reported as a
    /// failed outcome, never as a panic or hang.
    pub fn run(&self, request: &PatchJobRequest, sink: &dyn LogSink) -> JobOutcome {
        let command = PatchCommand::build(&self.runtime, request);
        if self.options.banner {
            self.write_header(request, &command, sink);
        }

        let started = Instant::now();
        let outcome = match execute(&command, request, sink) {
            Ok(status) => classify_exit(status, started.elapsed()),
            Err(err) => classify_error(&err, &self.runtime),
        };

        match &outcome {
            JobOutcome::Success { elapsed } => info!(
                output = %request.output_path.display(),
                elapsed_ms = elapsed.as_millis(),
                "patch job completed"
            ),
            JobOutcome::Failure { kind, message } => {
                warn!(kind = %kind, message = %message, "patch job failed");
            }
        }

        if self.options.banner {
            write_footer(request, &outcome, sink);
        }
        outcome
    }

    fn write_header(&self, request: &PatchJobRequest, command: &PatchCommand, sink: &dyn LogSink) {
        let heavy = "=".repeat(BANNER_WIDTH);
        sink.line(&heavy);
        sink.line("Starting patch job");
        sink.line(&heavy);
        sink.line(&format!("Input APK: {}", request.input_path.display()));
        sink.line(&format!("Output file: {}", request.output_path.display()));
        if let Some(info) = &self.runtime_info {
            sink.line(&format!("Java version: {}", info.summary()));
        }
        sink.line("Using all available patches");
        sink.line(&format!("Command: {command}"));
        sink.line(&"-".repeat(BANNER_WIDTH));
    }
}

fn write_footer(request: &PatchJobRequest, outcome: &JobOutcome, sink: &dyn LogSink) {
    sink.line(&"-".repeat(BANNER_WIDTH));
    match outcome {
        JobOutcome::Success { elapsed } => {
            sink.line(&format!(
                "Patching completed successfully in {:.1}s!",
                elapsed.as_secs_f64()
            ));
            sink.line(&format!(
                "Patched APK saved as: {}",
                request.output_path.display()
            ));
        }
        JobOutcome::Failure { message, .. } => sink.line(message),
    }
    sink.line(&"=".repeat(BANNER_WIDTH));
}

fn execute(
    command: &PatchCommand,
    request: &PatchJobRequest,
    sink: &dyn LogSink,
) -> RunnerResult<ExitStatus> {
    if !request.tool_path.is_file() {
        return Err(RunnerError::ToolMissing {
            path: request.tool_path.clone(),
        });
    }

    let (reader, writer) = io::pipe().map_err(|source| RunnerError::io("runner.pipe", source))?;
    let mut child = {
        let stderr_writer = writer
            .try_clone()
            .map_err(|source| RunnerError::io("runner.pipe", source))?;
        let mut process = command.to_command();
        process
            .stdin(Stdio::null())
            .stdout(writer)
            .stderr(stderr_writer);
        info!(command = %command, "launching patch tool");
        // `process` holds the parent's copies of the write end; it must be
        // dropped before reading or EOF never arrives.
        process.spawn().map_err(|source| {
            if source.kind() == IoErrorKind::NotFound {
                RunnerError::RuntimeMissing {
                    program: command.program().to_path_buf(),
                }
            } else {
                RunnerError::io("runner.spawn", source)
            }
        })?
    };

    let relayed = relay_lines(reader, sink);
    let status = child
        .wait()
        .map_err(|source| RunnerError::io("runner.wait", source))?;
    relayed?;
    Ok(status)
}

fn relay_lines(reader: PipeReader, sink: &dyn LogSink) -> RunnerResult<()> {
    let mut reader = BufReader::new(reader);
    let mut buffer = Vec::new();
    loop {
        buffer.clear();
        let read = reader
            .read_until(b'\n', &mut buffer)
            .map_err(|source| RunnerError::io("runner.read", source))?;
        if read == 0 {
            return Ok(());
        }
        let line = String::from_utf8_lossy(&buffer);
        sink.line(trim_line(&line));
    }
}

fn trim_line(line: &str) -> &str {
    line.trim_end_matches(['\r', '\n'])
}

fn classify_exit(status: ExitStatus, elapsed: Duration) -> JobOutcome {
    if status.success() {
        return JobOutcome::Success { elapsed };
    }
    match status.code() {
        Some(code) => JobOutcome::failure(
            ErrorKind::PatchMismatch,
            format!("Patching failed with return code {code}"),
        ),
        None => JobOutcome::failure(ErrorKind::Unknown, terminated_message(status)),
    }
}

#[cfg(unix)]
fn terminated_message(status: ExitStatus) -> String {
    use std::os::unix::process::ExitStatusExt;

    status.signal().map_or_else(
        || "Patch tool terminated without an exit code".to_string(),
        |signal| format!("Patch tool terminated by signal {signal}"),
    )
}

#[cfg(not(unix))]
fn terminated_message(_status: ExitStatus) -> String {
    "Patch tool terminated without an exit code".to_string()
}

fn classify_error(err: &RunnerError, runtime: &ToolRuntime) -> JobOutcome {
    match err {
        RunnerError::ToolMissing { path } => JobOutcome::failure(
            ErrorKind::RuntimeNotFound,
            format!("patch tool not found: {}", path.display()),
        ),
        RunnerError::RuntimeMissing { .. } => JobOutcome::failure(
            ErrorKind::RuntimeNotFound,
            format!(
                "Java not found ({}). Please make sure Java is installed and available in your PATH.",
                runtime.program().display()
            ),
        ),
        RunnerError::Io { source, .. } => {
            JobOutcome::failure(ErrorKind::Unknown, format!("Exception occurred: {source}"))
        }
        other => JobOutcome::failure(ErrorKind::Unknown, format!("Exception occurred: {other}")),
    }
}
