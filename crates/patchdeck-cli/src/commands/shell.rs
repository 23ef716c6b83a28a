//! Interactive session: a line-oriented front-end over [`AppState`].
//!
//! # Design
//! - The loop owns the state. Workers (startup check, patch job, CPU monitor)
//!   post [`AppEvent`]s through a channel and never touch it directly.
//! - Every message goes through the session log; the loop prints new entries
//!   after each command or event.
//! - At most one patch job runs at a time; quitting waits for it to finish.

use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use patchdeck_config::validate::parse_toggle;
use patchdeck_core::describe_failure;
use patchdeck_runner::{JobGuard, ProcessRunner, RunnerOptions, ToolRuntime, validate};
use patchdeck_telemetry::{MonitorSettings, SystemDiskProbe, SystemMonitor};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::detect_runtime;
use crate::cli::{AppContext, CliError, CliResult};
use crate::events::{AppEvent, ChannelSink};
use crate::output::{about_text, help_text, render_status};
use crate::state::{AppState, Status};

const PROMPT: &str = "patchdeck> ";

/// One parsed line of shell input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ShellCommand {
    Tool(PathBuf),
    Patches(PathBuf),
    Apk(PathBuf),
    Output(PathBuf),
    Drop(PathBuf),
    Export(PathBuf),
    Prefs {
        logs: Option<bool>,
        config: Option<bool>,
    },
    Status,
    Patch,
    Clear,
    ClearLog,
    Log(Option<usize>),
    Help,
    About,
    Quit,
    Empty,
}

/// Parse one input line. The error is a message for the session log.
pub(crate) fn parse_shell_command(line: &str) -> Result<ShellCommand, String> {
    let line = line.trim();
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(word, rest)| (word, rest.trim()));

    let command = match word.to_ascii_lowercase().as_str() {
        "" => ShellCommand::Empty,
        "tool" => ShellCommand::Tool(path_argument("tool", rest)?),
        "patches" => ShellCommand::Patches(path_argument("patches", rest)?),
        "apk" => ShellCommand::Apk(path_argument("apk", rest)?),
        "output" => ShellCommand::Output(path_argument("output", rest)?),
        "drop" => ShellCommand::Drop(path_argument("drop", rest)?),
        "export" => ShellCommand::Export(path_argument("export", rest)?),
        "prefs" | "settings" => parse_prefs(rest)?,
        "status" => ShellCommand::Status,
        "patch" => ShellCommand::Patch,
        "clear" => ShellCommand::Clear,
        "clear-log" => ShellCommand::ClearLog,
        "log" => ShellCommand::Log(parse_count(rest)?),
        "help" | "?" => ShellCommand::Help,
        "about" => ShellCommand::About,
        "quit" | "exit" => ShellCommand::Quit,
        other => return Err(format!("Unknown command: {other} (type `help` for commands)")),
    };
    Ok(command)
}

/// Rest of the line as a path, with one pair of surrounding quotes removed.
fn path_argument(command: &str, rest: &str) -> Result<PathBuf, String> {
    let unquoted = ['"', '\'']
        .into_iter()
        .find_map(|quote| {
            rest.strip_prefix(quote)
                .and_then(|inner| inner.strip_suffix(quote))
        })
        .unwrap_or(rest);
    if unquoted.is_empty() {
        return Err(format!("Usage: {command} <path>"));
    }
    Ok(PathBuf::from(unquoted))
}

fn parse_count(rest: &str) -> Result<Option<usize>, String> {
    if rest.is_empty() {
        return Ok(None);
    }
    rest.parse()
        .map(Some)
        .map_err(|_| format!("Usage: log [count] (got {rest})"))
}

fn parse_prefs(rest: &str) -> Result<ShellCommand, String> {
    let mut logs = None;
    let mut config = None;
    let mut words = rest.split_whitespace();
    while let Some(name) = words.next() {
        let value = words
            .next()
            .ok_or_else(|| format!("Missing value for {name} (use on or off)"))?;
        let slot = match name {
            "logs" => &mut logs,
            "config" => &mut config,
            other => return Err(format!("Unknown setting: {other} (use logs or config)")),
        };
        *slot = Some(parse_toggle(name, value).map_err(|_| {
            format!("Invalid value for {name}: {value} (use on or off)")
        })?);
    }
    Ok(ShellCommand::Prefs { logs, config })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

struct Shell {
    state: AppState,
    runtime: ToolRuntime,
    guard: JobGuard,
    events: ChannelSink,
    printed: usize,
}

impl Shell {
    fn new(ctx: AppContext, events: ChannelSink) -> Self {
        Self {
            state: AppState::new(ctx.prefs, ctx.store),
            runtime: ctx.runtime,
            guard: JobGuard::new(),
            events,
            printed: 0,
        }
    }

    fn is_busy(&self) -> bool {
        self.state.status == Status::Busy || self.guard.is_busy()
    }

    /// Detect the runtime and free space off the loop; results arrive as events.
    fn start_system_check(&self, home: PathBuf) {
        let runtime = self.runtime.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            events.post(AppEvent::RuntimeDetected(detect_runtime(runtime).await));
            let disk = tokio::task::spawn_blocking(move || SystemDiskProbe.disk_usage(&home))
                .await
                .map_err(|err| err.to_string())
                .and_then(|usage| usage.map_err(|err| err.to_string()));
            events.post(AppEvent::DiskChecked(disk));
        });
    }

    async fn execute(&mut self, command: ShellCommand) -> Flow {
        match command {
            ShellCommand::Empty => {}
            ShellCommand::Tool(path) => {
                self.state.log(&format!("Patch tool: {}", path.display()));
                self.state.set_tool(path);
            }
            ShellCommand::Patches(path) => {
                self.state.log(&format!("Patches: {}", path.display()));
                self.state.set_patches(path);
            }
            ShellCommand::Apk(path) => {
                self.state.set_input(path);
                if let Some(output) = self.state.output_path() {
                    self.state.log(&format!("Output file: {}", output.display()));
                }
            }
            ShellCommand::Output(path) => {
                self.state.log(&format!("Output directory: {}", path.display()));
                self.state.set_output_dir(path);
            }
            ShellCommand::Drop(path) => {
                self.state.drop_file(path);
            }
            ShellCommand::Export(path) => match self.state.log.export(&path) {
                Ok(()) => self.state.log(&format!("Log exported to: {}", path.display())),
                Err(err) => {
                    warn!(error = ?err, "log export failed");
                    self.state.log(&format!("Failed to export log: {err}"));
                }
            },
            ShellCommand::Prefs { logs, config } => {
                if logs.is_none() && config.is_none() {
                    self.state.log(&format!(
                        "Settings - Logs: {}, Config: {}",
                        on_off(self.state.prefs.save_logs_enabled),
                        on_off(self.state.prefs.save_config_enabled)
                    ));
                } else {
                    let save_logs = logs.unwrap_or(self.state.prefs.save_logs_enabled);
                    let save_config = config.unwrap_or(self.state.prefs.save_config_enabled);
                    self.state.update_preferences(save_logs, save_config);
                }
            }
            ShellCommand::Status => {
                let status = render_status(&self.state);
                self.state.log(&status);
            }
            ShellCommand::Patch => self.start_patch().await,
            ShellCommand::Clear => {
                self.state.clear_all();
                self.printed = 0;
            }
            ShellCommand::ClearLog => {
                self.state.log.clear();
                self.printed = 0;
            }
            ShellCommand::Log(count) => {
                let lines = count.map_or_else(
                    || self.state.log.entries(),
                    |count| self.state.log.tail(count),
                );
                for line in lines {
                    println!("{line}");
                }
            }
            ShellCommand::Help => self.state.log(&help_text()),
            ShellCommand::About => self.state.log(&about_text()),
            ShellCommand::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    /// Validate the selection and hand the job to a blocking worker.
    async fn start_patch(&mut self) {
        if self.is_busy() {
            self.state.log("A patch job is already running");
            return;
        }

        let runtime = detect_runtime(self.runtime.clone()).await;
        let request = self.state.request();
        let issues = validate(&request, &runtime, Some(&SystemDiskProbe));
        if !issues.is_empty() {
            for issue in &issues {
                self.state.log(&describe_failure(issue.kind, &issue.message));
            }
            return;
        }

        let Some(permit) = self.guard.try_acquire() else {
            self.state.log("A patch job is already running");
            return;
        };
        self.state.begin_job();
        info!(input = %request.input_path.display(), "patch job started");

        let runner = ProcessRunner::new(self.runtime.clone(), RunnerOptions::default())
            .with_runtime_info(runtime.ok());
        let events = self.events.clone();
        tokio::task::spawn_blocking(move || {
            let outcome = runner.run(&request, &events);
            events.post(AppEvent::JobFinished(outcome));
            drop(permit);
        });
    }

    /// Print log entries added since the last flush.
    fn flush(&mut self) {
        let entries = self.state.log.entries();
        let start = self.printed.min(entries.len());
        for line in &entries[start..] {
            println!("{line}");
        }
        self.printed = entries.len();
    }
}

pub(crate) async fn handle_shell(ctx: AppContext) -> CliResult<()> {
    let home = ctx.home.clone();
    let (sender, mut receiver) = mpsc::unbounded_channel();
    let sink = ChannelSink::new(sender);
    let mut shell = Shell::new(ctx, sink.clone());

    shell.state.log(&format!(
        "Patchdeck v{} - type `help` for commands",
        env!("CARGO_PKG_VERSION")
    ));
    shell.start_system_check(home);

    let mut monitor = SystemMonitor::new(MonitorSettings::default());
    if let Err(err) = monitor.start(Arc::new(sink)) {
        warn!(error = ?err, "system monitor unavailable");
    }

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut quitting = false;
    shell.flush();
    prompt();

    loop {
        tokio::select! {
            line = input.next_line(), if !quitting => {
                let line = line.map_err(|err| {
                    CliError::failure(anyhow::Error::new(err).context("failed to read command"))
                })?;
                match line {
                    None => quitting = true,
                    Some(line) => match parse_shell_command(&line) {
                        Ok(command) => {
                            debug!(?command, "shell command");
                            quitting = shell.execute(command).await == Flow::Quit;
                        }
                        Err(message) => shell.state.log(&message),
                    },
                }
                if quitting && shell.is_busy() {
                    shell.state.log("Waiting for the running patch job to finish...");
                }
                shell.flush();
                if !quitting {
                    prompt();
                }
            }
            Some(event) = receiver.recv() => {
                shell.state.apply(event);
                shell.flush();
            }
            else => break,
        }
        if quitting && shell.state.status != Status::Busy {
            break;
        }
    }

    monitor.stop();
    shell.state.persist();
    info!("Patchdeck session ended");
    Ok(())
}

fn prompt() {
    print!("{PROMPT}");
    let _ = std::io::stdout().flush();
}

const fn on_off(value: bool) -> &'static str {
    if value { "ON" } else { "OFF" }
}
