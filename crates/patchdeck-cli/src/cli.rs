//! Argument parsing, startup, and command dispatch.

use std::env;
use std::path::{Path, PathBuf};

use chrono::Local;
use clap::{Args, Parser, Subcommand, ValueEnum};
use patchdeck_config::{LoadOutcome, Preferences, PreferencesStore};
use patchdeck_runner::ToolRuntime;
use patchdeck_telemetry::{
    DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, SESSION_TARGET, init_logging, session_log_path,
};
use tracing::{debug, error, info, warn};

use crate::commands::check::handle_check;
use crate::commands::patch::handle_patch;
use crate::commands::prefs::{handle_prefs_reset, handle_prefs_set, handle_prefs_show};
use crate::commands::shell::handle_shell;

const DEFAULT_RUNTIME: &str = "java";

/// Parses CLI arguments, sets up logging, and executes the requested
/// command. Returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    let home = resolve_home(cli.home.clone());
    let store = PreferencesStore::new(&home);
    let (prefs, load_outcome) = store.load();

    let log_file = prefs
        .save_logs_enabled
        .then(|| session_log_path(&home, &Local::now()));
    let logging = LoggingConfig {
        level: &cli.log_level,
        format: cli.log_format.map_or_else(LogFormat::infer, LogFormat::from),
        log_file: log_file.as_deref(),
    };
    if let Err(err) = init_logging(&logging) {
        eprintln!("warning: {:#}", anyhow::Error::new(err));
    }
    info!(
        "Patchdeck v{} started - {}",
        env!("CARGO_PKG_VERSION"),
        if log_file.is_some() { "Logs saved" } else { "Console only" }
    );
    match &load_outcome {
        LoadOutcome::Loaded => debug!(path = %store.path().display(), "preferences loaded"),
        LoadOutcome::Missing => debug!(path = %store.path().display(), "no saved preferences"),
        LoadOutcome::Malformed { reason } => warn!(
            path = %store.path().display(),
            reason = %reason,
            "config load error (using defaults)"
        ),
    }

    let ctx = AppContext {
        home,
        store,
        prefs,
        runtime: ToolRuntime::new(cli.runtime),
    };

    match dispatch(cli.command.unwrap_or(Command::Shell), ctx).await {
        Ok(()) => 0,
        Err(err) => {
            error!(
                target: SESSION_TARGET,
                exit_code = err.exit_code(),
                "{}",
                err.display_message()
            );
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

async fn dispatch(command: Command, ctx: AppContext) -> CliResult<()> {
    match command {
        Command::Patch(args) => handle_patch(ctx, args).await,
        Command::Check(args) => handle_check(&ctx, args).await,
        Command::Prefs(prefs) => match prefs {
            PrefsCommand::Show => handle_prefs_show(&ctx),
            PrefsCommand::Set(args) => handle_prefs_set(ctx, &args),
            PrefsCommand::Reset => handle_prefs_reset(&ctx),
        },
        Command::Shell => handle_shell(ctx).await,
    }
}

/// `--home`, else the executable's directory, else the working directory.
fn resolve_home(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| {
            env::current_exe()
                .ok()
                .and_then(|exe| exe.parent().map(Path::to_path_buf))
        })
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

#[derive(Parser)]
#[command(
    name = "patchdeck",
    version,
    about = "Front-end for the APK patch tool: validate inputs, run patches, keep settings"
)]
pub(crate) struct Cli {
    #[arg(
        long,
        global = true,
        env = "PATCHDECK_HOME",
        help = "Directory holding config.json and logs/ (defaults to the executable's directory)"
    )]
    home: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        env = "PATCHDECK_LOG_LEVEL",
        default_value = DEFAULT_LOG_LEVEL
    )]
    log_level: String,
    #[arg(long, global = true, value_enum, help = "Console log format")]
    log_format: Option<LogFormatArg>,
    #[arg(
        long,
        global = true,
        env = "PATCHDECK_RUNTIME",
        default_value = DEFAULT_RUNTIME,
        help = "Java executable used to run the patch tool"
    )]
    runtime: PathBuf,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Validate the inputs and run one patch job.
    Patch(PatchArgs),
    /// Report the Java runtime and free disk space.
    Check(CheckArgs),
    /// Inspect or edit saved preferences.
    #[command(subcommand)]
    Prefs(PrefsCommand),
    /// Interactive session (the default).
    Shell,
}

#[derive(Args)]
pub(crate) struct PatchArgs {
    #[arg(long, help = "Patch tool JAR (defaults to the last one used)")]
    pub(crate) tool: Option<PathBuf>,
    #[arg(long, help = "Patches RVP file (defaults to the last one used)")]
    pub(crate) patches: Option<PathBuf>,
    #[arg(long, help = "APK to patch")]
    pub(crate) input: PathBuf,
    #[arg(long, help = "Output directory (defaults to the APK's directory)")]
    pub(crate) output: Option<PathBuf>,
}

#[derive(Args, Default)]
pub(crate) struct CheckArgs {
    #[arg(long, help = "Path whose volume is checked (defaults to the home directory)")]
    pub(crate) path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub(crate) enum PrefsCommand {
    /// Print every saved preference.
    Show,
    /// Change one preference and save it.
    Set(PrefsSetArgs),
    /// Restore defaults and save them.
    Reset,
}

#[derive(Args)]
pub(crate) struct PrefsSetArgs {
    #[arg(help = "Preference key, e.g. save_logs_enabled")]
    pub(crate) key: String,
    #[arg(help = "New value")]
    pub(crate) value: String,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub(crate) enum LogFormatArg {
    Pretty,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Pretty => Self::Pretty,
            LogFormatArg::Json => Self::Json,
        }
    }
}

/// Everything a command handler needs from startup.
#[derive(Debug)]
pub(crate) struct AppContext {
    pub(crate) home: PathBuf,
    pub(crate) store: PreferencesStore,
    pub(crate) prefs: Preferences,
    pub(crate) runtime: ToolRuntime,
}

#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Job(String),
    Failure(anyhow::Error),
}

pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn job(message: impl Into<String>) -> Self {
        Self::Job(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Job(_) => 1,
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) | Self::Job(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_shell() {
        let cli = Cli::try_parse_from(["patchdeck", "--home", "/tmp/p"]).expect("parse");
        assert!(cli.command.is_none());
        assert_eq!(cli.home, Some(PathBuf::from("/tmp/p")));
    }

    #[test]
    fn patch_arguments_parse() {
        let cli = Cli::try_parse_from([
            "patchdeck",
            "patch",
            "--tool",
            "cli.jar",
            "--patches",
            "patches.rvp",
            "--input",
            "app.apk",
            "--runtime",
            "/opt/jdk/bin/java",
        ])
        .expect("parse");
        assert_eq!(cli.runtime, PathBuf::from("/opt/jdk/bin/java"));
        match cli.command {
            Some(Command::Patch(args)) => {
                assert_eq!(args.tool, Some(PathBuf::from("cli.jar")));
                assert_eq!(args.input, PathBuf::from("app.apk"));
                assert!(args.output.is_none());
            }
            _ => panic!("expected patch command"),
        }
    }

    #[test]
    fn resolve_home_prefers_explicit_value() {
        assert_eq!(
            resolve_home(Some(PathBuf::from("/srv/patchdeck"))),
            PathBuf::from("/srv/patchdeck")
        );
        assert!(!resolve_home(None).as_os_str().is_empty());
    }

    #[test]
    fn cli_error_exit_codes() {
        assert_eq!(CliError::job("failed").exit_code(), 1);
        assert_eq!(CliError::validation("bad").exit_code(), 2);
        let failure = CliError::failure(anyhow!("inner").context("outer"));
        assert_eq!(failure.exit_code(), 3);
        assert_eq!(failure.display_message(), "outer: inner");
    }
}
