//! Renderers and help text for the terminal front-end.

use std::fmt::Write as _;
use std::path::Path;

use patchdeck_config::{PreferenceKey, Preferences};

use crate::state::AppState;

const APP_NAME: &str = "Patchdeck";
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
const APP_LICENSE: &str = env!("CARGO_PKG_LICENSE");

pub(crate) const SHELL_COMMANDS: &str = "\
COMMANDS:
  tool <path>        select the patch tool JAR
  patches <path>     select the patches RVP file
  apk <path>         select the APK to patch (sets the output next to it)
  output <dir>       override the output directory
  drop <path>        select a file by its extension (.jar, .rvp, .apk)
  status             show the current selection and system status
  patch              validate the selection and start patching
  clear              reset all paths and the log
  clear-log          clear the log
  log [count]        print the whole log, or only its last lines
  export <file>      save the log to a file
  prefs [logs on|off] [config on|off]
                     show or change settings
  help               usage, requirements, and troubleshooting
  about              version and license
  quit | exit        leave (waits for a running job)";

pub(crate) const USAGE: &str = "\
USAGE INSTRUCTIONS:

1. Select the patch tool JAR file (`tool` or `drop`)
2. Select the patches RVP file (`patches` or `drop`)
3. Choose the APK file to patch (`apk` or `drop`)
4. The output directory is set to the APK's location automatically
5. Run `patch` to start the process
6. Follow progress in the log output

AUTOMATIC FEATURES:
- JAR and RVP paths are remembered between sessions
- Output directory automatically matches the APK file location
- Output filename gets a '-patched' suffix automatically

SETTINGS:
- Logs: save a session log under logs/ (applies from the next session)
- Config: save the selection and settings between sessions

Files and the system are validated before every patch run.";

pub(crate) const REQUIREMENTS: &str = "\
REQUIREMENTS:

- Java 8+ (Java 11+ recommended for best compatibility)
- Patch tool JAR file (from the tool's official releases)
- Patches RVP file (from the official releases)
- APK file to patch (original app from a trusted source)

Ensure all files come from official sources to avoid security issues.";

pub(crate) const TROUBLESHOOTING: &str = "\
COMMON ISSUES:

- Java not found: install Java and ensure it is in PATH (or pass --runtime)
- File not found: check file paths and permissions
- Patching failed: ensure the APK version matches the patches
- Out of disk space: free space or use a smaller APK

TIPS:
- Check the log output for detailed error information
- Keep at least 2 GiB free (three times the APK size is required)
- Use original APK files from trusted sources
- Keep the patch tool and patches up to date

FILE LOCATIONS:
- Configuration: config.json (in the home directory)
- Logs: logs/ folder (if enabled in settings)";

pub(crate) fn help_text() -> String {
    [SHELL_COMMANDS, USAGE, REQUIREMENTS, TROUBLESHOOTING].join("\n\n")
}

pub(crate) fn about_text() -> String {
    format!(
        "{APP_NAME} v{APP_VERSION}\nLicense: {APP_LICENSE}\n\n\
         A terminal front-end for the APK patch tool: select the tool, the\n\
         patches, and an APK, then patch with live log output, pre-flight\n\
         validation, and remembered settings."
    )
}

pub(crate) fn render_status(state: &AppState) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "status:   {}", state.status.label());
    let _ = writeln!(text, "system:   {}", state.system_status);
    let _ = writeln!(text, "java:     {}", state.runtime_status);
    let _ = writeln!(text, "tool:     {}", display_or_unset(state.tool_path.as_deref()));
    let _ = writeln!(text, "patches:  {}", display_or_unset(state.patches_path.as_deref()));
    let _ = writeln!(text, "apk:      {}", display_or_unset(state.input_path.as_deref()));
    let _ = writeln!(text, "output:   {}", display_or_unset(state.output_path().as_deref()));
    let _ = write!(
        text,
        "settings: logs {}, config {}",
        on_off(state.prefs.save_logs_enabled),
        on_off(state.prefs.save_config_enabled)
    );
    text
}

pub(crate) fn render_preferences(prefs: &Preferences, file: &Path) -> String {
    let mut text = format!("file: {}", file.display());
    for key in PreferenceKey::ALL {
        let _ = write!(text, "\n{}: {}", key.as_str(), prefs.get(key));
    }
    text
}

fn display_or_unset(path: Option<&Path>) -> String {
    path.map_or_else(|| "<not set>".to_string(), |path| path.display().to_string())
}

const fn on_off(value: bool) -> &'static str {
    if value { "on" } else { "off" }
}
