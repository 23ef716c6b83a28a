//! Argument vector for a patch invocation.

use std::ffi::OsString;
use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};
use std::process::Command;

use patchdeck_core::PatchJobRequest;

use crate::runtime::ToolRuntime;

/// `<runtime> -jar <tool> patch -p <patches> -o <output> <input>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchCommand {
    program: PathBuf,
    args: Vec<OsString>,
}

impl PatchCommand {
    /// Build the invocation for `request`. The argument order is fixed.
    #[must_use]
    pub fn build(runtime: &ToolRuntime, request: &PatchJobRequest) -> Self {
        let args = vec![
            OsString::from("-jar"),
            request.tool_path.clone().into_os_string(),
            OsString::from("patch"),
            OsString::from("-p"),
            request.patches_path.clone().into_os_string(),
            OsString::from("-o"),
            request.output_path.clone().into_os_string(),
            request.input_path.clone().into_os_string(),
        ];
        Self {
            program: runtime.program().to_path_buf(),
            args,
        }
    }

    /// Runtime executable.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments following the program.
    #[must_use]
    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// A `Command` with program and arguments set; stdio is left to the caller.
    #[must_use]
    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command
    }
}

impl Display for PatchCommand {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.program.display())?;
        for arg in &self.args {
            let arg = arg.to_string_lossy();
            if arg.contains(char::is_whitespace) {
                write!(formatter, " \"{arg}\"")?;
            } else {
                write!(formatter, " {arg}")?;
            }
        }
        Ok(())
    }
}
