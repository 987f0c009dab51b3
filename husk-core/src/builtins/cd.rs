use std::io::Write;
use std::path::PathBuf;

use clap::Parser;

use crate::builtins;

/// Change the current shell working directory.
#[derive(Parser)]
pub(crate) struct CdCommand {
    /// Target directory (defaults to the value of HOME).
    target_dir: Option<PathBuf>,
}

impl builtins::Command for CdCommand {
    fn execute(
        &self,
        context: builtins::ExecutionContext<'_>,
    ) -> Result<builtins::ExitCode, crate::error::Error> {
        let target_dir = if let Some(target_dir) = &self.target_dir {
            target_dir.clone()
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
        } else {
            writeln!(context.stderr(), "cd: HOME not set")?;
            return Ok(builtins::ExitCode::Custom(1));
        };

        if let Err(e) = std::env::set_current_dir(&target_dir) {
            writeln!(context.stderr(), "cd: {}: {e}", target_dir.display())?;
            return Ok(builtins::ExitCode::Custom(1));
        }

        Ok(builtins::ExitCode::Success)
    }
}
