use clap::Parser;

use crate::builtins;

/// Remove an environment variable.
#[derive(Parser)]
pub(crate) struct EnvUnsetCommand {
    /// Name of the variable to remove.
    name: String,
}

impl builtins::Command for EnvUnsetCommand {
    fn execute(
        &self,
        _context: builtins::ExecutionContext<'_>,
    ) -> Result<builtins::ExitCode, crate::error::Error> {
        // SAFETY: the shell is single-threaded; nothing reads the environment
        // concurrently with this removal.
        unsafe { std::env::remove_var(&self.name) };
        Ok(builtins::ExitCode::Success)
    }
}
