use clap::Parser;

use crate::builtins;

/// Exit the shell.
#[derive(Parser)]
pub(crate) struct ExitCommand {
    /// Exit status (defaults to 0).
    code: Option<u8>,
}

impl builtins::Command for ExitCommand {
    fn execute(
        &self,
        _context: builtins::ExecutionContext<'_>,
    ) -> Result<builtins::ExitCode, crate::error::Error> {
        // By contract, exit is the one builtin that terminates the whole
        // shell process rather than returning to its dispatcher.
        std::process::exit(i32::from(self.code.unwrap_or(0)));
    }
}
