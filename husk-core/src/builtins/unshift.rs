use std::io::Write;

use clap::Parser;

use crate::builtins;

/// Restore positional arguments previously hidden with `shift`.
#[derive(Parser)]
pub(crate) struct UnshiftCommand {
    /// Number of positions to restore (defaults to the whole shift offset).
    #[arg(allow_negative_numbers = true)]
    n: Option<i64>,
}

impl builtins::Command for UnshiftCommand {
    fn execute(
        &self,
        context: builtins::ExecutionContext<'_>,
    ) -> Result<builtins::ExitCode, crate::error::Error> {
        let Some(n) = self.n else {
            context.shell.shift_offset = 0;
            return Ok(builtins::ExitCode::Success);
        };

        if n < 0 {
            writeln!(context.stderr(), "unshift: count may not be negative")?;
            return Ok(builtins::ExitCode::InvalidUsage);
        }

        #[allow(clippy::cast_sign_loss)]
        let n = n as usize;

        if n > context.shell.shift_offset {
            writeln!(context.stderr(), "unshift: cannot unshift that far")?;
            return Ok(builtins::ExitCode::InvalidUsage);
        }

        context.shell.shift_offset -= n;

        Ok(builtins::ExitCode::Success)
    }
}
