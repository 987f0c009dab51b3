use std::io::Write;

use clap::Parser;

use crate::builtins;

/// Hide leading positional arguments from `$N` addressing.
#[derive(Parser)]
pub(crate) struct ShiftCommand {
    /// Number of positions to shift the arguments by (defaults to 1).
    #[arg(allow_negative_numbers = true)]
    n: Option<i64>,
}

impl builtins::Command for ShiftCommand {
    fn execute(
        &self,
        context: builtins::ExecutionContext<'_>,
    ) -> Result<builtins::ExitCode, crate::error::Error> {
        let n = self.n.unwrap_or(1);

        if n < 0 {
            writeln!(context.stderr(), "shift: count may not be negative")?;
            return Ok(builtins::ExitCode::InvalidUsage);
        }

        #[allow(clippy::cast_sign_loss)]
        let n = n as usize;

        let max_offset = context.shell.positional_args.len() - 1;
        if context.shell.shift_offset + n > max_offset {
            writeln!(context.stderr(), "shift: cannot shift that far")?;
            return Ok(builtins::ExitCode::InvalidUsage);
        }

        context.shell.shift_offset += n;

        Ok(builtins::ExitCode::Success)
    }
}
