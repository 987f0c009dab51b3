//! Infrastructure for shell built-in commands.

use std::collections::HashMap;

use clap::Parser;

use crate::error;
use crate::openfiles::OpenFile;
use crate::shell::Shell;
use crate::trace_categories;

mod cd;
mod envset;
mod envunset;
mod exit;
mod shift;
mod sstat;
mod unshift;

/// Exit codes for built-in commands.
pub enum ExitCode {
    /// The command was successful.
    Success,
    /// The inputs to the command were invalid.
    InvalidUsage,
    /// The command returned a specific custom numerical exit code.
    Custom(u8),
}

impl ExitCode {
    /// The numerical exit status this code folds into `last_exit`.
    pub fn status(&self) -> u8 {
        match self {
            Self::Success => 0,
            Self::InvalidUsage => 1,
            Self::Custom(code) => *code,
        }
    }
}

/// Encapsulates the context in which a built-in command executes. Built-ins
/// run synchronously in the shell's own process; no child is forked.
pub struct ExecutionContext<'a> {
    /// The shell in which the command is being executed.
    pub shell: &'a mut Shell,
    /// Where the command's regular output should be written.
    pub output: &'a mut OpenFile,
}

impl ExecutionContext<'_> {
    /// Returns a writer for the command's diagnostic output.
    pub fn stderr(&self) -> impl std::io::Write {
        std::io::stderr()
    }
}

/// Trait implemented by built-in shell commands.
pub trait Command: Parser {
    /// Instantiates the built-in command with the given arguments.
    ///
    /// # Arguments
    ///
    /// * `args` - The arguments to the command, including its name.
    fn new<I>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = String>,
    {
        Self::try_parse_from(args)
    }

    /// Executes the built-in command in the provided context.
    fn execute(&self, context: ExecutionContext<'_>) -> Result<ExitCode, error::Error>;
}

/// Type of a function implementing a built-in command.
pub type CommandExecuteFunc =
    fn(ExecutionContext<'_>, Vec<String>) -> Result<ExitCode, error::Error>;

/// Encapsulates a registration for a built-in command.
#[derive(Clone)]
pub struct Registration {
    /// Function to execute the builtin.
    pub execute_func: CommandExecuteFunc,
}

/// Returns a built-in command registration, given an implementation of the
/// [`Command`] trait.
pub fn builtin<B: Command>() -> Registration {
    Registration {
        execute_func: exec_builtin::<B>,
    }
}

fn exec_builtin<B: Command>(
    context: ExecutionContext<'_>,
    args: Vec<String>,
) -> Result<ExitCode, error::Error> {
    tracing::debug!(target: trace_categories::BUILTINS, "dispatching: {}", args[0]);

    let command = match B::new(args) {
        Ok(command) => command,
        Err(e) => {
            // clap renders its own usage diagnostics.
            let _ = e.print();
            return Ok(ExitCode::InvalidUsage);
        }
    };

    command.execute(context)
}

/// Returns the default set of built-in command registrations.
pub(crate) fn default_builtins() -> HashMap<String, Registration> {
    HashMap::from([
        (String::from("cd"), builtin::<cd::CdCommand>()),
        (String::from("envset"), builtin::<envset::EnvSetCommand>()),
        (
            String::from("envunset"),
            builtin::<envunset::EnvUnsetCommand>(),
        ),
        (String::from("exit"), builtin::<exit::ExitCommand>()),
        (String::from("shift"), builtin::<shift::ShiftCommand>()),
        (String::from("sstat"), builtin::<sstat::SstatCommand>()),
        (String::from("unshift"), builtin::<unshift::UnshiftCommand>()),
    ])
}
