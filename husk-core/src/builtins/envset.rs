use clap::Parser;

use crate::builtins;

/// Set an environment variable.
#[derive(Parser)]
pub(crate) struct EnvSetCommand {
    /// Name of the variable to set.
    name: String,
    /// Value to give the variable.
    #[arg(allow_hyphen_values = true)]
    value: String,
}

impl builtins::Command for EnvSetCommand {
    fn execute(
        &self,
        _context: builtins::ExecutionContext<'_>,
    ) -> Result<builtins::ExitCode, crate::error::Error> {
        // SAFETY: the shell is single-threaded; nothing reads the environment
        // concurrently with this store.
        unsafe { std::env::set_var(&self.name, &self.value) };
        Ok(builtins::ExitCode::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::Command;

    #[test]
    fn values_may_begin_with_a_hyphen() -> anyhow::Result<()> {
        let command =
            EnvSetCommand::new(["envset", "HUSK_TEST_VAR_DASH", "-leading-dash"].map(String::from))?;
        assert_eq!(command.value, "-leading-dash");
        Ok(())
    }
}
