use clap::Parser;

const SHORT_DESCRIPTION: &str = "a compact Unix microshell";

const LONG_DESCRIPTION: &str = r"
husk is a deliberately small Unix shell: one pipeline per line, with
POSIX-style expansion ($VAR, $(cmd), positional arguments, wildcards) and a
handful of built-in commands.
";

/// Parsed command-line arguments for the husk shell.
#[derive(Parser)]
#[clap(name = "husk",
       version,
       about = SHORT_DESCRIPTION,
       long_about = LONG_DESCRIPTION)]
pub(crate) struct CommandLineArgs {
    /// Execute the provided command and then exit.
    #[arg(short = 'c', value_name = "COMMAND")]
    pub command: Option<String>,

    /// Tracing filter directives (e.g. "expansion=debug").
    #[arg(long = "log-filter", value_name = "FILTER")]
    pub log_filter: Option<String>,

    /// Path of a script to execute.
    pub script_path: Option<String>,

    /// Arguments for the script.
    #[clap(trailing_var_arg = true, allow_hyphen_values = true)]
    pub script_args: Vec<String>,
}
