//! Read-eval loop for the `husk` shell.

use std::io::{BufRead, BufReader, IsTerminal, Write};

use clap::Parser;

use crate::args::CommandLineArgs;
use crate::events;

/// Runs the shell to completion. Returns the shell's exit code.
pub(crate) fn run() -> u8 {
    let args = CommandLineArgs::parse();

    events::init_tracing(args.log_filter.as_deref());

    if let Err(e) = husk_core::interrupts::install() {
        eprintln!("husk: failed to install interrupt handler: {e}");
    }

    // Position 0 is the script name when running a script, otherwise the
    // shell's own invocation name.
    let mut positional_args = vec![];
    if let Some(script_path) = &args.script_path {
        positional_args.push(script_path.clone());
        positional_args.extend(args.script_args.iter().cloned());
    } else {
        positional_args.push(
            std::env::args()
                .next()
                .unwrap_or_else(|| String::from("husk")),
        );
    }

    let mut shell = husk_core::Shell::new(husk_core::CreateOptions { positional_args });

    if let Some(command) = &args.command {
        run_one_line(&mut shell, command.trim_end_matches('\n'));
        return shell.last_exit;
    }

    match &args.script_path {
        Some(script_path) => match std::fs::File::open(script_path) {
            Ok(file) => run_loop(&mut shell, BufReader::new(file), false),
            Err(e) => {
                eprintln!("husk: {script_path}: {e}");
                127
            }
        },
        None => {
            let interactive = std::io::stdin().is_terminal();
            run_loop(&mut shell, std::io::stdin().lock(), interactive)
        }
    }
}

/// Reads lines until EOF, stripping comments and running each through the
/// shell. Errors on one line never stop the loop.
fn run_loop(shell: &mut husk_core::Shell, mut input: impl BufRead, interactive: bool) -> u8 {
    let mut line = String::new();

    loop {
        if husk_core::interrupts::take() && interactive {
            // Fresh line after a ^C at the prompt.
            eprintln!();
        }

        if interactive {
            eprint!("% ");
            let _ = std::io::stderr().flush();
        }

        line.clear();
        match input.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                eprintln!("husk: read: {e}");
                break;
            }
        }

        strip_comment(&mut line);
        run_one_line(shell, line.trim_end_matches('\n'));
    }

    0
}

fn run_one_line(shell: &mut husk_core::Shell, line: &str) {
    if let Err(e) = shell.run_line(line) {
        eprintln!("husk: {e}");
    }
}

/// Truncates `line` at the first `#` that isn't escaped with a backslash and
/// isn't part of a `$#` expansion.
fn strip_comment(line: &mut String) {
    let mut prev = None;
    for (offset, c) in line.char_indices() {
        if c == '#' && prev != Some('$') && prev != Some('\\') {
            line.truncate(offset);
            return;
        }
        prev = Some(c);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comments_are_stripped() {
        let mut line = String::from("echo hi # a comment\n");
        strip_comment(&mut line);
        assert_eq!(line, "echo hi ");

        let mut line = String::from("# whole-line comment\n");
        strip_comment(&mut line);
        assert_eq!(line, "");
    }

    #[test]
    fn argument_count_and_escapes_survive_comment_stripping() {
        let mut line = String::from("echo $# args\n");
        strip_comment(&mut line);
        assert_eq!(line, "echo $# args\n");

        let mut line = String::from("echo \\# literal # not this\n");
        strip_comment(&mut line);
        assert_eq!(line, "echo \\# literal ");
    }
}
