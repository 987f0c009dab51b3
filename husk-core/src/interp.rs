//! Turns one input line into built-in dispatch or running child processes
//! with correctly wired file descriptors and exit-status bookkeeping.

use std::os::unix::process::ExitStatusExt;
use std::process::{Child, Command, ExitStatus, Stdio};

use crate::builtins;
use crate::error;
use crate::expansion;
use crate::openfiles::{self, OpenFile};
use crate::shell::Shell;
use crate::trace_categories;
use crate::words;

/// Encapsulates the result of running an input line.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExecutionResult {
    /// The numerical exit code of the command.
    pub exit_code: u8,
}

impl ExecutionResult {
    /// Returns a new `ExecutionResult` with the given exit code.
    pub fn new(exit_code: u8) -> Self {
        Self { exit_code }
    }

    /// Returns whether the command was successful.
    pub const fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Policy for handling the final child spawned for a line.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) enum WaitPolicy {
    /// Block until the child's exit status is available and fold it into the
    /// shell's `last_exit`.
    #[default]
    Wait,
    /// Return the child immediately; the caller owns waiting for it.
    NoWait,
}

/// Parameters for running one input line.
#[derive(Default)]
pub(crate) struct ExecutionParameters {
    /// Substitute stdin for the first pipeline segment; `None` means the
    /// shell's own stdin.
    pub stdin: Option<OpenFile>,
    /// Substitute stdout for the last pipeline segment; `None` means the
    /// shell's own stdout.
    pub stdout: Option<OpenFile>,
    /// Whether to wait for the final spawned child.
    pub wait: WaitPolicy,
}

/// Expands `line` once, then executes it: a single segment is tokenized and
/// dispatched (built-in or spawned child); a line containing unescaped `|`
/// characters becomes a pipeline. Returns the final child when the caller
/// asked not to wait for it.
pub(crate) fn process_line(
    shell: &mut Shell,
    line: &str,
    params: ExecutionParameters,
) -> Result<Option<Child>, error::Error> {
    let expanded = expansion::expand(shell, line)?;
    let segments = split_pipeline(&expanded);

    let result = if segments.len() <= 1 {
        run_segment(
            shell,
            segments.first().copied().unwrap_or(""),
            params.stdin,
            params.stdout,
            params.wait,
        )
    } else {
        run_pipeline(shell, &segments, params)
    };

    shell.reap_children();
    result
}

/// Splits an expanded line on `|` characters that are neither inside double
/// quotes nor escaped with a backslash.
fn split_pipeline(line: &str) -> Vec<&str> {
    let mut segments = vec![];
    let mut in_quotes = false;
    let mut escaped = false;
    let mut segment_start = 0;

    for (offset, c) in line.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => in_quotes = !in_quotes,
            '|' if !in_quotes => {
                segments.push(&line[segment_start..offset]);
                segment_start = offset + 1;
            }
            _ => {}
        }
    }
    segments.push(&line[segment_start..]);

    segments
}

/// Runs one pipeline segment: tokenizes it (with no re-expansion), then
/// either dispatches a built-in in the shell's own process or spawns a child.
fn run_segment(
    shell: &mut Shell,
    segment: &str,
    stdin: Option<OpenFile>,
    stdout: Option<OpenFile>,
    wait: WaitPolicy,
) -> Result<Option<Child>, error::Error> {
    let args = words::split_words(segment)?;
    let Some(command_name) = args.first() else {
        // Nothing to execute.
        return Ok(None);
    };

    tracing::debug!(target: trace_categories::COMMANDS, "executing: {}", args.join(" "));

    if let Some(registration) = shell.builtins.get(command_name.as_str()).cloned() {
        let mut output = match stdout {
            Some(file) => file,
            None => OpenFile::Stdout,
        };
        let context = builtins::ExecutionContext {
            shell,
            output: &mut output,
        };
        let exit_code = (registration.execute_func)(context, args)?;
        shell.last_exit = exit_code.status();
        return Ok(None);
    }

    let mut command = Command::new(command_name);
    command.args(&args[1..]);
    if let Some(stdin_file) = stdin {
        command.stdin(Stdio::from(stdin_file));
    }
    if let Some(stdout_file) = stdout {
        command.stdout(Stdio::from(stdout_file));
    }

    let child = match command.spawn() {
        Ok(child) => child,
        Err(e) => {
            // The exec-failure contract: report, yield 127 (or 126 for a
            // target that exists but cannot be executed), and keep going.
            let status = match e.kind() {
                std::io::ErrorKind::NotFound => 127,
                std::io::ErrorKind::PermissionDenied => 126,
                _ => {
                    tracing::error!(target: trace_categories::COMMANDS, "spawn failed: {e}");
                    return Err(error::Error::ChildCreationFailure);
                }
            };
            eprintln!("husk: {command_name}: {e}");
            shell.last_exit = status;
            return Ok(None);
        }
    };

    match wait {
        WaitPolicy::NoWait => Ok(Some(child)),
        WaitPolicy::Wait => {
            wait_for_foreground_child(shell, child)?;
            Ok(None)
        }
    }
}

/// Wires a chain of pipes across the pipeline's segments. Every segment but
/// the last runs without a wait, its stdout feeding the next segment's stdin;
/// the last segment gets the caller's true output target and wait policy.
fn run_pipeline(
    shell: &mut Shell,
    segments: &[&str],
    mut params: ExecutionParameters,
) -> Result<Option<Child>, error::Error> {
    let last = segments.len() - 1;
    let mut next_stdin = params.stdin.take();
    let mut final_child = None;

    for (i, segment) in segments.iter().enumerate() {
        if i < last {
            let (reader, writer) = openfiles::pipe()?;
            let child = run_segment(
                shell,
                segment,
                next_stdin.take(),
                Some(OpenFile::PipeWriter(writer)),
                WaitPolicy::NoWait,
            )?;
            if let Some(child) = child {
                shell.unwaited_children.push(child);
            }
            // The write end has moved into the child (or been dropped); only
            // the read end is carried forward, so EOF can propagate.
            next_stdin = Some(OpenFile::PipeReader(reader));
        } else {
            final_child = run_segment(
                shell,
                segment,
                next_stdin.take(),
                params.stdout.take(),
                params.wait,
            )?;
        }
    }

    Ok(final_child)
}

/// Blocks until the given child's exit status is available and folds it into
/// the shell's `last_exit`.
pub(crate) fn wait_for_foreground_child(
    shell: &mut Shell,
    mut child: Child,
) -> Result<(), error::Error> {
    shell.waiting_child = Some(child.id());
    let wait_result = child.wait();
    shell.waiting_child = None;

    let status = wait_result?;
    shell.last_exit = exit_status_to_code(&status);

    Ok(())
}

/// Folds an OS exit status into a single exit code: a normal exit maps to its
/// exit code, termination by signal N maps to 128+N. Termination by a signal
/// other than the interrupt signal is reported on stderr.
#[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
fn exit_status_to_code(status: &ExitStatus) -> u8 {
    if let Some(code) = status.code() {
        (code & 0xff) as u8
    } else if let Some(signal) = status.signal() {
        if signal != nix::sys::signal::Signal::SIGINT as i32 {
            let name = nix::sys::signal::Signal::try_from(signal)
                .map_or_else(|_| format!("signal {signal}"), |s| s.as_str().to_string());
            if status.core_dumped() {
                eprintln!("{name} (core dumped)");
            } else {
                eprintln!("{name}");
            }
        }
        128 + (signal & 0x7f) as u8
    } else {
        tracing::error!(target: trace_categories::COMMANDS, "unhandled process exit");
        127
    }
}
