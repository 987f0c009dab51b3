//! Process-wide shell state threaded through expansion and execution.

use std::collections::HashMap;
use std::process::Child;

use crate::builtins;
use crate::error;
use crate::interp::{self, ExecutionParameters, ExecutionResult};

/// Options for creating a new shell instance.
#[derive(Clone, Default)]
pub struct CreateOptions {
    /// The shell's positional arguments; position 0 is the script name, or the
    /// shell's own name when running interactively.
    pub positional_args: Vec<String>,
}

/// Represents an instance of the husk shell.
pub struct Shell {
    /// The positional arguments addressable via `$N`.
    pub positional_args: Vec<String>,

    /// Count of positional arguments currently hidden from `$1`-style
    /// addressing. Always strictly less than `positional_args.len()`.
    pub shift_offset: usize,

    /// Exit status of the most recent foreground command.
    pub last_exit: u8,

    /// Process id of the child currently being waited on in the foreground,
    /// if any. Lets a caught interrupt tell whether a child was in flight.
    pub waiting_child: Option<u32>,

    /// Registered built-in commands, keyed by name.
    pub builtins: HashMap<String, builtins::Registration>,

    /// Children launched without a foreground wait (pipeline prefixes) that
    /// have not yet been reaped.
    pub(crate) unwaited_children: Vec<Child>,
}

impl Shell {
    /// Returns a new shell instance created with the given options.
    pub fn new(options: CreateOptions) -> Self {
        let mut positional_args = options.positional_args;
        if positional_args.is_empty() {
            positional_args.push(String::from("husk"));
        }

        Self {
            positional_args,
            shift_offset: 0,
            last_exit: 0,
            waiting_child: None,
            builtins: builtins::default_builtins(),
            unwaited_children: vec![],
        }
    }

    /// Runs one raw input line to completion: expands it, then dispatches a
    /// built-in or launches (and waits for) child processes. The shell's
    /// `last_exit` is updated to reflect the outcome.
    pub fn run_line(&mut self, line: &str) -> Result<ExecutionResult, error::Error> {
        self.reap_children();
        interp::process_line(self, line, ExecutionParameters::default())?;
        Ok(ExecutionResult::new(self.last_exit))
    }

    /// Number of positional arguments after applying the shift offset,
    /// excluding position 0.
    pub fn positional_count(&self) -> usize {
        self.positional_args
            .len()
            .saturating_sub(self.shift_offset + 1)
    }

    /// Looks up the positional argument `$n`. Position 0 is always
    /// addressable regardless of the shift offset; any other out-of-range
    /// position yields `None`.
    pub fn positional(&self, n: usize) -> Option<&str> {
        if n == 0 {
            return self.positional_args.first().map(String::as_str);
        }

        let index = n.checked_add(self.shift_offset)?;
        self.positional_args.get(index).map(String::as_str)
    }

    /// Non-blockingly collects the exit status of any finished children that
    /// were launched without a foreground wait, so they do not accumulate as
    /// zombies.
    pub fn reap_children(&mut self) {
        self.unwaited_children
            .retain_mut(|child| matches!(child.try_wait(), Ok(None)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_shell(args: &[&str]) -> Shell {
        Shell::new(CreateOptions {
            positional_args: args.iter().map(|s| (*s).to_string()).collect(),
        })
    }

    #[test]
    fn positional_lookup_applies_shift() {
        let mut shell = test_shell(&["script", "a", "b", "c"]);
        assert_eq!(shell.positional_count(), 3);
        assert_eq!(shell.positional(0), Some("script"));
        assert_eq!(shell.positional(1), Some("a"));
        assert_eq!(shell.positional(3), Some("c"));
        assert_eq!(shell.positional(4), None);

        shell.shift_offset = 2;
        assert_eq!(shell.positional_count(), 1);
        assert_eq!(shell.positional(0), Some("script"));
        assert_eq!(shell.positional(1), Some("c"));
        assert_eq!(shell.positional(2), None);
    }

    #[test]
    fn positional_index_near_usize_max_is_out_of_range() {
        let mut shell = test_shell(&["script", "a"]);
        shell.shift_offset = 1;
        assert_eq!(shell.positional(usize::MAX), None);
        assert_eq!(shell.positional(2), None);
    }

    #[test]
    fn shift_then_unshift_restores_offset() -> anyhow::Result<()> {
        let mut shell = test_shell(&["script", "a", "b", "c"]);

        shell.run_line("shift 2")?;
        assert_eq!(shell.last_exit, 0);
        assert_eq!(shell.shift_offset, 2);

        shell.run_line("unshift 2")?;
        assert_eq!(shell.last_exit, 0);
        assert_eq!(shell.shift_offset, 0);

        Ok(())
    }

    #[test]
    fn over_shift_is_rejected() -> anyhow::Result<()> {
        let mut shell = test_shell(&["script", "a"]);

        shell.run_line("shift 2")?;
        assert_eq!(shell.last_exit, 1);
        assert_eq!(shell.shift_offset, 0);

        shell.run_line("unshift 1")?;
        assert_eq!(shell.last_exit, 1);

        Ok(())
    }

    #[test]
    fn unshift_without_count_resets() -> anyhow::Result<()> {
        let mut shell = test_shell(&["script", "a", "b", "c"]);

        shell.run_line("shift 1")?;
        shell.run_line("shift 1")?;
        assert_eq!(shell.shift_offset, 2);

        shell.run_line("unshift")?;
        assert_eq!(shell.shift_offset, 0);

        Ok(())
    }

    #[test]
    fn tokenization_failure_leaves_last_exit_unmodified() {
        let mut shell = test_shell(&["script"]);
        shell.last_exit = 42;

        let result = shell.run_line("echo \"abc");
        assert!(result.is_err());
        assert_eq!(shell.last_exit, 42);
        assert!(shell.waiting_child.is_none());
    }
}
