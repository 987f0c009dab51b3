//! Expansion of shell constructs in raw input lines.
//!
//! One left-to-right pass over the line rewrites `$$`, `${NAME}`, `$(CMD)`,
//! `$#`, `$?`, `$N`, and wildcards into plain text, before any word splitting
//! happens. Expansion is a pure text transform except for command
//! substitution (which recursively runs a sub-line with its output captured
//! through a pipe) and wildcards (which list the current directory).

use std::io::Read;
use std::path::Path;

use crate::error;
use crate::interp::{self, ExecutionParameters, WaitPolicy};
use crate::interrupts;
use crate::openfiles::{self, OpenFile};
use crate::shell::Shell;
use crate::trace_categories;

/// Hard cap on the size, in bytes, of a fully expanded line. Exceeding it
/// aborts processing of the whole line; nothing partially expanded runs.
pub(crate) const EXPANSION_CAPACITY: usize = 200_000;

/// Expands all shell constructs in `line`, returning the expanded text.
pub(crate) fn expand(shell: &mut Shell, line: &str) -> Result<String, error::Error> {
    Expander {
        shell,
        chars: line.chars().collect(),
        pos: 0,
        out: ExpansionBuffer::new(EXPANSION_CAPACITY),
    }
    .expand()
}

/// Growable output buffer with a hard capacity cap. Every write path checks
/// remaining capacity up front and reports a structured overflow error
/// instead of writing past the cap.
struct ExpansionBuffer {
    text: String,
    capacity: usize,
}

impl ExpansionBuffer {
    fn new(capacity: usize) -> Self {
        Self {
            text: String::new(),
            capacity,
        }
    }

    fn push_str(&mut self, s: &str, overflow: error::Error) -> Result<(), error::Error> {
        if self.text.len() + s.len() > self.capacity {
            return Err(overflow);
        }
        self.text.push_str(s);
        Ok(())
    }

    fn push_char(&mut self, c: char, overflow: error::Error) -> Result<(), error::Error> {
        if self.text.len() + c.len_utf8() > self.capacity {
            return Err(overflow);
        }
        self.text.push(c);
        Ok(())
    }
}

/// Single-pass scanner over one input line.
struct Expander<'a> {
    shell: &'a mut Shell,
    chars: Vec<char>,
    pos: usize,
    out: ExpansionBuffer,
}

impl Expander<'_> {
    fn expand(mut self) -> Result<String, error::Error> {
        while self.pos < self.chars.len() {
            match self.chars[self.pos] {
                '$' => self.expand_dollar()?,
                '\\' if self.peek(1) == Some('*') => {
                    // \* escapes the wildcard
                    self.out.push_char('*', error::Error::LiteralOverflow)?;
                    self.pos += 2;
                }
                '*' if self.in_wildcard_context() => self.expand_wildcard()?,
                c => {
                    self.out.push_char(c, error::Error::LiteralOverflow)?;
                    self.pos += 1;
                }
            }
        }

        Ok(self.out.text)
    }

    fn peek(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).copied()
    }

    /// A wildcard is only recognized when introduced by a space or quote (or
    /// the start of the line).
    fn in_wildcard_context(&self) -> bool {
        self.pos == 0 || matches!(self.chars[self.pos - 1], ' ' | '"')
    }

    fn expand_dollar(&mut self) -> Result<(), error::Error> {
        match self.peek(1) {
            Some('$') => {
                self.out
                    .push_str(&std::process::id().to_string(), error::Error::PidOverflow)?;
                self.pos += 2;
            }
            Some('{') => self.expand_variable()?,
            Some('(') => self.expand_command_substitution()?,
            Some('#') => {
                self.out.push_str(
                    &self.shell.positional_count().to_string(),
                    error::Error::ArgCountOverflow,
                )?;
                self.pos += 2;
            }
            Some('?') => {
                self.out.push_str(
                    &self.shell.last_exit.to_string(),
                    error::Error::ExitStatusOverflow,
                )?;
                self.pos += 2;
            }
            Some(c) if c.is_ascii_digit() => self.expand_positional()?,
            _ => {
                // Not an expansion after all; emit the '$' and rescan the
                // following character normally.
                self.out.push_char('$', error::Error::LiteralOverflow)?;
                self.pos += 1;
            }
        }

        Ok(())
    }

    fn expand_variable(&mut self) -> Result<(), error::Error> {
        let mut end = self.pos + 2;
        while self.chars.get(end).is_some_and(|c| *c != '}') {
            end += 1;
        }
        if end >= self.chars.len() {
            return Err(error::Error::UnmatchedBrace);
        }

        let name: String = self.chars[self.pos + 2..end].iter().collect();
        let value = std::env::var(&name).unwrap_or_default();
        self.out.push_str(&value, error::Error::VariableOverflow)?;
        self.pos = end + 1;

        Ok(())
    }

    fn expand_positional(&mut self) -> Result<(), error::Error> {
        let mut end = self.pos + 1;
        while self.chars.get(end).is_some_and(|c| c.is_ascii_digit()) {
            end += 1;
        }

        let digits: String = self.chars[self.pos + 1..end].iter().collect();

        // Out-of-range positions, including numbers too large to parse,
        // silently expand to nothing.
        if let Ok(n) = digits.parse::<usize>() {
            if let Some(arg) = self.shell.positional(n) {
                self.out.push_str(arg, error::Error::PositionalOverflow)?;
            }
        }
        self.pos = end;

        Ok(())
    }

    fn expand_command_substitution(&mut self) -> Result<(), error::Error> {
        // Find the matching ')', honoring nesting.
        let mut depth = 1usize;
        let mut end = self.pos + 2;
        while end < self.chars.len() {
            match self.chars[end] {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
            end += 1;
        }
        if depth != 0 {
            return Err(error::Error::UnmatchedParen);
        }

        let command: String = self.chars[self.pos + 2..end].iter().collect();
        let output = self.run_substitution(&command)?;
        self.out
            .push_str(&output, error::Error::CommandSubstitutionOverflow)?;
        self.pos = end + 1;

        Ok(())
    }

    /// Runs `command` through the full line-processing procedure with its
    /// stdout captured through a pipe, and returns the captured text with
    /// trailing newlines stripped and embedded newlines converted to spaces.
    fn run_substitution(&mut self, command: &str) -> Result<String, error::Error> {
        tracing::debug!(target: trace_categories::EXPANSION, "substituting: $({command})");

        let (mut reader, writer) = openfiles::pipe()?;
        let params = ExecutionParameters {
            stdout: Some(OpenFile::PipeWriter(writer)),
            wait: WaitPolicy::NoWait,
            ..Default::default()
        };
        let child = interp::process_line(self.shell, command, params)?;

        // The pipe's write end has moved into the child (or has already been
        // dropped by an in-process builtin); drain the read end until EOF. An
        // interrupt received while blocked here aborts the expansion.
        let mut output = vec![];
        let mut buf = [0u8; 4096];
        let mut read_result = Ok(());
        loop {
            match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => output.extend_from_slice(&buf[..n]),
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {
                    if interrupts::pending() {
                        read_result = Err(error::Error::Interrupted);
                        break;
                    }
                }
                Err(e) => {
                    read_result = Err(e.into());
                    break;
                }
            }
        }
        drop(reader);

        if let Some(child) = child {
            if read_result.is_ok() {
                interp::wait_for_foreground_child(self.shell, child)?;
            } else {
                // Don't block on a child we gave up on; let the reaper
                // collect it.
                self.shell.unwaited_children.push(child);
            }
        }
        read_result?;

        let mut output = String::from_utf8_lossy(&output).into_owned();
        while output.ends_with('\n') {
            output.pop();
        }
        Ok(output.replace('\n', " "))
    }

    fn expand_wildcard(&mut self) -> Result<(), error::Error> {
        // Collect any suffix pattern between the '*' and the next delimiter.
        let mut end = self.pos + 1;
        while let Some(c) = self.chars.get(end) {
            match c {
                ' ' | '"' => break,
                '/' => return Err(error::Error::WildcardSlash),
                _ => end += 1,
            }
        }

        let suffix: String = self.chars[self.pos + 1..end].iter().collect();
        let suffix = (!suffix.is_empty()).then_some(suffix.as_str());

        let entries = matching_entries(Path::new("."), suffix)?;
        if entries.is_empty() {
            // Zero matches: keep the literal text unexpanded. The suffix, if
            // any, is copied verbatim by the main scan loop.
            self.out.push_char('*', error::Error::LiteralOverflow)?;
            self.pos += 1;
        } else {
            self.out
                .push_str(&entries.join(" "), error::Error::WildcardOverflow)?;
            self.pos = end;
        }

        Ok(())
    }
}

/// Lists the names of non-hidden entries in `dir`, in the order the directory
/// listing produces them, optionally keeping only names that end in `suffix`.
fn matching_entries(dir: &Path, suffix: Option<&str>) -> Result<Vec<String>, error::Error> {
    let mut names = vec![];
    for entry in std::fs::read_dir(dir)? {
        let name = entry?.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        if suffix.is_some_and(|s| !name.ends_with(s)) {
            continue;
        }
        names.push(name);
    }

    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::CreateOptions;
    use anyhow::Result;

    fn test_shell(args: &[&str]) -> Shell {
        Shell::new(CreateOptions {
            positional_args: args.iter().map(|s| (*s).to_string()).collect(),
        })
    }

    #[test]
    fn plain_text_is_the_identity_transform() -> Result<()> {
        let mut shell = test_shell(&["husk"]);
        assert_eq!(expand(&mut shell, "")?, "");
        assert_eq!(expand(&mut shell, "echo hello world")?, "echo hello world");
        assert_eq!(expand(&mut shell, "a\"b c\"d")?, "a\"b c\"d");
        Ok(())
    }

    #[test]
    fn pid_expansion() -> Result<()> {
        let mut shell = test_shell(&["husk"]);
        assert_eq!(expand(&mut shell, "$$")?, std::process::id().to_string());
        Ok(())
    }

    #[test]
    fn variable_expansion() -> Result<()> {
        let mut shell = test_shell(&["husk"]);

        // SAFETY: tests in this crate only touch uniquely named variables.
        unsafe { std::env::set_var("HUSK_TEST_VAR_EXP", "value") };
        assert_eq!(expand(&mut shell, "a ${HUSK_TEST_VAR_EXP} b")?, "a value b");

        // Unset variables expand to the empty string.
        assert_eq!(expand(&mut shell, "a ${HUSK_TEST_VAR_UNSET} b")?, "a  b");

        // Expanding the result again is a no-op.
        let once = expand(&mut shell, "${HUSK_TEST_VAR_EXP}")?;
        assert_eq!(expand(&mut shell, &once)?, once);

        Ok(())
    }

    #[test]
    fn unmatched_brace_is_an_error() {
        let mut shell = test_shell(&["husk"]);
        assert!(matches!(
            expand(&mut shell, "echo ${NAME"),
            Err(error::Error::UnmatchedBrace)
        ));
    }

    #[test]
    fn positional_expansion_honors_shift() -> Result<()> {
        let mut shell = test_shell(&["script", "alpha", "beta"]);

        assert_eq!(expand(&mut shell, "$0 $1 $2")?, "script alpha beta");
        assert_eq!(expand(&mut shell, "$#")?, "2");
        assert_eq!(expand(&mut shell, "[$3]")?, "[]");

        shell.shift_offset = 1;
        assert_eq!(expand(&mut shell, "$0 $1")?, "script beta");
        assert_eq!(expand(&mut shell, "$#")?, "1");
        assert_eq!(expand(&mut shell, "[$2]")?, "[]");

        Ok(())
    }

    #[test]
    fn huge_positional_index_expands_to_nothing() -> Result<()> {
        let mut shell = test_shell(&["script", "a"]);
        shell.shift_offset = 1;

        // usize::MAX parses but cannot be shifted; larger numbers don't even
        // parse. Both are simply out of range.
        assert_eq!(expand(&mut shell, "[$18446744073709551615]")?, "[]");
        assert_eq!(expand(&mut shell, "[$99999999999999999999]")?, "[]");

        Ok(())
    }

    #[test]
    fn last_exit_expansion() -> Result<()> {
        let mut shell = test_shell(&["husk"]);
        shell.last_exit = 3;
        assert_eq!(expand(&mut shell, "$?")?, "3");
        Ok(())
    }

    #[test]
    fn unrecognized_dollar_is_literal() -> Result<()> {
        let mut shell = test_shell(&["husk"]);
        assert_eq!(expand(&mut shell, "a$Zb")?, "a$Zb");
        assert_eq!(expand(&mut shell, "cost$")?, "cost$");
        Ok(())
    }

    #[test]
    fn escaped_wildcard_is_literal() -> Result<()> {
        let mut shell = test_shell(&["husk"]);
        assert_eq!(expand(&mut shell, r"echo \*")?, "echo *");
        Ok(())
    }

    #[test]
    fn zero_match_wildcard_keeps_literal_text() -> Result<()> {
        let mut shell = test_shell(&["husk"]);
        assert_eq!(
            expand(&mut shell, "echo *qqqqzz_no_such_suffix")?,
            "echo *qqqqzz_no_such_suffix"
        );
        Ok(())
    }

    #[test]
    fn wildcard_pattern_may_not_contain_slash() {
        let mut shell = test_shell(&["husk"]);
        assert!(matches!(
            expand(&mut shell, "echo *x/y"),
            Err(error::Error::WildcardSlash)
        ));
    }

    #[test]
    fn matching_entries_skips_hidden_and_filters_suffix() -> Result<()> {
        let dir = tempfile::tempdir()?;
        for name in ["a.txt", "b.txt", "c.rs", ".hidden"] {
            std::fs::write(dir.path().join(name), "")?;
        }

        let mut all = matching_entries(dir.path(), None)?;
        all.sort();
        assert_eq!(all, vec!["a.txt", "b.txt", "c.rs"]);

        let mut txt = matching_entries(dir.path(), Some(".txt"))?;
        txt.sort();
        assert_eq!(txt, vec!["a.txt", "b.txt"]);

        assert!(matching_entries(dir.path(), Some(".zip"))?.is_empty());

        Ok(())
    }

    #[test]
    fn command_substitution_strips_and_flattens_newlines() -> Result<()> {
        let mut shell = test_shell(&["husk"]);
        assert_eq!(expand(&mut shell, "a $(echo hi) b")?, "a hi b");
        assert_eq!(expand(&mut shell, r#"$(printf "x\ny\n")"#)?, "x y");
        Ok(())
    }

    #[test]
    fn unmatched_paren_is_an_error() {
        let mut shell = test_shell(&["husk"]);
        assert!(matches!(
            expand(&mut shell, "echo $(echo hi"),
            Err(error::Error::UnmatchedParen)
        ));
    }

    #[test]
    fn buffer_reports_the_requested_overflow_kind() {
        let mut buffer = ExpansionBuffer::new(4);
        buffer.push_str("abcd", error::Error::PidOverflow).unwrap();
        assert!(matches!(
            buffer.push_char('e', error::Error::LiteralOverflow),
            Err(error::Error::LiteralOverflow)
        ));
        assert!(matches!(
            buffer.push_str("ef", error::Error::WildcardOverflow),
            Err(error::Error::WildcardOverflow)
        ));
        assert_eq!(buffer.text, "abcd");
    }

    #[test]
    fn oversized_variable_aborts_the_line() {
        let mut shell = test_shell(&["husk"]);

        // SAFETY: tests in this crate only touch uniquely named variables.
        unsafe { std::env::set_var("HUSK_TEST_VAR_HUGE", "x".repeat(EXPANSION_CAPACITY + 1)) };
        assert!(matches!(
            expand(&mut shell, "${HUSK_TEST_VAR_HUGE}"),
            Err(error::Error::VariableOverflow)
        ));
    }
}
