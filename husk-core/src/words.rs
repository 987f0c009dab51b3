//! Splitting expanded lines into argument words.

use crate::error;

/// Splits an already-expanded line into argument words.
///
/// Words are delimited by runs of plain spaces. A double quote opens a
/// verbatim span that may contain spaces and is closed by the next double
/// quote; the quote characters themselves are stripped. A backslash escaping
/// a `|` is dropped here; it already shielded the pipe from pipeline
/// splitting, and the command should see the bare character. An unterminated
/// quoted span is an error. Zero words is not an error; it signals that there
/// is nothing to execute.
pub(crate) fn split_words(line: &str) -> Result<Vec<String>, error::Error> {
    let mut words = vec![];
    let mut current = String::new();
    let mut in_word = false;
    let mut in_quotes = false;

    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                in_word = true;
            }
            ' ' if !in_quotes => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            '\\' if chars.peek() == Some(&'|') => {
                in_word = true;
            }
            _ => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if in_quotes {
        return Err(error::Error::UnterminatedQuote);
    }

    if in_word {
        words.push(current);
    }

    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_space_runs() -> anyhow::Result<()> {
        assert_eq!(split_words("")?, Vec::<String>::new());
        assert_eq!(split_words("   ")?, Vec::<String>::new());
        assert_eq!(split_words("ls")?, vec!["ls"]);
        assert_eq!(split_words("  ls   -l  /tmp ")?, vec!["ls", "-l", "/tmp"]);
        Ok(())
    }

    #[test]
    fn quotes_group_and_are_stripped() -> anyhow::Result<()> {
        assert_eq!(split_words(r#"echo "a b" c"#)?, vec!["echo", "a b", "c"]);
        assert_eq!(split_words(r#"ab"c d"e"#)?, vec!["abc de"]);
        assert_eq!(split_words(r#""""#)?, vec![""]);
        Ok(())
    }

    #[test]
    fn escaped_pipe_loses_its_backslash() -> anyhow::Result<()> {
        assert_eq!(split_words(r"echo \| x")?, vec!["echo", "|", "x"]);

        // Other backslashes are ordinary characters.
        assert_eq!(split_words(r"echo \x")?, vec!["echo", r"\x"]);
        Ok(())
    }

    #[test]
    fn unterminated_quote_is_an_error() {
        assert!(matches!(
            split_words(r#"echo "abc"#),
            Err(error::Error::UnterminatedQuote)
        ));
    }
}
