use std::io::Write;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

use clap::Parser;

use crate::builtins;

/// Report stat(2) information for files.
#[derive(Parser)]
pub(crate) struct SstatCommand {
    /// Files to report on.
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

impl builtins::Command for SstatCommand {
    fn execute(
        &self,
        context: builtins::ExecutionContext<'_>,
    ) -> Result<builtins::ExitCode, crate::error::Error> {
        let mut any_failed = false;

        for file in &self.files {
            // A failure on one file is reported and the rest still print.
            if let Err(e) = write_stat_line(context.output, file) {
                writeln!(context.stderr(), "sstat: {}: {e}", file.display())?;
                any_failed = true;
            }
        }

        if any_failed {
            Ok(builtins::ExitCode::Custom(1))
        } else {
            Ok(builtins::ExitCode::Success)
        }
    }
}

fn write_stat_line(output: &mut impl Write, file: &Path) -> std::io::Result<()> {
    let metadata = std::fs::symlink_metadata(file)?;

    let owner = uzers::get_user_by_uid(metadata.uid())
        .map_or_else(|| metadata.uid().to_string(), |u| {
            u.name().to_string_lossy().into_owned()
        });
    let group = uzers::get_group_by_gid(metadata.gid())
        .map_or_else(|| metadata.gid().to_string(), |g| {
            g.name().to_string_lossy().into_owned()
        });

    let modified: chrono::DateTime<chrono::Local> = metadata.modified()?.into();

    writeln!(
        output,
        "{} {owner} {group} {} {} {} {}",
        file.display(),
        format_mode(metadata.mode()),
        metadata.nlink(),
        metadata.len(),
        modified.format("%b %e %H:%M:%S %Y"),
    )
}

/// Renders a raw st_mode as the conventional ten-character permission string
/// (type, then rwx triples with setuid/setgid/sticky folded in).
fn format_mode(mode: u32) -> String {
    let type_bits = mode & (nix::libc::S_IFMT as u32);
    let type_char = if type_bits == nix::libc::S_IFDIR as u32 {
        'd'
    } else if type_bits == nix::libc::S_IFLNK as u32 {
        'l'
    } else if type_bits == nix::libc::S_IFCHR as u32 {
        'c'
    } else if type_bits == nix::libc::S_IFBLK as u32 {
        'b'
    } else if type_bits == nix::libc::S_IFIFO as u32 {
        'p'
    } else if type_bits == nix::libc::S_IFSOCK as u32 {
        's'
    } else {
        '-'
    };

    let mut s = String::with_capacity(10);
    s.push(type_char);
    push_triple(&mut s, mode >> 6, mode & (nix::libc::S_ISUID as u32) != 0, 's');
    push_triple(&mut s, mode >> 3, mode & (nix::libc::S_ISGID as u32) != 0, 's');
    push_triple(&mut s, mode, mode & (nix::libc::S_ISVTX as u32) != 0, 't');
    s
}

fn push_triple(s: &mut String, bits: u32, special: bool, special_char: char) {
    s.push(if bits & 4 != 0 { 'r' } else { '-' });
    s.push(if bits & 2 != 0 { 'w' } else { '-' });
    s.push(match (bits & 1 != 0, special) {
        (true, false) => 'x',
        (true, true) => special_char,
        (false, true) => special_char.to_ascii_uppercase(),
        (false, false) => '-',
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_strings() {
        assert_eq!(format_mode(0o100644), "-rw-r--r--");
        assert_eq!(format_mode(0o100755), "-rwxr-xr-x");
        assert_eq!(format_mode(0o040755), "drwxr-xr-x");
        assert_eq!(format_mode(0o104755), "-rwsr-xr-x");
        assert_eq!(format_mode(0o102644), "-rw-r-Sr--");
        assert_eq!(format_mode(0o041777), "drwxrwxrwt");
        assert_eq!(format_mode(0o120777), "lrwxrwxrwx");
    }

    #[test]
    fn stat_line_includes_name_size_and_mode() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("sample.txt");
        std::fs::write(&path, "12345")?;

        let mut out = vec![];
        write_stat_line(&mut out, &path)?;

        let line = String::from_utf8(out)?;
        assert!(line.starts_with(&path.display().to_string()));
        assert!(line.contains(" 5 "));
        assert!(line.contains(" -rw-"));
        Ok(())
    }

    #[test]
    fn missing_file_is_an_error() {
        let mut out = vec![];
        assert!(write_stat_line(&mut out, Path::new("/no/such/husk/file")).is_err());
        assert!(out.is_empty());
    }
}
