//! Files and pipes usable as a command's input or output.

use std::process::Stdio;

use crate::error;

/// Represents a file a command may read from or write to.
pub enum OpenFile {
    /// The shell's own standard input.
    Stdin,
    /// The shell's own standard output.
    Stdout,
    /// The shell's own standard error.
    Stderr,
    /// The read end of a pipe.
    PipeReader(os_pipe::PipeReader),
    /// The write end of a pipe.
    PipeWriter(os_pipe::PipeWriter),
}

impl From<OpenFile> for Stdio {
    fn from(open_file: OpenFile) -> Self {
        match open_file {
            OpenFile::Stdin | OpenFile::Stdout | OpenFile::Stderr => Self::inherit(),
            OpenFile::PipeReader(r) => r.into(),
            OpenFile::PipeWriter(w) => w.into(),
        }
    }
}

impl std::io::Write for OpenFile {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            Self::Stdin => Err(std::io::Error::other(error::Error::OpenFileNotWritable(
                "stdin",
            ))),
            Self::Stdout => std::io::stdout().write(buf),
            Self::Stderr => std::io::stderr().write(buf),
            Self::PipeReader(_) => Err(std::io::Error::other(error::Error::OpenFileNotWritable(
                "pipe reader",
            ))),
            Self::PipeWriter(writer) => writer.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdin => Ok(()),
            Self::Stdout => std::io::stdout().flush(),
            Self::Stderr => std::io::stderr().flush(),
            Self::PipeReader(_) => Ok(()),
            Self::PipeWriter(writer) => writer.flush(),
        }
    }
}

/// Creates a new pipe, returning its reader and writer ends.
pub fn pipe() -> Result<(os_pipe::PipeReader, os_pipe::PipeWriter), error::Error> {
    let (reader, writer) = os_pipe::pipe()?;
    Ok((reader, writer))
}
