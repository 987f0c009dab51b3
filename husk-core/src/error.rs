/// Monolithic error type for the shell.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Copying literal text would exceed the expansion buffer's capacity.
    #[error("literal text expansion overflowed")]
    LiteralOverflow,

    /// Expanding `$$` would exceed the expansion buffer's capacity.
    #[error("process id expansion overflowed")]
    PidOverflow,

    /// Expanding `${NAME}` would exceed the expansion buffer's capacity.
    #[error("environment variable expansion overflowed")]
    VariableOverflow,

    /// Expanding `$#` would exceed the expansion buffer's capacity.
    #[error("argument count expansion overflowed")]
    ArgCountOverflow,

    /// Expanding `$N` would exceed the expansion buffer's capacity.
    #[error("positional argument expansion overflowed")]
    PositionalOverflow,

    /// Expanding `$?` would exceed the expansion buffer's capacity.
    #[error("exit status expansion overflowed")]
    ExitStatusOverflow,

    /// Expanding a wildcard would exceed the expansion buffer's capacity.
    #[error("wildcard expansion overflowed")]
    WildcardOverflow,

    /// Expanding `$(CMD)` would exceed the expansion buffer's capacity.
    #[error("command substitution expansion overflowed")]
    CommandSubstitutionOverflow,

    /// A `${` was left unclosed at the end of the line.
    #[error("reached end of line before finding matching '}}'")]
    UnmatchedBrace,

    /// A `$(` was left unclosed at the end of the line.
    #[error("reached end of line before finding matching ')'")]
    UnmatchedParen,

    /// A double-quoted span was left unclosed at the end of the line.
    #[error("odd number of quotes found in input")]
    UnterminatedQuote,

    /// A wildcard suffix pattern contained a path separator.
    #[error("wildcard pattern cannot contain '/'")]
    WildcardSlash,

    /// An error occurred while creating a child process.
    #[error("failed to create child process")]
    ChildCreationFailure,

    /// A blocking operation was aborted by an interrupt.
    #[error("interrupted")]
    Interrupted,

    /// An I/O error occurred.
    #[error("i/o error: {0}")]
    IoError(#[from] std::io::Error),

    /// A system error occurred.
    #[error("system error: {0}")]
    ErrnoError(#[from] nix::errno::Errno),

    /// The given open file cannot be written to.
    #[error("cannot write to {0}")]
    OpenFileNotWritable(&'static str),
}
