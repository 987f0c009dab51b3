//! Trace utilities

/// Trace category for command execution.
pub const COMMANDS: &str = "commands";
/// Trace category for word expansion.
pub const EXPANSION: &str = "expansion";
/// Trace category for built-in command dispatch.
pub const BUILTINS: &str = "builtins";
