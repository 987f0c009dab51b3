//! Core implementation of the husk microshell. Implements shell-style textual
//! expansion of input lines, word splitting, built-in command dispatch, and
//! pipeline execution across child processes.

pub mod builtins;
mod error;
mod expansion;
mod interp;
pub mod interrupts;
mod openfiles;
mod shell;
mod trace_categories;
mod words;

pub use error::Error;
pub use interp::ExecutionResult;
pub use openfiles::OpenFile;
pub use shell::{CreateOptions, Shell};
