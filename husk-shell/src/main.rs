//! Implements the command-line interface for the `husk` shell.

mod args;
mod entry;
mod events;

fn main() {
    let exit_code = entry::run();
    std::process::exit(i32::from(exit_code));
}
