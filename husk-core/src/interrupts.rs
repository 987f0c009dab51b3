//! Cooperative interrupt handling.
//!
//! The shell never unwinds asynchronously on SIGINT; the OS-level handler only
//! records that an interrupt arrived, and blocking operations (the command
//! substitution read loop, the interactive prompt) poll the flag at defined
//! suspension points.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::error;

static INTERRUPT_PENDING: AtomicBool = AtomicBool::new(false);

extern "C" fn handle_sigint(_signal: nix::libc::c_int) {
    INTERRUPT_PENDING.store(true, Ordering::SeqCst);
}

/// Installs the shell's SIGINT handler.
///
/// `SA_RESTART` is deliberately omitted so that blocking reads return `EINTR`
/// and get a chance to observe the pending flag.
pub fn install() -> Result<(), error::Error> {
    let action = nix::sys::signal::SigAction::new(
        nix::sys::signal::SigHandler::Handler(handle_sigint),
        nix::sys::signal::SaFlags::empty(),
        nix::sys::signal::SigSet::empty(),
    );

    // SAFETY: the handler only performs an atomic store, which is
    // async-signal-safe.
    unsafe { nix::sys::signal::sigaction(nix::sys::signal::Signal::SIGINT, &action) }?;
    Ok(())
}

/// Returns whether an interrupt has been received and not yet acknowledged.
pub fn pending() -> bool {
    INTERRUPT_PENDING.load(Ordering::SeqCst)
}

/// Acknowledges any pending interrupt, returning whether one was pending.
pub fn take() -> bool {
    INTERRUPT_PENDING.swap(false, Ordering::SeqCst)
}
