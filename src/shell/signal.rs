//! Interrupt handling.
//!
//! `SIGINT` and `SIGTERM` only flip an atomic flag; the executor polls it
//! while a tool runs and unwinds from there, so locks and partial outputs
//! are cleaned up on the normal drop path.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

static SIGNALLED: AtomicBool = AtomicBool::new(false);

/// Install process-wide `SIGINT`/`SIGTERM` handlers.
pub fn install_handlers() {
    #[cfg(unix)]
    {
        extern "C" fn on_signal(_: libc::c_int) {
            SIGNALLED.store(true, Ordering::SeqCst);
        }

        // SAFETY: the handler only performs an atomic store, which is
        // async-signal-safe.
        unsafe {
            libc::signal(libc::SIGINT, on_signal as libc::sighandler_t);
            libc::signal(libc::SIGTERM, on_signal as libc::sighandler_t);
        }
    }
}

/// Interrupt flag observed by running commands.
///
/// A flag created with [`InterruptFlag::process`] also reports signals
/// caught by [`install_handlers`]; [`InterruptFlag::new`] is local only.
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag {
    local: Arc<AtomicBool>,
    process: bool,
}

impl InterruptFlag {
    /// A flag raised only through [`trigger`](Self::trigger).
    pub fn new() -> Self {
        Self::default()
    }

    /// A flag that is also raised by process signals.
    pub fn process() -> Self {
        Self {
            local: Arc::default(),
            process: true,
        }
    }

    /// Raise the flag.
    pub fn trigger(&self) {
        self.local.store(true, Ordering::SeqCst);
    }

    /// Whether an interrupt has been requested.
    pub fn is_set(&self) -> bool {
        self.local.load(Ordering::SeqCst) || (self.process && SIGNALLED.load(Ordering::SeqCst))
    }
}
