//! Poison tracking for parking_lot locks
//!
//! parking_lot locks do not poison, so a writer that panics mid-update would
//! leave its partial state visible to the next holder. Write paths hold a
//! [`PoisonOnUnwind`] next to their guard; if it is dropped during unwinding
//! the flag is set and every later access fails with `Error::Poisoned`.

use monostate_core::{Error, Result};
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
pub(crate) struct PoisonFlag(AtomicBool);

impl PoisonFlag {
    pub(crate) fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    pub(crate) fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Fail with `Error::Poisoned` if a writer panicked under the lock
    pub(crate) fn check(&self, label: &str) -> Result<()> {
        if self.is_set() {
            Err(Error::poisoned(label))
        } else {
            Ok(())
        }
    }

    pub(crate) fn arm<'a>(&'a self, label: &'a str) -> PoisonOnUnwind<'a> {
        PoisonOnUnwind { flag: self, label }
    }
}

/// Marks the flag poisoned if dropped while the thread is panicking
pub(crate) struct PoisonOnUnwind<'a> {
    flag: &'a PoisonFlag,
    label: &'a str,
}

impl Drop for PoisonOnUnwind<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.flag.0.store(true, Ordering::Release);
            tracing::error!(label = self.label, "writer panicked under lock, state poisoned");
        }
    }
}
