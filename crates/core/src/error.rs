//! Internal error taxonomy
//!
//! Two failure families exist:
//!
//! | Variant | When |
//! |---------|------|
//! | `Construction` | The one-time construction step behind a gate failed |
//! | `CapacityReservation` | Reserving storage for a container failed |
//! | `Poisoned` | A container lock was released by a panicking holder |
//! | `Internal` | Bug or invariant violation |
//!
//! None of these are retried automatically. A construction failure leaves the
//! gate uninitialized, so the next caller starts a fresh attempt.

use std::collections::TryReserveError;
use thiserror::Error;

/// Errors raised by gates and shared containers
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    /// One-time construction failed; the gate rolled back to uninitialized
    #[error("construction of '{label}' failed: {reason}")]
    Construction {
        /// Label of the gate or container being constructed
        label: String,
        /// Human-readable cause
        reason: String,
    },

    /// Storage for a container could not be reserved
    #[error("cannot reserve capacity for {requested} values: {reason}")]
    CapacityReservation {
        /// Number of values requested
        requested: usize,
        /// Allocator-reported cause
        reason: String,
    },

    /// A previous holder panicked inside the critical section
    #[error("lock on '{label}' is poisoned: a holder panicked mid-update")]
    Poisoned {
        /// Label of the poisoned container
        label: String,
    },

    /// Bug or invariant violation
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result alias for core operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Build a construction failure for `label`
    pub fn construction(label: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Construction {
            label: label.into(),
            reason: reason.into(),
        }
    }

    /// Build a poisoning failure for `label`
    pub fn poisoned(label: impl Into<String>) -> Self {
        Error::Poisoned {
            label: label.into(),
        }
    }

    /// Map an allocator failure for a reservation of `requested` values
    pub fn capacity(requested: usize, err: TryReserveError) -> Self {
        Error::CapacityReservation {
            requested,
            reason: err.to_string(),
        }
    }

    /// Whether the failure happened while constructing a shared value
    ///
    /// Capacity failures count: they only occur while sizing new storage.
    pub fn is_construction(&self) -> bool {
        matches!(
            self,
            Error::Construction { .. } | Error::CapacityReservation { .. }
        )
    }

    /// Whether the failure is a poisoned lock
    pub fn is_poisoned(&self) -> bool {
        matches!(self, Error::Poisoned { .. })
    }
}
