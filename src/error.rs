//! Unified error types for monostate.
//!
//! This module provides a clean error type that wraps internal errors
//! and presents a consistent interface to users.

use thiserror::Error;

/// All monostate errors.
///
/// Failures are never retried or swallowed by the library; each is surfaced
/// to the caller that hit it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    /// The one-time construction of a shared instance failed.
    ///
    /// The gate stays uninitialized, so a later call may retry cleanly.
    #[error("construction failed: {0}")]
    ConstructionFailure(String),

    /// A shared lock could not be used because a holder panicked under it.
    #[error("lock acquisition failed: {0}")]
    LockAcquisitionFailure(String),

    /// Internal error (bug or invariant violation)
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for monostate operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error is retryable.
    ///
    /// Only construction failures are: the gate rolled back, so the next
    /// `get_instance` runs a fresh attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::ConstructionFailure(_))
    }

    /// Check if this is a construction failure.
    pub fn is_construction(&self) -> bool {
        matches!(self, Error::ConstructionFailure(_))
    }

    /// Check if this is a poisoned-lock failure.
    pub fn is_lock_failure(&self) -> bool {
        matches!(self, Error::LockAcquisitionFailure(_))
    }

    /// Check if this is a serious/unrecoverable error.
    pub fn is_serious(&self) -> bool {
        matches!(self, Error::LockAcquisitionFailure(_) | Error::Internal(_))
    }
}

// Convert from internal core errors
impl From<monostate_core::Error> for Error {
    fn from(e: monostate_core::Error) -> Self {
        use monostate_core::Error as CoreError;
        match e {
            e @ CoreError::Construction { .. } => Error::ConstructionFailure(e.to_string()),
            e @ CoreError::CapacityReservation { .. } => {
                Error::ConstructionFailure(e.to_string())
            }
            e @ CoreError::Poisoned { .. } => Error::LockAcquisitionFailure(e.to_string()),
            CoreError::Internal(msg) => Error::Internal(msg),
        }
    }
}
