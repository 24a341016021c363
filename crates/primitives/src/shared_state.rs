//! SharedState primitive
//!
//! An ordered, append-only sequence of values guarded by its own lock.
//!
//! ## Guarantees
//!
//! - `append` is linearizable: the batch is added contiguously, in the order
//!   given, and concurrent appends are totally ordered by the lock
//! - `read_all` returns an owned snapshot taken under the lock; no caller can
//!   ever iterate storage that another thread is mutating
//! - No capacity limit; growth is unbounded
//!
//! ## Critical Sections
//!
//! Caller-provided iterators are drained *before* the lock is taken, so the
//! write lock only covers a single `Vec::append`. Only one lock is held at a
//! time by any call path.

use crate::poison::{PoisonFlag, PoisonOnUnwind};
use crate::DEFAULT_LABEL;
use monostate_core::{Error, Result};
use parking_lot::{RwLock, RwLockWriteGuard};
use std::fmt;

/// Append-only shared sequence
///
/// # Example
///
/// ```
/// use monostate_primitives::SharedState;
///
/// let state = SharedState::new();
/// state.append([1, 2]).unwrap();
/// state.append([3]).unwrap();
/// assert_eq!(state.read_all().unwrap(), vec![1, 2, 3]);
/// ```
pub struct SharedState<T> {
    label: String,
    attrs: RwLock<Vec<T>>,
    poison: PoisonFlag,
}

impl<T> SharedState<T> {
    /// Create an empty sequence with the default label
    pub fn new() -> Self {
        Self::labeled(DEFAULT_LABEL)
    }

    /// Create an empty sequence whose log events carry `label`
    pub fn labeled(label: impl Into<String>) -> Self {
        Self::from_vec(label, Vec::new())
    }

    /// Create an empty sequence with room for `capacity` values
    ///
    /// Fails with `Error::CapacityReservation` instead of aborting when the
    /// allocator cannot satisfy the request.
    pub fn try_with_capacity(label: impl Into<String>, capacity: usize) -> Result<Self> {
        let mut attrs = Vec::new();
        attrs
            .try_reserve_exact(capacity)
            .map_err(|e| Error::capacity(capacity, e))?;
        Ok(Self::from_vec(label, attrs))
    }

    fn from_vec(label: impl Into<String>, attrs: Vec<T>) -> Self {
        Self {
            label: label.into(),
            attrs: RwLock::new(attrs),
            poison: PoisonFlag::new(),
        }
    }

    /// Label carried in log events and errors
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Append `values` in the order given
    ///
    /// An empty batch succeeds without taking the lock.
    pub fn append<I>(&self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
    {
        let mut batch: Vec<T> = values.into_iter().collect();
        self.poison.check(&self.label)?;
        if batch.is_empty() {
            return Ok(());
        }

        let added = batch.len();
        let mut attrs = self.write()?;
        attrs.append(&mut batch);
        tracing::trace!(label = %self.label, added, len = attrs.len(), "appended");
        Ok(())
    }

    /// Snapshot of every value appended so far
    pub fn read_all(&self) -> Result<Vec<T>>
    where
        T: Clone,
    {
        self.with_attrs(<[T]>::to_vec)
    }

    /// Run `f` over the current values while holding the read lock
    ///
    /// `f` must not call back into this container for writing.
    pub fn with_attrs<R>(&self, f: impl FnOnce(&[T]) -> R) -> Result<R> {
        self.poison.check(&self.label)?;
        let attrs = self.attrs.read();
        // A writer may have poisoned between the check and our acquisition
        self.poison.check(&self.label)?;
        Ok(f(&attrs))
    }

    /// Number of values appended so far
    pub fn len(&self) -> Result<usize> {
        self.with_attrs(<[T]>::len)
    }

    /// Whether nothing has been appended yet
    pub fn is_empty(&self) -> Result<bool> {
        self.with_attrs(<[T]>::is_empty)
    }

    /// Whether a writer panicked while holding the lock
    pub fn is_poisoned(&self) -> bool {
        self.poison.is_set()
    }

    fn write(&self) -> Result<AttrsWriteGuard<'_, T>> {
        let guard = self.attrs.write();
        self.poison.check(&self.label)?;
        Ok(AttrsWriteGuard {
            _poison: self.poison.arm(&self.label),
            guard,
        })
    }
}

impl<T> Default for SharedState<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for SharedState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("SharedState");
        s.field("label", &self.label);
        if self.is_poisoned() {
            s.field("attrs", &"<poisoned>");
        } else {
            s.field("attrs", &*self.attrs.read());
        }
        s.finish()
    }
}

/// Write access that poisons the container if dropped during a panic
struct AttrsWriteGuard<'a, T> {
    // Declared first: dropped, and poisons, while the lock is still held
    _poison: PoisonOnUnwind<'a>,
    guard: RwLockWriteGuard<'a, Vec<T>>,
}

impl<T> std::ops::Deref for AttrsWriteGuard<'_, T> {
    type Target = Vec<T>;

    fn deref(&self) -> &Vec<T> {
        &self.guard
    }
}

impl<T> std::ops::DerefMut for AttrsWriteGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut Vec<T> {
        &mut self.guard
    }
}
