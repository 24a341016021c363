//! Initialization gate for lazily constructed shared values
//!
//! Guarantees that, however many threads race for the first access, exactly
//! one constructor runs and every caller receives the same value.
//!
//! ## Acquisition Sequence
//!
//! ```text
//! 1. Fast path: published value present? return it (acquire load, no lock)
//! 2. Acquire gate lock
//! 3. Re-check: another thread may have published while we waited
//! 4. State → Initializing, run constructor
//! 5. Ok:  publish value, State → Ready
//!    Err: State → Uninitialized, return error to this caller
//!    Panic: State → Uninitialized, panic continues unwinding
//! 6. Release gate lock (guard drop, every exit path)
//! ```
//!
//! Once Ready, step 1 always succeeds, so steady-state access never touches
//! the lock.

use once_cell::sync::OnceCell;
use parking_lot::{const_mutex, Mutex};
use std::convert::Infallible;
use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

const UNINITIALIZED: u8 = 0;
const INITIALIZING: u8 = 1;
const READY: u8 = 2;

/// Observable lifecycle of an [`InitGate`]
///
/// `Ready` is terminal. A failed or panicked construction moves the gate from
/// `Initializing` back to `Uninitialized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InitState {
    /// No value yet and no constructor running
    Uninitialized,
    /// A constructor is running under the gate lock
    Initializing,
    /// The value is published
    Ready,
}

impl InitState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            UNINITIALIZED => InitState::Uninitialized,
            INITIALIZING => InitState::Initializing,
            _ => InitState::Ready,
        }
    }
}

/// One-time construction gate
///
/// `InitGate::new` is `const`, so a gate can back a `static` accessor, but it
/// is an ordinary value and may equally be owned by a struct and handed to
/// collaborators.
///
/// # Thread Safety
///
/// Construction is serialized by an internal lock; publication goes through
/// a `OnceCell`, which gives every reader a happens-before edge with the end
/// of construction. Calling into the same gate from inside its constructor
/// deadlocks.
///
/// # Example
///
/// ```
/// use monostate_concurrency::{InitGate, InitState};
///
/// static GATE: InitGate<Vec<u32>> = InitGate::new();
///
/// let first = GATE.get_or_init(|| vec![1, 2, 3]);
/// let second = GATE.get_or_init(|| unreachable!());
/// assert!(std::ptr::eq(first, second));
/// assert_eq!(GATE.state(), InitState::Ready);
/// ```
pub struct InitGate<T> {
    /// Lifecycle marker, written only while `lock` is held
    state: AtomicU8,

    /// Construction attempts started (successful or not)
    attempts: AtomicU64,

    /// Serializes construction; never held on the fast path
    lock: Mutex<()>,

    /// Publication slot
    slot: OnceCell<T>,
}

impl<T> InitGate<T> {
    /// Create an uninitialized gate
    pub const fn new() -> Self {
        InitGate {
            state: AtomicU8::new(UNINITIALIZED),
            attempts: AtomicU64::new(0),
            lock: const_mutex(()),
            slot: OnceCell::new(),
        }
    }

    /// Published value, if any
    ///
    /// Never blocks. Returns `None` while a constructor is still running.
    pub fn get(&self) -> Option<&T> {
        self.slot.get()
    }

    /// Whether the value is published
    pub fn is_ready(&self) -> bool {
        self.slot.get().is_some()
    }

    /// Current lifecycle state
    pub fn state(&self) -> InitState {
        InitState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Number of construction attempts started so far
    ///
    /// Stays at 1 after a successful first construction no matter how many
    /// callers raced for it.
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Get the value, constructing it with `init` on first access
    pub fn get_or_init<F>(&self, init: F) -> &T
    where
        F: FnOnce() -> T,
    {
        match self.get_or_try_init(|| Ok::<T, Infallible>(init())) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Get the value, constructing it with a fallible `init` on first access
    ///
    /// If `init` returns `Err`, the error goes to this caller only, nothing is
    /// published, and the gate returns to [`InitState::Uninitialized`] so the
    /// next caller runs its own constructor. Callers blocked on the lock during
    /// a failed attempt re-check and then attempt construction themselves.
    pub fn get_or_try_init<F, E>(&self, init: F) -> Result<&T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if let Some(value) = self.slot.get() {
            return Ok(value);
        }
        self.initialize(init)
    }

    #[cold]
    fn initialize<F, E>(&self, init: F) -> Result<&T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let _gate_guard = self.lock.lock();

        // Another thread may have published while we waited for the lock
        if let Some(value) = self.slot.get() {
            return Ok(value);
        }

        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.store(INITIALIZING, Ordering::Release);
        let rollback = Rollback {
            state: &self.state,
            attempt,
            armed: true,
        };
        tracing::debug!(attempt, "gate construction started");

        let value = match init() {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(attempt, "gate construction failed, rolled back");
                return Err(e);
            }
        };

        // Under the gate lock nobody else can fill the slot
        let published = self.slot.get_or_init(|| value);
        self.state.store(READY, Ordering::Release);
        rollback.disarm();
        tracing::debug!(attempt, "gate construction complete");

        Ok(published)
    }

    /// Consume the gate, returning the published value if any
    pub fn into_inner(self) -> Option<T> {
        self.slot.into_inner()
    }
}

impl<T> Default for InitGate<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for InitGate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InitGate")
            .field("state", &self.state())
            .field("attempts", &self.attempts())
            .field("value", &self.slot.get())
            .finish()
    }
}

/// Resets the gate to Uninitialized unless construction published a value
struct Rollback<'a> {
    state: &'a AtomicU8,
    attempt: u64,
    armed: bool,
}

impl Rollback<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for Rollback<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.state.store(UNINITIALIZED, Ordering::Release);
        if std::thread::panicking() {
            tracing::warn!(
                attempt = self.attempt,
                "gate constructor panicked, rolled back"
            );
        }
    }
}
