//! Shared instance entry point for monostate.
//!
//! This module provides [`SharedInstance`], the object every collaborator
//! shares, the [`get_instance`] accessor that lazily constructs the
//! process-wide one, and a builder for constructing instances behind
//! gates the caller owns.

use crate::error::{Error, Result};
use monostate_concurrency::{InitGate, InitState};
use monostate_core::Value;
use monostate_primitives::{SharedAttrs, SharedState, DEFAULT_LABEL};
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Gate behind [`get_instance`]
static INSTANCE: InitGate<SharedInstanceRef> = InitGate::new();

/// Get the process-wide shared instance, constructing it on first call.
///
/// Every call, from any thread, returns a handle to the same instance. The
/// first caller constructs it with default settings; concurrent first
/// callers block until construction finishes and never see a partially
/// built instance. After that the call takes no lock.
///
/// # Errors
///
/// [`Error::ConstructionFailure`] if construction fails. Nothing is
/// published in that case and the next call retries.
///
/// # Example
///
/// ```
/// use monostate::get_instance;
///
/// let a = get_instance()?;
/// let b = get_instance()?;
/// assert!(a.ptr_eq(&b));
/// # Ok::<(), monostate::Error>(())
/// ```
pub fn get_instance() -> Result<SharedInstanceRef> {
    SharedInstance::builder().build_in(&INSTANCE)
}

/// Lifecycle state of the process-wide instance.
pub fn instance_state() -> InitState {
    INSTANCE.state()
}

/// The shared object.
///
/// Holds an ordered, append-only `attrs` sequence and a keyed settings
/// store. Both are internally synchronized, each behind its own lock, so a
/// `&SharedInstance` is all any thread needs.
pub struct SharedInstance {
    label: String,
    attrs: SharedState<Value>,
    settings: SharedAttrs,
}

impl SharedInstance {
    /// Create a builder for instance configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use monostate::SharedInstance;
    ///
    /// let config = SharedInstance::builder()
    ///     .label("app-config")
    ///     .initial_capacity(16)
    ///     .build()?;
    /// assert_eq!(config.label(), "app-config");
    /// # Ok::<(), monostate::Error>(())
    /// ```
    pub fn builder() -> SharedInstanceBuilder {
        SharedInstanceBuilder::new()
    }

    /// Label carried in log events and errors.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Append `values`, in the order given, to `attrs`.
    ///
    /// Accepts zero or more values of anything convertible to [`Value`].
    ///
    /// ```
    /// # let shared = monostate::SharedInstance::builder().build()?;
    /// shared.append([1, 2])?;
    /// shared.append(["three"])?;
    /// assert_eq!(shared.len()?, 3);
    /// # Ok::<(), monostate::Error>(())
    /// ```
    pub fn append<I, V>(&self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.attrs
            .append(values.into_iter().map(Into::into))
            .map_err(Error::from)
    }

    /// Snapshot copy of `attrs`.
    pub fn read_all(&self) -> Result<Vec<Value>> {
        self.attrs.read_all().map_err(Error::from)
    }

    /// Visit `attrs` under the read lock without copying.
    pub fn with_attrs<R>(&self, f: impl FnOnce(&[Value]) -> R) -> Result<R> {
        self.attrs.with_attrs(f).map_err(Error::from)
    }

    /// Number of values in `attrs`.
    pub fn len(&self) -> Result<usize> {
        self.attrs.len().map_err(Error::from)
    }

    /// Whether `attrs` is empty.
    pub fn is_empty(&self) -> Result<bool> {
        self.attrs.is_empty().map_err(Error::from)
    }

    /// Keyed settings shared with every holder of this instance.
    pub fn settings(&self) -> &SharedAttrs {
        &self.settings
    }

    /// Whether a writer panicked while holding one of this instance's locks.
    pub fn is_poisoned(&self) -> bool {
        self.attrs.is_poisoned() || self.settings.is_poisoned()
    }
}

impl fmt::Debug for SharedInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedInstance")
            .field("label", &self.label)
            .field("attrs", &self.attrs)
            .field("settings", &self.settings)
            .finish()
    }
}

/// Shared handle to a [`SharedInstance`].
///
/// Cloning is cheap and yields another handle to the same instance.
#[derive(Clone)]
pub struct SharedInstanceRef(Arc<SharedInstance>);

impl SharedInstanceRef {
    /// Whether both handles point at the same instance.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Number of live handles to this instance.
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.0)
    }
}

impl Deref for SharedInstanceRef {
    type Target = SharedInstance;

    fn deref(&self) -> &SharedInstance {
        &self.0
    }
}

impl fmt::Debug for SharedInstanceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

/// Builder for shared instance configuration.
///
/// # Example
///
/// ```
/// use monostate::{InitGate, SharedInstance, SharedInstanceRef};
///
/// // A gate owned by a collaborator instead of the process-wide one
/// let gate: InitGate<SharedInstanceRef> = InitGate::new();
/// let first = SharedInstance::builder().label("plugins").build_in(&gate)?;
/// let again = SharedInstance::builder().label("ignored").build_in(&gate)?;
/// assert!(first.ptr_eq(&again));
/// assert_eq!(again.label(), "plugins");
/// # Ok::<(), monostate::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct SharedInstanceBuilder {
    label: String,
    initial_capacity: usize,
}

impl SharedInstanceBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            label: DEFAULT_LABEL.to_string(),
            initial_capacity: 0,
        }
    }

    /// Set the label carried in log events and errors.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Reserve room for `capacity` values in `attrs` at construction.
    ///
    /// A reservation the allocator cannot satisfy fails construction with
    /// [`Error::ConstructionFailure`] rather than aborting the process.
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Construct a standalone instance.
    pub fn build(self) -> Result<SharedInstanceRef> {
        self.construct()
    }

    /// Get the instance behind `gate`, constructing it from this
    /// configuration if the gate is not yet ready.
    ///
    /// Once the gate is ready the configuration is ignored and the existing
    /// instance is returned.
    pub fn build_in(self, gate: &InitGate<SharedInstanceRef>) -> Result<SharedInstanceRef> {
        gate.get_or_try_init(|| self.construct()).cloned()
    }

    fn construct(self) -> Result<SharedInstanceRef> {
        let attrs = SharedState::try_with_capacity(self.label.as_str(), self.initial_capacity)
            .map_err(|e| {
                tracing::warn!(
                    label = %self.label,
                    error = %e,
                    "shared instance construction failed"
                );
                Error::from(e)
            })?;
        let settings = SharedAttrs::labeled(format!("{}.settings", self.label));

        tracing::debug!(
            label = %self.label,
            capacity = self.initial_capacity,
            "shared instance constructed"
        );

        Ok(SharedInstanceRef(Arc::new(SharedInstance {
            label: self.label,
            attrs,
            settings,
        })))
    }
}

impl Default for SharedInstanceBuilder {
    fn default() -> Self {
        Self::new()
    }
}
