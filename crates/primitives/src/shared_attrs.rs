//! SharedAttrs primitive
//!
//! Keyed attributes shared by every handle created from the same store.
//! Handles are distinct objects; the backing map is one. A write through any
//! handle is visible through all of them once it returns.
//!
//! Every access goes through the store's lock. Keys are kept in sorted order
//! so snapshots are deterministic.

use crate::poison::PoisonFlag;
use crate::DEFAULT_LABEL;
use monostate_core::{Result, Value};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

struct AttrStore<V> {
    label: String,
    map: RwLock<BTreeMap<String, V>>,
    poison: PoisonFlag,
}

/// Handle to a shared keyed attribute store
///
/// # Example
///
/// ```
/// use monostate_primitives::SharedAttrs;
/// use monostate_core::Value;
///
/// let first = SharedAttrs::new();
/// let second = first.handle();
///
/// first.set("foo", Value::from("bar")).unwrap();
/// second.set("foo", Value::from("spam")).unwrap();
///
/// assert_eq!(first.get("foo").unwrap(), Some(Value::from("spam")));
/// assert!(first.shares_store_with(&second));
/// ```
pub struct SharedAttrs<V = Value> {
    store: Arc<AttrStore<V>>,
}

impl<V> SharedAttrs<V> {
    /// Create a new, empty store and return its first handle
    pub fn new() -> Self {
        Self::labeled(DEFAULT_LABEL)
    }

    /// Create a new, empty store whose log events carry `label`
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            store: Arc::new(AttrStore {
                label: label.into(),
                map: RwLock::new(BTreeMap::new()),
                poison: PoisonFlag::new(),
            }),
        }
    }

    /// Another handle onto the same backing store
    pub fn handle(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }

    /// Whether `other` reads and writes the same backing store
    pub fn shares_store_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.store, &other.store)
    }

    /// Number of live handles onto the backing store
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.store)
    }

    /// Label carried in log events and errors
    pub fn label(&self) -> &str {
        &self.store.label
    }

    /// Set `key`, returning the previous value
    pub fn set(&self, key: impl Into<String>, value: V) -> Result<Option<V>> {
        let key = key.into();
        let store = &self.store;
        store.poison.check(&store.label)?;
        let mut map = store.map.write();
        store.poison.check(&store.label)?;
        let _armed = store.poison.arm(&store.label);
        tracing::trace!(label = %store.label, key = %key, "attribute set");
        Ok(map.insert(key, value))
    }

    /// Remove `key`, returning its value
    pub fn remove(&self, key: &str) -> Result<Option<V>> {
        let store = &self.store;
        store.poison.check(&store.label)?;
        let mut map = store.map.write();
        store.poison.check(&store.label)?;
        let _armed = store.poison.arm(&store.label);
        Ok(map.remove(key))
    }

    /// Copy of the value under `key`
    pub fn get(&self, key: &str) -> Result<Option<V>>
    where
        V: Clone,
    {
        self.read(|map| map.get(key).cloned())
    }

    /// Whether `key` is set
    pub fn contains(&self, key: &str) -> Result<bool> {
        self.read(|map| map.contains_key(key))
    }

    /// Number of attributes
    pub fn len(&self) -> Result<usize> {
        self.read(BTreeMap::len)
    }

    /// Whether no attribute is set
    pub fn is_empty(&self) -> Result<bool> {
        self.read(BTreeMap::is_empty)
    }

    /// Copy of every attribute, sorted by key
    pub fn snapshot(&self) -> Result<BTreeMap<String, V>>
    where
        V: Clone,
    {
        self.read(BTreeMap::clone)
    }

    /// Whether a writer panicked while holding the lock
    pub fn is_poisoned(&self) -> bool {
        self.store.poison.is_set()
    }

    fn read<R>(&self, f: impl FnOnce(&BTreeMap<String, V>) -> R) -> Result<R> {
        let store = &self.store;
        store.poison.check(&store.label)?;
        let map = store.map.read();
        store.poison.check(&store.label)?;
        Ok(f(&map))
    }
}

impl<V> Default for SharedAttrs<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for SharedAttrs<V> {
    fn clone(&self) -> Self {
        self.handle()
    }
}

impl<V: fmt::Debug> fmt::Debug for SharedAttrs<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedAttrs")
            .field("label", &self.store.label)
            .field("handles", &self.handle_count())
            .field("poisoned", &self.is_poisoned())
            .finish_non_exhaustive()
    }
}
