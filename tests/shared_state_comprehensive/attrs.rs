//! Keyed Settings Tests
//!
//! Tests for the settings store shared by every holder of an instance:
//! - Writes through one handle are visible through all
//! - Standalone stores are isolated
//! - Concurrent writers through distinct handles

use crate::*;
use monostate::{SharedAttrs, Value};
use std::sync::{Arc, Barrier};
use std::thread;

/// Two handles, one backing store
#[test]
fn test_settings_shared_between_handles() {
    let gate = create_gate();
    let cl1 = SharedInstance::builder().build_in(&gate).unwrap();
    cl1.settings().set("foo", Value::from("bar")).unwrap();

    let cl2 = SharedInstance::builder().build_in(&gate).unwrap();
    assert_eq!(cl2.settings().get("foo").unwrap(), Some(Value::from("bar")));

    cl2.settings().set("foo", Value::from("spam")).unwrap();
    cl2.settings().set("changed", Value::Bool(true)).unwrap();

    let snapshot = cl1.settings().snapshot().unwrap();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot["foo"], Value::from("spam"));
    assert_eq!(snapshot["changed"], Value::Bool(true));
}

/// Standalone attribute handles share state without a shared instance
#[test]
fn test_standalone_attr_handles() {
    let first: SharedAttrs = SharedAttrs::labeled("monostate");
    let second = first.handle();
    second.set("shared", Value::Bool(true)).unwrap();
    assert_eq!(first.get("shared").unwrap(), Some(Value::Bool(true)));
    assert!(first.shares_store_with(&second));

    let other: SharedAttrs = SharedAttrs::new();
    assert!(!other.shares_store_with(&first));
    assert!(other.is_empty().unwrap());
}

/// Concurrent writers through separately obtained instance handles
#[test]
fn test_concurrent_settings_writes() {
    const NUM_THREADS: usize = 8;
    const KEYS_PER_THREAD: i64 = 25;

    let gate = Arc::new(create_gate());
    let barrier = Arc::new(Barrier::new(NUM_THREADS));
    let handles: Vec<_> = (0..NUM_THREADS)
        .map(|i| {
            let gate = Arc::clone(&gate);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let shared = SharedInstance::builder().build_in(&gate).unwrap();
                barrier.wait();
                for j in 0..KEYS_PER_THREAD {
                    shared
                        .settings()
                        .set(format!("thread{}:{}", i, j), Value::Int(j))
                        .unwrap();
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }

    let settings = gate.get().unwrap().settings().snapshot().unwrap();
    assert_eq!(settings.len(), NUM_THREADS * KEYS_PER_THREAD as usize);
    assert_eq!(settings["thread7:24"], Value::Int(24));
}
