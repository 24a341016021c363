//! Shared State Container Tests
//!
//! Tests for append/read_all:
//! - Ordered appends
//! - Concurrent appends lose nothing
//! - Snapshot reads never see a partial batch

use crate::*;
use monostate::Value;
use proptest::prelude::*;
use std::sync::{Arc, Barrier};
use std::thread;

/// append(1, 2) then append(3) reads back as [1, 2, 3]
#[test]
fn test_sequential_appends_keep_order() {
    let gate = create_gate();
    let shared = SharedInstance::builder().build_in(&gate).unwrap();

    shared.append([1, 2]).unwrap();
    shared.append([3]).unwrap();

    assert_eq!(
        shared.read_all().unwrap(),
        vec![Value::Int(1), Value::Int(2), Value::Int(3)]
    );
}

/// Two threads append concurrently; both values land exactly once
#[test]
fn test_two_thread_appends_both_present() {
    init_tracing();

    let gate = Arc::new(create_gate());
    let barrier = Arc::new(Barrier::new(2));

    let handles: Vec<_> = ["added from A", "added from B"]
        .into_iter()
        .map(|msg| {
            let gate = Arc::clone(&gate);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let shared = SharedInstance::builder().build_in(&gate).unwrap();
                barrier.wait();
                shared.append([msg]).unwrap();
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }

    let attrs = gate.get().unwrap().read_all().unwrap();
    assert_eq!(attrs.len(), 2);
    for msg in ["added from A", "added from B"] {
        let hits = attrs.iter().filter(|v| v.as_str() == Some(msg)).count();
        assert_eq!(hits, 1, "{} should appear exactly once", msg);
    }
}

/// Many writers through distinct handles: no lost or duplicated append
#[test]
fn test_concurrent_appends_no_lost_update() {
    const NUM_WRITERS: usize = 10;
    const APPENDS_PER_THREAD: i64 = 100;

    let shared = create_instance("contended");
    let barrier = Arc::new(Barrier::new(NUM_WRITERS));

    let handles: Vec<_> = (0..NUM_WRITERS)
        .map(|i| {
            let shared = shared.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for j in 0..APPENDS_PER_THREAD {
                    shared.append([i as i64 * 1_000 + j]).unwrap();
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }

    let mut seen: Vec<i64> = shared
        .read_all()
        .unwrap()
        .iter()
        .map(|v| v.as_int().unwrap())
        .collect();
    seen.sort_unstable();

    let mut expected: Vec<i64> = (0..NUM_WRITERS as i64)
        .flat_map(|i| (0..APPENDS_PER_THREAD).map(move |j| i * 1_000 + j))
        .collect();
    expected.sort_unstable();
    assert_eq!(seen, expected);
}

/// Readers racing writers only ever see whole batches
#[test]
fn test_read_snapshot_isolation() {
    const NUM_WRITERS: usize = 4;
    const BATCHES: usize = 50;
    const BATCH_LEN: usize = 3;

    let shared = create_instance("snapshots");
    let barrier = Arc::new(Barrier::new(NUM_WRITERS + 2));

    let mut handles: Vec<_> = (0..NUM_WRITERS)
        .map(|w| {
            let shared = shared.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..BATCHES {
                    shared.append(vec![w as i64; BATCH_LEN]).unwrap();
                }
            })
        })
        .collect();

    for _ in 0..2 {
        let shared = shared.clone();
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            let mut last_len = 0;
            for _ in 0..BATCHES {
                let snapshot = shared.read_all().unwrap();
                assert_eq!(snapshot.len() % BATCH_LEN, 0, "partial batch observed");
                assert!(snapshot.len() >= last_len, "snapshot went backwards");
                for chunk in snapshot.chunks(BATCH_LEN) {
                    assert!(chunk.iter().all(|v| *v == chunk[0]));
                }
                last_len = snapshot.len();
            }
        }));
    }

    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(shared.len().unwrap(), NUM_WRITERS * BATCHES * BATCH_LEN);
}

/// A snapshot is detached from later appends
#[test]
fn test_snapshot_is_a_copy() {
    let shared = create_instance("copy");
    shared.append(["before"]).unwrap();
    let snapshot = shared.read_all().unwrap();
    shared.append(["after"]).unwrap();
    assert_eq!(snapshot, vec![Value::from("before")]);
    assert_eq!(shared.len().unwrap(), 2);
}

/// Appending nothing is allowed and changes nothing
#[test]
fn test_empty_append() {
    let shared = create_instance("empty");
    shared.append(Vec::<Value>::new()).unwrap();
    assert!(shared.is_empty().unwrap());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_read_all_is_concatenation_of_appends(
        batches in prop::collection::vec(prop::collection::vec(any::<i64>(), 0..6), 0..12)
    ) {
        let shared = create_instance("prop");
        for batch in &batches {
            shared.append(batch.iter().copied()).unwrap();
        }
        let expected: Vec<Value> = batches.concat().into_iter().map(Value::Int).collect();
        prop_assert_eq!(shared.read_all().unwrap(), expected);
    }
}
