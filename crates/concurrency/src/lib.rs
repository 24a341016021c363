//! Concurrency layer for monostate
//!
//! This crate implements single construction under contention:
//! - InitGate: double-checked acquisition around a one-time constructor
//! - InitState: the observable Uninitialized → Initializing → Ready lifecycle
//! - Rollback of failed or panicked construction so the next caller retries

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod gate;

pub use gate::{InitGate, InitState};
