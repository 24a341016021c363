//! Public types for the monostate API.
//!
//! This module re-exports types from internal crates with a clean public interface.

// Core value type
pub use monostate_core::Value;

// Construction gate
pub use monostate_concurrency::{InitGate, InitState};

// Synchronized primitives
pub use monostate_primitives::{SharedAttrs, SharedState};
