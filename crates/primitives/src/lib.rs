//! Shared-state primitives for monostate
//!
//! - [`SharedState`]: ordered, append-only sequence behind its own lock
//! - [`SharedAttrs`]: keyed attribute store shared by any number of handles
//!
//! Both report a poisoned lock instead of handing out state that a panicking
//! writer may have left half-updated.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod poison;
pub mod shared_attrs;
pub mod shared_state;

pub use shared_attrs::SharedAttrs;
pub use shared_state::SharedState;

/// Label used when a primitive is created without one
pub const DEFAULT_LABEL: &str = "shared";
