//! # Monostate
//!
//! Thread-safe, lazily-initialized shared state for in-process
//! collaborators.
//!
//! However many threads ask for the shared instance first, exactly one
//! instance is constructed and every caller receives the same one. All
//! later mutations go through the instance's own locks, so no update is lost
//! and no reader sees a torn value.
//!
//! ## Quick Start
//!
//! ```
//! use monostate::prelude::*;
//!
//! let shared = get_instance()?;
//! shared.append(["added from main"])?;
//! assert!(shared.read_all()?.contains(&Value::from("added from main")));
//! # Ok::<(), monostate::Error>(())
//! ```
//!
//! ## Components
//!
//! - [`InitGate`] - double-checked one-time construction
//! - [`SharedInstance`] - append-only `attrs` plus keyed settings
//! - [`SharedState`] / [`SharedAttrs`] - the underlying synchronized primitives
//!
//! The process-wide [`get_instance`] is a thin accessor over one static
//! [`InitGate`]. Collaborators that want their own lifetime own a gate and
//! use [`SharedInstanceBuilder::build_in`].

#![warn(missing_docs)]

mod error;
mod instance;
mod types;

pub mod prelude;

// Re-export main entry points
pub use error::{Error, Result};
pub use instance::{
    get_instance, instance_state, SharedInstance, SharedInstanceBuilder, SharedInstanceRef,
};

// Re-export types
pub use types::*;
