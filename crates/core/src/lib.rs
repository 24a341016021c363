//! Core types for monostate
//!
//! This crate defines the shared vocabulary of the workspace:
//! - [`Value`]: the opaque value model stored in shared containers
//! - [`Error`]: the internal error taxonomy surfaced by gates and containers

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod value;

pub use error::{Error, Result};
pub use value::Value;
