//! Convenient imports for monostate.
//!
//! ```
//! use monostate::prelude::*;
//!
//! let shared = get_instance()?;
//! shared.append([1, 2])?;
//! # Ok::<(), monostate::Error>(())
//! ```

// Main entry points
pub use crate::instance::{get_instance, SharedInstance, SharedInstanceBuilder, SharedInstanceRef};

// Error handling
pub use crate::error::{Error, Result};

// Core types
pub use crate::types::{InitGate, InitState, Value};
