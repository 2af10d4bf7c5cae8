//! # wadb-core - Core Domain Types
//!
//! Foundation crate for wadb. Provides the endpoint domain type, error
//! handling, and logging setup.
//!
//! This crate has **zero internal dependencies** -- it only depends on external
//! crates (serde, thiserror, regex, tracing).
//!
//! ## Public API
//!
//! ### Endpoints (`endpoint`)
//! - [`Endpoint`] - A `host:port` debugging target
//! - [`extract_endpoints()`] - All endpoint matches in free-form tool output
//! - [`last_endpoint()`] - The authoritative (last) endpoint match
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Custom error enum with `fatal` vs `recoverable` classification
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//! - [`ResultExt`] - Extension trait for adding error context
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use wadb_core::prelude::*;
//! ```

pub mod endpoint;
pub mod error;
pub mod logging;

/// Prelude for common imports used throughout all wadb crates
pub mod prelude {
    pub use super::error::{Error, Result, ResultExt};
    pub use tracing::{debug, error, info, instrument, trace, warn};
}

// Re-export commonly used types at crate root for convenience
pub use endpoint::{extract_endpoints, host_part, last_endpoint, Endpoint};
pub use error::{Error, Result, ResultExt};
