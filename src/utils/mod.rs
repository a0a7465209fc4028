//! Shared utilities for the HTTP layer.
//!
//! - [`errors`]: the `AppError` type every handler returns

pub mod errors;
