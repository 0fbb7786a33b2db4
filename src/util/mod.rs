//! Shared utilities: error types and result alias.

pub mod error;

pub use error::{Error, Result};
