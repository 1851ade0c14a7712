//! User Accounts Shared Library
//!
//! This crate contains the API types and input validation shared by the
//! backend and its clients.

pub mod types;
pub mod validation;

// Re-export commonly used items
pub use types::*;
pub use validation::ValidationError;
