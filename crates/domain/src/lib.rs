//! # Armageddon Domain
//!
//! Business domain types for the Armageddon finance client.
//!
//! This crate contains:
//! - Domain error types and Result definitions
//! - Configuration structures
//! - The normalized API response envelope ([`ApiResult`])
//! - Transaction, goal and user DTOs exchanged with the backend
//!
//! ## Architecture
//! - No dependencies on other Armageddon crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures (no I/O)

#[macro_use]
pub mod macros;
pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
