//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Armageddon
///
/// Hosts that do not care about the finer-grained API error taxonomy can
/// collapse everything into this type.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum ArmageddonError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    /// The session is gone and the user has to sign in again.
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ArmageddonError {
    /// Whether the caller should route the user back to the login entry point
    #[must_use]
    pub const fn requires_login(&self) -> bool {
        matches!(self, Self::Auth(_))
    }
}

/// Result type alias for Armageddon operations
pub type Result<T> = std::result::Result<T, ArmageddonError>;
