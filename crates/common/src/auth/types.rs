//! Credential types
//!
//! Defines the access/refresh credential pair and the error types shared by
//! the stores and the refresh coordinator.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Access and refresh credentials, always stored and read as one unit
///
/// Serialized camelCase (`accessToken`, `refreshToken`), which is both the
/// backend's wire format and the on-disk format of the file store.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialPair {
    /// Short-lived bearer token sent on every authenticated request
    pub access_token: String,

    /// Long-lived token exchanged for a new pair
    pub refresh_token: String,
}

impl CredentialPair {
    /// Create a new credential pair
    #[must_use]
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self { access_token: access_token.into(), refresh_token: refresh_token.into() }
    }

    /// Both halves are present
    ///
    /// Stores treat an incomplete pair as absent.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.access_token.is_empty() && !self.refresh_token.is_empty()
    }

    /// Value of the `Authorization` header for this pair
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

// Token values never reach logs.
impl fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Credential persistence errors
#[derive(Debug, Error)]
pub enum CredentialStoreError {
    /// Filesystem operation failed
    #[error("Credential file error: {0}")]
    Io(#[from] std::io::Error),

    /// Pair could not be serialized
    #[error("Credential serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Platform keychain rejected the operation
    #[error("Keychain error: {0}")]
    Keychain(String),
}

/// Why a refresh attempt failed
///
/// Cloneable so the single in-flight outcome can be handed to every waiter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshFailure {
    /// The refresh endpoint could not be reached
    #[error("Refresh request failed: {0}")]
    Network(String),

    /// The server answered with a non-success status
    #[error("Refresh rejected with status {status}")]
    Rejected { status: u16 },

    /// The server answered 2xx but not with `{ success: true, data: pair }`
    #[error("Malformed refresh response: {0}")]
    MalformedResponse(String),

    /// The new pair could not be persisted
    #[error("Failed to persist refreshed credentials: {0}")]
    Storage(String),

    /// The refresh task terminated without producing an outcome
    #[error("Refresh task aborted: {0}")]
    Aborted(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_camel_case() {
        let pair = CredentialPair::new("a", "r");
        let json = serde_json::to_string(&pair).unwrap();
        assert_eq!(json, r#"{"accessToken":"a","refreshToken":"r"}"#);
    }

    #[test]
    fn debug_output_is_redacted() {
        let pair = CredentialPair::new("secret-access", "secret-refresh");
        let debug = format!("{pair:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn completeness_requires_both_tokens() {
        assert!(CredentialPair::new("a", "r").is_complete());
        assert!(!CredentialPair::new("", "r").is_complete());
        assert!(!CredentialPair::new("a", "").is_complete());
    }

    #[test]
    fn bearer_header_value() {
        assert_eq!(CredentialPair::new("abc", "r").bearer(), "Bearer abc");
    }
}
