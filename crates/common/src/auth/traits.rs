//! Traits for credential storage, token refresh and session events
//!
//! These traits enable dependency injection and testing by abstracting
//! external dependencies (storage medium, refresh endpoint, host UI).

use async_trait::async_trait;

use super::types::{CredentialPair, CredentialStoreError, RefreshFailure};

/// Trait for credential persistence
///
/// Pure storage, no policy. Implementations replace the whole pair at once so
/// a concurrent reader never observes a half-written pair.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Read the stored pair
    ///
    /// Never fails: missing or corrupt data is reported as `None`.
    async fn read(&self) -> Option<CredentialPair>;

    /// Replace the stored pair
    ///
    /// # Errors
    /// Returns error if the storage medium rejects the write
    async fn write(&self, pair: &CredentialPair) -> Result<(), CredentialStoreError>;

    /// Remove any stored pair (idempotent)
    ///
    /// # Errors
    /// Returns error if the storage medium rejects the deletion
    async fn clear(&self) -> Result<(), CredentialStoreError>;
}

/// Trait for the network side of a credential refresh
///
/// Implementations must call the refresh endpoint directly, without going
/// through the authenticated request pipeline.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    /// Exchange a refresh token for a new credential pair
    ///
    /// # Errors
    /// Returns [`RefreshFailure`] on network errors, non-success statuses or
    /// malformed responses
    async fn refresh(&self, refresh_token: &str) -> Result<CredentialPair, RefreshFailure>;
}

/// Receiver of the "send the user back to login" signal
///
/// Implemented by the host application; closures work too.
pub trait AuthEventSink: Send + Sync {
    /// The session can no longer be recovered without signing in again
    fn on_session_expired(&self, reason: &str);
}

impl<F> AuthEventSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn on_session_expired(&self, reason: &str) {
        self(reason);
    }
}
