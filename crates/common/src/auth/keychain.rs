//! Credential storage layered on top of `KeychainProvider`.
//!
//! The pair is serialized into a single keychain secret rather than one
//! secret per token, so a write replaces both halves at once. Keychain calls
//! block, so they run on the blocking pool.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::auth::traits::CredentialStore;
use crate::auth::types::{CredentialPair, CredentialStoreError};
use crate::security::{KeychainError, KeychainProvider};

/// Keychain-backed credential store
#[derive(Debug, Clone)]
pub struct KeychainCredentialStore {
    keychain: KeychainProvider,
    account: String,
}

impl KeychainCredentialStore {
    /// Create a store for `account` under the provider's service name
    pub fn new(keychain: KeychainProvider, account: impl Into<String>) -> Self {
        Self { keychain, account: account.into() }
    }

    /// Keychain account the pair is stored under
    #[must_use]
    pub fn account(&self) -> &str {
        &self.account
    }
}

#[async_trait]
impl CredentialStore for KeychainCredentialStore {
    async fn read(&self) -> Option<CredentialPair> {
        let (keychain, account) = (self.keychain.clone(), self.account.clone());
        let secret = match tokio::task::spawn_blocking(move || keychain.get_secret(&account)).await {
            Ok(Ok(secret)) => secret,
            Ok(Err(KeychainError::NotFound)) => return None,
            Ok(Err(e)) => {
                warn!(account = %self.account, error = %e, "Failed to read credentials from keychain");
                return None;
            }
            Err(e) => {
                warn!(account = %self.account, error = %e, "Keychain read task failed");
                return None;
            }
        };

        match serde_json::from_str::<CredentialPair>(&secret) {
            Ok(pair) if pair.is_complete() => Some(pair),
            Ok(_) | Err(_) => {
                warn!(account = %self.account, "Ignoring malformed keychain credentials");
                None
            }
        }
    }

    async fn write(&self, pair: &CredentialPair) -> Result<(), CredentialStoreError> {
        let secret = serde_json::to_string(pair)?;
        let (keychain, account) = (self.keychain.clone(), self.account.clone());
        tokio::task::spawn_blocking(move || keychain.set_secret(&account, &secret))
            .await
            .map_err(|e| CredentialStoreError::Keychain(e.to_string()))?
            .map_err(|e| CredentialStoreError::Keychain(e.to_string()))?;

        debug!(account = %self.account, "Credentials stored in keychain");
        Ok(())
    }

    async fn clear(&self) -> Result<(), CredentialStoreError> {
        let (keychain, account) = (self.keychain.clone(), self.account.clone());
        tokio::task::spawn_blocking(move || keychain.delete_secret(&account))
            .await
            .map_err(|e| CredentialStoreError::Keychain(e.to_string()))?
            .map_err(|e| CredentialStoreError::Keychain(e.to_string()))
    }
}
