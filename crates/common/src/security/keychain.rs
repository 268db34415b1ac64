//! Generic keychain provider for secure secret storage
//!
//! Thin wrapper over the platform keychain (macOS Keychain Access, Windows
//! Credential Manager, Linux Secret Service) via the `keyring` crate.
//!
//! ## Usage
//!
//! ```no_run
//! use armageddon_common::security::KeychainProvider;
//!
//! let keychain = KeychainProvider::new("Armageddon.api");
//! keychain.set_secret("tokens", "{}")?;
//! let secret = keychain.get_secret("tokens")?;
//! assert_eq!(secret, "{}");
//! # Ok::<(), armageddon_common::security::KeychainError>(())
//! ```

use keyring::Entry;
use thiserror::Error;
use tracing::debug;

/// Generic keychain provider scoped to one service name
#[derive(Debug, Clone)]
pub struct KeychainProvider {
    service_name: String,
}

impl KeychainProvider {
    /// Create a new keychain provider for a specific service
    ///
    /// # Arguments
    /// * `service_name` - Service identifier (e.g., "Armageddon.api")
    pub fn new(service_name: impl Into<String>) -> Self {
        Self { service_name: service_name.into() }
    }

    /// Service identifier used for every entry
    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Store a secret value in the platform keychain
    ///
    /// # Errors
    /// Returns `KeychainError::AccessFailed` if keychain access fails
    pub fn set_secret(&self, key: &str, value: &str) -> Result<(), KeychainError> {
        debug!(service = %self.service_name, key = %key, "Storing secret in keychain");

        let entry = self.create_entry(key)?;
        entry.set_password(value).map_err(|e| {
            KeychainError::AccessFailed(format!("Failed to store secret for {}: {}", key, e))
        })?;

        Ok(())
    }

    /// Retrieve a secret value from the platform keychain
    ///
    /// # Errors
    /// Returns `KeychainError::NotFound` if secret doesn't exist
    /// Returns `KeychainError::AccessFailed` if keychain access fails
    pub fn get_secret(&self, key: &str) -> Result<String, KeychainError> {
        debug!(service = %self.service_name, key = %key, "Retrieving secret from keychain");

        let entry = self.create_entry(key)?;
        entry.get_password().map_err(|e| {
            if matches!(e, keyring::Error::NoEntry) {
                KeychainError::NotFound
            } else {
                KeychainError::AccessFailed(format!("Failed to retrieve secret for {}: {}", key, e))
            }
        })
    }

    /// Delete a secret from the platform keychain (idempotent)
    ///
    /// # Errors
    /// Returns `KeychainError::AccessFailed` if the keychain rejects the
    /// deletion
    pub fn delete_secret(&self, key: &str) -> Result<(), KeychainError> {
        debug!(service = %self.service_name, key = %key, "Deleting secret from keychain");

        let entry = self.create_entry(key)?;
        match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(KeychainError::AccessFailed(format!(
                "Failed to delete secret for {}: {}",
                key, e
            ))),
        }
    }

    fn create_entry(&self, account: &str) -> Result<Entry, KeychainError> {
        Entry::new(&self.service_name, account).map_err(|e| {
            KeychainError::AccessFailed(format!("Failed to create keychain entry: {}", e))
        })
    }
}

/// Keychain error types
#[derive(Debug, Error)]
pub enum KeychainError {
    /// Keychain access failed (permission denied, not available, etc.)
    #[error("Keychain access failed: {0}")]
    AccessFailed(String),

    /// Entry not found in keychain
    #[error("Entry not found")]
    NotFound,
}
