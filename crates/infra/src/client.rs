//! Client wiring
//!
//! Builds the credential store, transport, refresh endpoint, coordinator,
//! session monitor and pipeline from an [`AppConfig`].

use std::sync::Arc;
use std::time::Duration;

use armageddon_common::auth::{FileCredentialStore, MemoryCredentialStore};
use armageddon_common::{AuthEventSink, CredentialStore, RefreshCoordinator, SessionMonitor};
use armageddon_domain::constants::DEFAULT_CREDENTIALS_FILE;
use armageddon_domain::{AppConfig, CredentialBackend, CredentialConfig};
use tracing::info;

use crate::api::{
    ApiClient, ApiError, AuthApi, GoalApi, RefreshEndpoint, StatisticsApi, TransactionApi, UserApi,
};
use crate::http::{HttpClient, HttpTransport};

/// Entry point for hosts: one configured pipeline plus the endpoint groups
#[derive(Debug, Clone)]
pub struct ArmageddonClient {
    api: Arc<ApiClient>,
    auth_path: String,
}

impl ArmageddonClient {
    /// Wire a client from configuration
    ///
    /// # Arguments
    ///
    /// * `config` - Loaded configuration (see [`crate::config::load`])
    /// * `sink` - Receives the "session expired" signal
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] if the transport cannot be built or the
    /// configured credential backend is unavailable in this build
    pub fn from_config(config: &AppConfig, sink: Arc<dyn AuthEventSink>) -> Result<Self, ApiError> {
        let mut builder = HttpClient::builder().timeout(Duration::from_secs(config.api.timeout_secs));
        if let Some(agent) = &config.api.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        let transport: Arc<dyn HttpTransport> = Arc::new(
            builder.build().map_err(|e| ApiError::Config(format!("Failed to build HttpClient: {e}")))?,
        );

        let store = credential_store(&config.credentials)?;
        Ok(Self::with_parts(config, transport, store, sink))
    }

    /// Wire a client around caller-supplied transport and store
    pub fn with_parts(
        config: &AppConfig,
        transport: Arc<dyn HttpTransport>,
        store: Arc<dyn CredentialStore>,
        sink: Arc<dyn AuthEventSink>,
    ) -> Self {
        let refresher = Arc::new(RefreshEndpoint::new(config.api.auth_url("refresh"), Arc::clone(&transport)));
        let coordinator = Arc::new(RefreshCoordinator::new(refresher, Arc::clone(&store)));
        let monitor = Arc::new(SessionMonitor::new(sink));

        let api = Arc::new(ApiClient::new(config.api.base_url.clone(), transport, store, coordinator, monitor));

        info!(base_url = %config.api.base_url, backend = %config.credentials.backend, "Armageddon client ready");
        Self { api, auth_path: config.api.auth_path.clone() }
    }

    /// The underlying pipeline, for calls without a typed wrapper
    pub fn api(&self) -> &Arc<ApiClient> {
        &self.api
    }

    pub fn auth(&self) -> AuthApi {
        AuthApi::new(Arc::clone(&self.api), self.auth_path.clone())
    }

    pub fn users(&self) -> UserApi {
        UserApi::new(Arc::clone(&self.api))
    }

    pub fn transactions(&self) -> TransactionApi {
        TransactionApi::new(Arc::clone(&self.api))
    }

    pub fn goals(&self) -> GoalApi {
        GoalApi::new(Arc::clone(&self.api))
    }

    pub fn statistics(&self) -> StatisticsApi {
        StatisticsApi::new(Arc::clone(&self.api))
    }
}

/// Credential store for the configured backend
///
/// # Errors
///
/// Returns [`ApiError::Config`] for the keychain backend when the `platform`
/// feature is disabled
pub fn credential_store(config: &CredentialConfig) -> Result<Arc<dyn CredentialStore>, ApiError> {
    match config.backend {
        CredentialBackend::Memory => Ok(Arc::new(MemoryCredentialStore::new())),
        CredentialBackend::File => {
            let path = config.path.clone().unwrap_or_else(|| DEFAULT_CREDENTIALS_FILE.into());
            Ok(Arc::new(FileCredentialStore::new(path)))
        }
        CredentialBackend::Keychain => keychain_store(config),
    }
}

#[cfg(feature = "platform")]
fn keychain_store(config: &CredentialConfig) -> Result<Arc<dyn CredentialStore>, ApiError> {
    use armageddon_common::auth::KeychainCredentialStore;
    use armageddon_common::KeychainProvider;
    use armageddon_domain::constants::KEYCHAIN_ACCOUNT;

    let keychain = KeychainProvider::new(config.service_name.clone());
    Ok(Arc::new(KeychainCredentialStore::new(keychain, KEYCHAIN_ACCOUNT)))
}

#[cfg(not(feature = "platform"))]
fn keychain_store(_config: &CredentialConfig) -> Result<Arc<dyn CredentialStore>, ApiError> {
    Err(ApiError::Config("keychain credential backend requires the `platform` feature".to_string()))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use armageddon_common::auth::NoopAuthEventSink;

    use super::*;

    #[test]
    fn builds_from_default_config() {
        let config = AppConfig::default();
        let client = ArmageddonClient::from_config(&config, Arc::new(NoopAuthEventSink)).unwrap();
        assert_eq!(client.api().base_url(), "http://localhost:8080");
    }

    #[tokio::test]
    async fn memory_backend_starts_empty() {
        let config = CredentialConfig { backend: CredentialBackend::Memory, ..CredentialConfig::default() };
        let store = credential_store(&config).unwrap();
        assert!(store.read().await.is_none());
    }

    #[tokio::test]
    async fn file_backend_uses_configured_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path: PathBuf = dir.path().join("tokens.json");
        let config = CredentialConfig {
            backend: CredentialBackend::File,
            path: Some(path.clone()),
            ..CredentialConfig::default()
        };

        let store = credential_store(&config).unwrap();
        store.write(&armageddon_common::CredentialPair::new("a", "r")).await.unwrap();
        assert!(path.exists());
    }

    #[cfg(not(feature = "platform"))]
    #[test]
    fn keychain_backend_requires_platform_feature() {
        let config = CredentialConfig { backend: CredentialBackend::Keychain, ..CredentialConfig::default() };
        assert!(matches!(credential_store(&config), Err(ApiError::Config(_))));
    }
}
