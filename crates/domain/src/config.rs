//! Configuration structures
//!
//! Populated once at startup by the infra loader (file, then environment
//! overrides). Every section has serde defaults so a partial file is valid.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_AUTH_PATH, DEFAULT_KEYCHAIN_SERVICE, DEFAULT_TIMEOUT_SECS,
};

/// Top-level client configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub credentials: CredentialConfig,
    pub log: LogConfig,
}

/// Backend API settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to (no trailing slash)
    pub base_url: String,
    /// Path prefix of the authentication endpoints (`login`, `refresh`, ...)
    pub auth_path: String,
    /// Transport timeout in seconds
    pub timeout_secs: u64,
    pub user_agent: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            auth_path: DEFAULT_AUTH_PATH.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: None,
        }
    }
}

impl ApiConfig {
    /// Absolute URL of the authentication endpoint with the given suffix
    ///
    /// ```
    /// use armageddon_domain::ApiConfig;
    ///
    /// let config = ApiConfig::default();
    /// assert_eq!(config.auth_url("refresh"), "http://localhost:8080/api/auth/refresh");
    /// ```
    #[must_use]
    pub fn auth_url(&self, suffix: &str) -> String {
        format!("{}{}", self.base_url, self.auth_endpoint(suffix))
    }

    /// Endpoint path (relative to `base_url`) of an authentication call
    #[must_use]
    pub fn auth_endpoint(&self, suffix: &str) -> String {
        format!("{}/{}", self.auth_path.trim_end_matches('/'), suffix.trim_start_matches('/'))
    }
}

/// Where the credential pair is persisted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialBackend {
    /// Process memory only; credentials vanish on exit
    Memory,
    /// JSON file on disk
    #[default]
    File,
    /// Platform keychain (requires the `platform` feature of the common crate)
    Keychain,
}

crate::impl_wire_enum_conversions!(CredentialBackend {
    Memory => "memory",
    File => "file",
    Keychain => "keychain",
});

/// Credential storage settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialConfig {
    pub backend: CredentialBackend,
    /// File location for the `file` backend. Defaults to the working
    /// directory when unset.
    pub path: Option<PathBuf>,
    /// Keychain service name for the `keychain` backend
    pub service_name: String,
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            backend: CredentialBackend::default(),
            path: None,
            service_name: DEFAULT_KEYCHAIN_SERVICE.to_string(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive, e.g. `info` or `armageddon_infra=debug`
    pub level: String,
    /// Emit JSON lines instead of human readable output
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{ "api": { "base_url": "https://api.example.com" } }"#)
                .unwrap();

        assert_eq!(config.api.base_url, "https://api.example.com");
        assert_eq!(config.api.auth_path, "/api/auth");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.credentials.backend, CredentialBackend::File);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn auth_endpoint_joins_without_double_slash() {
        let config = ApiConfig { auth_path: "/api/auth/".to_string(), ..ApiConfig::default() };
        assert_eq!(config.auth_endpoint("/login"), "/api/auth/login");
        assert_eq!(config.auth_endpoint("refresh"), "/api/auth/refresh");
    }

    #[test]
    fn backend_parses_case_insensitively() {
        assert_eq!("KEYCHAIN".parse::<CredentialBackend>().unwrap(), CredentialBackend::Keychain);
        assert_eq!("memory".parse::<CredentialBackend>().unwrap(), CredentialBackend::Memory);
        assert!("redis".parse::<CredentialBackend>().is_err());
    }
}
