//! Configuration loader
//!
//! Loads client configuration from a file and environment variables.
//!
//! ## Loading Strategy
//! 1. Read `.env` from the working directory (if present) into the process
//!    environment
//! 2. Start from built-in defaults
//! 3. Overlay the first config file found (JSON or TOML)
//! 4. Overlay environment variables
//! 5. Validate and normalize (base URL must parse, trailing slash trimmed)
//!
//! ## Environment Variables
//! - `ARMAGEDDON_API_URL`: Base URL of the backend
//! - `ARMAGEDDON_AUTH_PATH`: Path prefix of the authentication endpoints
//! - `ARMAGEDDON_API_TIMEOUT_SECS`: Transport timeout in seconds
//! - `ARMAGEDDON_CREDENTIALS_BACKEND`: `memory`, `file` or `keychain`
//! - `ARMAGEDDON_CREDENTIALS_PATH`: Credential file for the `file` backend
//! - `ARMAGEDDON_LOG_LEVEL`: Log filter directive
//! - `ARMAGEDDON_LOG_JSON`: Emit JSON logs (true/false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./armageddon.toml` or `./armageddon.json` (current working directory)
//! 2. `../armageddon.toml` or `../armageddon.json` (parent directory)
//! 3. Next to the executable

use std::path::{Path, PathBuf};

use armageddon_domain::{AppConfig, ArmageddonError, CredentialBackend, Result};
use url::Url;

const ENV_API_URL: &str = "ARMAGEDDON_API_URL";
const ENV_AUTH_PATH: &str = "ARMAGEDDON_AUTH_PATH";
const ENV_TIMEOUT_SECS: &str = "ARMAGEDDON_API_TIMEOUT_SECS";
const ENV_CREDENTIALS_BACKEND: &str = "ARMAGEDDON_CREDENTIALS_BACKEND";
const ENV_CREDENTIALS_PATH: &str = "ARMAGEDDON_CREDENTIALS_PATH";
const ENV_LOG_LEVEL: &str = "ARMAGEDDON_LOG_LEVEL";
const ENV_LOG_JSON: &str = "ARMAGEDDON_LOG_JSON";

const CONFIG_FILE_NAMES: [&str; 2] = ["armageddon.toml", "armageddon.json"];

/// Load configuration: defaults, then config file, then environment
///
/// A missing config file is not an error; defaults are used instead.
///
/// # Errors
/// Returns `ArmageddonError::Config` if:
/// - A config file exists but cannot be read or parsed
/// - An environment variable has an invalid value
/// - The resulting base URL is not a valid http(s) URL
pub fn load() -> Result<AppConfig> {
    load_dotenv();

    let mut config = match probe_config_paths() {
        Some(path) => read_config_file(&path)?,
        None => {
            tracing::debug!("No config file found, using defaults");
            AppConfig::default()
        }
    };

    apply_env_overrides(&mut config)?;
    let config = normalize(config)?;

    tracing::info!(base_url = %config.api.base_url, "Configuration loaded");
    Ok(config)
}

/// Load configuration from defaults and environment variables only
///
/// # Errors
/// Returns `ArmageddonError::Config` if a variable has an invalid value or
/// the base URL does not validate.
pub fn load_from_env() -> Result<AppConfig> {
    let mut config = AppConfig::default();
    apply_env_overrides(&mut config)?;
    normalize(config)
}

/// Load configuration from a file, ignoring the environment
///
/// If `path` is `None`, probes the standard locations.
///
/// # Errors
/// Returns `ArmageddonError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<AppConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ArmageddonError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            ArmageddonError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    normalize(read_config_file(&config_path)?)
}

/// Probe the standard locations for a config file
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd.clone());
        dirs.push(cwd.join(".."));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            dirs.push(exe_dir.to_path_buf());
        }
    }

    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env file"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "Ignoring unreadable .env file"),
    }
}

fn read_config_file(path: &Path) -> Result<AppConfig> {
    tracing::info!(path = %path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(path)
        .map_err(|e| ArmageddonError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, path)
}

/// Parse configuration by file extension (`.json` or `.toml`)
fn parse_config(contents: &str, path: &Path) -> Result<AppConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| ArmageddonError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| ArmageddonError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(ArmageddonError::Config(format!("Unsupported config format: {extension}"))),
    }
}

fn apply_env_overrides(config: &mut AppConfig) -> Result<()> {
    if let Some(url) = env_var(ENV_API_URL) {
        config.api.base_url = url;
    }
    if let Some(path) = env_var(ENV_AUTH_PATH) {
        config.api.auth_path = path;
    }
    if let Some(secs) = env_var(ENV_TIMEOUT_SECS) {
        config.api.timeout_secs = secs
            .parse::<u64>()
            .map_err(|e| ArmageddonError::Config(format!("Invalid {ENV_TIMEOUT_SECS}: {e}")))?;
    }
    if let Some(backend) = env_var(ENV_CREDENTIALS_BACKEND) {
        config.credentials.backend = backend
            .parse::<CredentialBackend>()
            .map_err(|e| ArmageddonError::Config(format!("Invalid {ENV_CREDENTIALS_BACKEND}: {e}")))?;
    }
    if let Some(path) = env_var(ENV_CREDENTIALS_PATH) {
        config.credentials.path = Some(PathBuf::from(path));
    }
    if let Some(level) = env_var(ENV_LOG_LEVEL) {
        config.log.level = level;
    }
    config.log.json = env_bool(ENV_LOG_JSON, config.log.json);

    Ok(())
}

fn normalize(mut config: AppConfig) -> Result<AppConfig> {
    let base_url = config.api.base_url.trim().trim_end_matches('/').to_string();
    let parsed = Url::parse(&base_url)
        .map_err(|e| ArmageddonError::Config(format!("Invalid API base URL '{base_url}': {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ArmageddonError::Config(format!(
            "API base URL must use http or https: {base_url}"
        )));
    }
    config.api.base_url = base_url;

    let auth_path = config.api.auth_path.trim().trim_end_matches('/');
    config.api.auth_path = if auth_path.starts_with('/') {
        auth_path.to_string()
    } else {
        format!("/{auth_path}")
    };

    if config.api.timeout_secs == 0 {
        return Err(ArmageddonError::Config("API timeout must be at least one second".into()));
    }

    Ok(config)
}

/// Non-empty environment variable value
fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    env_var(key)
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use armageddon_domain::CredentialBackend;
    use once_cell::sync::Lazy;
    use tempfile::TempDir;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const ALL_VARS: [&str; 7] = [
        ENV_API_URL,
        ENV_AUTH_PATH,
        ENV_TIMEOUT_SECS,
        ENV_CREDENTIALS_BACKEND,
        ENV_CREDENTIALS_PATH,
        ENV_LOG_LEVEL,
        ENV_LOG_JSON,
    ];

    fn clear_env() {
        for key in ALL_VARS {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_env_bool_parsing() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");

        for value in ["1", "true", "YES", "on"] {
            std::env::set_var("ARMAGEDDON_TEST_BOOL", value);
            assert!(env_bool("ARMAGEDDON_TEST_BOOL", false), "{value} should be true");
        }
        for value in ["0", "false", "no", "OFF"] {
            std::env::set_var("ARMAGEDDON_TEST_BOOL", value);
            assert!(!env_bool("ARMAGEDDON_TEST_BOOL", true), "{value} should be false");
        }

        std::env::remove_var("ARMAGEDDON_TEST_BOOL");
        assert!(env_bool("ARMAGEDDON_TEST_BOOL", true));
        assert!(!env_bool("ARMAGEDDON_TEST_BOOL", false));
    }

    #[test]
    fn test_load_from_env_defaults() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        let config = load_from_env().unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_load_from_env_overrides() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var(ENV_API_URL, "https://api.example.com/");
        std::env::set_var(ENV_AUTH_PATH, "v2/auth/");
        std::env::set_var(ENV_TIMEOUT_SECS, "5");
        std::env::set_var(ENV_CREDENTIALS_BACKEND, "Memory");
        std::env::set_var(ENV_CREDENTIALS_PATH, "/tmp/tokens.json");
        std::env::set_var(ENV_LOG_LEVEL, "debug");
        std::env::set_var(ENV_LOG_JSON, "true");

        let config = load_from_env().unwrap();
        clear_env();

        assert_eq!(config.api.base_url, "https://api.example.com");
        assert_eq!(config.api.auth_path, "/v2/auth");
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(config.credentials.backend, CredentialBackend::Memory);
        assert_eq!(config.credentials.path, Some(PathBuf::from("/tmp/tokens.json")));
        assert_eq!(config.log.level, "debug");
        assert!(config.log.json);
    }

    #[test]
    fn test_load_from_env_invalid_values() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var(ENV_TIMEOUT_SECS, "soon");
        assert!(matches!(load_from_env(), Err(ArmageddonError::Config(_))));
        clear_env();

        std::env::set_var(ENV_CREDENTIALS_BACKEND, "cloud");
        assert!(matches!(load_from_env(), Err(ArmageddonError::Config(_))));
        clear_env();

        std::env::set_var(ENV_API_URL, "not a url");
        assert!(matches!(load_from_env(), Err(ArmageddonError::Config(_))));
        clear_env();

        std::env::set_var(ENV_API_URL, "ftp://example.com");
        assert!(matches!(load_from_env(), Err(ArmageddonError::Config(_))));
        clear_env();
    }

    #[test]
    fn test_load_from_file_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("armageddon.toml");
        std::fs::write(
            &path,
            r#"
[api]
base_url = "https://finance.example.com/"
timeout_secs = 10

[credentials]
backend = "memory"
"#,
        )
        .unwrap();

        let config = load_from_file(Some(path)).unwrap();
        assert_eq!(config.api.base_url, "https://finance.example.com");
        assert_eq!(config.api.auth_path, "/api/auth");
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.credentials.backend, CredentialBackend::Memory);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_load_from_file_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("armageddon.json");
        std::fs::write(&path, r#"{ "log": { "level": "warn", "json": true } }"#).unwrap();

        let config = load_from_file(Some(path)).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8080");
        assert_eq!(config.log.level, "warn");
        assert!(config.log.json);
    }

    #[test]
    fn test_load_from_file_not_found() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/armageddon.toml")));
        assert!(matches!(result, Err(ArmageddonError::Config(_))));
    }

    #[test]
    fn test_load_from_file_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("armageddon.json");
        std::fs::write(&path, r#"{ "api": "#).unwrap();

        assert!(matches!(load_from_file(Some(path)), Err(ArmageddonError::Config(_))));
    }

    #[test]
    fn test_parse_config_unsupported_format() {
        let result = parse_config("api: {}", Path::new("armageddon.yaml"));
        assert!(result.is_err(), "Should fail with unsupported format");
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = AppConfig::default();
        config.api.timeout_secs = 0;
        assert!(normalize(config).is_err());
    }
}
