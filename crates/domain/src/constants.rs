//! Application constants
//!
//! Centralized location for domain-level constants shared by the client
//! crates.

// Backend defaults
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_AUTH_PATH: &str = "/api/auth";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// Credential storage
pub const DEFAULT_CREDENTIALS_FILE: &str = "armageddon_tokens.json";
pub const DEFAULT_KEYCHAIN_SERVICE: &str = "Armageddon.api";
pub const KEYCHAIN_ACCOUNT: &str = "tokens";

// Error messages surfaced to callers
pub const FALLBACK_ERROR_MESSAGE: &str = "API request failed";
pub const NETWORK_ERROR_MESSAGE: &str = "unable to reach the server";
pub const SESSION_EXPIRED_MESSAGE: &str = "authentication expired, please sign in again";

// Envelope markers
pub const RESULT_SUCCESS: &str = "SUCCESS";
pub const RESULT_FAIL: &str = "FAIL";
