//! API-specific error types
//!
//! Provides error classification for API operations. Only the request
//! pipeline's single refresh-and-retry path recovers locally; everything here
//! reaches the caller.

use armageddon_common::CredentialStoreError;
use armageddon_domain::constants::NETWORK_ERROR_MESSAGE;
use armageddon_domain::{ArmageddonError, EnvelopeError};
use thiserror::Error;

use crate::http::TransportError;

/// Categories of API errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCategory {
    /// No response was received
    Network,
    /// The session is gone; the user must sign in again
    Authentication,
    /// The server answered with a non-success status or a FAIL envelope
    Server,
    /// The response body could not be interpreted
    Decode,
    /// Local problem: configuration, request construction or credential
    /// storage
    Config,
}

/// API operation errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// The transport never produced a response. The detail is for logs; the
    /// display text is fixed.
    #[error("Network error: {}", NETWORK_ERROR_MESSAGE)]
    Network(String),

    /// Refresh was impossible or failed; credentials have been cleared
    #[error("Authentication expired: {0}")]
    AuthExpired(String),

    /// Non-2xx response (or a FAIL envelope) with the extracted message
    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Credential storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Get the error category for this error
    pub const fn category(&self) -> ApiErrorCategory {
        match self {
            Self::Network(_) => ApiErrorCategory::Network,
            Self::AuthExpired(_) => ApiErrorCategory::Authentication,
            Self::Server { .. } => ApiErrorCategory::Server,
            Self::Decode(_) => ApiErrorCategory::Decode,
            Self::InvalidRequest(_) | Self::Storage(_) | Self::Config(_) => ApiErrorCategory::Config,
        }
    }

    /// Whether the caller should send the user back to the login entry point
    pub const fn is_auth_expired(&self) -> bool {
        matches!(self, Self::AuthExpired(_))
    }

    /// HTTP status of a server error
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::InvalidRequest(message) => Self::InvalidRequest(message),
            TransportError::Unreachable(detail) => Self::Network(detail),
        }
    }
}

impl From<EnvelopeError> for ApiError {
    fn from(err: EnvelopeError) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<CredentialStoreError> for ApiError {
    fn from(err: CredentialStoreError) -> Self {
        Self::Storage(err.to_string())
    }
}

/// Collapse into the domain error for hosts that use one error type
impl From<ApiError> for ArmageddonError {
    fn from(err: ApiError) -> Self {
        let message = err.to_string();
        match err {
            ApiError::Network(_) => Self::Network(message),
            ApiError::AuthExpired(_) => Self::Auth(message),
            ApiError::Server { .. } => Self::Server(message),
            ApiError::Decode(_) => Self::Internal(message),
            ApiError::InvalidRequest(_) => Self::InvalidInput(message),
            ApiError::Storage(_) | ApiError::Config(_) => Self::Config(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert_eq!(ApiError::Network("refused".into()).category(), ApiErrorCategory::Network);
        assert_eq!(
            ApiError::AuthExpired("expired".into()).category(),
            ApiErrorCategory::Authentication
        );
        assert_eq!(
            ApiError::Server { status: 500, message: "boom".into() }.category(),
            ApiErrorCategory::Server
        );
        assert_eq!(ApiError::Decode("bad".into()).category(), ApiErrorCategory::Decode);
        assert_eq!(ApiError::Storage("ro".into()).category(), ApiErrorCategory::Config);
    }

    #[test]
    fn test_network_message_hides_detail() {
        let err = ApiError::Network("tcp connect error: Connection refused".into());
        assert_eq!(err.to_string(), "Network error: unable to reach the server");
    }

    #[test]
    fn test_server_error_displays_extracted_message() {
        let err = ApiError::Server { status: 400, message: "Title is required".into() };
        assert_eq!(err.to_string(), "Title is required");
        assert_eq!(err.status(), Some(400));
        assert!(!err.is_auth_expired());
    }

    #[test]
    fn test_conversion_to_domain_error() {
        let auth: ArmageddonError = ApiError::AuthExpired("refresh rejected".into()).into();
        assert!(auth.requires_login());

        let network: ArmageddonError = ApiError::Network("down".into()).into();
        assert_eq!(
            network,
            ArmageddonError::Network("Network error: unable to reach the server".into())
        );
    }

    #[test]
    fn test_transport_error_mapping() {
        let err: ApiError = TransportError::Unreachable("dns".into()).into();
        assert!(matches!(err, ApiError::Network(_)));

        let err: ApiError = TransportError::InvalidRequest("header".into()).into();
        assert_eq!(err.category(), ApiErrorCategory::Config);
    }
}
