//! Authentication endpoints
//!
//! [`RefreshEndpoint`] is the network side of the refresh coordinator. It
//! talks to the transport directly, never through the request pipeline, so a
//! refresh can never recurse into another refresh.
//!
//! [`AuthApi`] covers login, signup, logout and the verification flows.

use std::sync::Arc;

use armageddon_common::{CredentialPair, RefreshFailure, TokenRefresher};
use armageddon_domain::{
    EmailVerificationConfirm, EmailVerificationRequest, LoginRequest, PasswordResetConfirm,
    PasswordResetRequest, SignupRequest,
};
use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, instrument, warn};

use super::client::ApiClient;
use super::errors::ApiError;
use super::request::RequestDescriptor;
use crate::http::{HttpTransport, TransportError, TransportRequest};

/// `POST {auth}/refresh` with `{ refreshToken }`
///
/// Success is exactly `{ "success": true, "data": { accessToken, refreshToken } }`;
/// any other status or shape is a [`RefreshFailure`].
pub struct RefreshEndpoint {
    url: String,
    transport: Arc<dyn HttpTransport>,
}

impl RefreshEndpoint {
    /// # Arguments
    ///
    /// * `url` - Absolute URL of the refresh endpoint
    /// * `transport` - Transport shared with the pipeline
    pub fn new(url: impl Into<String>, transport: Arc<dyn HttpTransport>) -> Self {
        Self { url: url.into(), transport }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl TokenRefresher for RefreshEndpoint {
    #[instrument(skip(self, refresh_token), fields(url = %self.url))]
    async fn refresh(&self, refresh_token: &str) -> Result<CredentialPair, RefreshFailure> {
        let request = TransportRequest {
            method: Method::POST,
            url: self.url.clone(),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: Some(json!({ "refreshToken": refresh_token })),
        };

        let response = self.transport.send(request).await.map_err(|err| match err {
            TransportError::Unreachable(detail) | TransportError::InvalidRequest(detail) => {
                warn!(error = %detail, "Refresh endpoint unreachable");
                RefreshFailure::Network(detail)
            }
        })?;

        if !response.is_success() {
            warn!(status = response.status, "Refresh rejected");
            return Err(RefreshFailure::Rejected { status: response.status });
        }

        let pair = parse_refresh_body(&response.body)?;
        debug!("Refresh endpoint returned a new credential pair");
        Ok(pair)
    }
}

fn parse_refresh_body(body: &str) -> Result<CredentialPair, RefreshFailure> {
    let mut value: Value = serde_json::from_str(body)
        .map_err(|e| RefreshFailure::MalformedResponse(format!("body is not JSON: {e}")))?;

    if value.get("success") != Some(&Value::Bool(true)) {
        return Err(RefreshFailure::MalformedResponse("missing success flag".to_string()));
    }

    let data = value
        .get_mut("data")
        .map(Value::take)
        .ok_or_else(|| RefreshFailure::MalformedResponse("missing data".to_string()))?;

    let pair: CredentialPair = serde_json::from_value(data)
        .map_err(|e| RefreshFailure::MalformedResponse(format!("invalid credential pair: {e}")))?;

    if !pair.is_complete() {
        return Err(RefreshFailure::MalformedResponse("empty token".to_string()));
    }
    Ok(pair)
}

/// Account and session operations
pub struct AuthApi {
    client: Arc<ApiClient>,
    auth_path: String,
}

impl AuthApi {
    /// # Arguments
    ///
    /// * `client` - API client
    /// * `auth_path` - Path prefix of the authentication endpoints
    pub fn new(client: Arc<ApiClient>, auth_path: impl Into<String>) -> Self {
        Self { client, auth_path: auth_path.into().trim_end_matches('/').to_string() }
    }

    fn endpoint(&self, suffix: &str) -> String {
        format!("{}/{suffix}", self.auth_path)
    }

    /// Sign in and store the returned credentials
    ///
    /// # Errors
    ///
    /// Returns error if the backend rejects the login or the credentials
    /// cannot be stored
    #[instrument(skip(self, password))]
    pub async fn login(&self, login_id: &str, password: &str) -> Result<(), ApiError> {
        let body = LoginRequest { login_id: login_id.to_string(), password: password.to_string() };
        let request = RequestDescriptor::post(self.endpoint("login")).skip_auth().json_body(&body)?;

        let pair: CredentialPair = self.client.fetch(request).await?;
        if !pair.is_complete() {
            return Err(ApiError::Decode("login response carried an empty token".to_string()));
        }

        self.client.store_credentials(&pair).await?;
        info!("Logged in");
        Ok(())
    }

    /// Create an account
    ///
    /// # Errors
    ///
    /// Returns error if the backend rejects the signup
    #[instrument(skip(self, request), fields(login_id = %request.login_id))]
    pub async fn signup(&self, request: &SignupRequest) -> Result<(), ApiError> {
        let descriptor = RequestDescriptor::post(self.endpoint("signup")).skip_auth().json_body(request)?;
        self.client.execute(descriptor).await
    }

    /// Sign out. Local credentials are cleared even if the call fails.
    ///
    /// # Errors
    ///
    /// Returns the backend error (other than an already expired session), or
    /// a storage error if the credentials cannot be removed
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), ApiError> {
        let outcome = self.client.execute(RequestDescriptor::post(self.endpoint("logout"))).await;
        self.client.clear_credentials().await?;

        match outcome {
            Ok(()) | Err(ApiError::AuthExpired(_)) => {
                info!("Logged out");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Whether credentials are currently stored
    pub async fn is_logged_in(&self) -> bool {
        self.client.credentials().await.is_some()
    }

    /// # Errors
    ///
    /// Returns error if API request fails
    #[instrument(skip(self))]
    pub async fn request_email_verification(&self, email: &str) -> Result<(), ApiError> {
        let body = EmailVerificationRequest { email: email.to_string() };
        self.unauthenticated("email-verification/request", &body).await
    }

    /// # Errors
    ///
    /// Returns error if the code is rejected or the request fails
    #[instrument(skip(self, code))]
    pub async fn confirm_email_verification(&self, email: &str, code: &str) -> Result<(), ApiError> {
        let body = EmailVerificationConfirm { email: email.to_string(), code: code.to_string() };
        self.unauthenticated("email-verification/confirm", &body).await
    }

    /// # Errors
    ///
    /// Returns error if API request fails
    #[instrument(skip(self))]
    pub async fn request_password_reset(&self, login_id: &str, email: &str) -> Result<(), ApiError> {
        let body = PasswordResetRequest { login_id: login_id.to_string(), email: email.to_string() };
        self.unauthenticated("password-reset/request", &body).await
    }

    /// # Errors
    ///
    /// Returns error if the code is rejected or the request fails
    #[instrument(skip(self, code, new_password))]
    pub async fn confirm_password_reset(
        &self,
        login_id: &str,
        code: &str,
        new_password: &str,
    ) -> Result<(), ApiError> {
        let body = PasswordResetConfirm {
            login_id: login_id.to_string(),
            code: code.to_string(),
            new_password: new_password.to_string(),
        };
        self.unauthenticated("password-reset/confirm", &body).await
    }

    async fn unauthenticated<T: serde::Serialize>(&self, suffix: &str, body: &T) -> Result<(), ApiError> {
        let descriptor = RequestDescriptor::post(self.endpoint(suffix)).skip_auth().json_body(body)?;
        self.client.execute(descriptor).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_success_envelope() {
        let pair = parse_refresh_body(
            r#"{"success":true,"data":{"accessToken":"a2","refreshToken":"r2"}}"#,
        )
        .unwrap();
        assert_eq!(pair, CredentialPair::new("a2", "r2"));
    }

    #[test]
    fn rejects_other_shapes() {
        for body in [
            "",
            "not json",
            r#"{"success":false,"data":{"accessToken":"a","refreshToken":"r"}}"#,
            r#"{"result":"SUCCESS","data":{"accessToken":"a","refreshToken":"r"}}"#,
            r#"{"success":true}"#,
            r#"{"success":true,"data":{"accessToken":"a"}}"#,
            r#"{"success":true,"data":{"accessToken":"","refreshToken":"r"}}"#,
        ] {
            assert!(
                matches!(parse_refresh_body(body), Err(RefreshFailure::MalformedResponse(_))),
                "{body} should be malformed"
            );
        }
    }
}
