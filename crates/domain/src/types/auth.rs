//! Request bodies of the authentication endpoints
//!
//! All bodies are serialized camelCase (`loginId`, `newPassword`) as the
//! backend expects.

use serde::Serialize;

/// `POST {auth}/login`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub login_id: String,
    pub password: String,
}

/// `POST {auth}/signup`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub login_id: String,
    pub password: String,
    pub email: String,
    pub nickname: String,
}

/// `POST {auth}/email-verification/request`
#[derive(Debug, Clone, Serialize)]
pub struct EmailVerificationRequest {
    pub email: String,
}

/// `POST {auth}/email-verification/confirm`
#[derive(Debug, Clone, Serialize)]
pub struct EmailVerificationConfirm {
    pub email: String,
    pub code: String,
}

/// `POST {auth}/password-reset/request`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetRequest {
    pub login_id: String,
    pub email: String,
}

/// `POST {auth}/password-reset/confirm`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetConfirm {
    pub login_id: String,
    pub code: String,
    pub new_password: String,
}
