//! Domain data types exchanged with the backend

pub mod auth;
pub mod envelope;
pub mod goal;
pub mod transaction;
pub mod user;

pub use auth::{
    EmailVerificationConfirm, EmailVerificationRequest, LoginRequest, PasswordResetConfirm,
    PasswordResetRequest, SignupRequest,
};
pub use envelope::{error_message, ApiResult, EnvelopeError};
pub use goal::{Goal, GoalDraft};
pub use transaction::{Category, NewTransaction, Transaction, TransactionBody, TransactionType};
pub use user::{UserProfile, UserUpdate};
