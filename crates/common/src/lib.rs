//! Shared authentication primitives for the Armageddon client crates.
//!
//! Everything here is transport-agnostic: the HTTP side lives in
//! `armageddon-infra` and plugs in through [`auth::TokenRefresher`].
//!
//! # Feature Tiers
//!
//! - default: credential stores (memory, file), refresh coordination,
//!   session monitoring
//! - `platform`: keychain-backed credential storage
//! - `test-utils`: mock refreshers and recording event sinks

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod auth;

// Platform tier
// -------------------------------------------------------------------
#[cfg(feature = "platform")]
pub mod security;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(any(feature = "test-utils", test))]
pub mod testing;

// Re-export commonly used types and traits for convenience
// ------------------------
pub use auth::{
    AuthEventSink, CredentialPair, CredentialStore, CredentialStoreError, RefreshCoordinator,
    RefreshFailure, SessionMonitor, SessionTicket, TokenRefresher,
};
#[cfg(feature = "platform")]
pub use security::{KeychainError, KeychainProvider};
