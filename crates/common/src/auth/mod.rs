//! Credential lifecycle for the Armageddon API client
//!
//! This module owns everything about the access/refresh credential pair
//! except the HTTP calls themselves.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │  request pipeline    │  (armageddon-infra)
//! └─────────┬────────────┘
//!           │
//!           ├──► CredentialStore     (memory, file, keychain)
//!           ├──► RefreshCoordinator  (single-flight refresh)
//!           │         │
//!           │         └──► TokenRefresher  (refresh endpoint, injected)
//!           │
//!           └──► SessionMonitor      (one "go to login" signal per failure burst)
//! ```
//!
//! # Usage Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use armageddon_common::auth::{
//!     CredentialPair, FileCredentialStore, RefreshCoordinator, SessionMonitor, TokenRefresher,
//! };
//!
//! # async fn demo(refresher: Arc<dyn TokenRefresher>) {
//! let store = Arc::new(FileCredentialStore::new("armageddon_tokens.json"));
//! let coordinator = RefreshCoordinator::new(refresher, store.clone());
//! let monitor = SessionMonitor::new(Arc::new(|reason: &str| eprintln!("login required: {reason}")));
//!
//! let ticket = monitor.ticket();
//! match coordinator.refresh("stored-refresh-token").await {
//!     Ok(pair) => {
//!         let _header = pair.bearer();
//!     }
//!     Err(_) => {
//!         monitor.notify_expired(ticket, "refresh failed");
//!     }
//! }
//! # }
//! ```
//!
//! # Module Organization
//!
//! - **[`types`]**: `CredentialPair` and the error types
//! - **[`traits`]**: `CredentialStore`, `TokenRefresher`, `AuthEventSink`
//! - **[`store`]**: Memory and file credential stores
//! - **[`coordinator`]**: Single-flight refresh
//! - **[`session`]**: Session expiry signalling and event sinks
//!
//! With the `platform` feature, `KeychainCredentialStore` keeps the pair in
//! the OS keychain (macOS Keychain, Windows Credential Manager, Secret
//! Service on Linux).

pub mod coordinator;
#[cfg(feature = "platform")]
mod keychain;
pub mod session;
pub mod store;
pub mod traits;
pub mod types;

pub use coordinator::{RefreshCoordinator, RefreshOutcome};
#[cfg(feature = "platform")]
pub use keychain::KeychainCredentialStore;
pub use session::{ChannelAuthEventSink, NoopAuthEventSink, SessionEvent, SessionMonitor, SessionTicket};
pub use store::{FileCredentialStore, MemoryCredentialStore};
pub use traits::{AuthEventSink, CredentialStore, TokenRefresher};
pub use types::{CredentialPair, CredentialStoreError, RefreshFailure};
