//! Testing utilities and helpers
//!
//! This module provides test doubles for the auth seams:
//! - **[`mocks`]**: Scripted refreshers, recording event sinks and a store
//!   that rejects writes
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use armageddon_common::auth::{CredentialPair, MemoryCredentialStore, RefreshCoordinator};
//! use armageddon_common::testing::MockTokenRefresher;
//!
//! let refresher = Arc::new(MockTokenRefresher::succeeding(CredentialPair::new("a", "r")));
//! let coordinator =
//!     RefreshCoordinator::new(refresher.clone(), Arc::new(MemoryCredentialStore::new()));
//! assert_eq!(refresher.calls(), 0);
//! # drop(coordinator);
//! ```

pub mod mocks;

pub use mocks::{FailingCredentialStore, MockTokenRefresher, RecordingAuthEventSink};
