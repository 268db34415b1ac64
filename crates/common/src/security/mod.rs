//! Security primitives
//!
//! Generic platform keychain access. Credential-specific storage is layered
//! on top in `auth::keychain`.

pub mod keychain;

pub use keychain::{KeychainError, KeychainProvider};
