//! # Armageddon Infrastructure
//!
//! Network side of the Armageddon client.
//!
//! This crate contains:
//! - The outbound HTTP transport (reqwest)
//! - The authenticated request pipeline with single-flight refresh
//! - Typed endpoint groups (auth, users, transactions, goals, statistics)
//! - Configuration loading and tracing bootstrap
//!
//! ## Architecture
//! - Credential storage and refresh coordination come from
//!   `armageddon-common`
//! - Data types and configuration structs come from `armageddon-domain`
//! - Contains all network I/O

pub mod api;
pub mod client;
pub mod config;
pub mod http;
pub mod observability;

// Re-export commonly used items
pub use api::{ApiClient, ApiError, ApiErrorCategory, RequestDescriptor};
pub use client::ArmageddonClient;
pub use http::{HttpClient, HttpTransport};
pub use observability::init_tracing;
