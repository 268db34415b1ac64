//! Backend API client for Armageddon
//!
//! This module provides the authenticated request pipeline and the typed
//! endpoint groups built on it.
//!
//! # Architecture
//!
//! - All calls go through [`ApiClient`] (no direct reqwest outside `http`)
//! - 401 responses trigger at most one single-flight refresh and one replay
//! - The refresh endpoint bypasses the pipeline
//! - Unrecoverable sessions clear credentials and signal the host once

pub mod auth;
pub mod client;
pub mod errors;
pub mod goals;
pub mod request;
pub mod statistics;
pub mod transactions;
pub mod users;

pub use auth::{AuthApi, RefreshEndpoint};
pub use client::{ApiClient, ApiClientBuilder};
pub use errors::{ApiError, ApiErrorCategory};
pub use goals::GoalApi;
pub use request::RequestDescriptor;
pub use statistics::StatisticsApi;
pub use transactions::TransactionApi;
pub use users::UserApi;
