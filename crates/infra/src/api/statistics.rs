//! Spending statistics
//!
//! Goes through the authenticated pipeline like every other call, so an
//! expired token is refreshed here too.

use std::sync::Arc;

use serde_json::Value;
use tracing::instrument;

use super::client::ApiClient;
use super::errors::ApiError;
use super::request::RequestDescriptor;

pub struct StatisticsApi {
    client: Arc<ApiClient>,
}

impl StatisticsApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// `GET /api/statistics/summary` with `params` as the query string
    ///
    /// The summary shape is backend-defined and returned as JSON.
    ///
    /// # Errors
    ///
    /// Returns error if API request fails or the backend reports FAIL
    #[instrument(skip(self, params))]
    pub async fn summary<K, V>(&self, params: impl IntoIterator<Item = (K, V)>) -> Result<Value, ApiError>
    where
        K: Into<String>,
        V: ToString,
    {
        let request = params
            .into_iter()
            .fold(RequestDescriptor::get("/api/statistics/summary"), |request, (key, value)| {
                request.query(key, value)
            });

        Ok(self.client.fetch_optional(request).await?.unwrap_or(Value::Null))
    }
}
