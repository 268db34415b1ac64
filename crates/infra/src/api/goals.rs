//! Savings goal endpoints under `/goals`

use std::sync::Arc;

use armageddon_domain::{Goal, GoalDraft};
use tracing::instrument;

use super::client::ApiClient;
use super::errors::ApiError;
use super::request::RequestDescriptor;

pub struct GoalApi {
    client: Arc<ApiClient>,
}

impl GoalApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// # Errors
    ///
    /// Returns error if API request fails or a goal cannot be decoded
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Goal>, ApiError> {
        Ok(self.client.fetch_optional(RequestDescriptor::get("/goals")).await?.unwrap_or_default())
    }

    /// # Errors
    ///
    /// Returns error if API request fails or the backend reports FAIL
    #[instrument(skip(self, draft), fields(title = %draft.title))]
    pub async fn create(&self, draft: &GoalDraft) -> Result<(), ApiError> {
        self.client.execute(RequestDescriptor::post("/goals").json_body(draft)?).await
    }

    /// # Errors
    ///
    /// Returns error if API request fails or the backend reports FAIL
    #[instrument(skip(self, draft))]
    pub async fn update(&self, id: i64, draft: &GoalDraft) -> Result<(), ApiError> {
        self.client.execute(RequestDescriptor::put(format!("/goals/{id}")).json_body(draft)?).await
    }

    /// # Errors
    ///
    /// Returns error if API request fails or the backend reports FAIL
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client.execute(RequestDescriptor::delete(format!("/goals/{id}"))).await
    }
}
