//! Account endpoints under `/api/users`

use std::sync::Arc;

use armageddon_domain::{UserProfile, UserUpdate};
use tracing::{info, instrument};

use super::client::ApiClient;
use super::errors::ApiError;
use super::request::RequestDescriptor;

pub struct UserApi {
    client: Arc<ApiClient>,
}

impl UserApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Profile of the signed-in user
    ///
    /// # Errors
    ///
    /// Returns error if API request fails or the profile cannot be decoded
    #[instrument(skip(self))]
    pub async fn me(&self) -> Result<UserProfile, ApiError> {
        self.client.fetch(RequestDescriptor::get("/api/users/me")).await
    }

    /// `PUT /api/users/update`; only the fields set in `update` are sent
    ///
    /// # Errors
    ///
    /// Returns error if API request fails or the backend reports FAIL
    #[instrument(skip(self, update))]
    pub async fn update(&self, update: &UserUpdate) -> Result<(), ApiError> {
        let request = RequestDescriptor::put("/api/users/update").json_body(update)?;
        self.client.execute(request).await
    }

    /// Delete the account and drop local credentials
    ///
    /// # Errors
    ///
    /// Returns error if API request fails; credentials are kept in that case
    #[instrument(skip(self))]
    pub async fn delete_account(&self) -> Result<(), ApiError> {
        self.client.execute(RequestDescriptor::delete("/api/users/delete")).await?;
        self.client.clear_credentials().await?;
        info!("Account deleted");
        Ok(())
    }
}
