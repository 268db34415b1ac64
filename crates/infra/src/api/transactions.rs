//! Income and expense transactions

use std::sync::Arc;

use armageddon_domain::{NewTransaction, Transaction};
use chrono::NaiveDate;
use serde_json::Value;
use tracing::{debug, instrument};

use super::client::ApiClient;
use super::errors::ApiError;
use super::request::RequestDescriptor;

/// Transaction endpoints under `/transaction`
pub struct TransactionApi {
    client: Arc<ApiClient>,
}

impl TransactionApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// `POST /transaction/write`
    ///
    /// # Errors
    ///
    /// Returns error if API request fails or the backend reports FAIL
    #[instrument(skip(self, transaction), fields(kind = %transaction.kind))]
    pub async fn create(&self, transaction: &NewTransaction) -> Result<(), ApiError> {
        let request = RequestDescriptor::post("/transaction/write").json_body(&transaction.body())?;
        self.client.execute(request).await
    }

    /// `PUT /transaction/edit/{id}`
    ///
    /// # Errors
    ///
    /// Returns error if API request fails or the backend reports FAIL
    #[instrument(skip(self, transaction))]
    pub async fn update(&self, id: i64, transaction: &NewTransaction) -> Result<(), ApiError> {
        let request =
            RequestDescriptor::put(format!("/transaction/edit/{id}")).json_body(&transaction.body())?;
        self.client.execute(request).await
    }

    /// `DELETE /transaction/delete/{id}`
    ///
    /// # Errors
    ///
    /// Returns error if API request fails or the backend reports FAIL
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client.execute(RequestDescriptor::delete(format!("/transaction/delete/{id}"))).await
    }

    /// Transactions dated between `start` and `end` (inclusive)
    ///
    /// # Errors
    ///
    /// Returns error if API request fails, the backend reports FAIL, or an
    /// entry cannot be decoded
    #[instrument(skip(self))]
    pub async fn list(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Transaction>, ApiError> {
        let request = RequestDescriptor::get("/transaction/list")
            .query("startDate", start)
            .query("endDate", end);

        let transactions: Vec<Transaction> = self.client.fetch_optional(request).await?.unwrap_or_default();
        debug!(count = transactions.len(), "Transactions listed");
        Ok(transactions)
    }

    /// A single transaction, `None` if the backend has no data for `id`
    ///
    /// # Errors
    ///
    /// Returns error if API request fails or the backend reports FAIL
    #[instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<Option<Transaction>, ApiError> {
        self.client.fetch_optional(RequestDescriptor::get("/transaction/modal").query("id", id)).await
    }

    /// Monthly totals as returned by the backend
    ///
    /// # Errors
    ///
    /// Returns error if API request fails or the backend reports FAIL
    #[instrument(skip(self))]
    pub async fn monthly_summary(&self, year: i32, month: u32) -> Result<Value, ApiError> {
        let request = RequestDescriptor::get("/transaction/monthly").query("year", year).query("month", month);
        Ok(self.client.fetch_optional(request).await?.unwrap_or(Value::Null))
    }

    /// Transactions of one day
    ///
    /// # Errors
    ///
    /// Returns error if API request fails or the backend reports FAIL
    #[instrument(skip(self))]
    pub async fn daily(&self, date: NaiveDate) -> Result<Vec<Transaction>, ApiError> {
        let request = RequestDescriptor::get("/transaction/daily").query("date", date);
        Ok(self.client.fetch_optional(request).await?.unwrap_or_default())
    }
}
