//! Request descriptors
//!
//! A descriptor is everything the pipeline needs to (re)issue a call. The
//! retry flag can only be set by the pipeline itself.

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use super::errors::ApiError;

/// One logical API call
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    method: Method,
    endpoint: String,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body: Option<Value>,
    skip_auth: bool,
    is_retry: bool,
}

impl RequestDescriptor {
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
            skip_auth: false,
            is_retry: false,
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::GET, endpoint)
    }

    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(Method::POST, endpoint)
    }

    pub fn put(endpoint: impl Into<String>) -> Self {
        Self::new(Method::PUT, endpoint)
    }

    pub fn delete(endpoint: impl Into<String>) -> Self {
        Self::new(Method::DELETE, endpoint)
    }

    /// Attach a JSON body
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Serialize `body` and attach it
    ///
    /// # Errors
    /// Returns [`ApiError::InvalidRequest`] if `body` cannot be serialized.
    pub fn json_body<T: Serialize + ?Sized>(self, body: &T) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::InvalidRequest(format!("Failed to serialize body: {e}")))?;
        Ok(self.json(value))
    }

    /// Add or replace a header; overrides the pipeline defaults
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
        self
    }

    /// Append a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Exempt the call from authentication: no bearer token, no refresh
    #[must_use]
    pub fn skip_auth(mut self) -> Self {
        self.skip_auth = true;
        self
    }

    pub const fn method(&self) -> &Method {
        &self.method
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub const fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub const fn is_skip_auth(&self) -> bool {
        self.skip_auth
    }

    pub const fn is_retry(&self) -> bool {
        self.is_retry
    }

    /// The same call, marked as the one allowed replay
    pub(crate) fn into_retry(mut self) -> Self {
        self.is_retry = true;
        self
    }

    /// Absolute URL against `base_url`, query string included
    pub(crate) fn url(&self, base_url: &str) -> Result<String, ApiError> {
        let separator = if self.endpoint.starts_with('/') { "" } else { "/" };
        let mut url = Url::parse(&format!("{base_url}{separator}{}", self.endpoint))
            .map_err(|e| ApiError::InvalidRequest(format!("Invalid endpoint '{}': {e}", self.endpoint)))?;

        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(self.query.iter());
        }

        Ok(url.into())
    }
}
