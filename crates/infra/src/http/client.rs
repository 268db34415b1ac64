use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client as ReqwestClient, Method};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// A fully resolved outbound request
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

/// Status and raw body of a received response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Failure to obtain any response
///
/// Carries no status: a received response, whatever its status, is a
/// [`TransportResponse`].
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request could not be built (bad URL or header)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// No response was received (DNS, connect, TLS, timeout, reset)
    #[error("Request failed: {0}")]
    Unreachable(String),
}

/// Outbound HTTP contract used by the request pipeline and the refresh
/// endpoint
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send one request. Never retries.
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

/// reqwest-backed [`HttpTransport`] with timeout support.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: ReqwestClient,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self, TransportError> {
        Self::builder().build()
    }

    fn prepare(&self, request: TransportRequest) -> Result<reqwest::Request, TransportError> {
        let mut headers = HeaderMap::with_capacity(request.headers.len());
        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| TransportError::InvalidRequest(format!("header name '{name}': {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| TransportError::InvalidRequest(format!("header '{name}': {e}")))?;
            headers.insert(name, value);
        }

        let mut builder = self.client.request(request.method, &request.url).headers(headers);
        if let Some(body) = &request.body {
            let bytes = serde_json::to_vec(body)
                .map_err(|e| TransportError::InvalidRequest(format!("body: {e}")))?;
            builder = builder.body(bytes);
        }

        builder.build().map_err(|e| TransportError::InvalidRequest(e.to_string()))
    }
}

#[async_trait]
impl HttpTransport for HttpClient {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let request = self.prepare(request)?;
        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, "sending HTTP request");

        let response = self.client.execute(request).await.map_err(|err| {
            debug!(%method, %url, error = %err, "HTTP request failed");
            TransportError::Unreachable(err.to_string())
        })?;

        let status = response.status().as_u16();
        debug!(%method, %url, status, "received HTTP response");

        let body = response.text().await.map_err(|err| {
            debug!(%method, %url, error = %err, "failed to read HTTP response body");
            TransportError::Unreachable(err.to_string())
        })?;

        Ok(TransportResponse { status, body })
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    user_agent: Option<String>,
    default_headers: Option<HeaderMap>,
    system_proxy: bool,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(30), user_agent: None, default_headers: None, system_proxy: false }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn default_headers(mut self, headers: HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    /// Honor `HTTP(S)_PROXY` from the environment (off by default).
    pub fn system_proxy(mut self, enabled: bool) -> Self {
        self.system_proxy = enabled;
        self
    }

    pub fn build(self) -> Result<HttpClient, TransportError> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout);

        if !self.system_proxy {
            builder = builder.no_proxy();
        }

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder.build().map_err(|err| TransportError::InvalidRequest(err.to_string()))?;

        Ok(HttpClient { client })
    }
}
