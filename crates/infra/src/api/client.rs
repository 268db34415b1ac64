//! Authenticated request pipeline
//!
//! Every backend call goes through [`ApiClient::request`]:
//!
//! ```text
//! ATTACH ─► SEND ─┬─► 2xx ─────────────────────────────► body
//!                 ├─► no response ─────────────────────► Network
//!                 ├─► non-401 ─────────────────────────► Server { message }
//!                 └─► 401 ─┬─ eligible ─► REFRESH ─ok─► RETRY_SEND (once)
//!                          │                 └─fail─┐
//!                          └─ not eligible ─────────┴─► clear + signal ─► AuthExpired
//! ```
//!
//! A 401 is eligible for refresh when the call is not exempt, has not been
//! replayed yet, and a refresh token is stored. A second 401 after the replay
//! is always terminal. An exempt call's 401 keeps the server's message.

use std::sync::Arc;

use armageddon_common::{CredentialPair, CredentialStore, RefreshCoordinator, SessionMonitor, SessionTicket};
use armageddon_domain::constants::FALLBACK_ERROR_MESSAGE;
use armageddon_domain::{error_message, ApiResult};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use super::errors::ApiError;
use super::request::RequestDescriptor;
use crate::http::{HttpTransport, TransportRequest, TransportResponse};

const UNAUTHORIZED: u16 = 401;

/// Request pipeline with single-flight credential refresh
pub struct ApiClient {
    base_url: String,
    transport: Arc<dyn HttpTransport>,
    store: Arc<dyn CredentialStore>,
    coordinator: Arc<RefreshCoordinator>,
    monitor: Arc<SessionMonitor>,
}

impl ApiClient {
    /// Create a new API client
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL every endpoint is appended to
    /// * `transport` - Outbound HTTP transport
    /// * `store` - Credential store shared with `coordinator`
    /// * `coordinator` - Single-flight refresh coordinator
    /// * `monitor` - Receives the re-authentication signal
    pub fn new(
        base_url: impl Into<String>,
        transport: Arc<dyn HttpTransport>,
        store: Arc<dyn CredentialStore>,
        coordinator: Arc<RefreshCoordinator>,
        monitor: Arc<SessionMonitor>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            transport,
            store,
            coordinator,
            monitor,
        }
    }

    /// Create a builder for fluent configuration
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn coordinator(&self) -> &Arc<RefreshCoordinator> {
        &self.coordinator
    }

    pub fn monitor(&self) -> &Arc<SessionMonitor> {
        &self.monitor
    }

    /// Currently stored credentials
    pub async fn credentials(&self) -> Option<CredentialPair> {
        self.store.read().await
    }

    /// Execute a call and return the parsed JSON body
    ///
    /// An empty 2xx body yields `Value::Null`.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Network`] if no response was received
    /// - [`ApiError::AuthExpired`] if the session could not be recovered;
    ///   credentials have been cleared and the session monitor notified
    /// - [`ApiError::Server`] for any other non-2xx response
    /// - [`ApiError::Decode`] if a 2xx body is not JSON
    #[instrument(skip(self, descriptor), fields(method = %descriptor.method(), endpoint = %descriptor.endpoint()))]
    pub async fn request(&self, descriptor: RequestDescriptor) -> Result<Value, ApiError> {
        let mut descriptor = descriptor;
        let ticket = self.monitor.ticket();

        loop {
            let sent_token = self.attach(&descriptor).await;
            let response = self.send(&descriptor, sent_token.as_deref()).await?;

            if response.is_success() {
                debug!(status = response.status, retry = descriptor.is_retry(), "Request succeeded");
                return parse_body(&response.body);
            }

            if response.status != UNAUTHORIZED {
                let err = server_error(&response);
                warn!(status = response.status, error = %err, "Request failed");
                return Err(err);
            }

            if descriptor.is_skip_auth() {
                return Err(self.expire(ticket, &response_message(&response)).await);
            }
            if descriptor.is_retry() {
                return Err(self.expire(ticket, "unauthorized after credential refresh").await);
            }

            let Some(stored) = self.store.read().await else {
                return Err(self.expire(ticket, "unauthorized without stored credentials").await);
            };

            if sent_token.as_deref() != Some(stored.access_token.as_str()) {
                debug!("Credentials changed since the request was sent, replaying");
                descriptor = descriptor.into_retry();
                continue;
            }

            info!("Access token rejected, refreshing credentials");
            match self.coordinator.refresh(&stored.refresh_token).await {
                Ok(_) => descriptor = descriptor.into_retry(),
                Err(failure) => {
                    return Err(self.expire(ticket, &format!("credential refresh failed: {failure}")).await)
                }
            }
        }
    }

    /// Execute a call and normalize the body into [`ApiResult`]
    ///
    /// # Errors
    /// Same as [`ApiClient::request`], plus [`ApiError::Decode`] when `data`
    /// does not match `T`.
    pub async fn request_envelope<T: DeserializeOwned>(
        &self,
        descriptor: RequestDescriptor,
    ) -> Result<ApiResult<T>, ApiError> {
        let body = self.request(descriptor).await?;
        Ok(ApiResult::from_value(body)?)
    }

    /// Execute a call and return the envelope's `data`
    ///
    /// A FAIL envelope is surfaced as [`ApiError::Server`] with its message.
    ///
    /// # Errors
    /// Same as [`ApiClient::request_envelope`], plus [`ApiError::Decode`]
    /// when a successful envelope carries no data.
    pub async fn fetch<T: DeserializeOwned>(&self, descriptor: RequestDescriptor) -> Result<T, ApiError> {
        let envelope = self.request_envelope::<T>(descriptor).await?;
        Ok(ensure_success(envelope)?.require_data()?)
    }

    /// Like [`ApiClient::fetch`], but a successful envelope without data is
    /// `None` rather than an error
    ///
    /// # Errors
    /// Same as [`ApiClient::request_envelope`]; a FAIL envelope is an
    /// [`ApiError::Server`].
    pub async fn fetch_optional<T: DeserializeOwned>(
        &self,
        descriptor: RequestDescriptor,
    ) -> Result<Option<T>, ApiError> {
        let envelope = self.request_envelope::<T>(descriptor).await?;
        Ok(ensure_success(envelope)?.into_data())
    }

    /// Execute a call whose payload is irrelevant
    ///
    /// # Errors
    /// Same as [`ApiClient::request`]; a FAIL envelope is an
    /// [`ApiError::Server`].
    pub async fn execute(&self, descriptor: RequestDescriptor) -> Result<(), ApiError> {
        let envelope = self.request_envelope::<Value>(descriptor).await?;
        ensure_success(envelope).map(|_| ())
    }

    /// Persist a new pair (after login) and start a session
    ///
    /// # Errors
    /// Returns [`ApiError::Storage`] if the store rejects the write.
    pub async fn store_credentials(&self, pair: &CredentialPair) -> Result<(), ApiError> {
        self.store.write(pair).await?;
        self.monitor.begin_session();
        info!("Credentials stored");
        Ok(())
    }

    /// Remove stored credentials without signalling (logout)
    ///
    /// # Errors
    /// Returns [`ApiError::Storage`] if the store rejects the deletion.
    pub async fn clear_credentials(&self) -> Result<(), ApiError> {
        self.monitor.end_session();
        self.store.clear().await?;
        info!("Credentials cleared");
        Ok(())
    }

    /// Read the store and return the access token to send, if any
    async fn attach(&self, descriptor: &RequestDescriptor) -> Option<String> {
        if descriptor.is_skip_auth() {
            return None;
        }

        self.store.read().await.map(|pair| pair.access_token)
    }

    async fn send(
        &self,
        descriptor: &RequestDescriptor,
        access_token: Option<&str>,
    ) -> Result<TransportResponse, ApiError> {
        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        for (name, value) in descriptor.headers() {
            headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
            headers.push((name.clone(), value.clone()));
        }
        if let Some(token) = access_token {
            headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case("authorization"));
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }

        let request = TransportRequest {
            method: descriptor.method().clone(),
            url: descriptor.url(&self.base_url)?,
            headers,
            body: descriptor.body().cloned(),
        };

        debug!(authenticated = access_token.is_some(), retry = descriptor.is_retry(), "Sending request");

        self.transport.send(request).await.map_err(|err| {
            let err = ApiError::from(err);
            warn!(error = %err, "No response received");
            err
        })
    }

    /// Terminal authentication failure: clear credentials and signal once
    ///
    /// A request whose session was replaced while it was in flight (a login
    /// or logout since `ticket`, or a sibling that already expired it)
    /// leaves the store alone.
    async fn expire(&self, ticket: SessionTicket, reason: &str) -> ApiError {
        if self.monitor.ticket() == ticket {
            warn!(reason, "Session expired");
            if let Err(e) = self.store.clear().await {
                error!(error = %e, "Failed to clear credentials");
            }
            self.monitor.notify_expired(ticket, reason);
        } else {
            debug!(reason, "Session changed while the request was in flight");
        }
        ApiError::AuthExpired(reason.to_string())
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("coordinator", &self.coordinator)
            .field("monitor", &self.monitor)
            .finish_non_exhaustive()
    }
}

fn parse_body(body: &str) -> Result<Value, ApiError> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body).map_err(|e| ApiError::Decode(format!("Response is not JSON: {e}")))
}

fn response_message(response: &TransportResponse) -> String {
    serde_json::from_str::<Value>(&response.body)
        .ok()
        .and_then(|body| error_message(&body).map(str::to_string))
        .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string())
}

fn server_error(response: &TransportResponse) -> ApiError {
    ApiError::Server { status: response.status, message: response_message(response) }
}

fn ensure_success<T>(envelope: ApiResult<T>) -> Result<ApiResult<T>, ApiError> {
    match envelope {
        ApiResult::Failure { message } => Err(ApiError::Server {
            status: 200,
            message: message.unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string()),
        }),
        success => Ok(success),
    }
}

/// Builder for API client
#[derive(Default)]
pub struct ApiClientBuilder {
    base_url: Option<String>,
    transport: Option<Arc<dyn HttpTransport>>,
    store: Option<Arc<dyn CredentialStore>>,
    coordinator: Option<Arc<RefreshCoordinator>>,
    monitor: Option<Arc<SessionMonitor>>,
}

impl ApiClientBuilder {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn coordinator(mut self, coordinator: Arc<RefreshCoordinator>) -> Self {
        self.coordinator = Some(coordinator);
        self
    }

    /// Defaults to a monitor that discards signals
    pub fn monitor(mut self, monitor: Arc<SessionMonitor>) -> Self {
        self.monitor = Some(monitor);
        self
    }

    /// Build the API client
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] if a required component is missing
    pub fn build(self) -> Result<ApiClient, ApiError> {
        let base_url = self.base_url.ok_or_else(|| ApiError::Config("Base URL not set".into()))?;
        let transport = self.transport.ok_or_else(|| ApiError::Config("Transport not set".into()))?;
        let store = self.store.ok_or_else(|| ApiError::Config("Credential store not set".into()))?;
        let coordinator = self
            .coordinator
            .ok_or_else(|| ApiError::Config("Refresh coordinator not set".into()))?;
        let monitor = self.monitor.unwrap_or_else(|| Arc::new(SessionMonitor::noop()));

        Ok(ApiClient::new(base_url, transport, store, coordinator, monitor))
    }
}
