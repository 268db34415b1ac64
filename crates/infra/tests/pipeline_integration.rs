//! Integration tests for the authenticated request pipeline
//!
//! **Coverage:**
//! - Single-flight refresh: concurrent 401s share one refresh call
//! - At most one replay per call
//! - Exempt calls never trigger a refresh
//! - Refresh failure clears credentials and signals the host exactly once
//! - Server error message precedence
//! - Network failures are reported without touching credentials
//!
//! **Infrastructure:**
//! - WireMock HTTP server standing in for the backend
//! - Real reqwest transport and in-memory credential store

use std::sync::Arc;
use std::time::Duration;

use armageddon_common::auth::MemoryCredentialStore;
use armageddon_common::testing::RecordingAuthEventSink;
use armageddon_common::{CredentialPair, CredentialStore};
use armageddon_domain::AppConfig;
use armageddon_infra::{ApiError, ApiErrorCategory, ArmageddonClient, HttpClient, RequestDescriptor};
use chrono::NaiveDate;
use futures::future::join_all;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Harness
// ============================================================================

struct Harness {
    server: MockServer,
    client: ArmageddonClient,
    store: Arc<MemoryCredentialStore>,
    sink: Arc<RecordingAuthEventSink>,
}

impl Harness {
    async fn start() -> Self {
        let server = MockServer::start().await;
        let store = Arc::new(MemoryCredentialStore::new());
        let sink = Arc::new(RecordingAuthEventSink::new());

        let mut config = AppConfig::default();
        config.api.base_url = server.uri();

        let transport = Arc::new(HttpClient::new().expect("http client should build"));
        let client = ArmageddonClient::with_parts(&config, transport, store.clone(), sink.clone());

        Self { server, client, store, sink }
    }

    async fn signed_in() -> Self {
        let harness = Self::start().await;
        harness.store.write(&CredentialPair::new("old", "r-old")).await.expect("seed credentials");
        harness
    }

    async fn mount_refresh(&self, response: ResponseTemplate, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh"))
            .and(body_json(json!({ "refreshToken": "r-old" })))
            .respond_with(response)
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }
}

fn rotated_pair() -> Value {
    json!({ "success": true, "data": { "accessToken": "new", "refreshToken": "r-new" } })
}

fn list_request() -> RequestDescriptor {
    RequestDescriptor::get("/transaction/list")
        .query("startDate", "2026-03-01")
        .query("endDate", "2026-03-31")
}

// ============================================================================
// Single-flight refresh
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_unauthorized_calls_share_one_refresh() -> anyhow::Result<()> {
    let harness = Harness::signed_in().await;

    Mock::given(method("GET"))
        .and(path("/transaction/list"))
        .and(header("Authorization", "Bearer old"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&harness.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/transaction/list"))
        .and(header("Authorization", "Bearer new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": "SUCCESS", "data": [] })))
        .expect(5)
        .mount(&harness.server)
        .await;
    harness
        .mount_refresh(
            ResponseTemplate::new(200).set_body_json(rotated_pair()).set_delay(Duration::from_millis(200)),
            1,
        )
        .await;

    let api = harness.client.api();
    let results = join_all((0..5).map(|_| api.request(list_request()))).await;

    for result in results {
        assert_eq!(result?, json!({ "result": "SUCCESS", "data": [] }));
    }
    assert_eq!(harness.store.read().await, Some(CredentialPair::new("new", "r-new")));
    assert_eq!(api.coordinator().refresh_count(), 1);
    assert_eq!(harness.sink.count(), 0);
    Ok(())
}

#[tokio::test]
async fn empty_transaction_list_after_refresh() -> anyhow::Result<()> {
    let harness = Harness::signed_in().await;

    Mock::given(method("GET"))
        .and(path("/transaction/list"))
        .and(header("Authorization", "Bearer old"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&harness.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/transaction/list"))
        .and(query_param("startDate", "2026-03-01"))
        .and(query_param("endDate", "2026-03-31"))
        .and(header("Authorization", "Bearer new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": "SUCCESS", "data": [] })))
        .expect(1)
        .mount(&harness.server)
        .await;
    harness.mount_refresh(ResponseTemplate::new(200).set_body_json(rotated_pair()), 1).await;

    let start = NaiveDate::from_ymd_opt(2026, 3, 1).expect("valid date");
    let end = NaiveDate::from_ymd_opt(2026, 3, 31).expect("valid date");
    let transactions = harness.client.transactions().list(start, end).await?;

    assert!(transactions.is_empty());
    Ok(())
}

// ============================================================================
// Replay limits
// ============================================================================

#[tokio::test]
async fn second_unauthorized_is_terminal() {
    let harness = Harness::signed_in().await;

    Mock::given(method("GET"))
        .and(path("/api/users/me"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&harness.server)
        .await;
    harness.mount_refresh(ResponseTemplate::new(200).set_body_json(rotated_pair()), 1).await;

    let err = harness.client.users().me().await.unwrap_err();

    assert!(err.is_auth_expired());
    assert_eq!(err.category(), ApiErrorCategory::Authentication);
    assert!(harness.store.read().await.is_none());
    assert_eq!(harness.sink.count(), 1);
}

#[tokio::test]
async fn exempt_call_never_refreshes() {
    let harness = Harness::signed_in().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "Bad credentials" })))
        .expect(1)
        .mount(&harness.server)
        .await;
    harness.mount_refresh(ResponseTemplate::new(200).set_body_json(rotated_pair()), 0).await;

    let err = harness.client.auth().login("kim", "wrong").await.unwrap_err();

    assert!(matches!(&err, ApiError::AuthExpired(reason) if reason == "Bad credentials"));
    assert_eq!(err.to_string(), "Authentication expired: Bad credentials");
    assert_eq!(harness.client.api().coordinator().refresh_count(), 0);
}

#[tokio::test]
async fn exempt_call_sends_no_authorization() -> anyhow::Result<()> {
    let harness = Harness::signed_in().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/signup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": "SUCCESS" })))
        .expect(1)
        .mount(&harness.server)
        .await;

    harness
        .client
        .api()
        .execute(RequestDescriptor::post("/api/auth/signup").json(json!({ "loginId": "kim" })).skip_auth())
        .await?;

    let received = harness.server.received_requests().await.unwrap_or_default();
    assert_eq!(received.len(), 1);
    assert!(!received[0].headers.contains_key("authorization"));
    Ok(())
}

// ============================================================================
// Refresh failure
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn rejected_refresh_expires_session_once() {
    let harness = Harness::signed_in().await;

    Mock::given(method("GET"))
        .and(path("/goals"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&harness.server)
        .await;
    harness
        .mount_refresh(ResponseTemplate::new(400).set_delay(Duration::from_millis(100)), 1)
        .await;

    let goals = harness.client.goals();
    let results = join_all((0..5).map(|_| goals.list())).await;

    for result in results {
        assert!(matches!(result, Err(ApiError::AuthExpired(_))));
    }
    assert!(harness.store.read().await.is_none());
    assert_eq!(harness.sink.count(), 1);
    assert_eq!(harness.client.api().monitor().generation(), 1);
}

#[tokio::test]
async fn malformed_refresh_response_expires_session() {
    let harness = Harness::signed_in().await;

    Mock::given(method("GET"))
        .and(path("/api/users/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&harness.server)
        .await;
    harness
        .mount_refresh(
            ResponseTemplate::new(200).set_body_json(json!({ "result": "SUCCESS", "data": {} })),
            1,
        )
        .await;

    let err = harness.client.users().me().await.unwrap_err();

    match err {
        ApiError::AuthExpired(reason) => assert!(reason.contains("Malformed refresh response")),
        other => panic!("expected AuthExpired, got {other:?}"),
    }
    assert_eq!(harness.sink.count(), 1);
}

#[tokio::test]
async fn unauthorized_without_credentials_is_terminal() {
    let harness = Harness::start().await;

    Mock::given(method("GET"))
        .and(path("/api/users/me"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&harness.server)
        .await;
    harness.mount_refresh(ResponseTemplate::new(200).set_body_json(rotated_pair()), 0).await;

    let err = harness.client.users().me().await.unwrap_err();
    assert!(err.is_auth_expired());
    assert_eq!(harness.sink.count(), 1);
    assert_eq!(harness.sink.reasons(), vec!["unauthorized without stored credentials".to_string()]);
}

// ============================================================================
// Server errors
// ============================================================================

#[tokio::test]
async fn server_error_message_precedence() {
    let harness = Harness::signed_in().await;

    let cases = [
        ("/a", json!({ "error": { "message": "A" }, "message": "B" }), "A"),
        ("/b", json!({ "message": "B" }), "B"),
        ("/c", json!({}), "API request failed"),
    ];
    for (endpoint, body, _) in &cases {
        Mock::given(method("GET"))
            .and(path(*endpoint))
            .respond_with(ResponseTemplate::new(500).set_body_json(body.clone()))
            .mount(&harness.server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/d"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&harness.server)
        .await;

    for (endpoint, _, expected) in cases {
        let err = harness.client.api().request(RequestDescriptor::get(endpoint)).await.unwrap_err();
        assert_eq!(err.to_string(), expected);
        assert_eq!(err.status(), Some(500));
    }

    let err = harness.client.api().request(RequestDescriptor::get("/d")).await.unwrap_err();
    assert_eq!(err.to_string(), "API request failed");
    assert_eq!(err.category(), ApiErrorCategory::Server);

    assert_eq!(harness.sink.count(), 0);
    assert!(harness.store.read().await.is_some());
}

#[tokio::test]
async fn fail_envelope_surfaces_backend_message() {
    let harness = Harness::signed_in().await;

    Mock::given(method("DELETE"))
        .and(path("/transaction/delete/7"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "result": "FAIL", "message": "Not yours" })),
        )
        .mount(&harness.server)
        .await;

    let err = harness.client.transactions().delete(7).await.unwrap_err();

    assert_eq!(err.to_string(), "Not yours");
    assert_eq!(err.category(), ApiErrorCategory::Server);
}

// ============================================================================
// Network errors
// ============================================================================

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);

    let store = Arc::new(MemoryCredentialStore::with_pair(CredentialPair::new("old", "r-old")));
    let sink = Arc::new(RecordingAuthEventSink::new());
    let mut config = AppConfig::default();
    config.api.base_url = format!("http://127.0.0.1:{port}");
    let transport = Arc::new(HttpClient::new().expect("http client should build"));
    let client = ArmageddonClient::with_parts(&config, transport, store.clone(), sink.clone());

    let err = client.users().me().await.unwrap_err();

    assert_eq!(err.category(), ApiErrorCategory::Network);
    assert_eq!(err.to_string(), "Network error: unable to reach the server");
    assert!(store.read().await.is_some());
    assert_eq!(sink.count(), 0);
}
