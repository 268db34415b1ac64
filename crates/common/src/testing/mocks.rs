//! Mock implementations of the auth traits
//!
//! Provides mock objects for testing purposes.

// Allow missing error/panic docs for test mocks - they are designed to be simple
// and errors are clearly indicated by their return types
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::auth::{
    AuthEventSink, CredentialPair, CredentialStore, CredentialStoreError, RefreshFailure,
    TokenRefresher,
};

type RefreshResult = Result<CredentialPair, RefreshFailure>;

/// Scripted [`TokenRefresher`]
///
/// Answers from a queue of outcomes; once the queue is down to its last entry
/// that entry is repeated.
///
/// # Examples
///
/// ```
/// use armageddon_common::auth::{CredentialPair, RefreshFailure, TokenRefresher};
/// use armageddon_common::testing::MockTokenRefresher;
///
/// # tokio_test_block(async {
/// let refresher = MockTokenRefresher::failing(RefreshFailure::Rejected { status: 400 });
/// assert!(refresher.refresh("r").await.is_err());
/// assert_eq!(refresher.calls(), 1);
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) {
/// #     tokio::runtime::Runtime::new().unwrap().block_on(f);
/// # }
/// ```
#[derive(Debug)]
pub struct MockTokenRefresher {
    outcomes: Mutex<VecDeque<RefreshResult>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    received: Mutex<Vec<String>>,
}

impl MockTokenRefresher {
    /// Refresher that always returns `pair`
    pub fn succeeding(pair: CredentialPair) -> Self {
        Self::with_outcomes(vec![Ok(pair)])
    }

    /// Refresher that always fails with `failure`
    pub fn failing(failure: RefreshFailure) -> Self {
        Self::with_outcomes(vec![Err(failure)])
    }

    /// Refresher answering with `outcomes` in order
    pub fn with_outcomes(outcomes: Vec<RefreshResult>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            delay: None,
            calls: AtomicUsize::new(0),
            received: Mutex::new(Vec::new()),
        }
    }

    /// Sleep for `delay` before answering
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of refresh calls received
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Refresh tokens received, in call order
    pub fn received_tokens(&self) -> Vec<String> {
        self.received.lock().clone()
    }

    fn next_outcome(&self) -> RefreshResult {
        let mut outcomes = self.outcomes.lock();
        if outcomes.len() > 1 {
            outcomes.pop_front().unwrap_or_else(|| Err(RefreshFailure::Network("no outcome".into())))
        } else {
            outcomes
                .front()
                .cloned()
                .unwrap_or_else(|| Err(RefreshFailure::Network("no outcome scripted".into())))
        }
    }
}

#[async_trait]
impl TokenRefresher for MockTokenRefresher {
    async fn refresh(&self, refresh_token: &str) -> RefreshResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.received.lock().push(refresh_token.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.next_outcome()
    }
}

/// [`AuthEventSink`] that records every signal it receives
#[derive(Debug, Default)]
pub struct RecordingAuthEventSink {
    reasons: Mutex<Vec<String>>,
}

impl RecordingAuthEventSink {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of signals received
    pub fn count(&self) -> usize {
        self.reasons.lock().len()
    }

    /// Reasons received, in order
    pub fn reasons(&self) -> Vec<String> {
        self.reasons.lock().clone()
    }
}

impl AuthEventSink for RecordingAuthEventSink {
    fn on_session_expired(&self, reason: &str) {
        self.reasons.lock().push(reason.to_string());
    }
}

/// [`CredentialStore`] that reads nothing and rejects every write
#[derive(Debug, Default)]
pub struct FailingCredentialStore {
    clears: AtomicUsize,
}

impl FailingCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `clear` calls received
    pub fn clears(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialStore for FailingCredentialStore {
    async fn read(&self) -> Option<CredentialPair> {
        None
    }

    async fn write(&self, _pair: &CredentialPair) -> Result<(), CredentialStoreError> {
        Err(CredentialStoreError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only store",
        )))
    }

    async fn clear(&self) -> Result<(), CredentialStoreError> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn refresher_plays_outcomes_in_order_then_repeats_last() {
        let refresher = MockTokenRefresher::with_outcomes(vec![
            Err(RefreshFailure::Network("down".into())),
            Ok(CredentialPair::new("a", "r")),
        ]);

        assert!(refresher.refresh("r1").await.is_err());
        assert_eq!(refresher.refresh("r2").await, Ok(CredentialPair::new("a", "r")));
        assert_eq!(refresher.refresh("r3").await, Ok(CredentialPair::new("a", "r")));
        assert_eq!(refresher.received_tokens(), vec!["r1", "r2", "r3"]);
    }

    #[test]
    fn recording_sink_keeps_reasons() {
        let sink = RecordingAuthEventSink::new();
        sink.on_session_expired("one");
        sink.on_session_expired("two");
        assert_eq!(sink.count(), 2);
        assert_eq!(sink.reasons(), vec!["one", "two"]);
    }
}
