//! Session expiry signalling
//!
//! The pipeline reports unrecoverable authentication failures here. Every
//! terminal failure reaches the host, but a burst of requests that started
//! in the same session generation produces a single signal.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::traits::AuthEventSink;

/// Session generation a request observed when it started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTicket(u64);

/// Emits the "session expired, go back to login" signal
///
/// Requests take a [`SessionTicket`] before they run. The first failure
/// reported with the current ticket fires the sink and advances the
/// generation, so failures holding the same ticket are absorbed. Signing in
/// or out also advances the generation: requests issued before the change
/// can no longer signal.
pub struct SessionMonitor {
    sink: Arc<dyn AuthEventSink>,
    generation: AtomicU64,
}

impl SessionMonitor {
    /// Create a monitor forwarding to `sink`
    #[must_use]
    pub fn new(sink: Arc<dyn AuthEventSink>) -> Self {
        Self { sink, generation: AtomicU64::new(0) }
    }

    /// Monitor that discards every signal
    #[must_use]
    pub fn noop() -> Self {
        Self::new(Arc::new(NoopAuthEventSink))
    }

    /// Ticket for a request starting now
    #[must_use]
    pub fn ticket(&self) -> SessionTicket {
        SessionTicket(self.generation.load(Ordering::SeqCst))
    }

    /// Current generation
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// A new credential pair was stored
    pub fn begin_session(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(generation, "Session started");
    }

    /// The session ended without a failure (explicit logout)
    pub fn end_session(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(generation, "Session ended");
    }

    /// Report that the session cannot be recovered
    ///
    /// Returns `true` if this call delivered the signal to the sink.
    pub fn notify_expired(&self, ticket: SessionTicket, reason: &str) -> bool {
        let SessionTicket(seen) = ticket;
        if self
            .generation
            .compare_exchange(seen, seen.wrapping_add(1), Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            info!(reason, "Session expired, signalling re-authentication");
            self.sink.on_session_expired(reason);
            true
        } else {
            debug!(reason, "Session expiry already signalled");
            false
        }
    }
}

impl std::fmt::Debug for SessionMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionMonitor").field("generation", &self.generation()).finish_non_exhaustive()
    }
}

/// Sink that ignores every signal
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAuthEventSink;

impl AuthEventSink for NoopAuthEventSink {
    fn on_session_expired(&self, _reason: &str) {}
}

/// Session event delivered through [`ChannelAuthEventSink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEvent {
    pub reason: String,
}

/// Sink that broadcasts signals to any number of subscribers
#[derive(Debug, Clone)]
pub struct ChannelAuthEventSink {
    sender: broadcast::Sender<SessionEvent>,
}

impl ChannelAuthEventSink {
    /// Create a sink buffering up to `capacity` unread events per subscriber
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to future session events
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }
}

impl Default for ChannelAuthEventSink {
    fn default() -> Self {
        Self::new(16)
    }
}

impl AuthEventSink for ChannelAuthEventSink {
    fn on_session_expired(&self, reason: &str) {
        let event = SessionEvent { reason: reason.to_string() };
        if self.sender.send(event).is_err() {
            warn!("Session expired but no subscriber is listening");
        }
    }
}
