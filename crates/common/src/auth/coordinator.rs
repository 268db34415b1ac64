//! Single-flight credential refresh
//!
//! Owns the process-wide refresh state:
//! - At most one refresh call is in flight at any time
//! - Every caller arriving while a refresh is in flight awaits the same
//!   outcome instead of issuing a second call
//! - The refreshed pair is persisted (or the store cleared on failure) before
//!   any waiter is released
//! - A caller presenting the refresh token the last refresh already consumed
//!   gets that refresh's pair back without a network call
//!
//! The refresh itself runs on a spawned task, so it completes even if every
//! waiter is dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use super::traits::{CredentialStore, TokenRefresher};
use super::types::{CredentialPair, RefreshFailure};

/// Result handed to every waiter of a refresh
pub type RefreshOutcome = Result<CredentialPair, RefreshFailure>;

type PendingRefresh = Shared<BoxFuture<'static, RefreshOutcome>>;

enum RefreshState {
    Idle(Option<Rotation>),
    InFlight(PendingRefresh),
}

/// Last successful refresh: the token it spent and the pair it produced
struct Rotation {
    consumed: String,
    pair: CredentialPair,
}

/// Single-flight refresh coordinator
///
/// Only this type mutates the refresh state, and only through
/// [`RefreshCoordinator::refresh`].
pub struct RefreshCoordinator {
    refresher: Arc<dyn TokenRefresher>,
    store: Arc<dyn CredentialStore>,
    state: Arc<Mutex<RefreshState>>,
    attempts: Arc<AtomicU64>,
}

impl RefreshCoordinator {
    /// Create a coordinator
    ///
    /// # Arguments
    /// * `refresher` - Network side of the refresh (calls the refresh
    ///   endpoint)
    /// * `store` - Credential store updated with the outcome
    #[must_use]
    pub fn new(refresher: Arc<dyn TokenRefresher>, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            refresher,
            store,
            state: Arc::new(Mutex::new(RefreshState::Idle(None))),
            attempts: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Refresh credentials, joining the in-flight refresh if there is one
    ///
    /// `refresh_token` is only used when this call starts a new refresh. A
    /// token the previous successful refresh already rotated out resolves to
    /// that refresh's pair.
    ///
    /// # Errors
    /// Returns the shared [`RefreshFailure`] when the refresh fails; the
    /// credential store has been cleared by then.
    pub async fn refresh(&self, refresh_token: &str) -> RefreshOutcome {
        let pending = {
            let mut state = self.state.lock();
            match &*state {
                RefreshState::InFlight(pending) => {
                    debug!("Joining in-flight credential refresh");
                    pending.clone()
                }
                RefreshState::Idle(Some(last)) if last.consumed == refresh_token => {
                    debug!("Refresh token already rotated, reusing the refreshed pair");
                    return Ok(last.pair.clone());
                }
                RefreshState::Idle(_) => {
                    let pending = self.start(refresh_token.to_string());
                    *state = RefreshState::InFlight(pending.clone());
                    pending
                }
            }
        };

        pending.await
    }

    /// Whether a refresh is currently in flight
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        matches!(*self.state.lock(), RefreshState::InFlight(_))
    }

    /// Number of refresh calls issued so far
    #[must_use]
    pub fn refresh_count(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Spawn the refresh task. Called with the state lock held; the task
    /// takes the same lock to return to idle, so it cannot finish before the
    /// caller has recorded it as in flight.
    fn start(&self, refresh_token: String) -> PendingRefresh {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        info!(attempt, "Starting credential refresh");

        let refresher = Arc::clone(&self.refresher);
        let store = Arc::clone(&self.store);
        let state = Arc::clone(&self.state);

        let task = tokio::spawn(async move {
            let outcome = match refresher.refresh(&refresh_token).await {
                Ok(pair) => match store.write(&pair).await {
                    Ok(()) => Ok(pair),
                    Err(e) => Err(RefreshFailure::Storage(e.to_string())),
                },
                Err(failure) => Err(failure),
            };

            let last = match &outcome {
                Ok(pair) => {
                    info!(attempt, "Credential refresh succeeded");
                    Some(Rotation { consumed: refresh_token, pair: pair.clone() })
                }
                Err(failure) => {
                    warn!(attempt, error = %failure, "Credential refresh failed, clearing credentials");
                    if let Err(e) = store.clear().await {
                        error!(error = %e, "Failed to clear credentials after refresh failure");
                    }
                    None
                }
            };

            *state.lock() = RefreshState::Idle(last);
            outcome
        });

        let state = Arc::clone(&self.state);
        async move {
            match task.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(error = %e, "Credential refresh task did not complete");
                    *state.lock() = RefreshState::Idle(None);
                    Err(RefreshFailure::Aborted(e.to_string()))
                }
            }
        }
        .boxed()
        .shared()
    }
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("refreshing", &self.is_refreshing())
            .field("attempts", &self.refresh_count())
            .finish_non_exhaustive()
    }
}
