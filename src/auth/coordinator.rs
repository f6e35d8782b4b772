//! Single-flight access token refresh
//!
//! [`RefreshCoordinator`] guarantees that however many requests hit a `401`
//! at the same time, exactly one refresh call reaches the
//! [`RefreshEndpoint`]. Every other caller waits for that call to settle and
//! receives the same outcome.
//!
//! # State machine
//!
//! ```text
//!            await_fresh_token() [leader]
//!   Idle ─────────────────────────────────▶ Refreshing { waiters }
//!    ▲                                          │   ▲
//!    │  success: store tokens, resolve all      │   │ await_fresh_token() [follower]
//!    │  failure: clear store, reject all        │   │ enqueue waiter
//!    └──────────────────────────────────────────┘───┘
//! ```
//!
//! Leader election and waiter enqueueing happen under a single
//! [`tokio::sync::Mutex`], so two leaders can never form. The lock is never
//! held across the refresh network call.
//!
//! The leader's refresh runs on its own Tokio task. The leader then waits on
//! its oneshot exactly like a follower, so abandoning any request (leader or
//! follower) never strands the remaining waiters.
//!
//! # Cancellation
//!
//! Dropping an `await_fresh_token()` future drops its oneshot receiver.
//! Closed waiters are pruned when the queue grows and settling them is a
//! no-op; the refresh itself and the other waiters are unaffected.

use std::sync::Arc;

use tokio::sync::{oneshot, Mutex};

use crate::auth::metrics::RefreshMetrics;
use crate::auth::refresh_endpoint::{RefreshEndpoint, RefreshFailure};
use crate::auth::token_store::TokenStore;
use crate::error::{ApiResult, SalonError};

type Outcome = Result<String, RefreshFailure>;
type Waiter = oneshot::Sender<Outcome>;

/// Number of waiters whose callers are still listening.
fn live_waiters(waiters: &[Waiter]) -> usize {
    waiters.iter().filter(|w| !w.is_closed()).count()
}

/// Refresh state shared by every request of one client.
#[derive(Debug, Default)]
enum CoordinatorState {
    #[default]
    Idle,
    Refreshing { waiters: Vec<Waiter> },
}

#[derive(Debug)]
struct Inner {
    state: Mutex<CoordinatorState>,
    store: Arc<dyn TokenStore>,
    endpoint: Arc<dyn RefreshEndpoint>,
}

/// Coordinates token refreshes for one API client.
///
/// Cloning is cheap and every clone shares the same state.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use url::Url;
/// use salon_client::auth::coordinator::RefreshCoordinator;
/// use salon_client::auth::refresh_endpoint::HttpRefreshEndpoint;
/// use salon_client::auth::token_store::{MemoryTokenStore, TokenPair};
///
/// # async fn example() -> salon_client::error::ApiResult<()> {
/// let base = Url::parse("https://api.example.com")?;
/// let store = Arc::new(MemoryTokenStore::with_pair(TokenPair::new("a", "r")));
/// let endpoint = Arc::new(HttpRefreshEndpoint::new(&base, "/auth/refresh", Duration::from_secs(10))?);
///
/// let coordinator = RefreshCoordinator::new(store, endpoint);
/// let fresh = coordinator.await_fresh_token().await?;
/// println!("new access token: {fresh}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RefreshCoordinator {
    inner: Arc<Inner>,
}

impl RefreshCoordinator {
    /// Creates an idle coordinator.
    pub fn new(store: Arc<dyn TokenStore>, endpoint: Arc<dyn RefreshEndpoint>) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(CoordinatorState::Idle),
                store,
                endpoint,
            }),
        }
    }

    /// Returns a freshly issued access token.
    ///
    /// The first caller while idle starts a refresh; callers arriving while a
    /// refresh is in flight join it. All of them return once it settles.
    ///
    /// # Errors
    ///
    /// Returns [`SalonError::RefreshFailed`] when the refresh endpoint rejects
    /// the refresh token, is unreachable, or no refresh token is stored. The
    /// token store has been cleared by the time this error is observed.
    pub async fn await_fresh_token(&self) -> ApiResult<String> {
        let (tx, rx) = oneshot::channel();

        {
            let mut state = self.inner.state.lock().await;
            match &mut *state {
                CoordinatorState::Refreshing { waiters } => {
                    waiters.retain(|w| !w.is_closed());
                    waiters.push(tx);
                    tracing::debug!(waiters = waiters.len(), "Joined in-flight token refresh");
                }
                CoordinatorState::Idle => {
                    *state = CoordinatorState::Refreshing { waiters: vec![tx] };
                    let inner = Arc::clone(&self.inner);
                    tokio::spawn(inner.run_refresh());
                }
            }
        }

        match rx.await {
            Ok(Ok(access_token)) => Ok(access_token),
            Ok(Err(failure)) => Err(failure.into()),
            Err(_) => Err(SalonError::RefreshFailed(
                "refresh task ended without settling".to_string(),
            )),
        }
    }

    /// Returns `true` while a refresh is in flight.
    pub async fn is_refreshing(&self) -> bool {
        matches!(
            *self.inner.state.lock().await,
            CoordinatorState::Refreshing { .. }
        )
    }

    /// Returns the number of live callers waiting on the in-flight refresh,
    /// the leader included. Zero when idle.
    pub async fn pending_waiters(&self) -> usize {
        match &*self.inner.state.lock().await {
            CoordinatorState::Idle => 0,
            CoordinatorState::Refreshing { waiters } => live_waiters(waiters),
        }
    }
}

impl Inner {
    /// Drives one refresh cycle to completion and settles every waiter.
    async fn run_refresh(self: Arc<Self>) {
        let metrics = RefreshMetrics::start();
        tracing::info!("Refreshing access token");

        // A panic inside the exchange surfaces as a JoinError, so the waiters
        // are still settled.
        let exchange = tokio::spawn(Arc::clone(&self).exchange());
        let outcome = match exchange.await {
            Ok(outcome) => outcome,
            Err(e) => Err(RefreshFailure(format!("refresh task aborted: {e}"))),
        };

        if let Err(ref failure) = outcome {
            tracing::warn!(reason = %failure, "Token refresh failed; clearing credentials");
            if let Err(e) = self.store.clear_all() {
                tracing::warn!(error = %e, "Failed to clear token store");
            }
        }

        let waiters = {
            let mut state = self.state.lock().await;
            match std::mem::take(&mut *state) {
                CoordinatorState::Refreshing { waiters } => waiters,
                CoordinatorState::Idle => Vec::new(),
            }
        };

        let settled = live_waiters(&waiters);
        match outcome {
            Ok(_) => {
                tracing::info!(waiters = settled, "Access token refreshed");
                metrics.finish("success", settled);
            }
            Err(_) => metrics.finish("failure", settled),
        }

        for waiter in waiters {
            // A closed receiver means the caller went away.
            let _ = waiter.send(outcome.clone());
        }
    }

    /// Exchanges the stored refresh token and persists the result.
    async fn exchange(self: Arc<Self>) -> Outcome {
        let refresh_token = match self.store.refresh_token() {
            Ok(Some(token)) => token,
            Ok(None) => return Err(RefreshFailure("no refresh token stored".to_string())),
            Err(e) => {
                return Err(RefreshFailure(format!(
                    "failed to read refresh token: {e}"
                )))
            }
        };

        let tokens = self.endpoint.refresh(&refresh_token).await?;

        self.store
            .set_access_token(&tokens.access_token)
            .map_err(|e| RefreshFailure(format!("failed to store access token: {e}")))?;
        if let Some(ref rotated) = tokens.refresh_token {
            self.store
                .set_refresh_token(rotated)
                .map_err(|e| RefreshFailure(format!("failed to store refresh token: {e}")))?;
        }

        Ok(tokens.access_token)
    }
}
