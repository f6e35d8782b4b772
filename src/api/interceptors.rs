//! Pre-send and post-failure hooks
//!
//! - [`AuthInterceptor`] attaches the stored access token before dispatch.
//! - [`FailureInterceptor`] turns a first `401` into one coordinated refresh
//!   followed by exactly one replay.

use std::sync::Arc;

use crate::api::dispatcher::RequestDispatcher;
use crate::api::request::{ApiResponse, RequestDescriptor};
use crate::auth::coordinator::RefreshCoordinator;
use crate::auth::token_store::TokenStore;
use crate::error::{ApiResult, SalonError};

// ---------------------------------------------------------------------------
// AuthInterceptor
// ---------------------------------------------------------------------------

/// Sets `Authorization: Bearer <access token>` from the token store.
///
/// When no token is stored the request goes out unauthenticated; some
/// endpoints do not require auth. A store read error is logged and treated
/// the same way.
#[derive(Debug, Clone)]
pub struct AuthInterceptor {
    store: Arc<dyn TokenStore>,
}

impl AuthInterceptor {
    /// Creates an interceptor reading from `store`.
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }

    /// Attaches the current access token to `request`, if one is stored.
    pub fn apply(&self, request: &mut RequestDescriptor) {
        match self.store.access_token() {
            Ok(Some(token)) => request.set_bearer(&token),
            Ok(None) => {
                tracing::debug!(url = %request.url, "No access token stored; sending unauthenticated")
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read access token; sending unauthenticated");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// FailureInterceptor
// ---------------------------------------------------------------------------

/// Recovers from an expired access token.
///
/// Only a `401` on a request that has not been replayed engages the
/// coordinator. Everything else, including a `401` on the replay itself, is
/// handed back unchanged.
#[derive(Debug, Clone)]
pub struct FailureInterceptor {
    coordinator: RefreshCoordinator,
    dispatcher: Arc<dyn RequestDispatcher>,
}

impl FailureInterceptor {
    /// Creates an interceptor that replays through `dispatcher`.
    pub fn new(coordinator: RefreshCoordinator, dispatcher: Arc<dyn RequestDispatcher>) -> Self {
        Self {
            coordinator,
            dispatcher,
        }
    }

    /// Handles a failed dispatch.
    ///
    /// # Errors
    ///
    /// - `error` unchanged when it is not a first `401`.
    /// - [`SalonError::RefreshFailed`] when the coordinated refresh fails.
    /// - Whatever the replay returns otherwise.
    pub async fn handle(&self, error: SalonError) -> ApiResult<ApiResponse> {
        if !error.is_auth_expired() {
            return Err(error);
        }
        let mut request = match error {
            SalonError::Http { request, .. } => *request,
            other => return Err(other),
        };
        request.retried = true;
        tracing::debug!(
            method = %request.method,
            url = %request.url,
            "Access token expired; awaiting refresh"
        );

        let access_token = self.coordinator.await_fresh_token().await?;
        request.set_bearer(&access_token);
        self.dispatcher.send(request).await
    }
}
