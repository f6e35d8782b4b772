//! Test utilities for the salon client
//!
//! In-process fakes for the client's collaborators: a token store that
//! counts `clear_all` calls, a scriptable refresh endpoint that can be held
//! open, and a dispatcher that only accepts one access token.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use reqwest::StatusCode;
use tokio::sync::Semaphore;

use crate::api::dispatcher::RequestDispatcher;
use crate::api::request::{ApiResponse, RequestDescriptor};
use crate::auth::refresh_endpoint::{RefreshEndpoint, RefreshFailure, RefreshedTokens};
use crate::auth::token_store::{MemoryTokenStore, TokenStore};
use crate::error::{ApiResult, SalonError};

// ---------------------------------------------------------------------------
// CountingTokenStore
// ---------------------------------------------------------------------------

/// [`MemoryTokenStore`] wrapper that counts `clear_all` calls.
#[derive(Debug)]
pub struct CountingTokenStore {
    inner: MemoryTokenStore,
    clears: AtomicUsize,
}

impl CountingTokenStore {
    pub fn new(inner: MemoryTokenStore) -> Self {
        Self {
            inner,
            clears: AtomicUsize::new(0),
        }
    }

    pub fn clear_calls(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

impl TokenStore for CountingTokenStore {
    fn access_token(&self) -> ApiResult<Option<String>> {
        self.inner.access_token()
    }

    fn refresh_token(&self) -> ApiResult<Option<String>> {
        self.inner.refresh_token()
    }

    fn set_access_token(&self, token: &str) -> ApiResult<()> {
        self.inner.set_access_token(token)
    }

    fn set_refresh_token(&self, token: &str) -> ApiResult<()> {
        self.inner.set_refresh_token(token)
    }

    fn clear_all(&self) -> ApiResult<()> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        self.inner.clear_all()
    }
}

// ---------------------------------------------------------------------------
// FakeRefreshEndpoint
// ---------------------------------------------------------------------------

/// Scripted [`RefreshEndpoint`].
///
/// A gated endpoint blocks every call until [`release`](Self::release), so
/// tests can queue waiters behind an in-flight refresh.
#[derive(Debug)]
pub struct FakeRefreshEndpoint {
    outcome: Result<RefreshedTokens, RefreshFailure>,
    gate: Option<Semaphore>,
    calls: AtomicUsize,
    seen: Mutex<Vec<String>>,
}

impl FakeRefreshEndpoint {
    pub fn succeeding(access_token: &str, rotated_refresh: Option<&str>) -> Self {
        Self::with_outcome(Ok(RefreshedTokens {
            access_token: access_token.to_string(),
            refresh_token: rotated_refresh.map(str::to_string),
        }))
    }

    pub fn failing(reason: &str) -> Self {
        Self::with_outcome(Err(RefreshFailure(reason.to_string())))
    }

    fn with_outcome(outcome: Result<RefreshedTokens, RefreshFailure>) -> Self {
        Self {
            outcome,
            gate: None,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn gated(mut self) -> Self {
        self.gate = Some(Semaphore::new(0));
        self
    }

    pub fn release(&self) {
        if let Some(ref gate) = self.gate {
            gate.add_permits(1024);
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen_refresh_tokens(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl RefreshEndpoint for FakeRefreshEndpoint {
    async fn refresh(&self, refresh_token: &str) -> Result<RefreshedTokens, RefreshFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(refresh_token.to_string());
        if let Some(ref gate) = self.gate {
            let _permit = gate.acquire().await;
        }
        self.outcome.clone()
    }
}

// ---------------------------------------------------------------------------
// FakeDispatcher
// ---------------------------------------------------------------------------

/// [`RequestDispatcher`] that answers `200` only for one bearer token and
/// `401` otherwise, recording every request it receives.
#[derive(Debug)]
pub struct FakeDispatcher {
    accepted_token: String,
    sent: Mutex<Vec<RequestDescriptor>>,
}

impl FakeDispatcher {
    pub fn accepting(token: &str) -> Self {
        Self {
            accepted_token: token.to_string(),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<RequestDescriptor> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl RequestDispatcher for FakeDispatcher {
    async fn send(&self, request: RequestDescriptor) -> ApiResult<ApiResponse> {
        self.sent.lock().unwrap().push(request.clone());
        if request.bearer_token() == Some(self.accepted_token.as_str()) {
            Ok(ApiResponse {
                status: StatusCode::OK,
                headers: HashMap::new(),
                body: r#"{"ok":true}"#.to_string(),
            })
        } else {
            Err(SalonError::Http {
                status: StatusCode::UNAUTHORIZED,
                request: Box::new(request),
                body: String::new(),
            })
        }
    }
}

/// Assert that an error's display contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T: std::fmt::Debug>(result: ApiResult<T>, expected: &str) {
    match result {
        Ok(v) => panic!("Expected error containing '{}' but got Ok({:?})", expected, v),
        Err(e) => {
            let error_msg = e.to_string();
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}
