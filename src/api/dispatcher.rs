//! Request dispatch
//!
//! A [`RequestDispatcher`] performs the network call for a
//! [`RequestDescriptor`] exactly as given. It attaches no credentials of its
//! own, never retries, and does not treat `401` specially: every non-2xx
//! status becomes [`SalonError::Http`] carrying the original descriptor.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::api::request::{ApiResponse, RequestDescriptor};
use crate::error::{ApiResult, SalonError};

/// Sends a single request.
#[async_trait::async_trait]
pub trait RequestDispatcher: Send + Sync + std::fmt::Debug {
    /// Performs the network call.
    ///
    /// # Errors
    ///
    /// - [`SalonError::Network`] on transport failure.
    /// - [`SalonError::Http`] on any non-2xx status, carrying `request`.
    async fn send(&self, request: RequestDescriptor) -> ApiResult<ApiResponse>;
}

/// [`RequestDispatcher`] backed by `reqwest`.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use salon_client::api::dispatcher::HttpDispatcher;
///
/// let dispatcher = HttpDispatcher::new(Duration::from_secs(30), "salon-client/0.1").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct HttpDispatcher {
    http: Arc<reqwest::Client>,
}

impl HttpDispatcher {
    /// Builds a dispatcher with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`SalonError::Config`] if the HTTP client cannot be built
    /// (e.g. TLS initialisation fails).
    pub fn new(timeout: Duration, user_agent: &str) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| SalonError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(Arc::new(http)))
    }

    /// Builds a dispatcher that shares an existing HTTP client.
    pub fn with_client(http: Arc<reqwest::Client>) -> Self {
        Self { http }
    }

    /// Returns the underlying HTTP client.
    pub fn client(&self) -> Arc<reqwest::Client> {
        Arc::clone(&self.http)
    }
}

#[async_trait::async_trait]
impl RequestDispatcher for HttpDispatcher {
    async fn send(&self, request: RequestDescriptor) -> ApiResult<ApiResponse> {
        tracing::debug!(
            method = %request.method,
            url = %request.url,
            retried = request.retried,
            "Dispatching request"
        );

        let mut req = self.http.request(request.method.clone(), request.url.as_str());
        for (k, v) in &request.headers {
            req = req.header(k.as_str(), v.as_str());
        }
        if let Some(ref body) = request.body {
            req = req.body(body.clone());
        }

        let response = req.send().await.map_err(|e| {
            SalonError::Network(format!("{} {} failed: {}", request.method, request.url, e))
        })?;

        let status = response.status();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(k, v)| {
                v.to_str()
                    .ok()
                    .map(|v| (k.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| SalonError::Network(format!("failed to read response body: {e}")))?;

        if !status.is_success() {
            tracing::debug!(%status, url = %request.url, "Request returned non-success status");
            return Err(SalonError::Http {
                status,
                request: Box::new(request),
                body,
            });
        }

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}
