//! Remote refresh-token exchange
//!
//! Wire contract:
//!
//! ```text
//! POST /auth/refresh
//! {"refreshToken": "<refresh token>"}
//!
//! 200 {"accessToken": "<new access token>", "refreshToken": "<rotated, optional>"}
//! ```
//!
//! Any non-2xx status, transport failure or undecodable body is a hard
//! [`RefreshFailure`].

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::api::request::resolve_url;
use crate::error::{ApiResult, SalonError};

/// Default path of the refresh endpoint relative to the API base URL.
pub const DEFAULT_REFRESH_PATH: &str = "/auth/refresh";

/// Reason a refresh attempt failed.
///
/// Cloned verbatim to every caller waiting on the same refresh cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshFailure(pub String);

impl std::fmt::Display for RefreshFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<RefreshFailure> for SalonError {
    fn from(failure: RefreshFailure) -> Self {
        SalonError::RefreshFailed(failure.0)
    }
}

/// Tokens returned by a successful refresh.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshedTokens {
    /// The newly issued access token.
    pub access_token: String,

    /// A rotated refresh token, when the server rotates them.
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// Exchanges a refresh token for a new access token.
#[async_trait::async_trait]
pub trait RefreshEndpoint: Send + Sync + std::fmt::Debug {
    /// Performs one refresh call. Implementations must not retry.
    async fn refresh(&self, refresh_token: &str) -> Result<RefreshedTokens, RefreshFailure>;
}

/// [`RefreshEndpoint`] that speaks the JSON wire contract over HTTP.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use url::Url;
/// use salon_client::auth::refresh_endpoint::HttpRefreshEndpoint;
///
/// let base = Url::parse("https://api.example.com").unwrap();
/// let endpoint = HttpRefreshEndpoint::new(&base, "/auth/refresh", Duration::from_secs(10)).unwrap();
/// assert_eq!(endpoint.url().as_str(), "https://api.example.com/auth/refresh");
/// ```
#[derive(Debug, Clone)]
pub struct HttpRefreshEndpoint {
    http: Arc<reqwest::Client>,
    url: Url,
}

impl HttpRefreshEndpoint {
    /// Builds an endpoint at `path` beneath `base_url`, with its own HTTP
    /// client.
    ///
    /// # Errors
    ///
    /// Returns [`SalonError::InvalidUrl`] if `path` cannot be joined, or
    /// [`SalonError::Config`] if the HTTP client cannot be built.
    pub fn new(base_url: &Url, path: &str, timeout: Duration) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SalonError::Config(format!("failed to build HTTP client: {e}")))?;
        Self::with_client(Arc::new(http), base_url, path)
    }

    /// Builds an endpoint that shares an existing HTTP client.
    pub fn with_client(http: Arc<reqwest::Client>, base_url: &Url, path: &str) -> ApiResult<Self> {
        Ok(Self {
            http,
            url: resolve_url(base_url, path)?,
        })
    }

    /// Returns the absolute refresh URL.
    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait::async_trait]
impl RefreshEndpoint for HttpRefreshEndpoint {
    async fn refresh(&self, refresh_token: &str) -> Result<RefreshedTokens, RefreshFailure> {
        let resp = self
            .http
            .post(self.url.clone())
            .json(&RefreshRequest { refresh_token })
            .send()
            .await
            .map_err(|e| RefreshFailure(format!("refresh request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RefreshFailure(format!(
                "refresh endpoint returned {status}: {body}"
            )));
        }

        resp.json::<RefreshedTokens>()
            .await
            .map_err(|e| RefreshFailure(format!("failed to parse refresh response: {e}")))
    }
}
