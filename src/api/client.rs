//! Authenticated API client
//!
//! [`ApiClient`] wires the interceptor chain together:
//!
//! ```text
//! send(request)
//!   └─ AuthInterceptor::apply        (attach stored bearer token)
//!       └─ RequestDispatcher::send   (network call)
//!           └─ on error: FailureInterceptor::handle
//!                 └─ RefreshCoordinator::await_fresh_token
//!                       └─ RequestDispatcher::send   (single replay)
//! ```
//!
//! Each client owns exactly one [`RefreshCoordinator`]; clones of the client
//! share it.

use std::sync::Arc;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::api::dispatcher::{HttpDispatcher, RequestDispatcher};
use crate::api::interceptors::{AuthInterceptor, FailureInterceptor};
use crate::api::request::{resolve_url, ApiResponse, RequestDescriptor};
use crate::auth::coordinator::RefreshCoordinator;
use crate::auth::refresh_endpoint::{HttpRefreshEndpoint, RefreshEndpoint};
use crate::auth::token_store::{TokenPair, TokenStore};
use crate::config::ApiConfig;
use crate::error::ApiResult;

/// User agent sent by [`ApiClient::from_config`].
pub const USER_AGENT: &str = concat!("salon-client/", env!("CARGO_PKG_VERSION"));

/// Authenticated client for the salon booking API.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use salon_client::api::client::ApiClient;
/// use salon_client::auth::token_store::{MemoryTokenStore, TokenPair};
/// use salon_client::config::ApiConfig;
///
/// # async fn example() -> salon_client::error::ApiResult<()> {
/// let client = ApiClient::from_config(&ApiConfig::default(), Arc::new(MemoryTokenStore::new()))?;
/// client.login(&TokenPair::new("access", "refresh"))?;
///
/// let bookings: serde_json::Value = client.get_json("/bookings").await?;
/// println!("{bookings}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Url,
    store: Arc<dyn TokenStore>,
    dispatcher: Arc<dyn RequestDispatcher>,
    coordinator: RefreshCoordinator,
    auth: AuthInterceptor,
    failure: FailureInterceptor,
}

impl ApiClient {
    /// Assembles a client from its collaborators.
    pub fn new(
        base_url: Url,
        store: Arc<dyn TokenStore>,
        dispatcher: Arc<dyn RequestDispatcher>,
        refresh_endpoint: Arc<dyn RefreshEndpoint>,
    ) -> Self {
        let coordinator = RefreshCoordinator::new(Arc::clone(&store), refresh_endpoint);
        Self {
            base_url,
            auth: AuthInterceptor::new(Arc::clone(&store)),
            failure: FailureInterceptor::new(coordinator.clone(), Arc::clone(&dispatcher)),
            store,
            dispatcher,
            coordinator,
        }
    }

    /// Builds an HTTP-backed client from configuration.
    ///
    /// The dispatcher and the refresh endpoint share one `reqwest` client.
    ///
    /// # Errors
    ///
    /// Returns `SalonError::InvalidUrl` if the base URL or refresh path is
    /// malformed, or `SalonError::Config` if the HTTP client cannot be
    /// built.
    pub fn from_config(config: &ApiConfig, store: Arc<dyn TokenStore>) -> ApiResult<Self> {
        let base_url = Url::parse(&config.base_url)?;
        let dispatcher = HttpDispatcher::new(config.timeout(), USER_AGENT)?;
        let refresh_endpoint =
            HttpRefreshEndpoint::with_client(dispatcher.client(), &base_url, &config.refresh_path)?;

        Ok(Self::new(
            base_url,
            store,
            Arc::new(dispatcher),
            Arc::new(refresh_endpoint),
        ))
    }

    /// Returns the API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns this client's refresh coordinator.
    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.coordinator
    }

    /// Resolves `path` beneath the base URL, keeping its path prefix.
    ///
    /// Absolute URLs are returned unchanged.
    pub fn url(&self, path: &str) -> ApiResult<String> {
        Ok(resolve_url(&self.base_url, path)?.to_string())
    }

    /// Creates a request for `path`, ready to be customised and passed to
    /// [`send`](Self::send).
    pub fn request(&self, method: Method, path: &str) -> ApiResult<RequestDescriptor> {
        Ok(RequestDescriptor::new(method, self.url(path)?))
    }

    /// Sends `request` through the full interceptor chain.
    ///
    /// # Errors
    ///
    /// - `SalonError::Network` on transport failure.
    /// - `SalonError::Http` for any non-2xx other than a recoverable `401`,
    ///   including a `401` on the replay.
    /// - `SalonError::RefreshFailed` when the token could not be refreshed;
    ///   the caller should re-authenticate.
    pub async fn send(&self, mut request: RequestDescriptor) -> ApiResult<ApiResponse> {
        self.auth.apply(&mut request);
        match self.dispatcher.send(request).await {
            Ok(response) => Ok(response),
            Err(error) => self.failure.handle(error).await,
        }
    }

    /// `GET path` and decode the JSON response.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let request = self
            .request(Method::GET, path)?
            .with_header("Accept", "application/json");
        self.send(request).await?.json()
    }

    /// `method path` with a JSON body, decoding the JSON response.
    pub async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self
            .request(method, path)?
            .with_header("Accept", "application/json")
            .with_json(body)?;
        self.send(request).await?.json()
    }

    /// Stores the token pair issued at login.
    pub fn login(&self, pair: &TokenPair) -> ApiResult<()> {
        self.store.set_pair(pair)?;
        tracing::info!("Stored credentials");
        Ok(())
    }

    /// Clears stored credentials.
    pub fn logout(&self) -> ApiResult<()> {
        self.store.clear_all()?;
        tracing::info!("Cleared credentials");
        Ok(())
    }

    /// Returns `true` when an access token is stored.
    pub fn is_logged_in(&self) -> ApiResult<bool> {
        Ok(self.store.access_token()?.is_some())
    }

    /// Forces a coordinated refresh, joining one already in flight.
    pub async fn refresh_now(&self) -> ApiResult<String> {
        self.coordinator.await_fresh_token().await
    }
}
