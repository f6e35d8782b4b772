//! Outbound request and response types
//!
//! [`RequestDescriptor`] is the unit that flows through the interceptor
//! chain. It is created per call, mutated by the interceptors (bearer header,
//! `retried` flag), and discarded after completion.

use std::collections::HashMap;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::error::ApiResult;

/// Name of the header carrying the bearer credential.
pub const AUTHORIZATION: &str = "Authorization";

/// Formats the `Authorization` header value for an access token.
///
/// # Examples
///
/// ```
/// use salon_client::api::request::bearer;
///
/// assert_eq!(bearer("abc"), "Bearer abc");
/// ```
pub fn bearer(access_token: &str) -> String {
    format!("Bearer {}", access_token)
}

/// Resolves `path` beneath `base`, keeping any path prefix on the base.
///
/// A leading `/` on `path` is relative to the API root, not the host root.
/// Absolute URLs are returned unchanged.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use salon_client::api::request::resolve_url;
///
/// let base = Url::parse("https://api.example.com/v1").unwrap();
/// let url = resolve_url(&base, "/bookings").unwrap();
/// assert_eq!(url.as_str(), "https://api.example.com/v1/bookings");
/// ```
pub fn resolve_url(base: &Url, path: &str) -> ApiResult<Url> {
    if let Ok(absolute) = Url::parse(path) {
        return Ok(absolute);
    }

    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let prefix = format!("{}/", base.path());
        base.set_path(&prefix);
    }
    Ok(base.join(path.trim_start_matches('/'))?)
}

/// A single outbound API call.
///
/// # Examples
///
/// ```
/// use reqwest::Method;
/// use salon_client::api::request::RequestDescriptor;
///
/// let request = RequestDescriptor::new(Method::GET, "https://api.example.com/bookings")
///     .with_header("Accept", "application/json");
/// assert!(!request.retried);
/// assert_eq!(request.header("Accept"), Some("application/json"));
/// ```
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    /// HTTP method.
    pub method: Method,

    /// Absolute request URL.
    pub url: String,

    /// Request headers. Names are matched case-insensitively by
    /// [`header`](Self::header) and [`set_header`](Self::set_header).
    pub headers: HashMap<String, String>,

    /// Raw request body, if any.
    pub body: Option<String>,

    /// Set once the request has been replayed after a token refresh.
    ///
    /// A replayed request is never replayed again.
    pub retried: bool,
}

impl RequestDescriptor {
    /// Creates a request with no headers, no body and `retried == false`.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            body: None,
            retried: false,
        }
    }

    /// Builder-style variant of [`set_header`](Self::set_header).
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.set_header(name, value);
        self
    }

    /// Sets a raw body.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serializes `value` as the JSON body and sets `Content-Type`.
    ///
    /// # Errors
    ///
    /// Returns [`SalonError::Serialization`](crate::error::SalonError::Serialization)
    /// if `value` cannot be serialized.
    pub fn with_json<T: Serialize + ?Sized>(mut self, value: &T) -> ApiResult<Self> {
        self.body = Some(serde_json::to_string(value)?);
        self.set_header("Content-Type", "application/json");
        Ok(self)
    }

    /// Returns a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Inserts or replaces a header, dropping any differently-cased
    /// duplicate of the same name.
    pub fn set_header(&mut self, name: &str, value: &str) {
        self.headers.retain(|k, _| !k.eq_ignore_ascii_case(name));
        self.headers.insert(name.to_string(), value.to_string());
    }

    /// Sets `Authorization: Bearer <access_token>`.
    pub fn set_bearer(&mut self, access_token: &str) {
        self.set_header(AUTHORIZATION, &bearer(access_token));
    }

    /// Returns the access token from the `Authorization` header, if it uses
    /// the bearer scheme.
    pub fn bearer_token(&self) -> Option<&str> {
        self.header(AUTHORIZATION)?.strip_prefix("Bearer ")
    }
}

/// A successful (2xx) response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// Response status code.
    pub status: StatusCode,

    /// Response headers, lower-cased names.
    pub headers: HashMap<String, String>,

    /// Response body as text.
    pub body: String,
}

impl ApiResponse {
    /// Deserializes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SalonError::Serialization`](crate::error::SalonError::Serialization)
    /// when the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> ApiResult<T> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(url: &str) -> Url {
        Url::parse(url).unwrap()
    }

    #[test]
    fn test_resolve_url_at_host_root() {
        let url = resolve_url(&base("http://localhost:8080"), "/auth/refresh").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/auth/refresh");
    }

    #[test]
    fn test_resolve_url_keeps_base_path_prefix() {
        for prefix in ["https://api.salon.example/api/", "https://api.salon.example/api"] {
            for path in ["/auth/refresh", "auth/refresh"] {
                let url = resolve_url(&base(prefix), path).unwrap();
                assert_eq!(url.as_str(), "https://api.salon.example/api/auth/refresh");
            }
        }
    }

    #[test]
    fn test_resolve_url_passes_absolute_urls_through() {
        let url = resolve_url(
            &base("https://api.salon.example/api/"),
            "https://cdn.example.com/x.png",
        )
        .unwrap();
        assert_eq!(url.as_str(), "https://cdn.example.com/x.png");
    }

    #[test]
    fn test_new_request_is_not_retried() {
        let request = RequestDescriptor::new(Method::POST, "https://api.example.com/x");
        assert!(!request.retried);
        assert!(request.headers.is_empty());
        assert!(request.body.is_none());
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let request = RequestDescriptor::new(Method::GET, "https://api.example.com/x")
            .with_header("content-type", "text/plain");
        assert_eq!(request.header("Content-Type"), Some("text/plain"));
    }

    #[test]
    fn test_set_header_replaces_differently_cased_duplicate() {
        let mut request = RequestDescriptor::new(Method::GET, "https://api.example.com/x")
            .with_header("authorization", "Bearer old");
        request.set_bearer("new");
        assert_eq!(request.headers.len(), 1);
        assert_eq!(request.header(AUTHORIZATION), Some("Bearer new"));
    }

    #[test]
    fn test_bearer_token_extracts_token() {
        let mut request = RequestDescriptor::new(Method::GET, "https://api.example.com/x");
        assert_eq!(request.bearer_token(), None);
        request.set_bearer("tok123");
        assert_eq!(request.bearer_token(), Some("tok123"));
    }

    #[test]
    fn test_bearer_token_ignores_other_schemes() {
        let request = RequestDescriptor::new(Method::GET, "https://api.example.com/x")
            .with_header(AUTHORIZATION, "Basic dXNlcjpwYXNz");
        assert_eq!(request.bearer_token(), None);
    }

    #[test]
    fn test_with_json_sets_body_and_content_type() {
        let request = RequestDescriptor::new(Method::POST, "https://api.example.com/bookings")
            .with_json(&serde_json::json!({"serviceId": 7}))
            .unwrap();
        assert_eq!(request.body.as_deref(), Some(r#"{"serviceId":7}"#));
        assert_eq!(request.header("content-type"), Some("application/json"));
    }

    #[test]
    fn test_response_json_decodes_body() {
        let response = ApiResponse {
            status: StatusCode::OK,
            headers: HashMap::new(),
            body: r#"{"balance":42}"#.to_string(),
        };
        let value: serde_json::Value = response.json().unwrap();
        assert_eq!(value["balance"], 42);
    }

    #[test]
    fn test_response_json_reports_malformed_body() {
        let response = ApiResponse {
            status: StatusCode::OK,
            headers: HashMap::new(),
            body: "not json".to_string(),
        };
        assert!(response.json::<serde_json::Value>().is_err());
    }
}
