//! Error types for the salon API client
//!
//! This module defines all error types used throughout the crate, using
//! `thiserror` for ergonomic error handling.
//!
//! Two result aliases are exported:
//!
//! - [`Result`] -- `anyhow`-backed, used by configuration loading and the CLI.
//! - [`ApiResult`] -- typed, used on the request path so that callers can
//!   match on [`SalonError`] variants (e.g. `RefreshFailed`) directly.

use reqwest::StatusCode;
use thiserror::Error;

use crate::api::request::RequestDescriptor;

/// Main error type for salon client operations
///
/// Covers the request path (transport failures, non-2xx statuses, refresh
/// failures) as well as the configuration and credential storage layers.
#[derive(Error, Debug)]
pub enum SalonError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport-level failure (connection refused, timeout, TLS, ...)
    ///
    /// Never involves the refresh coordinator.
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a non-2xx status
    ///
    /// Carries the original request so the failure interceptor can replay it.
    #[error("HTTP {status} for {} {}", .request.method, .request.url)]
    Http {
        /// Response status code
        status: StatusCode,
        /// The request that produced this status
        request: Box<RequestDescriptor>,
        /// Response body, possibly empty
        body: String,
    },

    /// Token refresh failed; the stored credentials have been cleared
    ///
    /// Every caller waiting on the same refresh cycle receives this error
    /// with the same reason.
    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    /// A URL could not be parsed or joined
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Keyring/credential storage errors
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    /// In-process credential storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl SalonError {
    /// Returns the HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            SalonError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` for a `401 Unauthorized` on a request that has not
    /// been replayed yet.
    ///
    /// This is the only condition that engages the refresh coordinator.
    pub fn is_auth_expired(&self) -> bool {
        match self {
            SalonError::Http {
                status, request, ..
            } => *status == StatusCode::UNAUTHORIZED && !request.retried,
            _ => false,
        }
    }
}

/// Result type alias for application-level operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;

/// Result type alias for the request path
pub type ApiResult<T> = std::result::Result<T, SalonError>;
