//! salon-client - Authenticated client library for the salon booking API
//!
//! Every outbound request carries the stored access token. When the server
//! answers `401`, the request is parked behind a single shared token refresh
//! and replayed once with the new token.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `api`: Request types, dispatcher, interceptors and the `ApiClient`
//! - `auth`: Token storage, refresh endpoint and the refresh coordinator
//! - `commands`: Handlers behind the command-line tool
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use salon_client::{ApiClient, Config, MemoryTokenStore, TokenPair};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     config.validate()?;
//!
//!     let client = ApiClient::from_config(&config.api, Arc::new(MemoryTokenStore::new()))?;
//!     client.login(&TokenPair::new("access", "refresh"))?;
//!     let profile: serde_json::Value = client.get_json("/me").await?;
//!     println!("{profile}");
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;

// Re-export commonly used types
pub use api::{ApiClient, ApiResponse, RequestDescriptor, RequestDispatcher};
pub use auth::{
    KeyringTokenStore, MemoryTokenStore, RefreshCoordinator, RefreshEndpoint, TokenPair,
    TokenStore,
};
pub use config::Config;
pub use error::{ApiResult, Result, SalonError};

#[cfg(test)]
pub mod test_utils;
