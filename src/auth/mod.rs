//! Credential handling for the API client
//!
//! # Module Layout
//!
//! - [`coordinator`]      -- Single-flight refresh state machine
//! - [`metrics`]          -- Refresh telemetry via the `metrics` crate
//! - [`refresh_endpoint`] -- Refresh-token exchange over HTTP
//! - [`token_store`]      -- Token persistence (in-memory, OS keyring)

pub mod coordinator;
pub mod metrics;
pub mod refresh_endpoint;
pub mod token_store;

pub use coordinator::RefreshCoordinator;
pub use refresh_endpoint::{HttpRefreshEndpoint, RefreshEndpoint, RefreshFailure, RefreshedTokens};
pub use token_store::{KeyringTokenStore, MemoryTokenStore, TokenPair, TokenStore};
