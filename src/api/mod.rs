//! Outbound request pipeline
//!
//! # Module Layout
//!
//! - [`client`]       -- `ApiClient`, which composes the pipeline
//! - [`dispatcher`]   -- `RequestDispatcher` trait and reqwest implementation
//! - [`interceptors`] -- bearer attachment and 401 recovery
//! - [`request`]      -- request/response value types

pub mod client;
pub mod dispatcher;
pub mod interceptors;
pub mod request;

pub use client::ApiClient;
pub use dispatcher::{HttpDispatcher, RequestDispatcher};
pub use interceptors::{AuthInterceptor, FailureInterceptor};
pub use request::{ApiResponse, RequestDescriptor};
