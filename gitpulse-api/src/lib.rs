//! GitPulse API - HTTP Proxy over the GitHub Repository-Search API
//!
//! This crate provides the HTTP surface of GitPulse: an Axum server that
//! forwards repository-search queries upstream with bounded retries, caches
//! responses in a key-value store, and rate-limits callers per route.
//! The cache, retry, and upstream-client primitives live in gitpulse-core.

pub mod config;
pub mod error;
pub mod middleware;
#[cfg(feature = "openapi")]
pub mod openapi;
pub mod routes;
pub mod telemetry;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use middleware::{rate_limit_middleware, RateLimitState};
pub use routes::create_api_router;
