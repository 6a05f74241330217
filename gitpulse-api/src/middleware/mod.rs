//! Axum middleware for the GitPulse API.

pub mod rate_limit;

pub use rate_limit::{rate_limit_middleware, RateLimitError, RateLimitKey, RateLimitState};
