//! GitPulse Core - Caching and Upstream-Fetch Primitives
//!
//! This crate contains the library half of GitPulse:
//! - Deterministic cache-key derivation from request identity
//! - A cache store contract with Redis and in-memory backends
//! - Generic cache wrapping for any asynchronous, idempotent handler
//! - A bounded-retry resilient request primitive with exponential backoff
//! - The GitHub repository-search client and its parameter builder
//!
//! The HTTP surface lives in gitpulse-api; nothing in this crate knows about
//! routes or status codes.

pub mod cache;
pub mod error;
pub mod github;
pub mod retry;

// Re-export commonly used types
pub use cache::{cached, CacheKey, CacheOp, CacheStore, MemoryStore, RedisStore, DEFAULT_TTL};
pub use error::{CacheError, ParamsError, UpstreamError};
pub use github::{extract_items, SearchClient, SearchParams, DEFAULT_BASE_URL};
pub use retry::{retry, RetryPolicy};
