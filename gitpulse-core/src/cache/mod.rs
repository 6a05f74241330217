//! Response caching: key derivation, store backends, and generic wrapping.
//!
//! The cache layer memoizes any asynchronous, idempotent handler:
//! - [`key`] derives a stable SHA-256 identifier from the logical operation
//!   name plus the request's path and query parameters.
//! - [`store`] defines the key-value contract and ships a Redis backend for
//!   production plus an in-memory backend for tests and local development.
//! - [`wrap`] provides [`cached`], the higher-order function that
//!   short-circuits on hit and persists on miss with a TTL.
//!
//! Expiry is delegated entirely to the store's native TTL mechanism; there is
//! no explicit deletion path. Concurrent identical misses each invoke the
//! wrapped handler and race on the write; the last writer wins.

pub mod key;
pub mod store;
pub mod wrap;

pub use key::{derive, CacheKey, CacheOp};
pub use store::{CacheStore, MemoryStore, RedisStore};
pub use wrap::{cached, DEFAULT_TTL};
