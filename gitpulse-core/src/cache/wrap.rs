//! Generic cache wrapping for asynchronous handlers.

use std::future::Future;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};

use super::key::CacheOp;
use super::store::CacheStore;
use crate::error::CacheError;

/// TTL applied when a route does not specify its own.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// Run `handler` through the cache identified by `op`.
///
/// 1. Derive the cache key from the operation's logical name, path, and
///    query parameters.
/// 2. On a hit, decode and return the stored value; the handler is not
///    invoked. A corrupt entry is fatal for this request and never falls
///    through to a live fetch.
/// 3. On a miss, invoke the handler exactly once and await its result.
/// 4. Encode the result and store it with `ttl`. Encode and store failures
///    propagate even though the fetch succeeded.
/// 5. Return the live result.
///
/// There is no single-flight protection: concurrent identical misses each
/// invoke the handler and race on the write; the last writer wins.
pub async fn cached<T, E, F, Fut>(
    store: &dyn CacheStore,
    op: CacheOp<'_>,
    ttl: Duration,
    handler: F,
) -> Result<T, E>
where
    T: Serialize + DeserializeOwned,
    E: From<CacheError>,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let key = op.key();

    if let Some(bytes) = store.get(&key).await? {
        tracing::debug!(operation = op.name, key = %key, "cache hit");
        let value =
            serde_json::from_slice(&bytes).map_err(|source| CacheError::Decode { source })?;
        return Ok(value);
    }

    tracing::debug!(operation = op.name, key = %key, "cache miss");
    let value = handler().await?;

    let bytes = serde_json::to_vec(&value).map_err(|source| CacheError::Encode { source })?;
    store.set(&key, &bytes, ttl).await?;

    Ok(value)
}
