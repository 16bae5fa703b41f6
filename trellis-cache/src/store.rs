//! Cache store trait and the read-through `remember` helper.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use trellis_core::{CacheError, TrellisResult};

/// Object-safe cache store over string keys and JSON values.
///
/// Implementations own serialization-at-rest and TTL bookkeeping. Keys are
/// opaque to the store; the query proxy derives them from model identifiers.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Get a fresh value, or `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError>;

    /// Store a value under `key` for `ttl`.
    async fn put(&self, key: &str, value: Value, ttl: Duration) -> Result<(), CacheError>;

    /// Remove a key. Returns whether a live entry was removed.
    async fn forget(&self, key: &str) -> Result<bool, CacheError>;

    /// Remove every entry.
    async fn flush(&self) -> Result<(), CacheError>;
}

/// Return the cached value for `key` if present and fresh, otherwise run
/// `compute`, store the result with `ttl`, and return it.
///
/// The computation runs at most once per key per TTL window for a single
/// caller. A cached payload that no longer decodes as `T` is treated as a
/// miss and overwritten.
pub async fn remember<T, F, Fut>(
    store: &dyn CacheStore,
    key: &str,
    ttl: Duration,
    compute: F,
) -> TrellisResult<T>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = TrellisResult<T>>,
{
    if let Some(raw) = store.get(key).await? {
        match serde_json::from_value(raw) {
            Ok(value) => {
                tracing::trace!(key, "cache hit");
                return Ok(value);
            }
            Err(err) => {
                tracing::debug!(key, error = %err, "cached payload undecodable, recomputing");
            }
        }
    }

    tracing::trace!(key, "cache miss");
    let value = compute().await?;
    let raw = serde_json::to_value(&value).map_err(|err| CacheError::Codec {
        reason: err.to_string(),
    })?;
    store.put(key, raw, ttl).await?;

    Ok(value)
}
