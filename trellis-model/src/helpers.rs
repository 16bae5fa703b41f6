//! Free-function façade over [`ModelQuery`].
//!
//! Direct call-throughs for the common one-liners. `limit` of `None`
//! retrieves all records. The cached variants route through the proxy so
//! their cache keys are identical to the proxy's.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use trellis_cache::CacheStore;
use trellis_core::TrellisResult;

use crate::model::Model;
use crate::query::ModelQuery;

/// Get `column`'s values for a model, ordered ascending by that column.
pub async fn get_model_column<M: Model>(
    column: &str,
    limit: Option<usize>,
) -> TrellisResult<Vec<Value>> {
    let query = ModelQuery::<M>::from_class();
    let query = match limit {
        Some(limit) => query.limit(limit),
        None => query,
    };
    query.column(column).await
}

/// Get a model's `id` column values.
pub async fn get_model_ids<M: Model>(limit: Option<usize>) -> TrellisResult<Vec<Value>> {
    get_model_column::<M>("id", limit).await
}

/// Get `column`'s values for a model, using cached values when fresh.
pub async fn get_cached_model_columns<M: Model>(
    store: Arc<dyn CacheStore>,
    column: &str,
    ttl: Duration,
    limit: Option<usize>,
) -> TrellisResult<Vec<Value>> {
    let query = ModelQuery::<M>::from_class().cached_for(store, ttl);
    let query = match limit {
        Some(limit) => query.limit(limit),
        None => query,
    };
    query.column(column).await
}

/// Get a model's `id` column values, using cached values when fresh.
pub async fn get_cached_model_ids<M: Model>(
    store: Arc<dyn CacheStore>,
    ttl: Duration,
    limit: Option<usize>,
) -> TrellisResult<Vec<Value>> {
    get_cached_model_columns::<M>(store, "id", ttl, limit).await
}
