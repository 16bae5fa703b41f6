//! The fluent query/cache proxy.
//!
//! One [`ModelQuery`] is created per logical query session, refined through
//! builder-style calls, and consumed by a single terminal operation. Caching
//! is off until [`ModelQuery::cached`] is called; once enabled it stays
//! enabled for the life of the proxy, and the cache identifier and TTL are
//! fixed at that moment.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use trellis_cache::{remember, CacheStore};
use trellis_core::TrellisResult;

use crate::model::{Model, QueryBuilder};

/// TTL applied by [`ModelQuery::cached`] when none is given.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30);

/// Cache key for whole-record terminal operations (`get`, `first`, `count`).
pub fn models_key(identifier: &str) -> String {
    format!("models:{identifier}")
}

/// Cache key for single-column terminal operations (`column`, `ids`).
pub fn column_key(column: &str, identifier: &str) -> String {
    format!("model_column:{column}:{identifier}")
}

/// How a query session was started. Fixed at construction; decides which
/// identifier the cache key uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuerySource {
    /// Started from the record type itself; identifier is `Model::NAME`.
    Class,
    /// Started from a record instance; identifier is `Model::NAME`.
    Instance,
    /// Started from a pre-built query handle; identifier is the table name.
    Builder,
}

#[derive(Clone)]
struct CachePolicy {
    store: Arc<dyn CacheStore>,
    ttl: Duration,
    identifier: String,
}

/// Fluent proxy over a model's query builder with opt-in result caching.
///
/// Refinements replace the underlying builder and return the proxy; terminal
/// operations consume the proxy. When caching is enabled, the terminal
/// result is memoized under a key derived from the query's source:
/// `models:{identifier}` for record results, `model_column:{column}:{identifier}`
/// for column results.
pub struct ModelQuery<M: Model> {
    builder: M::Builder,
    source: QuerySource,
    cache: Option<CachePolicy>,
}

impl<M: Model> ModelQuery<M> {
    // ========================================================================
    // CONSTRUCTION
    // ========================================================================

    /// Start a query session from the record type.
    pub fn from_class() -> Self {
        Self {
            builder: M::query(),
            source: QuerySource::Class,
            cache: None,
        }
    }

    /// Start a query session from a record instance.
    ///
    /// Only the record type is used; the instance pins the type parameter,
    /// so the cache identifier is the class token rather than the table name.
    pub fn from_instance(_instance: &M) -> Self {
        Self {
            builder: M::query(),
            source: QuerySource::Instance,
            cache: None,
        }
    }

    /// Adopt a pre-built query handle.
    pub fn from_builder(builder: M::Builder) -> Self {
        Self {
            builder,
            source: QuerySource::Builder,
            cache: None,
        }
    }

    // ========================================================================
    // CACHING
    // ========================================================================

    /// Enable result caching with [`DEFAULT_CACHE_TTL`].
    pub fn cached(self, store: Arc<dyn CacheStore>) -> Self {
        self.cached_for(store, DEFAULT_CACHE_TTL)
    }

    /// Enable result caching with an explicit TTL.
    ///
    /// The cache identifier is computed here, not at the terminal call:
    /// the class token for `Class`/`Instance` sources, the storage-table
    /// name for `Builder` sources.
    pub fn cached_for(mut self, store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        let identifier = match self.source {
            QuerySource::Class | QuerySource::Instance => M::NAME,
            QuerySource::Builder => M::table(),
        };
        self.cache = Some(CachePolicy {
            store,
            ttl,
            identifier: identifier.to_string(),
        });
        self
    }

    /// The identifier cache keys will use, if caching is enabled.
    pub fn cache_identifier(&self) -> Option<&str> {
        self.cache.as_ref().map(|policy| policy.identifier.as_str())
    }

    /// How this query session was started.
    pub fn source(&self) -> QuerySource {
        self.source
    }

    // ========================================================================
    // REFINEMENT OPERATIONS
    // ========================================================================

    /// Keep only rows whose `column` equals `value`.
    pub fn filter(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.builder = self.builder.filter(column, value.into());
        self
    }

    /// Order rows ascending by `column`.
    pub fn order_by(mut self, column: &str) -> Self {
        self.builder = self.builder.order_by(column);
        self
    }

    /// Keep at most `limit` rows.
    pub fn limit(mut self, limit: usize) -> Self {
        self.builder = self.builder.limit(limit);
        self
    }

    /// Apply `refine` only when `condition` holds.
    pub fn when(self, condition: bool, refine: impl FnOnce(Self) -> Self) -> Self {
        if condition {
            refine(self)
        } else {
            self
        }
    }

    // ========================================================================
    // TERMINAL OPERATIONS
    // ========================================================================

    /// Execute and return all matching rows.
    pub async fn get(self) -> TrellisResult<Vec<M>> {
        let Self { builder, cache, .. } = self;
        match cache {
            None => builder.fetch_all().await,
            Some(policy) => {
                let key = models_key(&policy.identifier);
                tracing::debug!(key = %key, "running cached model query");
                remember(policy.store.as_ref(), &key, policy.ttl, move || async move {
                    builder.fetch_all().await
                })
                .await
            }
        }
    }

    /// Execute and return the first matching row, if any.
    pub async fn first(self) -> TrellisResult<Option<M>> {
        let Self { builder, cache, .. } = self;
        match cache {
            None => builder.fetch_first().await,
            Some(policy) => {
                let key = models_key(&policy.identifier);
                remember(policy.store.as_ref(), &key, policy.ttl, move || async move {
                    builder.fetch_first().await
                })
                .await
            }
        }
    }

    /// Execute and return the number of matching rows.
    pub async fn count(self) -> TrellisResult<u64> {
        let Self { builder, cache, .. } = self;
        match cache {
            None => builder.count().await,
            Some(policy) => {
                let key = models_key(&policy.identifier);
                remember(policy.store.as_ref(), &key, policy.ttl, move || async move {
                    builder.count().await
                })
                .await
            }
        }
    }

    /// Return `column`'s values for all matching rows, ordered ascending by
    /// that column.
    pub async fn column(self, column: &str) -> TrellisResult<Vec<Value>> {
        let Self { builder, cache, .. } = self;
        let builder = builder.order_by(column);
        match cache {
            None => builder.fetch_column(column).await,
            Some(policy) => {
                let key = column_key(column, &policy.identifier);
                tracing::debug!(key = %key, "running cached column query");
                let column = column.to_string();
                remember(policy.store.as_ref(), &key, policy.ttl, move || async move {
                    builder.fetch_column(&column).await
                })
                .await
            }
        }
    }

    /// Return the `id` column values for all matching rows.
    pub async fn ids(self) -> TrellisResult<Vec<Value>> {
        self.column("id").await
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde::{Deserialize, Serialize};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use trellis_cache::MemoryStore;
    use trellis_core::QueryError;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Widget {
        id: i64,
        name: String,
    }

    fn fixture_rows() -> Vec<Widget> {
        vec![
            Widget {
                id: 2,
                name: "beta".to_string(),
            },
            Widget {
                id: 1,
                name: "alpha".to_string(),
            },
        ]
    }

    struct WidgetBuilder {
        rows: Vec<Widget>,
        order: Option<String>,
        limit: Option<usize>,
        fetches: Arc<AtomicUsize>,
    }

    impl WidgetBuilder {
        fn new(rows: Vec<Widget>) -> Self {
            Self {
                rows,
                order: None,
                limit: None,
                fetches: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn materialize(mut self) -> TrellisResult<Vec<Widget>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if let Some(order) = &self.order {
                match order.as_str() {
                    "id" => self.rows.sort_by_key(|w| w.id),
                    "name" => self.rows.sort_by(|a, b| a.name.cmp(&b.name)),
                    other => {
                        return Err(QueryError::UnknownColumn {
                            table: Widget::table().to_string(),
                            column: other.to_string(),
                        }
                        .into())
                    }
                }
            }
            if let Some(limit) = self.limit {
                self.rows.truncate(limit);
            }
            Ok(self.rows)
        }
    }

    #[async_trait]
    impl QueryBuilder for WidgetBuilder {
        type Model = Widget;

        fn filter(self, _column: &str, _value: Value) -> Self {
            self
        }

        fn order_by(mut self, column: &str) -> Self {
            self.order = Some(column.to_string());
            self
        }

        fn limit(mut self, limit: usize) -> Self {
            self.limit = Some(limit);
            self
        }

        async fn fetch_all(self) -> TrellisResult<Vec<Widget>> {
            self.materialize()
        }

        async fn fetch_first(self) -> TrellisResult<Option<Widget>> {
            Ok(self.materialize()?.into_iter().next())
        }

        async fn fetch_column(self, column: &str) -> TrellisResult<Vec<Value>> {
            let column = column.to_string();
            self.materialize()?
                .into_iter()
                .map(|row| match column.as_str() {
                    "id" => Ok(Value::from(row.id)),
                    "name" => Ok(Value::from(row.name)),
                    other => Err(QueryError::UnknownColumn {
                        table: Widget::table().to_string(),
                        column: other.to_string(),
                    }
                    .into()),
                })
                .collect()
        }

        async fn count(self) -> TrellisResult<u64> {
            Ok(self.materialize()?.len() as u64)
        }
    }

    impl Model for Widget {
        type Builder = WidgetBuilder;

        const NAME: &'static str = "widget";

        fn table() -> &'static str {
            "widgets"
        }

        fn query() -> WidgetBuilder {
            WidgetBuilder::new(fixture_rows())
        }
    }

    #[tokio::test]
    async fn test_column_returns_values_ordered_ascending() {
        let names = ModelQuery::<Widget>::from_class().column("name").await.unwrap();
        assert_eq!(names, vec![Value::from("alpha"), Value::from("beta")]);

        let ids = ModelQuery::<Widget>::from_class().column("id").await.unwrap();
        assert_eq!(ids, vec![Value::from(1), Value::from(2)]);
    }

    #[tokio::test]
    async fn test_ids_equals_column_id() {
        let ids = ModelQuery::<Widget>::from_class().ids().await.unwrap();
        let column = ModelQuery::<Widget>::from_class().column("id").await.unwrap();
        assert_eq!(ids, column);
    }

    #[tokio::test]
    async fn test_cache_identifier_follows_source_kind() {
        let store = Arc::new(MemoryStore::new());

        let from_class = ModelQuery::<Widget>::from_class().cached(store.clone());
        assert_eq!(from_class.cache_identifier(), Some("widget"));

        let instance = fixture_rows().remove(0);
        let from_instance = ModelQuery::from_instance(&instance).cached(store.clone());
        assert_eq!(from_instance.cache_identifier(), Some("widget"));

        let from_builder =
            ModelQuery::<Widget>::from_builder(WidgetBuilder::new(fixture_rows())).cached(store);
        assert_eq!(from_builder.cache_identifier(), Some("widgets"));
    }

    #[tokio::test]
    async fn test_cached_column_computes_once_under_column_key() {
        let store = Arc::new(MemoryStore::new());
        let fetches = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let mut builder = WidgetBuilder::new(fixture_rows());
            builder.fetches = fetches.clone();

            let names = ModelQuery::<Widget>::from_builder(builder)
                .cached(store.clone())
                .column("name")
                .await
                .unwrap();
            assert_eq!(names, vec![Value::from("alpha"), Value::from("beta")]);
        }

        assert_eq!(fetches.load(Ordering::SeqCst), 1);
        let cached = store.get("model_column:name:widgets").await.unwrap();
        assert!(cached.is_some());
    }

    #[tokio::test]
    async fn test_cached_get_uses_models_key() {
        let store = Arc::new(MemoryStore::new());

        let rows = ModelQuery::<Widget>::from_class()
            .cached(store.clone())
            .get()
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert!(store.get("models:widget").await.unwrap().is_some());
        assert!(store.get("model_column:id:widget").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_uncached_terminal_returns_result_as_is() {
        let rows = ModelQuery::<Widget>::from_class().get().await.unwrap();
        assert_eq!(rows, fixture_rows());

        let count = ModelQuery::<Widget>::from_class().count().await.unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_refinements_apply_before_terminal() {
        let first = ModelQuery::<Widget>::from_class()
            .order_by("id")
            .limit(1)
            .first()
            .await
            .unwrap();
        assert_eq!(first.map(|w| w.id), Some(1));

        let limited = ModelQuery::<Widget>::from_class()
            .when(true, |query| query.limit(1))
            .when(false, |query| query.limit(0))
            .order_by("id")
            .get()
            .await
            .unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_column_error_surfaces_untouched() {
        let err = ModelQuery::<Widget>::from_class()
            .column("bogus")
            .await
            .unwrap_err();

        assert_eq!(
            err,
            QueryError::UnknownColumn {
                table: "widgets".to_string(),
                column: "bogus".to_string(),
            }
            .into()
        );
    }

    #[tokio::test]
    async fn test_caching_respects_enabling_time_ttl() {
        let store = Arc::new(MemoryStore::new());

        // Zero TTL: every call recomputes.
        let fetches = Arc::new(AtomicUsize::new(0));
        for _ in 0..2 {
            let mut builder = WidgetBuilder::new(fixture_rows());
            builder.fetches = fetches.clone();
            ModelQuery::<Widget>::from_builder(builder)
                .cached_for(store.clone(), Duration::ZERO)
                .ids()
                .await
                .unwrap();
        }
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }
}
