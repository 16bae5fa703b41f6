//! Trellis Test Utilities
//!
//! Test infrastructure for the Trellis workspace:
//! - [`MemoryDatabase`] - a process-wide, seedable table registry
//! - [`MemoryBuilder`] - a [`QueryBuilder`] implementation over it
//! - Fixture models ([`Example`], [`Tag`])
//!
//! `Model::query()` is a static entry point, so the database is an ambient
//! process-wide registry. Seeding replaces a table's contents, which keeps
//! concurrent tests of the same model stable as long as they seed the same
//! rows.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use trellis_core::{QueryError, TrellisResult};

pub use trellis_model::{Model, QueryBuilder};

// Re-export the pieces integration tests reach for.
pub use trellis_cache::{remember, CacheStore, MemoryStore};
pub use trellis_model::{
    column_key, get_cached_model_columns, get_cached_model_ids, get_model_column, get_model_ids,
    models_key, ModelQuery, QuerySource, DEFAULT_CACHE_TTL,
};
pub use trellis_routes::{relative, relative_route, routepath, MemoryRouter, RouteRegistry};

static DATABASE: Lazy<RwLock<HashMap<&'static str, Vec<Value>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

// ============================================================================
// MEMORY DATABASE
// ============================================================================

/// Process-wide in-memory table registry backing the fixture models.
pub struct MemoryDatabase;

impl MemoryDatabase {
    /// Replace the contents of `M`'s table with `rows`.
    pub fn seed<M: Model>(rows: &[M]) -> TrellisResult<()> {
        let rows = rows
            .iter()
            .map(|row| {
                serde_json::to_value(row).map_err(|err| {
                    QueryError::Backend {
                        reason: err.to_string(),
                    }
                    .into()
                })
            })
            .collect::<TrellisResult<Vec<Value>>>()?;

        let mut tables = DATABASE.write().map_err(|_| QueryError::LockPoisoned)?;
        tables.insert(M::table(), rows);
        Ok(())
    }

    /// Drop `M`'s table.
    pub fn clear<M: Model>() -> TrellisResult<()> {
        let mut tables = DATABASE.write().map_err(|_| QueryError::LockPoisoned)?;
        tables.remove(M::table());
        Ok(())
    }

    fn rows(table: &str) -> TrellisResult<Vec<Value>> {
        let tables = DATABASE.read().map_err(|_| QueryError::LockPoisoned)?;
        Ok(tables.get(table).cloned().unwrap_or_default())
    }
}

// ============================================================================
// MEMORY QUERY BUILDER
// ============================================================================

/// [`QueryBuilder`] over [`MemoryDatabase`]: equality filters, single-column
/// ascending order, limit.
#[derive(Debug, Clone, Default)]
pub struct MemoryBuilder<M> {
    filters: Vec<(String, Value)>,
    order: Option<String>,
    limit: Option<usize>,
    _model: PhantomData<fn() -> M>,
}

impl<M: Model> MemoryBuilder<M> {
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
            order: None,
            limit: None,
            _model: PhantomData,
        }
    }

    fn field<'a>(row: &'a Value, column: &str) -> TrellisResult<&'a Value> {
        row.get(column).ok_or_else(|| {
            QueryError::UnknownColumn {
                table: M::table().to_string(),
                column: column.to_string(),
            }
            .into()
        })
    }

    fn materialize(self) -> TrellisResult<Vec<Value>> {
        let mut rows = MemoryDatabase::rows(M::table())?;

        for (column, expected) in &self.filters {
            let mut kept = Vec::with_capacity(rows.len());
            for row in rows {
                if Self::field(&row, column)? == expected {
                    kept.push(row);
                }
            }
            rows = kept;
        }

        if let Some(column) = &self.order {
            // Surface unknown order columns before sorting silently no-ops.
            for row in &rows {
                Self::field(row, column)?;
            }
            rows.sort_by(|a, b| {
                let left = a.get(column).unwrap_or(&Value::Null);
                let right = b.get(column).unwrap_or(&Value::Null);
                compare_values(left, right)
            });
        }

        if let Some(limit) = self.limit {
            rows.truncate(limit);
        }

        Ok(rows)
    }
}

/// Ordering over JSON scalars: null < bool < number < string < everything else.
fn compare_values(left: &Value, right: &Value) -> Ordering {
    fn rank(value: &Value) -> u8 {
        match value {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            _ => 4,
        }
    }

    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(a), Value::String(b)) => a.cmp(b),
        _ => rank(left).cmp(&rank(right)),
    }
}

#[async_trait]
impl<M: Model> QueryBuilder for MemoryBuilder<M> {
    type Model = M;

    fn filter(mut self, column: &str, value: Value) -> Self {
        self.filters.push((column.to_string(), value));
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

    async fn fetch_all(self) -> TrellisResult<Vec<M>> {
        self.materialize()?
            .into_iter()
            .map(|row| {
                serde_json::from_value(row).map_err(|err| {
                    QueryError::Backend {
                        reason: err.to_string(),
                    }
                    .into()
                })
            })
            .collect()
    }

    async fn fetch_first(self) -> TrellisResult<Option<M>> {
        Ok(self.limit(1).fetch_all().await?.into_iter().next())
    }

    async fn fetch_column(self, column: &str) -> TrellisResult<Vec<Value>> {
        let column = column.to_string();
        self.materialize()?
            .into_iter()
            .map(|row| Self::field(&row, &column).cloned())
            .collect()
    }

    async fn count(self) -> TrellisResult<u64> {
        Ok(self.materialize()?.len() as u64)
    }
}

// ============================================================================
// FIXTURE MODELS
// ============================================================================

/// The canonical fixture record (id, name, timestamps).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Example {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        let at = fixture_timestamp();
        Self {
            id,
            name: name.into(),
            created_at: at,
            updated_at: at,
        }
    }
}

impl Model for Example {
    type Builder = MemoryBuilder<Self>;

    const NAME: &'static str = "example";

    fn table() -> &'static str {
        "examples"
    }

    fn query() -> MemoryBuilder<Self> {
        MemoryBuilder::new()
    }
}

/// A second fixture model, for tests that need distinct cache identifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub label: String,
}

impl Model for Tag {
    type Builder = MemoryBuilder<Self>;

    const NAME: &'static str = "tag";

    fn table() -> &'static str {
        "tags"
    }

    fn query() -> MemoryBuilder<Self> {
        MemoryBuilder::new()
    }
}

/// A fixed timestamp keeps seeded rows byte-stable across reseeds.
fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// Seed the `examples` table with the standard rows (ids 1 and 2).
pub fn seed_examples() -> TrellisResult<()> {
    MemoryDatabase::seed(&[Example::new(1, "helloworld"), Example::new(2, "another")])
}
