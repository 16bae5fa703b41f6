//! The ORM seam: record types and their query builders.
//!
//! The underlying data store is an external collaborator. A record type
//! implements [`Model`] to name itself and hand out builders; its builder
//! implements [`QueryBuilder`] with two explicit operation groups:
//! refinements that consume and return the builder, and terminal operations
//! that execute the query and return data.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use trellis_core::TrellisResult;

/// A record type backed by a data-store table.
///
/// `NAME` is the model's class token (used as the cache identifier when a
/// query starts from the type or an instance); `table()` is the storage-table
/// name (used when a query starts from a pre-built handle).
pub trait Model: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// The builder type that refines and executes queries for this model.
    type Builder: QueryBuilder<Model = Self>;

    /// Class token naming this record type.
    const NAME: &'static str;

    /// Storage-table name.
    fn table() -> &'static str;

    /// A fresh builder over all rows of this model, the query entry point.
    fn query() -> Self::Builder;
}

/// An in-progress, not-yet-executed data-store query.
///
/// Refinement operations consume the builder and return a refined one; the
/// proxy replaces its handle rather than mutating in place. Terminal
/// operations execute the query. Errors (unknown columns, backend failures)
/// surface from the implementation untouched.
#[async_trait]
pub trait QueryBuilder: Send + Sized + 'static {
    /// The record type this builder materializes.
    type Model: Model;

    // ========================================================================
    // REFINEMENT OPERATIONS
    // ========================================================================

    /// Keep only rows whose `column` equals `value`.
    fn filter(self, column: &str, value: Value) -> Self;

    /// Order rows ascending by `column`.
    fn order_by(self, column: &str) -> Self;

    /// Keep at most `limit` rows.
    fn limit(self, limit: usize) -> Self;

    // ========================================================================
    // TERMINAL OPERATIONS
    // ========================================================================

    /// Execute and return all matching rows.
    async fn fetch_all(self) -> TrellisResult<Vec<Self::Model>>;

    /// Execute and return the first matching row, if any.
    async fn fetch_first(self) -> TrellisResult<Option<Self::Model>>;

    /// Execute and return only `column`'s value for each matching row.
    async fn fetch_column(self, column: &str) -> TrellisResult<Vec<Value>>;

    /// Execute and return the number of matching rows.
    async fn count(self) -> TrellisResult<u64>;
}
