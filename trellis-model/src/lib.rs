//! Trellis Model - Fluent Query Proxy
//!
//! Wraps a record type's query builder in a fluent proxy that can memoize the
//! result of its terminal operation in a cache store:
//! - [`Model`] / [`QueryBuilder`] - the ORM seam the proxy drives
//! - [`ModelQuery`] - the proxy itself (refine, then run one terminal op)
//! - free-function façade (`get_model_ids`, `get_model_column`, and the
//!   cached variants)
//!
//! ```ignore
//! let names = ModelQuery::<User>::from_class()
//!     .cached(store)
//!     .column("name")
//!     .await?;
//! ```

pub mod helpers;
pub mod model;
pub mod query;

pub use helpers::{
    get_cached_model_columns, get_cached_model_ids, get_model_column, get_model_ids,
};
pub use model::{Model, QueryBuilder};
pub use query::{column_key, models_key, ModelQuery, QuerySource, DEFAULT_CACHE_TTL};
