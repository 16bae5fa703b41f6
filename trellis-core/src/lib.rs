//! Trellis Core - Shared Types and Utilities
//!
//! Foundation crate for the Trellis helper library:
//! - Error types for every Trellis subsystem and the master error enum
//! - Word-safe string truncation
//! - Rule-string validation ("required|string|min:3" style)
//!
//! The query proxy lives in `trellis-model`, the cache seam in
//! `trellis-cache`, and the route helpers in `trellis-routes`.

pub mod error;
pub mod text;
pub mod validate;

pub use error::{
    CacheError, QueryError, RouteError, TrellisError, TrellisResult, ValidationError,
};
pub use text::truncate_words;
pub use validate::{validate, validated, Rule, Validator};
