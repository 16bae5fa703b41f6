//! Error types for Trellis operations

use thiserror::Error;

/// Query builder and data-store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("Unknown column {column} on table {table}")]
    UnknownColumn { table: String, column: String },

    #[error("Query backend error: {reason}")]
    Backend { reason: String },

    #[error("Database lock poisoned")]
    LockPoisoned,
}

/// Cache store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("Cache backend error: {reason}")]
    Backend { reason: String },

    #[error("Failed to encode or decode cached value: {reason}")]
    Codec { reason: String },

    #[error("Cache lock poisoned")]
    LockPoisoned,
}

/// Route resolution errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("Unknown route: {name}")]
    UnknownRoute { name: String },

    #[error("Route {route} declares {expected} parameter(s), {supplied} value(s) supplied")]
    ParameterMismatch {
        route: String,
        expected: usize,
        supplied: usize,
    },

    #[error("Missing parameter {parameter} for route {route}")]
    MissingParameter { route: String, parameter: String },
}

/// Validation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid type for {field}: expected {expected}")]
    InvalidType { field: String, expected: String },

    #[error("Value for {field} is below the minimum of {min}")]
    TooShort { field: String, min: i64 },

    #[error("Value for {field} exceeds the maximum of {max}")]
    TooLong { field: String, max: i64 },

    #[error("Unknown validation rule: {rule}")]
    UnknownRule { rule: String },
}

/// Master error type for all Trellis errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TrellisError {
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Route error: {0}")]
    Route(#[from] RouteError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Result type alias for Trellis operations.
pub type TrellisResult<T> = Result<T, TrellisError>;

// =============================================================================
// TESTS
// =============================================================================
