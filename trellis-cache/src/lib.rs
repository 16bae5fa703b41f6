//! Trellis Cache - Key-Value Cache Seam
//!
//! Abstracts the application framework's cache store behind an object-safe
//! trait and provides:
//! - [`CacheStore`] - get/put/forget/flush over string keys and JSON values
//! - [`remember`] - the read-through helper used by the query proxy
//! - [`MemoryStore`] - an in-memory TTL backend
//!
//! No cross-caller mutual exclusion is provided around read-then-write:
//! concurrent callers missing the same cold key may each run the computation
//! once (accepted thundering herd).

pub mod memory;
pub mod store;

pub use memory::MemoryStore;
pub use store::{remember, CacheStore};
