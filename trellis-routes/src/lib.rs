//! Trellis Routes - Named-Route Helpers
//!
//! Resolves named routes into URLs through a router registry:
//! - [`RouteRegistry`] - the router collaborator contract
//! - [`MemoryRouter`] - an in-memory registry with `{param}` patterns
//! - [`routepath`] - compact `name/value/value` route resolution
//! - [`relative`] / [`relative_route`] - scheme-and-host-stripped URLs
//!
//! ```
//! use trellis_routes::{routepath, MemoryRouter};
//!
//! let router = MemoryRouter::new("http://localhost")
//!     .route("users.show", "/users/{id}");
//!
//! let url = routepath(&router, "users.show/123").unwrap();
//! assert_eq!(url, "http://localhost/users/123");
//! ```

pub mod registry;
pub mod resolver;

pub use registry::{MemoryRouter, RouteRegistry};
pub use resolver::{relative, relative_route, routepath};
