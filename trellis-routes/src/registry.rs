//! The router collaborator contract and an in-memory implementation.

use trellis_core::{RouteError, TrellisResult};

/// A router's route registry and URL builder.
///
/// `parameter_names` reports a route's declared parameters in declaration
/// order, and is empty for unknown routes. `url` builds an absolute URL
/// (scheme and host included) from a name-to-value binding.
pub trait RouteRegistry: Send + Sync {
    /// Declared parameter names for `name`, in declaration order.
    fn parameter_names(&self, name: &str) -> Vec<String>;

    /// Build the absolute URL for `name` with the given parameter binding.
    fn url(&self, name: &str, parameters: &[(&str, &str)]) -> TrellisResult<String>;
}

#[derive(Debug, Clone)]
struct RouteDef {
    name: String,
    pattern: String,
}

/// In-memory route registry.
///
/// Routes are registered as `{param}` patterns against a base origin:
///
/// ```
/// use trellis_routes::{MemoryRouter, RouteRegistry};
///
/// let router = MemoryRouter::new("http://localhost")
///     .route("test.three", "/test/three/{a}/{b}");
///
/// assert_eq!(router.parameter_names("test.three"), vec!["a", "b"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryRouter {
    base: String,
    routes: Vec<RouteDef>,
}

impl MemoryRouter {
    /// Create a registry rooted at `base` (scheme + host, no trailing slash).
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            routes: Vec::new(),
        }
    }

    /// Register `pattern` under `name`. Re-registering a name replaces it.
    pub fn route(mut self, name: impl Into<String>, pattern: impl Into<String>) -> Self {
        let def = RouteDef {
            name: name.into(),
            pattern: pattern.into(),
        };
        self.routes.retain(|existing| existing.name != def.name);
        self.routes.push(def);
        self
    }

    fn find(&self, name: &str) -> Option<&RouteDef> {
        self.routes.iter().find(|def| def.name == name)
    }
}

/// Placeholder names (`{param}`) in `pattern`, left to right.
fn placeholders(pattern: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut rest = pattern;
    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        names.push(rest[start + 1..start + len].to_string());
        rest = &rest[start + len + 1..];
    }
    names
}

impl RouteRegistry for MemoryRouter {
    fn parameter_names(&self, name: &str) -> Vec<String> {
        self.find(name)
            .map(|def| placeholders(&def.pattern))
            .unwrap_or_default()
    }

    fn url(&self, name: &str, parameters: &[(&str, &str)]) -> TrellisResult<String> {
        let def = self.find(name).ok_or_else(|| RouteError::UnknownRoute {
            name: name.to_string(),
        })?;

        let mut path = def.pattern.clone();
        for parameter in placeholders(&def.pattern) {
            let value = parameters
                .iter()
                .find(|(key, _)| *key == parameter)
                .map(|(_, value)| *value)
                .ok_or_else(|| RouteError::MissingParameter {
                    route: name.to_string(),
                    parameter: parameter.clone(),
                })?;
            path = path.replace(&format!("{{{parameter}}}"), value);
        }

        Ok(format!("{}{}", self.base, path))
    }
}

// =============================================================================
// TESTS
// =============================================================================
