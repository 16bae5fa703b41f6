//! Route-path resolution and relative URLs.

use trellis_core::{RouteError, TrellisResult};

use crate::registry::RouteRegistry;

/// Resolve a compact route path of the form `name` or `name/v1/v2/...`.
///
/// Without a `/` the whole string is a route name and is resolved with no
/// parameters. Otherwise the first segment is the route name and the
/// remaining segments are positional parameter values, bound to the route's
/// declared parameter names in declaration order:
///
/// ```
/// use trellis_routes::{routepath, MemoryRouter};
///
/// let router = MemoryRouter::new("http://localhost")
///     .route("web.products.show", "/products/{category}/{id}");
///
/// assert_eq!(
///     routepath(&router, "web.products.show/books/123").unwrap(),
///     "http://localhost/products/books/123",
/// );
/// ```
///
/// # Errors
/// Returns `RouteError::ParameterMismatch` when the number of values differs
/// from the number of declared parameters (an unknown route declares none,
/// so supplying values to one also fails here), and `RouteError::UnknownRoute`
/// from the registry for an unknown plain name.
pub fn routepath(registry: &dyn RouteRegistry, spec: &str) -> TrellisResult<String> {
    let Some((name, rest)) = spec.split_once('/') else {
        return registry.url(spec, &[]);
    };

    let values: Vec<&str> = rest.split('/').collect();
    let names = registry.parameter_names(name);

    if names.len() != values.len() {
        tracing::debug!(route = name, "routepath segment count mismatch");
        return Err(RouteError::ParameterMismatch {
            route: name.to_string(),
            expected: names.len(),
            supplied: values.len(),
        }
        .into());
    }

    let parameters: Vec<(&str, &str)> = names
        .iter()
        .map(String::as_str)
        .zip(values)
        .collect();

    registry.url(name, &parameters)
}

/// Build the URL for a named route and strip the scheme and host.
///
/// Never returns an empty path: a URL with no path component resolves
/// to `"/"`.
pub fn relative(
    registry: &dyn RouteRegistry,
    name: &str,
    parameters: &[(&str, &str)],
) -> TrellisResult<String> {
    let url = registry.url(name, parameters)?;
    Ok(strip_origin(&url))
}

/// Alias of [`relative`] matching the façade naming.
pub fn relative_route(
    registry: &dyn RouteRegistry,
    name: &str,
    parameters: &[(&str, &str)],
) -> TrellisResult<String> {
    relative(registry, name, parameters)
}

/// The path component of `url`, with scheme and host removed.
fn strip_origin(url: &str) -> String {
    let host_start = url.find("://").map_or(0, |scheme| scheme + 3);
    match url[host_start..].find('/') {
        Some(path) if !url[host_start + path..].is_empty() => {
            url[host_start + path..].to_string()
        }
        _ => "/".to_string(),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::MemoryRouter;
    use proptest::prelude::*;
    use trellis_core::TrellisError;

    fn router() -> MemoryRouter {
        MemoryRouter::new("http://localhost")
            .route("test.zero", "/")
            .route("test.one", "/test/one")
            .route("test.two", "/test/two/{id}")
            .route("test.three", "/test/three/{a}/{b}")
    }

    #[test]
    fn test_routepath_resolves_plain_names_and_positional_values() {
        let router = router();
        let results = [
            routepath(&router, "test.one").unwrap(),
            routepath(&router, "test.two/1").unwrap(),
            routepath(&router, "test.three/123/456").unwrap(),
        ];

        assert_eq!(
            results,
            [
                "http://localhost/test/one".to_string(),
                "http://localhost/test/two/1".to_string(),
                "http://localhost/test/three/123/456".to_string(),
            ]
        );
    }

    #[test]
    fn test_routepath_matches_direct_url_building() {
        let router = router();
        assert_eq!(
            routepath(&router, "test.two/123").unwrap(),
            router.url("test.two", &[("id", "123")]).unwrap()
        );
        assert_eq!(
            routepath(&router, "test.one").unwrap(),
            router.url("test.one", &[]).unwrap()
        );
    }

    #[test]
    fn test_routepath_rejects_segment_count_mismatch() {
        let router = router();

        let err = routepath(&router, "test.three/1").unwrap_err();
        assert_eq!(
            err,
            TrellisError::Route(RouteError::ParameterMismatch {
                route: "test.three".to_string(),
                expected: 2,
                supplied: 1,
            })
        );

        // Unknown routes declare no parameters; supplying values mismatches.
        let err = routepath(&router, "missing/1").unwrap_err();
        assert!(matches!(
            err,
            TrellisError::Route(RouteError::ParameterMismatch { expected: 0, .. })
        ));
    }

    #[test]
    fn test_routepath_unknown_plain_name_surfaces_registry_error() {
        let err = routepath(&router(), "missing").unwrap_err();
        assert_eq!(
            err,
            TrellisError::Route(RouteError::UnknownRoute {
                name: "missing".to_string()
            })
        );
    }

    #[test]
    fn test_relative_strips_scheme_and_host() {
        let router = router();
        let results = [
            relative(&router, "test.zero", &[]).unwrap(),
            relative(&router, "test.one", &[]).unwrap(),
            relative(&router, "test.three", &[("a", "1"), ("b", "2")]).unwrap(),
            relative_route(&router, "test.two", &[("id", "1")]).unwrap(),
        ];

        assert_eq!(
            results,
            [
                "/".to_string(),
                "/test/one".to_string(),
                "/test/three/1/2".to_string(),
                "/test/two/1".to_string(),
            ]
        );
    }

    #[test]
    fn test_relative_of_bare_origin_is_root() {
        let router = MemoryRouter::new("http://localhost").route("home", "");
        assert_eq!(relative(&router, "home", &[]).unwrap(), "/");
    }

    proptest! {
        #[test]
        fn prop_relative_always_starts_with_slash(
            segment in "[a-z]{1,8}",
            value in "[0-9]{1,4}",
        ) {
            let pattern = format!("/{segment}/{{id}}");
            let router = MemoryRouter::new("https://example.test").route("r", pattern);
            let path = relative(&router, "r", &[("id", &value)]).unwrap();
            prop_assert!(path.starts_with('/'));
            prop_assert_eq!(path, format!("/{}/{}", segment, value));
        }

        #[test]
        fn prop_routepath_equals_direct_binding(value in "[a-zA-Z0-9]{1,8}") {
            let router = MemoryRouter::new("http://localhost")
                .route("a.b.show", "/a/b/{id}");
            let via_path = routepath(&router, &format!("a.b.show/{value}")).unwrap();
            let direct = router.url("a.b.show", &[("id", &value)]).unwrap();
            prop_assert_eq!(via_path, direct);
        }
    }
}
