//! Path rewriting for the matched route.

use axum::http::Uri;

use crate::routing::router::Route;

/// Path to forward for `path` under `route`.
///
/// With `strip_prefix` the leading matched prefix is removed; an empty
/// remainder becomes `/`.
pub fn forwarded_path<'a>(path: &'a str, route: &Route) -> &'a str {
    if !route.strip_prefix() {
        return path;
    }
    match path.strip_prefix(route.prefix()) {
        Some("") => "/",
        Some(rest) => rest,
        None => path,
    }
}

/// Forwarded path with the inbound query string re-attached.
pub fn forwarded_path_and_query(uri: &Uri, route: &Route) -> String {
    let path = forwarded_path(uri.path(), route);
    match uri.query() {
        Some(query) => format!("{path}?{query}"),
        None => path.to_string(),
    }
}

/// Absolute backend URL for an inbound request URI.
pub fn backend_url(uri: &Uri, route: &Route) -> String {
    route.backend().join(&forwarded_path_and_query(uri, route))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::matcher::MatchKind;
    use crate::routing::router::BackendUrl;

    fn route(prefix: &str, backend: &str, strip_prefix: bool) -> Route {
        Route::new(prefix, MatchKind::Prefix, BackendUrl::parse(backend).unwrap(), strip_prefix).unwrap()
    }

    #[test]
    fn test_no_strip_keeps_path() {
        let r = route("/0x", "http://127.0.0.1:8080", false);
        assert_eq!(forwarded_path("/0xdeadbeef", &r), "/0xdeadbeef");
    }

    #[test]
    fn test_strip_prefix() {
        let r = route("/api", "http://localhost:9000", true);
        assert_eq!(forwarded_path("/api/users", &r), "/users");
        assert_eq!(forwarded_path("/api", &r), "/");
        // Only the leading occurrence is removed.
        assert_eq!(forwarded_path("/api/api", &r), "/api");
    }

    #[test]
    fn test_query_preserved() {
        let r = route("/api", "http://localhost:9000", true);
        let uri: Uri = "/api/users?id=1".parse().unwrap();
        assert_eq!(forwarded_path_and_query(&uri, &r), "/users?id=1");
        assert_eq!(backend_url(&uri, &r), "http://localhost:9000/users?id=1");
    }

    #[test]
    fn test_base_path_concatenation() {
        let r = route("/subnames", "http://127.0.0.1:4350/graphql", true);
        let uri: Uri = "/subnames".parse().unwrap();
        assert_eq!(backend_url(&uri, &r), "http://127.0.0.1:4350/graphql/");

        let uri: Uri = "/subnames/alice".parse().unwrap();
        assert_eq!(backend_url(&uri, &r), "http://127.0.0.1:4350/graphql/alice");
    }

    #[test]
    fn test_missing_leading_slash_is_joined() {
        let r = route("/api", "localhost:9000", true);
        let uri: Uri = "/apiusers".parse().unwrap();
        assert_eq!(backend_url(&uri, &r), "http://localhost:9000/users");
    }
}
