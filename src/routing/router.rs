//! Route lookup.
//!
//! # Responsibilities
//! - Store compiled routes in declaration order
//! - Look up the matching route for a request path
//! - Return matched route or explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) scan in declaration order; the first match wins
//! - Exact routes get no implicit priority over prefix routes
//! - Explicit NoMatch rather than silent default

use std::collections::HashSet;
use thiserror::Error;
use url::Url;

use crate::config::RouteConfig;
use crate::routing::matcher::{MatchKind, PathMatcher};

/// Error building a route table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("route prefix must not be empty")]
    EmptyPrefix,

    #[error("duplicate {kind} route for {prefix:?}")]
    DuplicateRoute { prefix: String, kind: MatchKind },

    #[error("invalid backend url {url:?}: {reason}")]
    InvalidBackend { url: String, reason: String },
}

/// Normalized backend base URL: `http://host[:port][/base/path]`, no trailing slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendUrl {
    base: String,
    authority: String,
}

impl BackendUrl {
    /// Parse a configured backend, assuming `http://` when no scheme is given.
    pub fn parse(raw: &str) -> Result<Self, RouteError> {
        let invalid = |reason: String| RouteError::InvalidBackend {
            url: raw.to_string(),
            reason,
        };

        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(invalid("url is empty".into()));
        }

        let normalized = if trimmed.contains("://") {
            trimmed.to_string()
        } else {
            format!("http://{trimmed}")
        };
        let url = Url::parse(&normalized).map_err(|e| invalid(e.to_string()))?;

        if url.scheme() != "http" {
            return Err(invalid(format!(
                "scheme {:?} is not supported, backends are reached over plain http",
                url.scheme()
            )));
        }
        let host = url
            .host_str()
            .ok_or_else(|| invalid("url has no host".into()))?;
        if url.query().is_some() || url.fragment().is_some() {
            return Err(invalid("url must not carry a query or fragment".into()));
        }
        if !url.username().is_empty() || url.password().is_some() {
            return Err(invalid("url must not carry credentials".into()));
        }

        let authority = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        let base_path = url.path().trim_end_matches('/');

        Ok(Self {
            base: format!("http://{authority}{base_path}"),
            authority,
        })
    }

    /// Base URL without trailing slash.
    pub fn as_str(&self) -> &str {
        &self.base
    }

    /// `host[:port]` as it should appear in the backend's `Host` header.
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Append a forwarded path (and query) with exactly one joining slash.
    pub fn join(&self, path_and_query: &str) -> String {
        if path_and_query.starts_with('/') {
            format!("{}{}", self.base, path_and_query)
        } else {
            format!("{}/{}", self.base, path_and_query)
        }
    }
}

impl std::fmt::Display for BackendUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.base)
    }
}

/// A compiled route.
#[derive(Debug, Clone)]
pub struct Route {
    matcher: PathMatcher,
    backend: BackendUrl,
    strip_prefix: bool,
}

impl Route {
    pub fn new(
        prefix: impl Into<String>,
        kind: MatchKind,
        backend: BackendUrl,
        strip_prefix: bool,
    ) -> Result<Self, RouteError> {
        let prefix = prefix.into();
        if prefix.is_empty() {
            return Err(RouteError::EmptyPrefix);
        }
        Ok(Self {
            matcher: PathMatcher::new(prefix, kind),
            backend,
            strip_prefix,
        })
    }

    /// Compile a configured route.
    pub fn from_config(config: &RouteConfig) -> Result<Self, RouteError> {
        let backend = BackendUrl::parse(&config.backend)?;
        Self::new(
            config.prefix.clone(),
            config.match_kind,
            backend,
            config.strip_prefix,
        )
    }

    pub fn matches(&self, path: &str) -> bool {
        self.matcher.matches(path)
    }

    pub fn prefix(&self) -> &str {
        self.matcher.pattern()
    }

    pub fn match_kind(&self) -> MatchKind {
        self.matcher.kind()
    }

    pub fn backend(&self) -> &BackendUrl {
        &self.backend
    }

    pub fn strip_prefix(&self) -> bool {
        self.strip_prefix
    }
}

/// Ordered, immutable route table.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// Build a table, rejecting duplicate `(prefix, kind)` pairs.
    pub fn new(routes: Vec<Route>) -> Result<Self, RouteError> {
        let mut seen = HashSet::new();
        for route in &routes {
            if !seen.insert((route.prefix(), route.match_kind())) {
                return Err(RouteError::DuplicateRoute {
                    prefix: route.prefix().to_string(),
                    kind: route.match_kind(),
                });
            }
        }
        Ok(Self { routes })
    }

    /// Compile the configured routes, preserving declaration order.
    pub fn from_config(configs: &[RouteConfig]) -> Result<Self, RouteError> {
        let routes = configs
            .iter()
            .map(Route::from_config)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(routes)
    }

    /// Find the first route, in declaration order, that matches `path`.
    pub fn match_path(&self, path: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.matches(path))
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
