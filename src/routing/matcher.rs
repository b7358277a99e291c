//! Path matching logic.
//!
//! # Responsibilities
//! - Match a request path against a configured prefix or exact path
//!
//! # Design Decisions
//! - Path matching is case-sensitive and byte-wise
//! - Only the path is matched; the query string never participates
//! - No regex to guarantee O(n) matching

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a route's pattern is compared with the request path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    /// Path starts with the pattern.
    #[default]
    Prefix,
    /// Path equals the pattern.
    Exact,
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchKind::Prefix => f.write_str("prefix"),
            MatchKind::Exact => f.write_str("exact"),
        }
    }
}

/// Matches a request path against one pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMatcher {
    pattern: String,
    kind: MatchKind,
}

impl PathMatcher {
    pub fn new(pattern: impl Into<String>, kind: MatchKind) -> Self {
        Self {
            pattern: pattern.into(),
            kind,
        }
    }

    /// Returns true if `path` satisfies this matcher.
    pub fn matches(&self, path: &str) -> bool {
        match self.kind {
            MatchKind::Exact => path == self.pattern,
            MatchKind::Prefix => path.starts_with(&self.pattern),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn kind(&self) -> MatchKind {
        self.kind
    }
}
