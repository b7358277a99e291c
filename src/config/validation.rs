//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check route table invariants (unique prefix/match pairs, usable backends)
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::routing::matcher::MatchKind;
use crate::routing::router::BackendUrl;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no routes configured")]
    NoRoutes,

    #[error("route #{index}: prefix {prefix:?} must be non-empty and start with '/'")]
    InvalidPrefix { index: usize, prefix: String },

    #[error("route #{index}: duplicate {kind} route for {prefix:?}")]
    DuplicateRoute {
        index: usize,
        prefix: String,
        kind: MatchKind,
    },

    #[error("route #{index}: {reason}")]
    InvalidBackend { index: usize, reason: String },

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("{field} {value:?} is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("listener.tls.{0} must not be empty")]
    EmptyTlsPath(&'static str),
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.routes.is_empty() {
        errors.push(ValidationError::NoRoutes);
    }

    let mut seen = HashSet::new();
    for (index, route) in config.routes.iter().enumerate() {
        if !route.prefix.starts_with('/') {
            errors.push(ValidationError::InvalidPrefix {
                index,
                prefix: route.prefix.clone(),
            });
        }
        if !seen.insert((route.prefix.as_str(), route.match_kind)) {
            errors.push(ValidationError::DuplicateRoute {
                index,
                prefix: route.prefix.clone(),
                kind: route.match_kind,
            });
        }
        if let Err(e) = BackendUrl::parse(&route.backend) {
            errors.push(ValidationError::InvalidBackend {
                index,
                reason: e.to_string(),
            });
        }
    }

    let timeouts = &config.timeouts;
    for (name, secs) in [
        ("connect_secs", timeouts.connect_secs),
        ("read_secs", timeouts.read_secs),
        ("write_secs", timeouts.write_secs),
    ] {
        if secs == 0 {
            errors.push(ValidationError::ZeroTimeout(name));
        }
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if let Some(tls) = &config.listener.tls {
        if tls.cert_path.trim().is_empty() {
            errors.push(ValidationError::EmptyTlsPath("cert_path"));
        }
        if tls.key_path.trim().is_empty() {
            errors.push(ValidationError::EmptyTlsPath("key_path"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
