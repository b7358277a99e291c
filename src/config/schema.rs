//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::routing::matcher::MatchKind;

/// Root configuration for the reverse proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Ordered route table. Declaration order is match order.
    pub routes: Vec<RouteConfig>,

    /// Backend timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:443").
    pub bind_address: String,

    /// TLS configuration. Plain HTTP is served when absent.
    pub tls: Option<TlsConfig>,

    /// Time allowed for in-flight requests to finish on shutdown.
    pub shutdown_grace_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:443".to_string(),
            tls: None,
            shutdown_grace_secs: 10,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// One entry of the route table.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Path prefix, or exact path when `match = "exact"`.
    pub prefix: String,

    /// How `prefix` is compared against the request path.
    #[serde(rename = "match", default)]
    pub match_kind: MatchKind,

    /// Backend base URL. `http://` is assumed when the scheme is missing.
    pub backend: String,

    /// Remove the matched prefix before forwarding.
    #[serde(default)]
    pub strip_prefix: bool,
}

impl RouteConfig {
    /// Prefix route shorthand.
    pub fn prefix(prefix: impl Into<String>, backend: impl Into<String>, strip_prefix: bool) -> Self {
        Self {
            prefix: prefix.into(),
            match_kind: MatchKind::Prefix,
            backend: backend.into(),
            strip_prefix,
        }
    }

    /// Exact route shorthand.
    pub fn exact(path: impl Into<String>, backend: impl Into<String>) -> Self {
        Self {
            prefix: path.into(),
            match_kind: MatchKind::Exact,
            backend: backend.into(),
            strip_prefix: false,
        }
    }
}

/// Timeout configuration for backend calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout (DNS + TCP) in seconds.
    pub connect_secs: u64,

    /// Maximum stall of a single backend read in seconds.
    pub read_secs: u64,

    /// Maximum stall of a single backend write in seconds.
    pub write_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 10,
            read_secs: 30,
            write_secs: 30,
        }
    }
}

impl TimeoutConfig {
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }

    pub fn read(&self) -> Duration {
        Duration::from_secs(self.read_secs)
    }

    pub fn write(&self) -> Duration {
        Duration::from_secs(self.write_secs)
    }
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum buffered request body in bytes.
    pub max_body_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_size: 10 * 1024 * 1024, // 10MB
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub log_level: String,

    /// Log line format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_route_table() {
        let raw = r#"
            [listener]
            bind_address = "127.0.0.1:8443"

            [timeouts]
            read_secs = 5

            [[routes]]
            prefix = "/0x"
            match = "prefix"
            backend = "http://127.0.0.1:8080"
            strip_prefix = false

            [[routes]]
            prefix = "/subnames"
            backend = "127.0.0.1:4350/graphql"
            strip_prefix = true

            [[routes]]
            prefix = "/graphql"
            match = "exact"
            backend = "http://127.0.0.1:4350"
        "#;

        let config: ProxyConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:8443");
        assert!(config.listener.tls.is_none());
        assert_eq!(config.timeouts.read(), Duration::from_secs(5));
        assert_eq!(config.timeouts.connect(), Duration::from_secs(10));
        assert_eq!(config.routes.len(), 3);
        assert_eq!(config.routes[1].match_kind, MatchKind::Prefix);
        assert!(config.routes[1].strip_prefix);
        assert_eq!(config.routes[2].match_kind, MatchKind::Exact);
        assert!(!config.routes[2].strip_prefix);
    }

    #[test]
    fn test_defaults() {
        let config = ProxyConfig::default();
        assert_eq!(config.timeouts.write_secs, 30);
        assert_eq!(config.observability.log_format, LogFormat::Pretty);
        assert!(config.routes.is_empty());
    }
}
