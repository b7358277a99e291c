//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define proxy metrics (requests, latency)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `proxy_requests_total` (counter): total requests by method, status, route
//! - `proxy_request_duration_seconds` (histogram): latency by method, route
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Labels for route prefix, method, status code

use axum::http::Method;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Route label for requests answered before or without a route match.
pub const NO_ROUTE: &str = "none";

/// Install the Prometheus exporter with an HTTP listener on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Bounded label for `method`: extension methods collapse into `other`.
pub fn method_label(method: &Method) -> &'static str {
    match method.as_str() {
        "GET" => "GET",
        "POST" => "POST",
        "PUT" => "PUT",
        "DELETE" => "DELETE",
        "HEAD" => "HEAD",
        "OPTIONS" => "OPTIONS",
        _ => "other",
    }
}

/// Record one completed request.
pub fn record_request(method: &Method, status: u16, route: &str, started: Instant) {
    let method = method_label(method);
    metrics::counter!(
        "proxy_requests_total",
        "method" => method,
        "status" => status.to_string(),
        "route" => route.to_string()
    )
    .increment(1);

    metrics::histogram!(
        "proxy_request_duration_seconds",
        "method" => method,
        "route" => route.to_string()
    )
    .record(started.elapsed().as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_label_is_bounded() {
        assert_eq!(method_label(&Method::GET), "GET");
        assert_eq!(method_label(&Method::OPTIONS), "OPTIONS");
        assert_eq!(method_label(&Method::PATCH), "other");
        assert_eq!(method_label(&Method::from_bytes(b"PURGE").unwrap()), "other");
        assert_eq!(method_label(&Method::from_bytes(b"get").unwrap()), "other");
    }

    #[test]
    fn test_record_without_exporter_is_noop() {
        let method = Method::from_bytes(b"FOO").unwrap();
        record_request(&method, 501, NO_ROUTE, Instant::now());
    }
}
