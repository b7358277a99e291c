//! CORS response policy.
//!
//! Every response leaving the proxy carries the same CORS header set, and
//! `OPTIONS` requests are answered locally without touching a backend.

use axum::http::header::{
    HeaderMap, HeaderValue, ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
    ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE, ORIGIN,
    VARY,
};
use axum::http::Method;

pub const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS, HEAD";
pub const ALLOW_HEADERS: &str = "Content-Type, Authorization, X-Requested-With";
pub const MAX_AGE_SECS: &str = "3600";

/// True for CORS preflight requests.
pub fn is_preflight(method: &Method) -> bool {
    method == Method::OPTIONS
}

/// CORS headers computed for one inbound request.
#[derive(Debug, Clone)]
pub struct CorsHeaders {
    allow_origin: HeaderValue,
}

impl CorsHeaders {
    /// Echo the request's `Origin`, or allow any origin when it has none.
    pub fn for_request(headers: &HeaderMap) -> Self {
        let allow_origin = headers
            .get(ORIGIN)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static("*"));
        Self { allow_origin }
    }

    pub fn allow_origin(&self) -> &HeaderValue {
        &self.allow_origin
    }

    /// Write the CORS header set into `headers`.
    ///
    /// `Access-Control-*` values replace existing ones; `Origin` is appended
    /// to `Vary` so backend `Vary` values survive.
    pub fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, self.allow_origin.clone());
        headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOW_METHODS));
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOW_HEADERS));
        headers.insert(ACCESS_CONTROL_ALLOW_CREDENTIALS, HeaderValue::from_static("true"));
        headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static(MAX_AGE_SECS));

        let has_origin = headers
            .get_all(VARY)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(','))
            .any(|v| v.trim().eq_ignore_ascii_case("origin"));
        if !has_origin {
            headers.append(VARY, HeaderValue::from_static("Origin"));
        }
    }
}
