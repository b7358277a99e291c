//! Header forwarding policy.
//!
//! # Responsibilities
//! - Drop the inbound `Host` header before forwarding (the client sets the backend's own)
//! - Drop backend `access-control-*` headers so the proxy's CORS headers are authoritative
//! - Drop backend hop-by-hop headers; the relayed body is buffered and re-framed
//!
//! # Design Decisions
//! - Everything else passes through untouched, including repeated headers
//! - Value order within a repeated header is preserved

use axum::http::header::{HeaderMap, CONNECTION, HOST};
use axum::http::HeaderName;

const CORS_HEADER_PREFIX: &str = "access-control-";

/// Connection-scoped headers that never survive a hop.
fn is_hop_by_hop(name: &HeaderName) -> bool {
    matches!(
        name.as_str(),
        "connection"
            | "keep-alive"
            | "proxy-connection"
            | "proxy-authenticate"
            | "te"
            | "trailer"
            | "transfer-encoding"
            | "upgrade"
    )
}

/// Header names listed as connection options in `Connection`.
fn connection_options(headers: &HeaderMap) -> Vec<HeaderName> {
    headers
        .get_all(CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|token| token.trim().parse::<HeaderName>().ok())
        .collect()
}

/// Copy every header for which `keep` returns true, preserving value order.
fn copy_headers(headers: &HeaderMap, keep: impl Fn(&HeaderName) -> bool) -> HeaderMap {
    let mut filtered = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if keep(name) {
            filtered.append(name.clone(), value.clone());
        }
    }
    filtered
}

/// Headers to send to the backend.
pub fn filter_request_headers(headers: &HeaderMap) -> HeaderMap {
    copy_headers(headers, |name| name != HOST)
}

/// Backend headers to relay to the caller.
///
/// `Content-Length` is kept: it matches the buffered body, or describes the
/// resource for `HEAD`.
pub fn filter_response_headers(headers: &HeaderMap) -> HeaderMap {
    let options = connection_options(headers);
    // Header names are stored lower-cased.
    copy_headers(headers, |name| {
        !name.as_str().starts_with(CORS_HEADER_PREFIX)
            && !is_hop_by_hop(name)
            && !options.contains(name)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_request_drops_only_host() {
        let mut headers = HeaderMap::new();
        headers.insert("Host", HeaderValue::from_static("proxy.example.com"));
        headers.insert("Authorization", HeaderValue::from_static("Bearer t"));
        headers.append("Accept", HeaderValue::from_static("text/html"));
        headers.append("Accept", HeaderValue::from_static("application/json"));

        let filtered = filter_request_headers(&headers);
        assert!(filtered.get(HOST).is_none());
        assert_eq!(filtered.get("authorization").unwrap(), "Bearer t");
        let accept: Vec<_> = filtered.get_all("accept").iter().collect();
        assert_eq!(accept, vec!["text/html", "application/json"]);
        assert_eq!(filtered.len(), 3);
    }

    #[test]
    fn test_response_drops_cors_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("Access-Control-Allow-Origin", HeaderValue::from_static("https://evil.example"));
        headers.insert("ACCESS-CONTROL-MAX-AGE", HeaderValue::from_static("1"));
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        headers.append("Set-Cookie", HeaderValue::from_static("a=1"));
        headers.append("Set-Cookie", HeaderValue::from_static("b=2"));

        let filtered = filter_response_headers(&headers);
        assert!(filtered.keys().all(|k| !k.as_str().starts_with("access-control-")));
        assert_eq!(filtered.get("content-type").unwrap(), "application/json");
        assert_eq!(filtered.get_all("set-cookie").iter().count(), 2);
    }

    #[test]
    fn test_response_drops_framing_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("Transfer-Encoding", HeaderValue::from_static("chunked"));
        headers.insert("Connection", HeaderValue::from_static("keep-alive, X-Session-Hint"));
        headers.insert("Keep-Alive", HeaderValue::from_static("timeout=5"));
        headers.insert("X-Session-Hint", HeaderValue::from_static("abc"));
        headers.insert("Content-Length", HeaderValue::from_static("11"));
        headers.insert("Content-Type", HeaderValue::from_static("text/plain"));

        let filtered = filter_response_headers(&headers);
        assert!(filtered.get("transfer-encoding").is_none());
        assert!(filtered.get(CONNECTION).is_none());
        assert!(filtered.get("keep-alive").is_none());
        assert!(filtered.get("x-session-hint").is_none());
        assert_eq!(filtered.get("content-length").unwrap(), "11");
        assert_eq!(filtered.get("content-type").unwrap(), "text/plain");
    }
}
