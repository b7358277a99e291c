//! Response assembly.
//!
//! # Responsibilities
//! - Build the proxied response from a backend response, an error, or a preflight
//! - Strip backend CORS headers and attach the proxy's own
//! - Map request errors to their status codes
//!
//! # Design Decisions
//! - The response is a plain value until `into_response`, which consumes it;
//!   every exit path goes through the same finalization
//! - Bodies are buffered; no streaming

use axum::body::{Body, Bytes};
use axum::http::header::{HeaderMap, HeaderValue, CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::Response;

use crate::error::ProxyError;
use crate::http::client::BackendResponse;
use crate::security::cors::CorsHeaders;
use crate::security::headers::filter_response_headers;

/// Response under construction for one inbound request.
#[derive(Debug)]
pub struct ProxiedResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl ProxiedResponse {
    /// Local answer to a CORS preflight.
    pub fn preflight() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("0"));
        Self {
            status: StatusCode::NO_CONTENT,
            headers,
            body: Bytes::new(),
        }
    }

    /// Relay a backend response, minus its CORS and hop-by-hop headers.
    pub fn from_backend(response: BackendResponse) -> Self {
        Self {
            status: response.status,
            headers: filter_response_headers(&response.headers),
            body: response.body,
        }
    }

    /// Plain-text error response.
    pub fn from_error(error: &ProxyError) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        Self {
            status: error.status_code(),
            headers,
            body: Bytes::from(error.body()),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Attach CORS headers and produce the final response.
    pub fn into_response(self, cors: &CorsHeaders) -> Response {
        let Self {
            status,
            mut headers,
            body,
        } = self;
        cors.apply(&mut headers);

        let mut response = Response::new(Body::from(body));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response
    }
}
