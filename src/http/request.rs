//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4) when the caller sent none
//! - Restrict forwarding to the closed set of supported methods
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Unsupported methods are a typed error, never a backend call

use axum::http::{HeaderName, Method, Request};
use std::fmt;
use tower_http::request_id::{MakeRequestId, RequestId};

use crate::error::ProxyError;

/// Header carrying the request correlation ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        uuid::Uuid::new_v4()
            .to_string()
            .parse()
            .ok()
            .map(RequestId::new)
    }
}

/// Methods the proxy forwards to backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardMethod {
    Get,
    Post,
    Put,
    Delete,
    Head,
}

impl ForwardMethod {
    pub fn as_method(self) -> Method {
        match self {
            ForwardMethod::Get => Method::GET,
            ForwardMethod::Post => Method::POST,
            ForwardMethod::Put => Method::PUT,
            ForwardMethod::Delete => Method::DELETE,
            ForwardMethod::Head => Method::HEAD,
        }
    }
}

impl TryFrom<&Method> for ForwardMethod {
    type Error = ProxyError;

    fn try_from(method: &Method) -> Result<Self, Self::Error> {
        match method.as_str() {
            "GET" => Ok(ForwardMethod::Get),
            "POST" => Ok(ForwardMethod::Post),
            "PUT" => Ok(ForwardMethod::Put),
            "DELETE" => Ok(ForwardMethod::Delete),
            "HEAD" => Ok(ForwardMethod::Head),
            _ => Err(ProxyError::UnsupportedMethod(method.clone())),
        }
    }
}

impl fmt::Display for ForwardMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_method().as_str())
    }
}
