//! Request-level error taxonomy.
//!
//! Every variant is recovered at the handler boundary and turned into a
//! well-formed response; nothing here escapes a single request.

use axum::http::{Method, StatusCode};
use thiserror::Error;

use crate::http::client::TransportError;

/// Failure of one proxied request.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// No route table entry matched the request path.
    #[error("no route matches {path}")]
    RouteNotFound { path: String },

    /// The method is outside the forwardable set.
    #[error("method {0} is not supported")]
    UnsupportedMethod(Method),

    /// Declared request body exceeds the configured limit.
    #[error("request body of {size} bytes exceeds the {max} byte limit")]
    PayloadTooLarge { size: u64, max: usize },

    /// The inbound request body could not be read.
    #[error("failed to read request body: {0}")]
    RequestBody(String),

    /// The backend exchange failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ProxyError {
    /// Status code presented to the caller.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            Self::UnsupportedMethod(_) => StatusCode::NOT_IMPLEMENTED,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::RequestBody(_) => StatusCode::BAD_REQUEST,
            Self::Transport(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Response body presented to the caller.
    ///
    /// A missing route answers with the bare reason phrase; the other
    /// variants carry their description so operators can see what failed.
    pub fn body(&self) -> String {
        match self {
            Self::RouteNotFound { .. } => "Not Found".to_string(),
            Self::UnsupportedMethod(_) => format!("Not Implemented: {self}"),
            Self::PayloadTooLarge { .. } => format!("Payload Too Large: {self}"),
            Self::RequestBody(_) => format!("Bad Request: {self}"),
            Self::Transport(_) => format!("Bad Gateway: {self}"),
        }
    }
}
