//! Backend HTTP client.
//!
//! # Responsibilities
//! - Open one HTTP/1.1 connection per forwarded request
//! - Enforce connect, read and write timeouts
//! - Buffer the backend response and hand it back unmodified
//! - Classify every failure as a [`TransportError`]
//!
//! # Design Decisions
//! - No pooling: each request is independent and never sees another's state
//! - The connection is driven inside the caller's future, so dropping the
//!   inbound request tears the backend exchange down with it
//! - Exactly one attempt; retries belong to callers

use axum::body::{Body, Bytes};
use axum::http::header::HOST;
use axum::http::{HeaderMap, HeaderValue, Request, StatusCode, Uri, Version};
use hyper_util::rt::TokioIo;
use std::error::Error as StdError;
use std::io;
use std::time::Duration;
use thiserror::Error;

use crate::http::request::ForwardMethod;
use crate::resilience::timeouts::{connect_with_timeout, ConnectError, TimedIo, Timeouts};

/// Failure to complete a backend exchange.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid backend url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("connection to {addr} timed out after {timeout:?}")]
    ConnectTimeout { addr: String, timeout: Duration },

    #[error("backend exchange timed out: {0}")]
    Timeout(String),

    #[error("backend exchange failed: {0}")]
    Exchange(String),
}

impl TransportError {
    /// True for any of the three timeout bounds.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::ConnectTimeout { .. } | Self::Timeout(_))
    }

    /// Flatten an error chain into one message, classifying timeouts.
    fn from_exchange_error(err: &(dyn StdError + 'static)) -> Self {
        let mut message = String::new();
        let mut timed_out = false;
        let mut current = Some(err);

        while let Some(cause) = current {
            if let Some(io_err) = cause.downcast_ref::<io::Error>() {
                timed_out |= io_err.kind() == io::ErrorKind::TimedOut;
            }
            let text = cause.to_string();
            if !message.contains(&text) {
                if !message.is_empty() {
                    message.push_str(": ");
                }
                message.push_str(&text);
            }
            current = cause.source();
        }

        if timed_out {
            Self::Timeout(message)
        } else {
            Self::Exchange(message)
        }
    }
}

/// Backend response, body fully buffered.
#[derive(Debug)]
pub struct BackendResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Plain-HTTP client for backend services.
#[derive(Debug, Clone, Default)]
pub struct BackendClient {
    timeouts: Timeouts,
}

impl BackendClient {
    pub fn new(timeouts: Timeouts) -> Self {
        Self { timeouts }
    }

    pub fn timeouts(&self) -> &Timeouts {
        &self.timeouts
    }

    /// Send one request to the absolute `url` and buffer the response.
    ///
    /// `headers` are sent as given, except that `Host` is set to the URL's
    /// authority.
    pub async fn forward(
        &self,
        method: ForwardMethod,
        url: &str,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<BackendResponse, TransportError> {
        let invalid = |reason: String| TransportError::InvalidUrl {
            url: url.to_string(),
            reason,
        };

        let uri: Uri = url.parse().map_err(|e: axum::http::uri::InvalidUri| invalid(e.to_string()))?;
        if uri.scheme_str() != Some("http") {
            return Err(invalid("only plain http backends are supported".into()));
        }
        let authority = uri
            .authority()
            .ok_or_else(|| invalid("url has no host".into()))?
            .clone();
        let host = authority.host().trim_start_matches('[').trim_end_matches(']');
        let port = authority.port_u16().unwrap_or(80);
        let path_and_query = uri.path_and_query().map_or("/", |pq| pq.as_str());

        let host_header =
            HeaderValue::from_str(authority.as_str()).map_err(|e| invalid(e.to_string()))?;
        let mut request = Request::builder()
            .method(method.as_method())
            .uri(path_and_query)
            .version(Version::HTTP_11)
            .body(Body::from(body))
            .map_err(|e| invalid(e.to_string()))?;
        *request.headers_mut() = headers;
        request.headers_mut().insert(HOST, host_header);

        let addr = authority.to_string();
        let stream = connect_with_timeout(host, port, self.timeouts.connect)
            .await
            .map_err(|e| match e {
                ConnectError::Io(source) => TransportError::Connect {
                    addr: addr.clone(),
                    source,
                },
                ConnectError::TimedOut(timeout) => TransportError::ConnectTimeout {
                    addr: addr.clone(),
                    timeout,
                },
            })?;

        tracing::trace!(backend = %addr, method = %method, path = %path_and_query, "Connected to backend");

        let io = TokioIo::new(TimedIo::new(stream, self.timeouts.read, self.timeouts.write));
        let (mut sender, connection) = hyper::client::conn::http1::handshake::<_, Body>(io)
            .await
            .map_err(|e| TransportError::from_exchange_error(&e))?;

        let exchange = async move {
            let response = sender
                .send_request(request)
                .await
                .map_err(|e| TransportError::from_exchange_error(&e))?;
            let (parts, body) = response.into_parts();
            let body = axum::body::to_bytes(Body::new(body), usize::MAX)
                .await
                .map_err(|e| TransportError::from_exchange_error(&e))?;
            Ok::<_, TransportError>(BackendResponse {
                status: parts.status,
                headers: parts.headers,
                body,
            })
        };

        tokio::pin!(connection);
        tokio::pin!(exchange);

        tokio::select! {
            result = &mut exchange => result,
            driven = &mut connection => match driven {
                // Connection closed cleanly; the exchange has everything it needs.
                Ok(()) => exchange.await,
                Err(e) => Err(TransportError::from_exchange_error(&e)),
            },
        }
    }
}
