//! HTTP server setup and the proxy request handler.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all proxy handler
//! - Wire up middleware (request ID, tracing)
//! - Serve over TLS (axum-server + rustls) or plain HTTP
//! - Run each request through the proxy pipeline:
//!   preflight → method check → route lookup → rewrite → forward → CORS
//!
//! # Design Decisions
//! - Every exit path ends in `ProxiedResponse::into_response`, so CORS
//!   headers are attached exactly once, errors included
//! - Errors never escape the handler; each becomes a response

use axum::{
    body::Body,
    extract::State,
    http::{header::CONTENT_LENGTH, HeaderMap, Request},
    response::Response,
    routing::any,
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::error::ProxyError;
use crate::http::client::BackendClient;
use crate::http::request::{ForwardMethod, UuidRequestId, X_REQUEST_ID};
use crate::http::response::ProxiedResponse;
use crate::net::tls::load_listener_tls;
use crate::observability::metrics::{self, NO_ROUTE};
use crate::resilience::Timeouts;
use crate::routing::rewrite;
use crate::routing::{Route, RouteError, RouteTable};
use crate::security::cors::{self, CorsHeaders};
use crate::security::headers::filter_request_headers;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
    pub client: BackendClient,
    pub max_body_size: usize,
}

/// HTTP server for the reverse proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, RouteError> {
        let routes = Arc::new(RouteTable::from_config(&config.routes)?);
        let client = BackendClient::new(Timeouts::from(&config.timeouts));

        tracing::info!(
            routes = routes.len(),
            connect_timeout = ?client.timeouts().connect,
            read_timeout = ?client.timeouts().read,
            write_timeout = ?client.timeouts().write,
            "Route table compiled"
        );
        for route in routes.routes() {
            tracing::debug!(
                prefix = %route.prefix(),
                kind = %route.match_kind(),
                backend = %route.backend(),
                strip_prefix = route.strip_prefix(),
                "Route"
            );
        }

        let state = AppState {
            routes,
            client,
            max_body_size: config.limits.max_body_size,
        };

        let router = Self::build_router(state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(X_REQUEST_ID, UuidRequestId))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::new(X_REQUEST_ID)),
            )
    }

    /// The fully layered router, for embedding or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Run the server on `listener` until `shutdown` fires.
    ///
    /// TLS is terminated here when `[listener.tls]` is configured.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        let app = self.router.into_make_service();

        match &self.config.listener.tls {
            Some(tls) => {
                let rustls = load_listener_tls(tls).await?;
                let handle = axum_server::Handle::new();
                let grace = Duration::from_secs(self.config.listener.shutdown_grace_secs);

                let shutdown_handle = handle.clone();
                tokio::spawn(async move {
                    let _ = shutdown.recv().await;
                    tracing::info!(grace = ?grace, "Draining connections");
                    shutdown_handle.graceful_shutdown(Some(grace));
                });

                tracing::info!(address = %addr, "HTTPS server starting");
                axum_server::from_tcp_rustls(listener.into_std()?, rustls)
                    .handle(handle)
                    .serve(app)
                    .await?;
            }
            None => {
                tracing::warn!(address = %addr, "No TLS configured, serving plain HTTP");
                axum::serve(listener, app)
                    .with_graceful_shutdown(async move {
                        let _ = shutdown.recv().await;
                        tracing::info!("Draining connections");
                    })
                    .await?;
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main proxy handler.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let cors = CorsHeaders::for_request(request.headers());

    if cors::is_preflight(&method) {
        tracing::debug!(path = %path, origin = ?cors.allow_origin(), "Answering preflight");
        metrics::record_request(&method, 204, NO_ROUTE, started);
        return ProxiedResponse::preflight().into_response(&cors);
    }

    let mut route_label = NO_ROUTE;
    let proxied = match dispatch(&state, request, &mut route_label).await {
        Ok(proxied) => proxied,
        Err(error) => {
            match &error {
                ProxyError::Transport(e) => tracing::warn!(
                    method = %method,
                    path = %path,
                    route = route_label,
                    timeout = e.is_timeout(),
                    error = %e,
                    "Backend request failed"
                ),
                other => tracing::debug!(method = %method, path = %path, error = %other, "Request rejected"),
            }
            ProxiedResponse::from_error(&error)
        }
    };

    let status = proxied.status();
    metrics::record_request(&method, status.as_u16(), route_label, started);
    tracing::info!(
        method = %method,
        path = %path,
        status = status.as_u16(),
        route = route_label,
        elapsed = ?started.elapsed(),
        "Request completed"
    );

    proxied.into_response(&cors)
}

/// Method check, route lookup and forwarding.
async fn dispatch<'a>(
    state: &'a AppState,
    request: Request<Body>,
    route_label: &mut &'a str,
) -> Result<ProxiedResponse, ProxyError> {
    let method = ForwardMethod::try_from(request.method())?;
    let path = request.uri().path();
    let route = state
        .routes
        .match_path(path)
        .ok_or_else(|| ProxyError::RouteNotFound {
            path: path.to_string(),
        })?;
    *route_label = route.prefix();

    forward(state, method, route, request).await
}

async fn forward(
    state: &AppState,
    method: ForwardMethod,
    route: &Route,
    request: Request<Body>,
) -> Result<ProxiedResponse, ProxyError> {
    let (parts, body) = request.into_parts();
    let url = rewrite::backend_url(&parts.uri, route);
    let headers = filter_request_headers(&parts.headers);

    if let Some(size) = declared_length(&parts.headers) {
        if size > state.max_body_size as u64 {
            return Err(ProxyError::PayloadTooLarge {
                size,
                max: state.max_body_size,
            });
        }
    }
    let body = axum::body::to_bytes(body, state.max_body_size)
        .await
        .map_err(|e| ProxyError::RequestBody(e.to_string()))?;

    tracing::debug!(method = %method, backend_url = %url, body_len = body.len(), "Forwarding request");

    let response = state.client.forward(method, &url, headers, body).await?;
    Ok(ProxiedResponse::from_backend(response))
}

fn declared_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}
