//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TLS/TCP connection
//!     → server.rs (Axum setup, request ID, proxy handler)
//!     → request.rs (method check, request ID generation)
//!     → [routing layer picks route and rewrites the URL]
//!     → client.rs (one bounded exchange with the backend)
//!     → response.rs (filter backend headers, attach CORS)
//!     → Send to client
//! ```

pub mod client;
pub mod request;
pub mod response;
pub mod server;

pub use client::{BackendClient, BackendResponse, TransportError};
pub use request::{ForwardMethod, X_REQUEST_ID};
pub use response::ProxiedResponse;
pub use server::{AppState, HttpServer};
