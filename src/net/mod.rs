//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → tls.rs (TLS handshake when [listener.tls] is configured)
//!     → Hand off to HTTP layer
//! ```
//!
//! # Design Decisions
//! - TLS terminates at the proxy; backends are reached over plain HTTP
//! - Without TLS config the same router is served over plain HTTP

pub mod tls;
