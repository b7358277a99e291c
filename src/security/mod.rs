//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → cors.rs (preflight short-circuit, compute CORS headers)
//!     → headers.rs (drop Host before forwarding)
//! Backend response:
//!     → headers.rs (drop backend access-control-* headers)
//!     → cors.rs (apply proxy CORS headers)
//! ```
//!
//! # Design Decisions
//! - The proxy is the single source of CORS headers
//! - CORS headers are attached to every response, errors included

pub mod cors;
pub mod headers;
