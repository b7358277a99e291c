//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to backend:
//!     → timeouts.rs (bounded connect, bounded reads and writes)
//!     → On failure: transport error, mapped to 502 by the handler
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every backend call has a deadline
//! - At most one backend attempt per inbound request (no retries)

pub mod timeouts;

pub use timeouts::Timeouts;
