//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → router.rs (route lookup in declaration order)
//!     → matcher.rs (prefix or exact comparison)
//!     → rewrite.rs (strip prefix, join with backend base URL)
//!     → Return: backend URL or NoMatch
//!
//! Route Compilation (at startup):
//!     RouteConfig[]
//!     → Normalize backend URLs
//!     → Reject duplicate (prefix, match) pairs
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path
//! - Deterministic: same input always matches same route
//! - First match wins (declaration order)

pub mod matcher;
pub mod rewrite;
pub mod router;

pub use matcher::MatchKind;
pub use router::{BackendUrl, Route, RouteError, RouteTable};
