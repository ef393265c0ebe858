//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → rate_limit.rs (resolve client IP, consume a token from its bucket)
//!     → 429 if the bucket is empty, 500 if the IP cannot be resolved
//!     → Pass to handlers
//!
//! Background:
//!     → rate_limit.rs sweep evicts buckets idle past the threshold
//! ```
//!
//! # Design Decisions
//! - Fail closed: no client IP means no request, never a silent allow
//! - One lock over the bucket map; per-call work is O(1)

pub mod rate_limit;

pub use rate_limit::{rate_limit_middleware, IpRateLimiter};
