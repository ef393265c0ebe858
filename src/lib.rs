//! Verification Service Library
//!
//! Records and looks up verified identity-like values (emails, handles, ...)
//! keyed by a canonical form, behind a per-client-IP token bucket limiter.

pub mod admin;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;
pub mod verification;

pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::{PeriodicTask, Shutdown};
pub use security::IpRateLimiter;
pub use verification::{canonical, VerificationStore, VerifiedRecord};
