//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → Logging → Metrics → Bind listener → Serve
//!
//! Background work (periodic.rs):
//!     Interval tick → callback, until the handle is stopped
//!
//! Shutdown (shutdown.rs, signals.rs):
//!     SIGTERM/SIGINT → broadcast → stop accepting → drain → stop sweeps → exit
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, listener last
//! - Shutdown has a deadline: forced exit after the grace period

pub mod periodic;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use periodic::PeriodicTask;
pub use shutdown::Shutdown;
