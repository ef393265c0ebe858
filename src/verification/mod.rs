//! Verification subsystem.
//!
//! # Data Flow
//! ```text
//! POST /verify {value, type}
//!     → record.rs (deserialize, reject unknown fields, validate)
//!     → store.rs (canonicalize, insert under write lock)
//!
//! GET /verify?value=...
//!     → canonical.rs (trim + lower-case)
//!     → store.rs (read under shared lock)
//!     → hit: stored record / miss: "not verified"
//! ```
//!
//! # Design Decisions
//! - The store owns its map; nothing else can reach the lock
//! - Both `value` and `type` are canonicalized on insert
//! - A miss is `None`, not an error

pub mod canonical;
pub mod record;
pub mod store;

pub use canonical::canonical;
pub use record::{VerifiedRecord, NOT_VERIFIED};
pub use store::VerificationStore;
