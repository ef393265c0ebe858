//! Verified record model.

use serde::{Deserialize, Serialize};

use crate::verification::canonical;

/// `type` reported for values that have never been verified.
pub const NOT_VERIFIED: &str = "not verified";

/// A value that has been verified, together with what kind of value it is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VerifiedRecord {
    /// The verified value (email address, handle, ...).
    pub value: String,

    /// Kind of value, e.g. "email" or "twitter".
    #[serde(rename = "type")]
    pub kind: String,
}

impl VerifiedRecord {
    pub fn new(value: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: kind.into(),
        }
    }

    /// Check that both fields are present.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.value.is_empty() {
            return Err("value is required");
        }
        if self.kind.is_empty() {
            return Err("type is required");
        }
        Ok(())
    }

    /// The record as it is stored: both fields canonicalized.
    pub fn canonicalized(&self) -> Self {
        Self {
            value: canonical(&self.value),
            kind: canonical(&self.kind),
        }
    }
}
