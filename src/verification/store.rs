//! Thread-safe verification store.
//!
//! A single reader/writer lock guards the map: lookups share it, adds and
//! resets take it exclusively. Every critical section is one map operation,
//! so a reader sees either the state before a write or the state after it.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::observability::metrics;
use crate::verification::{canonical, VerifiedRecord};

/// In-memory map from canonical key to verified record.
#[derive(Debug, Default)]
pub struct VerificationStore {
    records: RwLock<HashMap<String, VerifiedRecord>>,
}

impl VerificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a verified value, replacing any previous record under the same
    /// canonical key.
    pub fn add(&self, record: VerifiedRecord) {
        let record = record.canonicalized();
        tracing::debug!(kind = %record.kind, value_len = record.value.len(), "Recording verified value");

        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        records.insert(record.value.clone(), record);
        drop(records);

        metrics::record_verification_added();
    }

    /// Look up a raw value. Returns `None` if it was never verified.
    pub fn lookup(&self, raw_value: &str) -> Option<VerifiedRecord> {
        let key = canonical(raw_value);
        let found = self
            .records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned();

        metrics::record_lookup(found.is_some());
        found
    }

    /// Drop every record.
    pub fn reset(&self) {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        *records = HashMap::new();
        tracing::info!("Verification store reset");
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
