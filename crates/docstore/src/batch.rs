//! Atomic write batches
//!
//! A batch is staged in memory by one caller and committed exactly once;
//! either every staged write lands or none do. Order creation relies on this
//! to keep an order and its fan-out order items consistent.

use crate::types::DocRef;
use serde_json::Value;

/// A single staged write
#[derive(Debug, Clone)]
pub struct BatchWrite {
    pub doc: DocRef,
    pub data: Value,
    /// Merge into the existing document (field-wise) rather than replace it
    pub merge: bool,
}

/// A set of writes committed atomically
#[derive(Debug, Default)]
pub struct WriteBatch {
    writes: Vec<BatchWrite>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a write. `data` must serialize to a JSON object.
    pub fn set(&mut self, doc: DocRef, data: Value, merge: bool) {
        self.writes.push(BatchWrite { doc, data, merge });
    }

    pub fn writes(&self) -> &[BatchWrite] {
        &self.writes
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }
}
