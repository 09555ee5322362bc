//! Collection indexer - trait and test implementations
//!
//! The indexing pipeline itself lives outside this service; order creation
//! only needs to enqueue a collection for backfill when it encounters one
//! that is not fully indexed.

use async_trait::async_trait;
use common::ChainId;
use parking_lot::Mutex;

use crate::error::MetadataResult;

/// Enqueues a collection for asynchronous backfill indexing
#[async_trait]
pub trait CollectionIndexer: Send + Sync {
    async fn enqueue(&self, chain_id: ChainId, collection: &str) -> MetadataResult<()>;
}

/// Indexer that drops every request (for deployments without a backfill
/// pipeline attached)
#[derive(Debug, Default)]
pub struct NoopIndexer;

#[async_trait]
impl CollectionIndexer for NoopIndexer {
    async fn enqueue(&self, chain_id: ChainId, collection: &str) -> MetadataResult<()> {
        tracing::debug!(chain = %chain_id, collection, "backfill request dropped (noop indexer)");
        Ok(())
    }
}

/// Indexer that records every request, for asserting on backfill triggers
/// in tests
#[derive(Debug, Default)]
pub struct RecordingIndexer {
    enqueued: Mutex<Vec<(ChainId, String)>>,
}

impl RecordingIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests recorded so far
    pub fn enqueued(&self) -> Vec<(ChainId, String)> {
        self.enqueued.lock().clone()
    }
}

#[async_trait]
impl CollectionIndexer for RecordingIndexer {
    async fn enqueue(&self, chain_id: ChainId, collection: &str) -> MetadataResult<()> {
        self.enqueued
            .lock()
            .push((chain_id, collection.to_string()));
        Ok(())
    }
}
