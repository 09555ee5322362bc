//! DocumentStore trait definition

use async_trait::async_trait;

use crate::batch::WriteBatch;
use crate::error::StoreResult;
use crate::query::Query;
use crate::types::{DocRef, Document};

/// Read-modify-write callback for [`DocumentStore::transform`].
///
/// Receives the current document (if any) and returns the full replacement
/// document. Returning an error aborts the transaction without writing;
/// use [`StoreError::TransactionAborted`](crate::StoreError::TransactionAborted)
/// to signal a domain-level abort to the caller.
pub type TransformFn<'a> =
    &'a (dyn Fn(Option<&Document>) -> StoreResult<Document> + Send + Sync);

/// Interface to the document database.
///
/// Implementations must make `commit` atomic, `increment` linearizable, and
/// `transform` serialized per document. Everything else is plain reads.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read a single document
    async fn get(&self, doc: &DocRef) -> StoreResult<Option<Document>>;

    /// Read many documents in one round trip.
    ///
    /// The result is positionally aligned with `refs`; a missing document
    /// yields `None` at its position.
    async fn get_all(&self, refs: &[DocRef]) -> StoreResult<Vec<Option<Document>>>;

    /// Execute a filtered/ordered/cursored query
    async fn run_query(&self, query: &Query) -> StoreResult<Vec<Document>>;

    /// Commit a write batch atomically: all staged writes land or none do
    async fn commit(&self, batch: WriteBatch) -> StoreResult<()>;

    /// Atomically add `by` to a numeric field, creating the document and
    /// field as needed. Application code never reads then writes counters.
    async fn increment(&self, doc: &DocRef, field: &str, by: f64) -> StoreResult<()>;

    /// Run a per-document transaction: read the current document, apply `f`,
    /// write the result. Concurrent transforms of the same document are
    /// serialized; the returned document is the committed state.
    async fn transform(&self, doc: &DocRef, f: TransformFn<'_>) -> StoreResult<Document>;
}
