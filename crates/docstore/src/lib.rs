//! Document store abstraction for OpenMarket
//!
//! The marketplace persists denormalized documents (orders, order items,
//! users, collections, feed events) in a hierarchical document database.
//! This crate abstracts that store behind a trait so the business logic can
//! be exercised against an in-memory implementation:
//!
//! - point reads and batched multi-gets
//! - collection and collection-group queries with filters, ordering,
//!   cursoring (`start_after`) and limits
//! - atomic multi-document write batches with merge semantics
//! - atomic numeric increments (distributed counters)
//! - per-document transactions (`transform`) for read-modify-write state
//!   such as nonce counters

pub mod batch;
pub mod error;
pub mod memory;
pub mod query;
pub mod traits;
pub mod types;
pub mod value;

pub use batch::WriteBatch;
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use query::{Filter, FilterOp, Query, QuerySource};
pub use traits::DocumentStore;
pub use types::{DocRef, Document};
pub use value::cmp_values;
