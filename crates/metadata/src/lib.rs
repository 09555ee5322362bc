//! Collection and token metadata resolution for OpenMarket
//!
//! Order creation denormalizes collection and token metadata into every
//! order item. This crate resolves that metadata from the document store,
//! deduplicating lookups across a batch of orders, and fails closed when a
//! referenced collection has not finished indexing (triggering an
//! asynchronous backfill as a side effect).

pub mod error;
pub mod indexer;
pub mod resolver;
pub mod types;

pub use error::{MetadataError, MetadataResult};
pub use indexer::{CollectionIndexer, NoopIndexer, RecordingIndexer};
pub use resolver::MetadataResolver;
pub use types::{CollectionRecord, NftTargets, OrderMetadata, TokenRecord};
