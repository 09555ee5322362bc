//! Metadata resolution error types

use docstore::StoreError;
use thiserror::Error;

/// Errors that can occur resolving order metadata
#[derive(Error, Debug)]
pub enum MetadataError {
    /// Collection is missing or has not finished indexing
    #[error("Invalid collection {address} on chain {chain_id}: {reason}")]
    InvalidCollection {
        address: String,
        chain_id: String,
        reason: String,
    },

    /// Token could not be resolved
    #[error("Invalid token {token_id} in {collection} on chain {chain_id}: {reason}")]
    InvalidToken {
        collection: String,
        chain_id: String,
        token_id: String,
        reason: String,
    },

    /// Document store failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for metadata resolution
pub type MetadataResult<T> = std::result::Result<T, MetadataError>;
