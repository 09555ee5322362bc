//! Order ledger error types

use chain::ChainError;
use docstore::StoreError;
use metadata::MetadataError;
use thiserror::Error;

/// Errors that can occur in the order ledger
#[derive(Error, Debug)]
pub enum OrdersError {
    /// Nonce was already claimed or is not a valid integer
    #[error("Invalid nonce {nonce} for maker {maker}")]
    InvalidNonce { maker: String, nonce: String },

    /// The query combined filters the caller is not allowed to use, or
    /// options the index cannot serve
    #[error("Invalid query: {0}")]
    BadQuery(String),

    /// Collection/token resolution failed (invalid collection or token)
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    /// On-chain read failed
    #[error("Chain read failed: {0}")]
    Chain(#[from] ChainError),

    /// Document store failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A document could not be serialized or deserialized
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for order ledger operations
pub type OrdersResult<T> = std::result::Result<T, OrdersError>;
