//! Document store error types

use thiserror::Error;

/// Errors that can occur against the document store
#[derive(Error, Debug)]
pub enum StoreError {
    /// A query combined options the store cannot serve
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// A transaction callback chose to abort the transform
    #[error("Transaction aborted: {0}")]
    TransactionAborted(String),

    /// Serialization of a document failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Backend failure (network, quota, corruption)
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Result type for document store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;
