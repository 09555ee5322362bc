//! Chain client error types

use common::ChainId;
use thiserror::Error;

/// Errors that can occur reading on-chain state
#[derive(Error, Debug)]
pub enum ChainError {
    /// No RPC endpoint or contract address configured for the chain
    #[error("Chain not configured: {0}")]
    UnsupportedChain(ChainId),

    /// The RPC transport failed
    #[error("RPC transport error: {0}")]
    Transport(String),

    /// The node returned a JSON-RPC error
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The call returned data that could not be decoded
    #[error("Invalid call result: {0}")]
    InvalidResult(String),

    /// A token id was not a valid decimal integer
    #[error("Invalid token id: {0}")]
    InvalidTokenId(String),
}

/// Result type for chain reads
pub type ChainResult<T> = std::result::Result<T, ChainError>;
