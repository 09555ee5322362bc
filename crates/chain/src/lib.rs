//! On-chain reads for OpenMarket
//!
//! Wraps the two fee registries (the fee treasury's global curator fee and
//! the creators-fee-manager's per-collection creator fee) and ERC-721
//! ownership lookups behind the [`FeeOracle`] trait. All reads are
//! chain-id-scoped and read-only.
//!
//! # Feature Flags
//!
//! - `client` - Enable the JSON-RPC backed oracle

pub mod error;
pub mod oracle;

#[cfg(feature = "client")]
pub mod rpc;

pub use error::{ChainError, ChainResult};
pub use oracle::{CreatorFee, FeeOracle, MockFeeOracle};

#[cfg(feature = "client")]
pub use rpc::{RpcEndpoint, RpcFeeOracle};
