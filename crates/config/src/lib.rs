//! Configuration management for OpenMarket
//!
//! The marketplace is configured from one YAML file: marketplace metadata,
//! the chains it serves (RPC endpoint plus fee contract addresses per
//! chain), and the HTTP server binding.

use serde::{Deserialize, Serialize};

pub mod defaults;
pub mod parser;
pub mod validator;

pub use defaults::*;
pub use parser::*;
pub use validator::*;

/// Root configuration document
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MarketConfig {
    pub marketplace: MarketplaceConfig,
    #[serde(default)]
    pub chains: Vec<ChainConfig>,
    #[serde(default = "default_server")]
    pub server: ServerConfig,
    #[serde(default = "default_logging")]
    pub logging: LoggingConfig,
}

/// Marketplace metadata
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MarketplaceConfig {
    pub name: String,
    pub description: String,
    pub version: String,
}

/// One served chain: its RPC endpoint and the fee contracts read by the
/// ledger
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChainConfig {
    /// Decimal chain id ("1", "5", "137")
    pub chain_id: String,
    pub rpc_url: String,
    /// Fee treasury contract (global curator fee)
    pub fee_treasury: String,
    /// Creators fee manager contract (per-collection creator fee)
    pub creators_fee_manager: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

/// HTTP server binding
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Logging options
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// "pretty", "json", or "compact"
    pub format: String,
}
