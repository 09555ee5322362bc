//! Configuration validation

use crate::*;
use common::ChainId;
use std::collections::HashSet;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug, Clone)]
pub enum ValidationError {
    #[error("Marketplace name is required")]
    MissingMarketplaceName,

    #[error("Invalid version format: {0}. Must be in format X.Y.Z (e.g., 1.0.0)")]
    InvalidVersionFormat(String),

    #[error("Unsupported chain id: {0}")]
    UnsupportedChainId(String),

    #[error("Duplicate chain id: {0}")]
    DuplicateChainId(String),

    #[error("Chain {chain_id}: invalid RPC url: {message}")]
    InvalidRpcUrl { chain_id: String, message: String },

    #[error("Chain {chain_id}: {field} is not an address: {value}")]
    InvalidContractAddress {
        chain_id: String,
        field: String,
        value: String,
    },

    #[error("Server port must not be 0")]
    InvalidServerPort,

    #[error("Unknown log format: {0}. Must be one of: pretty, json, compact")]
    UnknownLogFormat(String),
}

#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
}

/// Result of validating a configuration
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn warn(&mut self, field: &str, message: impl Into<String>) {
        self.warnings.push(ValidationWarning {
            field: field.to_string(),
            message: message.into(),
        });
    }
}

fn is_address(s: &str) -> bool {
    let hex_part = s.trim().strip_prefix("0x").unwrap_or("");
    hex_part.len() == 40 && hex_part.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Validate a configuration, collecting every error and warning rather than
/// stopping at the first
pub fn validate_config(config: &MarketConfig) -> ValidationReport {
    let mut report = ValidationReport::new();

    if config.marketplace.name.trim().is_empty() {
        report.errors.push(ValidationError::MissingMarketplaceName);
    }

    let version_ok = {
        let parts: Vec<&str> = config.marketplace.version.split('.').collect();
        parts.len() == 3 && parts.iter().all(|p| p.parse::<u32>().is_ok())
    };
    if !version_ok {
        report.errors.push(ValidationError::InvalidVersionFormat(
            config.marketplace.version.clone(),
        ));
    }

    if config.chains.iter().all(|c| !c.enabled) {
        report.warn(
            "chains",
            "no enabled chains: on-chain fee reads will use the mock oracle",
        );
    }

    let mut seen = HashSet::new();
    for chain in &config.chains {
        if ChainId::parse(&chain.chain_id).is_none() {
            report
                .errors
                .push(ValidationError::UnsupportedChainId(chain.chain_id.clone()));
        }
        if !seen.insert(chain.chain_id.trim().to_string()) {
            report
                .errors
                .push(ValidationError::DuplicateChainId(chain.chain_id.clone()));
        }
        if !chain.enabled {
            continue;
        }
        if let Err(err) = Url::parse(&chain.rpc_url) {
            report.errors.push(ValidationError::InvalidRpcUrl {
                chain_id: chain.chain_id.clone(),
                message: err.to_string(),
            });
        }
        for (field, value) in [
            ("fee_treasury", &chain.fee_treasury),
            ("creators_fee_manager", &chain.creators_fee_manager),
        ] {
            if !is_address(value) {
                report.errors.push(ValidationError::InvalidContractAddress {
                    chain_id: chain.chain_id.clone(),
                    field: field.to_string(),
                    value: value.clone(),
                });
            }
        }
    }

    if config.server.port == 0 {
        report.errors.push(ValidationError::InvalidServerPort);
    }

    let known_format = matches!(config.logging.format.as_str(), "pretty" | "json" | "compact");
    if !known_format {
        report.errors.push(ValidationError::UnknownLogFormat(
            config.logging.format.clone(),
        ));
    }

    report
}
