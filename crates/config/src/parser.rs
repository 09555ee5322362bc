//! Configuration loading, saving, and generation

use crate::*;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Load and parse a configuration file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<MarketConfig> {
    let path = path.as_ref();
    info!("Loading configuration from: {:?}", path);

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;
    debug!("Config file content length: {} bytes", content.len());

    let config: MarketConfig =
        serde_yaml::from_str(&content).with_context(|| "Failed to parse YAML configuration")?;

    info!("Configuration loaded successfully");
    Ok(config)
}

/// Generate a default configuration (no chains: the server runs against
/// the mock fee oracle until chains are configured)
pub fn generate_default_config() -> MarketConfig {
    MarketConfig {
        marketplace: MarketplaceConfig {
            name: "OpenMarket".to_string(),
            description: "An NFT marketplace backend".to_string(),
            version: "1.0.0".to_string(),
        },
        chains: vec![ChainConfig {
            chain_id: "1".to_string(),
            rpc_url: "https://eth-mainnet.example.com/v2/KEY".to_string(),
            fee_treasury: "0x0000000000000000000000000000000000000000".to_string(),
            creators_fee_manager: "0x0000000000000000000000000000000000000000".to_string(),
            enabled: false,
        }],
        server: default_server(),
        logging: default_logging(),
    }
}

/// Serialize a configuration to a YAML file
pub fn save_config<P: AsRef<Path> + std::fmt::Debug>(config: &MarketConfig, path: P) -> Result<()> {
    let path = path.as_ref();
    info!("Saving configuration to: {:?}", path);

    let yaml = serde_yaml::to_string(config)
        .with_context(|| "Failed to serialize configuration to YAML")?;
    fs::write(path, yaml).with_context(|| format!("Failed to write config file: {:?}", path))?;

    info!("Configuration saved successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_round_trips() {
        let config = generate_default_config();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: MarketConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.marketplace.name, "OpenMarket");
        assert_eq!(parsed.chains.len(), 1);
        assert_eq!(parsed.server.port, 9010);
    }

    #[test]
    fn test_minimal_config_applies_defaults() {
        let yaml = r#"
marketplace:
  name: Test
  description: test market
  version: 0.1.0
"#;
        let parsed: MarketConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(parsed.chains.is_empty());
        assert_eq!(parsed.server.host, "0.0.0.0");
        assert_eq!(parsed.logging.format, "pretty");
    }
}
