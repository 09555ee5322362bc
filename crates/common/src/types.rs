//! Shared domain types used across OpenMarket
//!
//! Chains are keyed by their decimal chain-id string in every stored
//! document, matching the on-chain convention.

use serde::{Deserialize, Serialize};

/// Supported chains
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ChainId {
    /// Ethereum mainnet ("1")
    Mainnet,
    /// Goerli testnet ("5")
    Goerli,
    /// Polygon PoS ("137")
    Polygon,
}

impl ChainId {
    /// Decimal chain-id string as stored in documents
    pub fn as_str(&self) -> &'static str {
        match self {
            ChainId::Mainnet => "1",
            ChainId::Goerli => "5",
            ChainId::Polygon => "137",
        }
    }

    /// Parse from the decimal chain-id string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "1" => Some(ChainId::Mainnet),
            "5" => Some(ChainId::Goerli),
            "137" => Some(ChainId::Polygon),
            _ => None,
        }
    }
}

impl Default for ChainId {
    fn default() -> Self {
        ChainId::Mainnet
    }
}

impl std::fmt::Display for ChainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ChainId {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unsupported chain id: {}", s))
    }
}

impl TryFrom<String> for ChainId {
    type Error = String;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ChainId> for String {
    fn from(c: ChainId) -> Self {
        c.as_str().to_string()
    }
}

/// Sort direction for paginated queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    /// Ascending
    Asc,
    /// Descending (default for time-ordered feeds)
    #[default]
    Desc,
}

impl OrderDirection {
    /// Returns the opposite direction
    pub fn reverse(&self) -> Self {
        match self {
            OrderDirection::Asc => OrderDirection::Desc,
            OrderDirection::Desc => OrderDirection::Asc,
        }
    }
}

impl std::fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderDirection::Asc => write!(f, "asc"),
            OrderDirection::Desc => write!(f, "desc"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_id_round_trip() {
        assert_eq!(ChainId::parse("1"), Some(ChainId::Mainnet));
        assert_eq!(ChainId::parse(" 137 "), Some(ChainId::Polygon));
        assert_eq!(ChainId::parse("2"), None);
        assert_eq!(ChainId::Goerli.as_str(), "5");
    }

    #[test]
    fn test_chain_id_serde() {
        let json = serde_json::to_string(&ChainId::Polygon).unwrap();
        assert_eq!(json, "\"137\"");
        let back: ChainId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ChainId::Polygon);
    }

    #[test]
    fn test_direction_reverse() {
        assert_eq!(OrderDirection::Asc.reverse(), OrderDirection::Desc);
        assert_eq!(OrderDirection::Desc.reverse(), OrderDirection::Asc);
    }
}
