//! Metadata document shapes and the resolved metadata index

use common::{trim_lower_case, ChainId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Top-level collection for collection records
pub const COLLECTIONS_COLL: &str = "collections";
/// Subcollection of per-token records under a collection
pub const NFTS_SUB_COLL: &str = "nfts";

/// Indexing step that marks a collection as fully indexed
pub const CREATION_STEP_COMPLETE: &str = "complete";

/// The NFT targets of one order: a collection plus explicit token ids,
/// or an empty token list for a collection-wide order.
#[derive(Debug, Clone)]
pub struct NftTargets {
    pub chain_id: ChainId,
    pub collection: String,
    pub token_ids: Vec<String>,
}

/// Stored collection record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CollectionRecord {
    pub address: String,
    pub chain_id: String,
    pub slug: String,
    pub has_blue_check: bool,
    pub metadata: CollectionMetadata,
    pub state: CollectionState,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CollectionMetadata {
    pub name: String,
    pub profile_image: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CollectionState {
    pub create: CreationState,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreationState {
    pub step: String,
}

impl CollectionRecord {
    /// Document id of a collection record: `{chainId}:{address}`
    pub fn doc_id(chain_id: ChainId, address: &str) -> String {
        format!("{}:{}", chain_id.as_str(), trim_lower_case(address))
    }

    /// True once the indexing pipeline has written every metadata step
    pub fn is_fully_indexed(&self) -> bool {
        self.state.create.step == CREATION_STEP_COMPLETE
    }
}

/// Stored per-token record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TokenRecord {
    pub token_id: String,
    pub collection_address: String,
    pub slug: String,
    pub image: TokenImage,
    pub metadata: TokenMetadata,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TokenImage {
    pub url: String,
    pub cached_url: String,
    pub original_url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TokenMetadata {
    pub name: String,
    pub attributes: Vec<Value>,
}

impl TokenRecord {
    /// Preferred display image: primary url, then the cached copy, then the
    /// original upstream url
    pub fn display_image(&self) -> &str {
        if !self.image.url.is_empty() {
            &self.image.url
        } else if !self.image.cached_url.is_empty() {
            &self.image.cached_url
        } else {
            &self.image.original_url
        }
    }
}

/// Resolved metadata for a batch of orders, indexed for O(1) lookup while
/// order items are built
#[derive(Debug, Default)]
pub struct OrderMetadata {
    collections: HashMap<(String, String), CollectionRecord>,
    tokens: HashMap<(String, String, String), TokenRecord>,
}

impl OrderMetadata {
    pub(crate) fn insert_collection(&mut self, chain_id: ChainId, record: CollectionRecord) {
        let key = (
            chain_id.as_str().to_string(),
            trim_lower_case(&record.address),
        );
        self.collections.insert(key, record);
    }

    pub(crate) fn insert_token(&mut self, chain_id: ChainId, collection: &str, record: TokenRecord) {
        let key = (
            chain_id.as_str().to_string(),
            trim_lower_case(collection),
            record.token_id.clone(),
        );
        self.tokens.insert(key, record);
    }

    /// Resolved collection record
    pub fn collection(&self, chain_id: ChainId, address: &str) -> Option<&CollectionRecord> {
        self.collections
            .get(&(chain_id.as_str().to_string(), trim_lower_case(address)))
    }

    /// Resolved token record
    pub fn token(&self, chain_id: ChainId, address: &str, token_id: &str) -> Option<&TokenRecord> {
        self.tokens.get(&(
            chain_id.as_str().to_string(),
            trim_lower_case(address),
            token_id.to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_doc_id() {
        assert_eq!(
            CollectionRecord::doc_id(ChainId::Mainnet, " 0xAbC "),
            "1:0xabc"
        );
    }

    #[test]
    fn test_is_fully_indexed() {
        let mut record = CollectionRecord::default();
        assert!(!record.is_fully_indexed());
        record.state.create.step = CREATION_STEP_COMPLETE.to_string();
        assert!(record.is_fully_indexed());
    }

    #[test]
    fn test_display_image_preference() {
        let mut token = TokenRecord::default();
        assert_eq!(token.display_image(), "");
        token.image.original_url = "orig".to_string();
        assert_eq!(token.display_image(), "orig");
        token.image.cached_url = "cached".to_string();
        assert_eq!(token.display_image(), "cached");
        token.image.url = "primary".to_string();
        assert_eq!(token.display_image(), "primary");
    }

    #[test]
    fn test_metadata_index_lookup() {
        let mut meta = OrderMetadata::default();
        let record = CollectionRecord {
            address: "0xABC".to_string(),
            slug: "cool-cats".to_string(),
            ..Default::default()
        };
        meta.insert_collection(ChainId::Mainnet, record);

        assert!(meta.collection(ChainId::Mainnet, "0xabc").is_some());
        assert!(meta.collection(ChainId::Polygon, "0xabc").is_none());
    }
}
