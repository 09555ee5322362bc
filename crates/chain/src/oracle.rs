//! Fee oracle - trait and mock implementation

use async_trait::async_trait;
use common::ChainId;
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::error::{ChainError, ChainResult};

/// Per-collection creator fee as registered on chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatorFee {
    /// Payout recipient for the creator's share
    pub recipient: String,
    /// Fee in basis points
    pub bps: u32,
}

/// Read-only, chain-id-scoped access to the fee registries and ERC-721
/// ownership.
#[async_trait]
pub trait FeeOracle: Send + Sync {
    /// Global curator fee in basis points (fee treasury contract)
    async fn curator_fee_bps(&self, chain_id: ChainId) -> ChainResult<u32>;

    /// Creator fee for a collection (creators-fee-manager contract)
    async fn creator_fee(&self, chain_id: ChainId, collection: &str) -> ChainResult<CreatorFee>;

    /// Current owner of an ERC-721 token, as a lower-cased address
    async fn erc721_owner(
        &self,
        chain_id: ChainId,
        collection: &str,
        token_id: &str,
    ) -> ChainResult<String>;
}

// ==================== Mock Implementation ====================

/// Mock fee oracle for testing
pub struct MockFeeOracle {
    curator_bps: u32,
    default_creator_bps: u32,
    creator_fees: RwLock<HashMap<String, CreatorFee>>,
    owners: RwLock<HashMap<(String, String), String>>,
    fail_all: bool,
}

impl MockFeeOracle {
    /// Create a new mock oracle (2.5% curator, 5% creator by default)
    pub fn new() -> Self {
        Self {
            curator_bps: 250,
            default_creator_bps: 500,
            creator_fees: RwLock::new(HashMap::new()),
            owners: RwLock::new(HashMap::new()),
            fail_all: false,
        }
    }

    /// Configure the curator fee
    pub fn with_curator_bps(mut self, bps: u32) -> Self {
        self.curator_bps = bps;
        self
    }

    /// Configure the default creator fee
    pub fn with_default_creator_bps(mut self, bps: u32) -> Self {
        self.default_creator_bps = bps;
        self
    }

    /// Configure a per-collection creator fee
    pub fn with_creator_fee(self, collection: &str, recipient: &str, bps: u32) -> Self {
        self.creator_fees.write().insert(
            collection.to_lowercase(),
            CreatorFee {
                recipient: recipient.to_lowercase(),
                bps,
            },
        );
        self
    }

    /// Configure the owner of a token
    pub fn with_owner(self, collection: &str, token_id: &str, owner: &str) -> Self {
        self.owners.write().insert(
            (collection.to_lowercase(), token_id.to_string()),
            owner.to_lowercase(),
        );
        self
    }

    /// Configure every call to fail (simulates a dead RPC endpoint)
    pub fn with_failures(mut self) -> Self {
        self.fail_all = true;
        self
    }

    fn check(&self) -> ChainResult<()> {
        if self.fail_all {
            return Err(ChainError::Transport("mock failure".to_string()));
        }
        Ok(())
    }
}

impl Default for MockFeeOracle {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeeOracle for MockFeeOracle {
    async fn curator_fee_bps(&self, _chain_id: ChainId) -> ChainResult<u32> {
        self.check()?;
        Ok(self.curator_bps)
    }

    async fn creator_fee(&self, _chain_id: ChainId, collection: &str) -> ChainResult<CreatorFee> {
        self.check()?;
        let fees = self.creator_fees.read();
        Ok(fees
            .get(&collection.to_lowercase())
            .cloned()
            .unwrap_or(CreatorFee {
                recipient: String::new(),
                bps: self.default_creator_bps,
            }))
    }

    async fn erc721_owner(
        &self,
        _chain_id: ChainId,
        collection: &str,
        token_id: &str,
    ) -> ChainResult<String> {
        self.check()?;
        let owners = self.owners.read();
        owners
            .get(&(collection.to_lowercase(), token_id.to_string()))
            .cloned()
            .ok_or_else(|| {
                ChainError::InvalidResult(format!("no owner for {}:{}", collection, token_id))
            })
    }
}
