//! Order ledger domain types
//!
//! Orders are stored denormalized: the root order document plus one
//! order-item document per (collection, token) pair, so the flat order-item
//! index can be queried across all orders without joins.

use common::{trim_lower_case, ChainId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Top-level collection of order documents
pub const ORDERS_COLL: &str = "orders";
/// Subcollection of fan-out order items under an order
pub const ORDER_ITEMS_SUB_COLL: &str = "orderItems";
/// Top-level collection of activity feed events
pub const FEED_COLL: &str = "feed";
/// Top-level collection of user profiles and nonce state
pub const USERS_COLL: &str = "users";
/// Top-level collection of precomputed listing/offer pairings
pub const ORDER_MATCHES_COLL: &str = "orderMatches";
/// Document inside the orders collection holding aggregate counters
pub const COUNTERS_DOC: &str = "counters";

/// The entire sale price in basis points
pub const MAX_TOTAL_FEE_BPS: u32 = 10_000;

/// Order validity status.
///
/// Derived from the order's time window at write time; this subsystem never
/// re-validates it afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrderStatus {
    /// Within its time window at write time
    ValidActive,
    /// Outside its time window at write time
    ValidInactive,
    /// Structurally invalid (set by downstream validators, never here)
    Invalid,
}

impl OrderStatus {
    /// Status as a pure function of the order's time window
    pub fn from_time_window(start_time_ms: i64, end_time_ms: i64, now_ms: i64) -> Self {
        if start_time_ms <= now_ms && now_ms <= end_time_ms {
            OrderStatus::ValidActive
        } else {
            OrderStatus::ValidInactive
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::ValidActive => write!(f, "validActive"),
            OrderStatus::ValidInactive => write!(f, "validInactive"),
            OrderStatus::Invalid => write!(f, "invalid"),
        }
    }
}

/// A token inside an order's NFT target
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftToken {
    pub token_id: String,
    pub num_tokens: u64,
}

/// One NFT target of a signed order: a collection plus explicit tokens, or
/// an empty token list for "any token in this collection"
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainNfts {
    pub collection: String,
    pub tokens: Vec<NftToken>,
}

/// The signed order payload, stored verbatim.
///
/// Field order is fixed: the deterministic order id is the hash of this
/// struct's canonical JSON serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedOrderPayload {
    pub is_sell_order: bool,
    pub signer: String,
    /// Numeric constraints (num items, prices, times, nonce, max gas price)
    /// as decimal strings, untouched by this service
    pub constraints: Vec<String>,
    pub nfts: Vec<ChainNfts>,
    /// `[complicationAddress, currencyAddress]`
    pub exec_params: Vec<String>,
    pub extra_params: String,
    pub sig: String,
}

/// Execution parameters lifted out of the signed payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecParams {
    pub complication_address: String,
    pub currency_address: String,
}

/// A signed order as submitted for creation, with its typed top-level
/// fields alongside the verbatim signed payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub chain_id: ChainId,
    pub num_items: u64,
    pub start_price_eth: f64,
    pub end_price_eth: f64,
    pub start_time_ms: i64,
    pub end_time_ms: i64,
    pub max_gas_price_wei: String,
    /// String-encoded integer, claimed per maker before any write
    pub nonce: String,
    pub maker_address: String,
    pub exec_params: ExecParams,
    pub signed_order: SignedOrderPayload,
}

/// The canonical stored order document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub chain_id: ChainId,
    pub is_sell_order: bool,
    pub order_status: OrderStatus,
    pub num_items: u64,
    pub start_price_eth: f64,
    pub end_price_eth: f64,
    pub start_time_ms: i64,
    pub end_time_ms: i64,
    pub max_gas_price_wei: String,
    pub nonce: String,
    pub complication_address: String,
    pub currency_address: String,
    pub maker_address: String,
    pub maker_username: String,
    pub signed_order: SignedOrderPayload,
}

impl Order {
    /// Build the stored order document from a submitted order.
    ///
    /// Maker and signature fields come from the submission and are never
    /// overwritten by later merge-writes of the same order id.
    pub fn from_new_order(
        maker_address: &str,
        maker_username: &str,
        order: &NewOrder,
        order_id: &str,
        now_ms: i64,
    ) -> Self {
        Self {
            id: order_id.to_string(),
            chain_id: order.chain_id,
            is_sell_order: order.signed_order.is_sell_order,
            order_status: OrderStatus::from_time_window(
                order.start_time_ms,
                order.end_time_ms,
                now_ms,
            ),
            num_items: order.num_items,
            start_price_eth: order.start_price_eth,
            end_price_eth: order.end_price_eth,
            start_time_ms: order.start_time_ms,
            end_time_ms: order.end_time_ms,
            max_gas_price_wei: order.max_gas_price_wei.clone(),
            nonce: order.nonce.clone(),
            complication_address: order.exec_params.complication_address.clone(),
            currency_address: order.exec_params.currency_address.clone(),
            maker_address: trim_lower_case(maker_address),
            maker_username: trim_lower_case(maker_username),
            signed_order: order.signed_order.clone(),
        }
    }
}

/// The denormalized per-token projection of an order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Parent order id
    pub id: String,
    pub order_status: OrderStatus,
    pub chain_id: ChainId,
    pub is_sell_order: bool,
    pub num_items: u64,
    pub start_price_eth: f64,
    pub end_price_eth: f64,
    pub currency_address: String,
    pub complication_address: String,
    pub start_time_ms: i64,
    pub end_time_ms: i64,
    pub maker_address: String,
    pub maker_username: String,
    pub taker_address: String,
    pub taker_username: String,
    pub collection_address: String,
    pub collection_name: String,
    pub collection_image: String,
    pub collection_slug: String,
    pub has_blue_check: bool,
    pub token_id: String,
    pub num_tokens: u64,
    pub token_image: String,
    pub token_name: String,
    pub token_slug: String,
    pub attributes: Vec<Value>,
}

/// A precomputed listing/offer pairing (read-only here)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderMatch {
    pub id: String,
    pub chain_id: ChainId,
    pub lister_address: String,
    pub offerer_address: String,
    pub collection_addresses: Vec<String>,
    /// Matched tokens as `"{collectionAddress}:{tokenId}"`
    pub tokens: Vec<String>,
    pub timestamp: i64,
    pub price_eth: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_time_window() {
        assert_eq!(
            OrderStatus::from_time_window(100, 200, 150),
            OrderStatus::ValidActive
        );
        // boundaries are inclusive
        assert_eq!(
            OrderStatus::from_time_window(100, 200, 100),
            OrderStatus::ValidActive
        );
        assert_eq!(
            OrderStatus::from_time_window(100, 200, 200),
            OrderStatus::ValidActive
        );
        assert_eq!(
            OrderStatus::from_time_window(100, 200, 99),
            OrderStatus::ValidInactive
        );
        assert_eq!(
            OrderStatus::from_time_window(100, 200, 201),
            OrderStatus::ValidInactive
        );
    }

    #[test]
    fn test_status_serde_names() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::ValidActive).unwrap(),
            "\"validActive\""
        );
        assert_eq!(
            serde_json::to_string(&OrderStatus::ValidInactive).unwrap(),
            "\"validInactive\""
        );
    }

    #[test]
    fn test_order_from_new_order_normalizes_maker() {
        let order = crate::test_utils::sample_new_order();
        let stored = Order::from_new_order(" 0xMaKeR ", "Alice", &order, "oid", 150);
        assert_eq!(stored.maker_address, "0xmaker");
        assert_eq!(stored.maker_username, "alice");
        assert_eq!(stored.order_status, OrderStatus::ValidActive);
        assert_eq!(stored.complication_address, "0xcomplication");
    }
}
