//! Activity feed events
//!
//! Every created order appends one event to the feed collection: a
//! listing/offer event when the order carries exactly one item, or a
//! multi-order event otherwise. Events are append-only and never read back
//! by the ledger.

use docstore::{DocRef, WriteBatch};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{OrdersError, OrdersResult};
use crate::types::{Order, OrderItem, FEED_COLL};

/// Feed event discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FeedEventType {
    NftListing,
    NftOffer,
}

impl FeedEventType {
    fn for_order(is_sell_order: bool) -> Self {
        if is_sell_order {
            FeedEventType::NftListing
        } else {
            FeedEventType::NftOffer
        }
    }
}

/// Feed event for a single-item order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleOrderEvent {
    #[serde(rename = "type")]
    pub event_type: FeedEventType,
    pub order_id: String,
    pub order_item_id: String,
    pub is_sell_order: bool,
    pub payment_token: String,
    pub quantity: u64,
    pub start_price_eth: f64,
    pub end_price_eth: f64,
    pub start_time_ms: i64,
    pub end_time_ms: i64,
    pub maker_username: String,
    pub maker_address: String,
    pub taker_username: String,
    pub taker_address: String,
    pub users_involved: Vec<String>,
    pub chain_id: String,
    pub collection_address: String,
    pub collection_name: String,
    pub collection_slug: String,
    pub collection_profile_image: String,
    pub has_blue_check: bool,
    pub token_id: String,
    pub image: String,
    pub nft_name: String,
    pub nft_slug: String,
    pub likes: u64,
    pub comments: u64,
    pub timestamp: i64,
}

/// One item inside a multi-order feed event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedOrderItem {
    pub order_item_id: String,
    pub taker_username: String,
    pub taker_address: String,
    pub users_involved: Vec<String>,
    pub chain_id: String,
    pub collection_address: String,
    pub collection_name: String,
    pub collection_slug: String,
    pub collection_profile_image: String,
    pub has_blue_check: bool,
    pub token_id: String,
    pub image: String,
    pub nft_name: String,
    pub nft_slug: String,
}

/// Feed event for an order spanning zero or several items
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiOrderEvent {
    #[serde(rename = "type")]
    pub event_type: FeedEventType,
    pub title: String,
    pub order_id: String,
    pub chain_id: String,
    pub is_sell_order: bool,
    pub payment_token: String,
    pub quantity: u64,
    pub start_price_eth: f64,
    pub end_price_eth: f64,
    pub start_time_ms: i64,
    pub end_time_ms: i64,
    pub maker_address: String,
    pub maker_username: String,
    pub order_items: Vec<FeedOrderItem>,
    pub sample_images: Vec<String>,
    pub likes: u64,
    pub comments: u64,
    pub timestamp: i64,
}

fn users_involved(maker: &str, taker: &str) -> Vec<String> {
    [maker, taker]
        .iter()
        .filter(|a| !a.is_empty())
        .map(|a| a.to_string())
        .collect()
}

/// Stage the feed event for a created order into the write batch.
///
/// Exactly one item produces a listing/offer event; zero or more than one
/// produce a multi-order event.
pub fn stage_feed_events(
    batch: &mut WriteBatch,
    order: &Order,
    items: &[(String, OrderItem)],
    now_ms: i64,
) -> OrdersResult<()> {
    let event = match items {
        [(item_id, item)] => {
            let event = SingleOrderEvent {
                event_type: FeedEventType::for_order(order.is_sell_order),
                order_id: order.id.clone(),
                order_item_id: item_id.clone(),
                is_sell_order: order.is_sell_order,
                payment_token: order.currency_address.clone(),
                quantity: item.num_tokens,
                start_price_eth: item.start_price_eth,
                end_price_eth: item.end_price_eth,
                start_time_ms: item.start_time_ms,
                end_time_ms: item.end_time_ms,
                maker_username: item.maker_username.clone(),
                maker_address: item.maker_address.clone(),
                taker_username: item.taker_username.clone(),
                taker_address: item.taker_address.clone(),
                users_involved: users_involved(&item.maker_address, &item.taker_address),
                chain_id: item.chain_id.as_str().to_string(),
                collection_address: item.collection_address.clone(),
                collection_name: item.collection_name.clone(),
                collection_slug: item.collection_slug.clone(),
                collection_profile_image: item.collection_image.clone(),
                has_blue_check: item.has_blue_check,
                token_id: item.token_id.clone(),
                image: item.token_image.clone(),
                nft_name: item.token_name.clone(),
                nft_slug: item.token_slug.clone(),
                likes: 0,
                comments: 0,
                timestamp: now_ms,
            };
            serde_json::to_value(event)
        }
        _ => {
            let order_items: Vec<FeedOrderItem> = items
                .iter()
                .map(|(item_id, item)| FeedOrderItem {
                    order_item_id: item_id.clone(),
                    taker_username: item.taker_username.clone(),
                    taker_address: item.taker_address.clone(),
                    users_involved: users_involved(&item.maker_address, &item.taker_address),
                    chain_id: item.chain_id.as_str().to_string(),
                    collection_address: item.collection_address.clone(),
                    collection_name: item.collection_name.clone(),
                    collection_slug: item.collection_slug.clone(),
                    collection_profile_image: item.collection_image.clone(),
                    has_blue_check: item.has_blue_check,
                    token_id: item.token_id.clone(),
                    image: item.token_image.clone(),
                    nft_name: item.token_name.clone(),
                    nft_slug: item.token_slug.clone(),
                })
                .collect();
            let sample_images = items
                .iter()
                .take(3)
                .map(|(_, item)| item.token_image.clone())
                .collect();
            let event = MultiOrderEvent {
                event_type: FeedEventType::for_order(order.is_sell_order),
                title: "Multi Order".to_string(),
                order_id: order.id.clone(),
                chain_id: order.chain_id.as_str().to_string(),
                is_sell_order: order.is_sell_order,
                payment_token: order.currency_address.clone(),
                quantity: order.num_items,
                start_price_eth: order.start_price_eth,
                end_price_eth: order.end_price_eth,
                start_time_ms: order.start_time_ms,
                end_time_ms: order.end_time_ms,
                maker_address: order.maker_address.clone(),
                maker_username: order.maker_username.clone(),
                order_items,
                sample_images,
                likes: 0,
                comments: 0,
                timestamp: now_ms,
            };
            serde_json::to_value(event)
        }
    }
    .map_err(|e| OrdersError::Serialization(e.to_string()))?;

    let doc = DocRef::doc(FEED_COLL, &Uuid::new_v4().to_string());
    batch.set(doc, event, false);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sample_new_order;
    use crate::types::{Order, OrderStatus};
    use common::ChainId;
    use serde_json::Value;

    fn sample_order() -> Order {
        Order::from_new_order("0xmaker", "alice", &sample_new_order(), "oid", 150)
    }

    fn sample_item(token_id: &str) -> (String, OrderItem) {
        (
            format!("item-{}", token_id),
            OrderItem {
                id: "oid".to_string(),
                order_status: OrderStatus::ValidActive,
                chain_id: ChainId::Mainnet,
                is_sell_order: true,
                num_items: 1,
                start_price_eth: 1.0,
                end_price_eth: 1.0,
                currency_address: "0xcurrency".to_string(),
                complication_address: "0xcomplication".to_string(),
                start_time_ms: 100,
                end_time_ms: 200,
                maker_address: "0xmaker".to_string(),
                maker_username: "alice".to_string(),
                taker_address: String::new(),
                taker_username: String::new(),
                collection_address: "0xabc".to_string(),
                collection_name: "Test Collection".to_string(),
                collection_image: "img".to_string(),
                collection_slug: "test-collection".to_string(),
                has_blue_check: true,
                token_id: token_id.to_string(),
                num_tokens: 1,
                token_image: format!("https://img/{}", token_id),
                token_name: format!("Token #{}", token_id),
                token_slug: format!("token-{}", token_id),
                attributes: Vec::new(),
            },
        )
    }

    #[test]
    fn test_single_item_stages_listing_event() {
        let mut batch = WriteBatch::new();
        let items = vec![sample_item("1")];
        stage_feed_events(&mut batch, &sample_order(), &items, 150).unwrap();

        assert_eq!(batch.len(), 1);
        let write = &batch.writes()[0];
        assert!(write.doc.path().starts_with("feed/"));
        assert_eq!(write.data.get("type"), Some(&Value::from("nftListing")));
        assert_eq!(write.data.get("tokenId"), Some(&Value::from("1")));
        assert_eq!(
            write.data.get("usersInvolved"),
            Some(&serde_json::json!(["0xmaker"]))
        );
    }

    #[test]
    fn test_multiple_items_stage_multi_event() {
        let mut batch = WriteBatch::new();
        let items = vec![sample_item("1"), sample_item("2")];
        stage_feed_events(&mut batch, &sample_order(), &items, 150).unwrap();

        assert_eq!(batch.len(), 1);
        let write = &batch.writes()[0];
        assert_eq!(write.data.get("title"), Some(&Value::from("Multi Order")));
        let order_items = write.data.get("orderItems").unwrap().as_array().unwrap();
        assert_eq!(order_items.len(), 2);
        let samples = write.data.get("sampleImages").unwrap().as_array().unwrap();
        assert_eq!(samples.len(), 2);
    }

    #[test]
    fn test_offer_event_type() {
        let mut batch = WriteBatch::new();
        let mut order = sample_order();
        order.is_sell_order = false;
        let items = vec![sample_item("1")];
        stage_feed_events(&mut batch, &order, &items, 150).unwrap();
        assert_eq!(
            batch.writes()[0].data.get("type"),
            Some(&Value::from("nftOffer"))
        );
    }
}
