//! Paginated order queries over the flat order-item index
//!
//! Order items are queried as a collection group so one index serves every
//! filter combination. Pages fetch one extra row to detect a next page, and
//! cursors carry the last row's value for every sortable field so a client
//! can switch sort field mid-pagination without restarting.

use common::{trim_lower_case, ChainId, Cursor, OrderDirection};
use docstore::{DocRef, FilterOp, Query};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{OrdersError, OrdersResult};
use crate::ledger::OrderLedger;
use crate::types::{Order, OrderItem, OrderStatus, ORDERS_COLL, ORDER_ITEMS_SUB_COLL};

/// Default page size
pub const DEFAULT_LIMIT: usize = 50;
/// Hard cap on page size
pub const MAX_LIMIT: usize = 100;
/// Price floor applied when only a max price is given
pub const DEFAULT_MIN_PRICE: f64 = 0.000_000_1;
/// Price ceiling applied when only a min price is given
pub const DEFAULT_MAX_PRICE: f64 = 1_000_000.0;
/// The backing index caps `in` filters at this many values
const MAX_COLLECTIONS_FILTER: usize = 10;

/// Sortable order-item fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrderBy {
    StartPriceEth,
    StartTimeMs,
    EndTimeMs,
}

impl OrderBy {
    /// All sortable fields; next-page cursors carry a value for each
    pub const ALL: [OrderBy; 3] = [OrderBy::StartPriceEth, OrderBy::StartTimeMs, OrderBy::EndTimeMs];

    /// The document field this sorts on
    pub fn field(&self) -> &'static str {
        match self {
            OrderBy::StartPriceEth => "startPriceEth",
            OrderBy::StartTimeMs => "startTimeMs",
            OrderBy::EndTimeMs => "endTimeMs",
        }
    }
}

/// Filters for the order-item query
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderQuery {
    pub chain_id: Option<ChainId>,
    /// Defaults to [`OrderStatus::ValidActive`]
    pub order_status: Option<OrderStatus>,
    pub is_sell_order: Option<bool>,
    /// Must equal the authenticated user
    pub maker_address: Option<String>,
    /// Must equal the authenticated user
    pub taker_address: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub num_items: Option<u64>,
    /// Collection allow-list (at most 10)
    pub collections: Vec<String>,
    pub order_by: Option<OrderBy>,
    pub order_direction: Option<OrderDirection>,
    pub limit: Option<usize>,
    pub cursor: Option<String>,
}

/// A token inside a grouped order
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedToken {
    pub token_id: String,
    pub num_tokens: u64,
    pub token_image: String,
    pub token_name: String,
    pub token_slug: String,
    pub taker_address: String,
    pub taker_username: String,
}

/// A logical order: the parent order document plus the page's items for one
/// collection, grouped back together
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderGroup {
    pub order: Order,
    pub collection_address: String,
    pub collection_name: String,
    pub collection_image: String,
    pub has_blue_check: bool,
    pub tokens: Vec<GroupedToken>,
}

/// One page of grouped orders
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderListPage {
    pub data: Vec<OrderGroup>,
    pub cursor: String,
    pub has_next_page: bool,
}

impl OrderLedger {
    /// Run a filtered, ordered, cursored query over the order-item index.
    ///
    /// Maker/taker filters are authorization-scoped: each must equal the
    /// authenticated `user`. A price bound forces price ordering (ascending
    /// unless the caller set an explicit direction), overriding any
    /// requested sort field.
    pub async fn orders(
        &self,
        query: &OrderQuery,
        user: Option<&str>,
    ) -> OrdersResult<OrderListPage> {
        let user = user.map(trim_lower_case);
        for (name, filter) in [
            ("makerAddress", &query.maker_address),
            ("takerAddress", &query.taker_address),
        ] {
            if let Some(address) = filter {
                if user.as_deref() != Some(trim_lower_case(address).as_str()) {
                    return Err(OrdersError::BadQuery(format!(
                        "{} filter must match the authenticated user",
                        name
                    )));
                }
            }
        }
        if query.collections.len() > MAX_COLLECTIONS_FILTER {
            return Err(OrdersError::BadQuery(format!(
                "at most {} collections may be filtered",
                MAX_COLLECTIONS_FILTER
            )));
        }

        // a price bound forces price ordering; otherwise the caller's sort
        // field, defaulting to newest first
        let has_price = query.min_price.is_some() || query.max_price.is_some();
        let (order_by, direction) = if has_price {
            (
                OrderBy::StartPriceEth,
                query.order_direction.unwrap_or(OrderDirection::Asc),
            )
        } else {
            (
                query.order_by.unwrap_or(OrderBy::StartTimeMs),
                query.order_direction.unwrap_or(OrderDirection::Desc),
            )
        };

        let status = query.order_status.unwrap_or(OrderStatus::ValidActive);
        let mut store_query = Query::collection_group(ORDER_ITEMS_SUB_COLL).where_field(
            "orderStatus",
            FilterOp::Eq,
            json!(status),
        );
        if let Some(chain_id) = query.chain_id {
            store_query = store_query.where_field("chainId", FilterOp::Eq, json!(chain_id));
        }
        if let Some(is_sell) = query.is_sell_order {
            store_query = store_query.where_field("isSellOrder", FilterOp::Eq, json!(is_sell));
        }
        if let Some(maker) = &query.maker_address {
            store_query =
                store_query.where_field("makerAddress", FilterOp::Eq, json!(trim_lower_case(maker)));
        }
        if let Some(taker) = &query.taker_address {
            store_query =
                store_query.where_field("takerAddress", FilterOp::Eq, json!(trim_lower_case(taker)));
        }
        if let Some(num_items) = query.num_items {
            store_query = store_query.where_field("numItems", FilterOp::Eq, json!(num_items));
        }
        match query.collections.as_slice() {
            [] => {}
            [single] => {
                store_query = store_query.where_field(
                    "collectionAddress",
                    FilterOp::Eq,
                    json!(trim_lower_case(single)),
                );
            }
            many => {
                let lowered: Vec<String> = many.iter().map(|c| trim_lower_case(c)).collect();
                store_query =
                    store_query.where_field("collectionAddress", FilterOp::In, json!(lowered));
            }
        }
        if has_price {
            store_query = store_query
                .where_field(
                    "startPriceEth",
                    FilterOp::Ge,
                    json!(query.min_price.unwrap_or(DEFAULT_MIN_PRICE)),
                )
                .where_field(
                    "startPriceEth",
                    FilterOp::Le,
                    json!(query.max_price.unwrap_or(DEFAULT_MAX_PRICE)),
                );
        }

        let incoming = Cursor::decode(query.cursor.as_deref().unwrap_or(""));
        store_query = store_query.order_by(order_by.field(), direction);
        if let Some(value) = incoming.get(order_by.field()) {
            store_query = store_query.start_after(value.clone());
        }

        let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        store_query = store_query.limit(limit + 1);

        let mut rows = self.store.run_query(&store_query).await?;
        let has_next_page = rows.len() > limit;
        rows.truncate(limit);

        // next cursor: every sortable field from the last row, so the sort
        // field may change between pages
        let cursor = match rows.last() {
            Some(last) => {
                let mut next = Cursor::new();
                for field in OrderBy::ALL {
                    if let Some(value) = last.get(field.field()) {
                        next.set(field.field(), value.clone());
                    }
                }
                next.encode()
            }
            None => incoming.encode(),
        };

        let items: Vec<OrderItem> = rows
            .into_iter()
            .filter_map(|doc| {
                serde_json::from_value::<OrderItem>(Value::Object(doc))
                    .map_err(|err| {
                        tracing::warn!(%err, "skipping malformed order item");
                    })
                    .ok()
            })
            .collect();

        let data = self.group_items(items).await?;
        Ok(OrderListPage {
            data,
            cursor,
            has_next_page,
        })
    }

    /// Group a page of items into logical orders keyed by
    /// (order id, collection), fetching each distinct parent order once.
    /// Items whose parent order document is missing are dropped with a
    /// warning rather than failing the page.
    async fn group_items(&self, items: Vec<OrderItem>) -> OrdersResult<Vec<OrderGroup>> {
        // first-seen order of groups is preserved
        let mut group_keys: Vec<(String, String)> = Vec::new();
        let mut grouped: std::collections::HashMap<(String, String), Vec<OrderItem>> =
            std::collections::HashMap::new();
        for item in items {
            let key = (item.id.clone(), item.collection_address.clone());
            if !grouped.contains_key(&key) {
                group_keys.push(key.clone());
            }
            grouped.entry(key).or_default().push(item);
        }

        let mut order_ids: Vec<String> = Vec::new();
        let mut seen_ids = std::collections::HashSet::new();
        for (id, _) in &group_keys {
            if seen_ids.insert(id.clone()) {
                order_ids.push(id.clone());
            }
        }
        let refs: Vec<DocRef> = order_ids
            .iter()
            .map(|id| DocRef::doc(ORDERS_COLL, id))
            .collect();
        let fetched = self.store.get_all(&refs).await?;

        let mut orders: std::collections::HashMap<String, Order> = std::collections::HashMap::new();
        for (id, doc) in order_ids.into_iter().zip(fetched) {
            match doc {
                Some(doc) => match serde_json::from_value::<Order>(Value::Object(doc)) {
                    Ok(order) => {
                        orders.insert(id, order);
                    }
                    Err(err) => {
                        tracing::warn!(%err, order_id = %id, "skipping malformed order document");
                    }
                },
                None => {
                    tracing::warn!(order_id = %id, "order item references a missing order");
                }
            }
        }

        let mut groups = Vec::with_capacity(group_keys.len());
        for key in group_keys {
            let items = grouped.remove(&key).unwrap_or_default();
            let Some(order) = orders.get(&key.0) else {
                continue;
            };
            let first = &items[0];
            groups.push(OrderGroup {
                order: order.clone(),
                collection_address: first.collection_address.clone(),
                collection_name: first.collection_name.clone(),
                collection_image: first.collection_image.clone(),
                has_blue_check: first.has_blue_check,
                tokens: items
                    .iter()
                    .map(|item| GroupedToken {
                        token_id: item.token_id.clone(),
                        num_tokens: item.num_tokens,
                        token_image: item.token_image.clone(),
                        token_name: item.token_name.clone(),
                        token_slug: item.token_slug.clone(),
                        taker_address: item.taker_address.clone(),
                        taker_username: item.taker_username.clone(),
                    })
                    .collect(),
            });
        }
        Ok(groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{sample_new_order, seed_collection, seed_token};
    use crate::types::NftToken;
    use assert_matches::assert_matches;
    use chain::MockFeeOracle;
    use docstore::{DocumentStore, MemoryStore, WriteBatch};
    use metadata::{MetadataResolver, NoopIndexer};
    use std::sync::Arc;

    const FAR_FUTURE_MS: i64 = 32_503_680_000_000;

    async fn market_ledger() -> (Arc<MemoryStore>, OrderLedger) {
        let store = Arc::new(MemoryStore::new());
        seed_collection(&store, ChainId::Mainnet, "0xabc").await;
        for id in ["1", "2", "3", "4"] {
            seed_token(&store, ChainId::Mainnet, "0xabc", id).await;
        }
        let resolver = Arc::new(MetadataResolver::new(store.clone(), Arc::new(NoopIndexer)));
        let ledger = OrderLedger::new(store.clone(), resolver, Arc::new(MockFeeOracle::new()));
        (store, ledger)
    }

    /// Create a sell order for one token with the given nonce, price, and
    /// start time (end time far in the future so the order is active)
    async fn create_order(ledger: &OrderLedger, nonce: u64, token: &str, price: f64, start: i64) {
        let mut order = sample_new_order();
        order.nonce = nonce.to_string();
        order.start_price_eth = price;
        order.end_price_eth = price;
        order.start_time_ms = start;
        order.end_time_ms = FAR_FUTURE_MS;
        order.signed_order.constraints = vec![nonce.to_string()];
        order.signed_order.nfts[0].tokens = vec![NftToken {
            token_id: token.to_string(),
            num_tokens: 1,
        }];
        ledger.create_orders("0xmaker", &[order]).await.unwrap();
    }

    #[tokio::test]
    async fn test_default_query_returns_active_newest_first() {
        let (_, ledger) = market_ledger().await;
        create_order(&ledger, 1, "1", 1.0, 100).await;
        create_order(&ledger, 2, "2", 2.0, 200).await;
        create_order(&ledger, 3, "3", 3.0, 300).await;

        let page = ledger.orders(&OrderQuery::default(), None).await.unwrap();
        assert_eq!(page.data.len(), 3);
        assert!(!page.has_next_page);
        let starts: Vec<i64> = page.data.iter().map(|g| g.order.start_time_ms).collect();
        assert_eq!(starts, vec![300, 200, 100]);
    }

    #[tokio::test]
    async fn test_limit_and_cursor_pagination() {
        let (_, ledger) = market_ledger().await;
        for (i, token) in ["1", "2", "3"].iter().enumerate() {
            create_order(&ledger, i as u64 + 1, token, 1.0, (i as i64 + 1) * 100).await;
        }

        let query = OrderQuery {
            limit: Some(2),
            ..Default::default()
        };
        let first = ledger.orders(&query, None).await.unwrap();
        assert_eq!(first.data.len(), 2);
        assert!(first.has_next_page);

        let query = OrderQuery {
            limit: Some(2),
            cursor: Some(first.cursor.clone()),
            ..Default::default()
        };
        let second = ledger.orders(&query, None).await.unwrap();
        assert_eq!(second.data.len(), 1);
        assert!(!second.has_next_page);
        assert_eq!(second.data[0].order.start_time_ms, 100);
    }

    #[tokio::test]
    async fn test_price_filter_forces_price_ordering() {
        let (_, ledger) = market_ledger().await;
        create_order(&ledger, 1, "1", 5.0, 100).await;
        create_order(&ledger, 2, "2", 1.0, 200).await;
        create_order(&ledger, 3, "3", 3.0, 300).await;

        // caller asks for time ordering, price bound overrides to price asc
        let query = OrderQuery {
            min_price: Some(0.5),
            max_price: Some(10.0),
            order_by: Some(OrderBy::StartTimeMs),
            ..Default::default()
        };
        let page = ledger.orders(&query, None).await.unwrap();
        let prices: Vec<f64> = page.data.iter().map(|g| g.order.start_price_eth).collect();
        assert_eq!(prices, vec![1.0, 3.0, 5.0]);
    }

    #[tokio::test]
    async fn test_price_bounds_filter_rows() {
        let (_, ledger) = market_ledger().await;
        create_order(&ledger, 1, "1", 1.0, 100).await;
        create_order(&ledger, 2, "2", 3.0, 200).await;
        create_order(&ledger, 3, "3", 5.0, 300).await;

        let query = OrderQuery {
            min_price: Some(2.0),
            max_price: Some(4.0),
            ..Default::default()
        };
        let page = ledger.orders(&query, None).await.unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].order.start_price_eth, 3.0);
    }

    #[tokio::test]
    async fn test_cursor_carries_every_sort_field() {
        let (_, ledger) = market_ledger().await;
        create_order(&ledger, 1, "1", 1.0, 100).await;
        create_order(&ledger, 2, "2", 2.0, 200).await;

        let query = OrderQuery {
            limit: Some(1),
            ..Default::default()
        };
        let page = ledger.orders(&query, None).await.unwrap();
        let cursor = Cursor::decode(&page.cursor);
        for field in OrderBy::ALL {
            assert!(cursor.get(field.field()).is_some(), "missing {}", field.field());
        }

        // switch sort field mid-pagination: the cursor still applies
        let query = OrderQuery {
            limit: Some(1),
            order_by: Some(OrderBy::StartPriceEth),
            order_direction: Some(OrderDirection::Desc),
            cursor: Some(page.cursor),
            ..Default::default()
        };
        let second = ledger.orders(&query, None).await.unwrap();
        assert_eq!(second.data.len(), 1);
        assert_eq!(second.data[0].order.start_price_eth, 1.0);
    }

    #[tokio::test]
    async fn test_maker_filter_requires_matching_user() {
        let (_, ledger) = market_ledger().await;
        create_order(&ledger, 1, "1", 1.0, 100).await;

        let query = OrderQuery {
            maker_address: Some("0xmaker".to_string()),
            ..Default::default()
        };

        let err = ledger.orders(&query, None).await.unwrap_err();
        assert_matches!(err, OrdersError::BadQuery(_));

        let err = ledger.orders(&query, Some("0xsomeoneelse")).await.unwrap_err();
        assert_matches!(err, OrdersError::BadQuery(_));

        let page = ledger.orders(&query, Some("0xMAKER")).await.unwrap();
        assert_eq!(page.data.len(), 1);
    }

    #[tokio::test]
    async fn test_sell_side_and_status_filters() {
        let (_, ledger) = market_ledger().await;
        create_order(&ledger, 1, "1", 1.0, 100).await;
        // an expired order is inactive and excluded by the default filter
        let mut expired = sample_new_order();
        expired.nonce = "2".to_string();
        expired.signed_order.constraints = vec!["2".to_string()];
        expired.signed_order.nfts[0].tokens = vec![NftToken {
            token_id: "2".to_string(),
            num_tokens: 1,
        }];
        ledger.create_orders("0xmaker", &[expired]).await.unwrap();

        let page = ledger.orders(&OrderQuery::default(), None).await.unwrap();
        assert_eq!(page.data.len(), 1);

        let query = OrderQuery {
            order_status: Some(OrderStatus::ValidInactive),
            ..Default::default()
        };
        let page = ledger.orders(&query, None).await.unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].tokens[0].token_id, "2");

        let query = OrderQuery {
            is_sell_order: Some(false),
            ..Default::default()
        };
        let page = ledger.orders(&query, None).await.unwrap();
        assert!(page.data.is_empty());
    }

    #[tokio::test]
    async fn test_multi_token_order_groups_into_one_entry() {
        let (_, ledger) = market_ledger().await;
        let mut order = sample_new_order();
        order.num_items = 2;
        order.end_time_ms = FAR_FUTURE_MS;
        order.signed_order.nfts[0].tokens = vec![
            NftToken {
                token_id: "1".to_string(),
                num_tokens: 1,
            },
            NftToken {
                token_id: "2".to_string(),
                num_tokens: 1,
            },
        ];
        ledger.create_orders("0xmaker", &[order]).await.unwrap();

        let page = ledger.orders(&OrderQuery::default(), None).await.unwrap();
        assert_eq!(page.data.len(), 1);
        let mut token_ids: Vec<&str> =
            page.data[0].tokens.iter().map(|t| t.token_id.as_str()).collect();
        token_ids.sort_unstable();
        assert_eq!(token_ids, vec!["1", "2"]);
    }

    #[tokio::test]
    async fn test_orphan_item_is_skipped_not_fatal() {
        let (store, ledger) = market_ledger().await;
        create_order(&ledger, 1, "1", 1.0, 100).await;

        // an item whose parent order document is gone
        let mut batch = WriteBatch::new();
        let orphan = DocRef::doc(ORDERS_COLL, "missing-order")
            .child(ORDER_ITEMS_SUB_COLL, "orphan-item");
        batch.set(
            orphan,
            serde_json::json!({
                "id": "missing-order",
                "orderStatus": "validActive",
                "chainId": "1",
                "isSellOrder": true,
                "numItems": 1,
                "startPriceEth": 9.0,
                "endPriceEth": 9.0,
                "currencyAddress": "", "complicationAddress": "",
                "startTimeMs": 900, "endTimeMs": FAR_FUTURE_MS,
                "makerAddress": "0xmaker", "makerUsername": "",
                "takerAddress": "", "takerUsername": "",
                "collectionAddress": "0xabc", "collectionName": "", "collectionImage": "",
                "collectionSlug": "", "hasBlueCheck": false,
                "tokenId": "9", "numTokens": 1,
                "tokenImage": "", "tokenName": "", "tokenSlug": "",
                "attributes": [],
            }),
            false,
        );
        store.commit(batch).await.unwrap();

        let page = ledger.orders(&OrderQuery::default(), None).await.unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].tokens[0].token_id, "1");
    }

    #[tokio::test]
    async fn test_collections_allow_list() {
        let (_, ledger) = market_ledger().await;
        create_order(&ledger, 1, "1", 1.0, 100).await;

        let query = OrderQuery {
            collections: vec!["0xABC".to_string()],
            ..Default::default()
        };
        let page = ledger.orders(&query, None).await.unwrap();
        assert_eq!(page.data.len(), 1);

        let query = OrderQuery {
            collections: vec!["0xother".to_string()],
            ..Default::default()
        };
        let page = ledger.orders(&query, None).await.unwrap();
        assert!(page.data.is_empty());

        let query = OrderQuery {
            collections: (0..11).map(|i| format!("0x{}", i)).collect(),
            ..Default::default()
        };
        assert_matches!(
            ledger.orders(&query, None).await.unwrap_err(),
            OrdersError::BadQuery(_)
        );
    }
}
