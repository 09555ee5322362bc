//! Order match queries
//!
//! Order matches are precomputed listing/offer pairings written by the
//! matching pipeline; this service only reads them. A user's matches come
//! from two independently filtered, ordered, and cursored sub-queries (one
//! where the user listed, one where the user offered) merged into a single
//! ordered page. The merged set must be re-sorted: each sub-query is
//! ordered on its own, so plain concatenation is not globally ordered.

use common::{trim_lower_case, Cursor, OrderDirection};
use docstore::{cmp_values, DocumentStore, FilterOp, Query};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::OrdersResult;
use crate::query::{DEFAULT_LIMIT, MAX_LIMIT};
use crate::types::{OrderMatch, ORDER_MATCHES_COLL};

/// Sub-cursor key and address field per query class
const CLASSES: [(&str, &str); 2] = [
    ("listings", "listerAddress"),
    ("offers", "offererAddress"),
];

/// Sortable order-match fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchOrderBy {
    Timestamp,
    PriceEth,
}

impl MatchOrderBy {
    pub fn field(&self) -> &'static str {
        match self {
            MatchOrderBy::Timestamp => "timestamp",
            MatchOrderBy::PriceEth => "priceEth",
        }
    }
}

/// Filters for the order-match query
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MatchQuery {
    pub collection_address: Option<String>,
    /// Requires `collection_address`
    pub token_id: Option<String>,
    /// Defaults to [`MatchOrderBy::Timestamp`]
    pub order_by: Option<MatchOrderBy>,
    /// Defaults to descending
    pub order_direction: Option<OrderDirection>,
    pub limit: Option<usize>,
    /// Opaque cursor wrapping one sub-cursor per query class
    pub cursor: Option<String>,
}

/// One page of merged matches
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchPage {
    pub data: Vec<OrderMatch>,
    pub cursor: String,
    pub has_next_page: bool,
}

/// Reads the precomputed order-match collection
pub struct MatchQueryService {
    store: Arc<dyn DocumentStore>,
}

impl MatchQueryService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Fetch a user's order matches: listings they authored and offers they
    /// made, merged and re-sorted into one page.
    ///
    /// Each sub-query fetches `limit + 1` rows; the next-page flag comes
    /// from the pre-truncation merged length, and each class's next cursor
    /// from the last row of that class in the pre-truncation merged list.
    pub async fn order_matches(&self, user: &str, query: &MatchQuery) -> OrdersResult<MatchPage> {
        let user = trim_lower_case(user);
        let order_by = query.order_by.unwrap_or(MatchOrderBy::Timestamp);
        let field = order_by.field();
        let direction = query.order_direction.unwrap_or(OrderDirection::Desc);
        let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

        let outer = Cursor::decode(query.cursor.as_deref().unwrap_or(""));

        let mut merged: Vec<(usize, docstore::Document)> = Vec::new();
        for (class_idx, (cursor_key, address_field)) in CLASSES.iter().enumerate() {
            let mut store_query = Query::collection(ORDER_MATCHES_COLL)
                .where_field(*address_field, FilterOp::Eq, json!(user))
                .order_by(field, direction)
                .limit(limit + 1);

            if let Some(collection) = &query.collection_address {
                let collection = trim_lower_case(collection);
                store_query = match &query.token_id {
                    Some(token_id) => store_query.where_field(
                        "tokens",
                        FilterOp::ArrayContains,
                        json!(format!("{}:{}", collection, token_id.trim())),
                    ),
                    None => store_query.where_field(
                        "collectionAddresses",
                        FilterOp::ArrayContains,
                        json!(collection),
                    ),
                };
            }

            let sub_cursor = outer
                .get(cursor_key)
                .and_then(Value::as_str)
                .map(Cursor::decode)
                .unwrap_or_default();
            if let Some(value) = sub_cursor.get(field) {
                store_query = store_query.start_after(value.clone());
            }

            let rows = self.store.run_query(&store_query).await?;
            merged.extend(rows.into_iter().map(|doc| (class_idx, doc)));
        }

        merged.sort_by(|(_, a), (_, b)| {
            let va = a.get(field).unwrap_or(&Value::Null);
            let vb = b.get(field).unwrap_or(&Value::Null);
            match direction {
                OrderDirection::Asc => cmp_values(va, vb),
                OrderDirection::Desc => cmp_values(vb, va),
            }
        });

        let has_next_page = merged.len() > limit;

        // per-class cursors from the last row of each class before
        // truncation
        let mut class_positions: [Option<Value>; CLASSES.len()] = Default::default();
        for (class_idx, doc) in merged.iter().rev() {
            if class_positions[*class_idx].is_none() {
                class_positions[*class_idx] = doc.get(field).cloned();
            }
            if class_positions.iter().all(Option::is_some) {
                break;
            }
        }

        let mut next = Cursor::new();
        for (class_idx, (cursor_key, _)) in CLASSES.iter().enumerate() {
            match &class_positions[class_idx] {
                Some(value) => {
                    let mut sub = Cursor::new();
                    sub.set(field, value.clone());
                    next.set(*cursor_key, Value::String(sub.encode()));
                }
                None => {
                    // class returned nothing this page: keep its position
                    if let Some(prior) = outer.get(cursor_key) {
                        next.set(*cursor_key, prior.clone());
                    }
                }
            }
        }

        merged.truncate(limit);
        let data: Vec<OrderMatch> = merged
            .into_iter()
            .filter_map(|(_, doc)| {
                serde_json::from_value::<OrderMatch>(Value::Object(doc))
                    .map_err(|err| {
                        tracing::warn!(%err, "skipping malformed order match");
                    })
                    .ok()
            })
            .collect();

        Ok(MatchPage {
            data,
            cursor: next.encode(),
            has_next_page,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docstore::{DocRef, MemoryStore, WriteBatch};

    async fn seed_match(
        store: &MemoryStore,
        id: &str,
        lister: &str,
        offerer: &str,
        timestamp: i64,
        price: f64,
    ) {
        let mut batch = WriteBatch::new();
        batch.set(
            DocRef::doc(ORDER_MATCHES_COLL, id),
            json!({
                "id": id,
                "chainId": "1",
                "listerAddress": lister,
                "offererAddress": offerer,
                "collectionAddresses": ["0xabc"],
                "tokens": [format!("0xabc:{}", id)],
                "timestamp": timestamp,
                "priceEth": price,
            }),
            false,
        );
        store.commit(batch).await.unwrap();
    }

    async fn service_with_matches() -> (Arc<MemoryStore>, MatchQueryService) {
        let store = Arc::new(MemoryStore::new());
        // user lists at t=100, 300, 500 and offers at t=200, 400
        seed_match(&store, "l1", "0xuser", "0xother", 100, 1.0).await;
        seed_match(&store, "l2", "0xuser", "0xother", 300, 3.0).await;
        seed_match(&store, "l3", "0xuser", "0xother", 500, 5.0).await;
        seed_match(&store, "o1", "0xother", "0xuser", 200, 2.0).await;
        seed_match(&store, "o2", "0xother", "0xuser", 400, 4.0).await;
        let service = MatchQueryService::new(store.clone());
        (store, service)
    }

    #[tokio::test]
    async fn test_merged_page_is_globally_ordered() {
        let (_, service) = service_with_matches().await;
        let page = service
            .order_matches("0xUser", &MatchQuery::default())
            .await
            .unwrap();

        assert_eq!(page.data.len(), 5);
        assert!(!page.has_next_page);
        let timestamps: Vec<i64> = page.data.iter().map(|m| m.timestamp).collect();
        assert_eq!(timestamps, vec![500, 400, 300, 200, 100]);
    }

    #[tokio::test]
    async fn test_truncation_and_next_page_flag() {
        let (_, service) = service_with_matches().await;
        let query = MatchQuery {
            limit: Some(3),
            ..Default::default()
        };
        let page = service.order_matches("0xuser", &query).await.unwrap();

        assert_eq!(page.data.len(), 3);
        assert!(page.has_next_page);
        let timestamps: Vec<i64> = page.data.iter().map(|m| m.timestamp).collect();
        assert_eq!(timestamps, vec![500, 400, 300]);
    }

    #[tokio::test]
    async fn test_per_class_cursors_resume_both_classes() {
        let (_, service) = service_with_matches().await;
        let query = MatchQuery {
            limit: Some(4),
            ..Default::default()
        };
        let first = service.order_matches("0xuser", &query).await.unwrap();
        assert!(first.has_next_page);

        let outer = Cursor::decode(&first.cursor);
        assert!(outer.get("listings").is_some());
        assert!(outer.get("offers").is_some());

        let query = MatchQuery {
            limit: Some(4),
            cursor: Some(first.cursor),
            ..Default::default()
        };
        let second = service.order_matches("0xuser", &query).await.unwrap();
        assert!(!second.has_next_page);
        // every sub-query was exhausted on the first page (limit+1 = 5
        // covered all rows of each class), so the cursors point past the end
        assert!(second.data.is_empty());
    }

    #[tokio::test]
    async fn test_ascending_price_ordering() {
        let (_, service) = service_with_matches().await;
        let query = MatchQuery {
            order_by: Some(MatchOrderBy::PriceEth),
            order_direction: Some(OrderDirection::Asc),
            ..Default::default()
        };
        let page = service.order_matches("0xuser", &query).await.unwrap();
        let prices: Vec<f64> = page.data.iter().map(|m| m.price_eth).collect();
        assert_eq!(prices, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[tokio::test]
    async fn test_collection_and_token_filters() {
        let (store, service) = service_with_matches().await;
        seed_match(&store, "x1", "0xuser", "0xother", 600, 6.0).await;
        // rewrite x1 against a different collection
        let mut batch = WriteBatch::new();
        batch.set(
            DocRef::doc(ORDER_MATCHES_COLL, "x1"),
            json!({"collectionAddresses": ["0xdef"], "tokens": ["0xdef:x1"]}),
            true,
        );
        store.commit(batch).await.unwrap();

        let query = MatchQuery {
            collection_address: Some("0xDEF".to_string()),
            ..Default::default()
        };
        let page = service.order_matches("0xuser", &query).await.unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].id, "x1");

        let query = MatchQuery {
            collection_address: Some("0xabc".to_string()),
            token_id: Some("l2".to_string()),
            ..Default::default()
        };
        let page = service.order_matches("0xuser", &query).await.unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].id, "l2");
    }

    #[tokio::test]
    async fn test_user_with_no_matches() {
        let (_, service) = service_with_matches().await;
        let page = service
            .order_matches("0xnobody", &MatchQuery::default())
            .await
            .unwrap();
        assert!(page.data.is_empty());
        assert!(!page.has_next_page);
        assert_eq!(page.cursor, "");
    }
}
