//! Aggregate order counters
//!
//! Global, monotonically increasing counters over the order book: item
//! counts and open interest per side. Updates use the store's atomic
//! increment and are best-effort: a failed increment is logged and the
//! order creation proceeds, so the counters may undercount but an order is
//! never lost to a counter failure.

use docstore::{DocRef, DocumentStore};
use std::sync::Arc;

use crate::types::{NewOrder, COUNTERS_DOC, ORDERS_COLL};

const NUM_BUY_ORDER_ITEMS_FIELD: &str = "numBuyOrderItems";
const NUM_SELL_ORDER_ITEMS_FIELD: &str = "numSellOrderItems";
const OPEN_BUY_INTEREST_FIELD: &str = "openBuyInterest";
const OPEN_SELL_INTEREST_FIELD: &str = "openSellInterest";

/// Best-effort aggregate counters over order creation
pub struct OrderCounters {
    store: Arc<dyn DocumentStore>,
}

impl OrderCounters {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Record a created order: bump the side's item count by the order's
    /// item count and the side's open interest by its start price.
    pub async fn record(&self, order: &NewOrder) {
        let doc = DocRef::doc(ORDERS_COLL, COUNTERS_DOC);
        let (items_field, interest_field) = if order.signed_order.is_sell_order {
            (NUM_SELL_ORDER_ITEMS_FIELD, OPEN_SELL_INTEREST_FIELD)
        } else {
            (NUM_BUY_ORDER_ITEMS_FIELD, OPEN_BUY_INTEREST_FIELD)
        };

        if let Err(err) = self
            .store
            .increment(&doc, items_field, order.num_items as f64)
            .await
        {
            tracing::error!(%err, field = items_field, "failed to update order counters");
        }
        if let Err(err) = self
            .store
            .increment(&doc, interest_field, order.start_price_eth)
            .await
        {
            tracing::error!(%err, field = interest_field, "failed to update order counters");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sample_new_order;
    use docstore::MemoryStore;

    #[tokio::test]
    async fn test_sell_order_increments_sell_counters() {
        let store = Arc::new(MemoryStore::new());
        let counters = OrderCounters::new(store.clone());

        let mut order = sample_new_order();
        order.num_items = 3;
        order.start_price_eth = 1.5;
        counters.record(&order).await;
        counters.record(&order).await;

        let doc = store
            .get(&DocRef::doc(ORDERS_COLL, COUNTERS_DOC))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc.get(NUM_SELL_ORDER_ITEMS_FIELD).and_then(|v| v.as_f64()), Some(6.0));
        assert_eq!(doc.get(OPEN_SELL_INTEREST_FIELD).and_then(|v| v.as_f64()), Some(3.0));
        assert!(doc.get(NUM_BUY_ORDER_ITEMS_FIELD).is_none());
    }

    #[tokio::test]
    async fn test_buy_order_increments_buy_counters() {
        let store = Arc::new(MemoryStore::new());
        let counters = OrderCounters::new(store.clone());

        let mut order = sample_new_order();
        order.signed_order.is_sell_order = false;
        counters.record(&order).await;

        let doc = store
            .get(&DocRef::doc(ORDERS_COLL, COUNTERS_DOC))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc.get(NUM_BUY_ORDER_ITEMS_FIELD).and_then(|v| v.as_f64()), Some(1.0));
        assert_eq!(doc.get(OPEN_BUY_INTEREST_FIELD).and_then(|v| v.as_f64()), Some(1.0));
    }
}
