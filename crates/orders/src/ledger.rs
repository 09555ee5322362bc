//! Order ledger - the order creation write path
//!
//! `create_orders` turns a batch of signed orders into one atomic write:
//! the canonical order documents, their fan-out order items, and the feed
//! events all land together or not at all. Nonce claims happen first, per
//! order, outside the batch; aggregate counters are incremented
//! best-effort alongside it.

use chain::FeeOracle;
use chrono::Utc;
use common::{doc_id_hash, order_hash, trim_lower_case, ChainId};
use docstore::{DocRef, DocumentStore, WriteBatch};
use metadata::{MetadataResolver, NftTargets, OrderMetadata};
use std::sync::Arc;

use crate::counters::OrderCounters;
use crate::error::{OrdersError, OrdersResult};
use crate::types::{
    ChainNfts, NewOrder, NftToken, Order, OrderItem, ORDERS_COLL, ORDER_ITEMS_SUB_COLL,
};
use crate::{feed, fees, nonce, users};

/// Outcome of a `create_orders` call
#[derive(Debug, Default)]
pub struct CreatedOrders {
    /// Ids of orders staged and committed
    pub created: Vec<String>,
    /// Orders rejected for a stale nonce; siblings were still committed
    pub rejected: Vec<RejectedOrder>,
}

/// A single order rejected within a batch
#[derive(Debug)]
pub struct RejectedOrder {
    pub nonce: String,
    pub reason: String,
}

/// The order ledger service
pub struct OrderLedger {
    pub(crate) store: Arc<dyn DocumentStore>,
    metadata: Arc<MetadataResolver>,
    oracle: Arc<dyn FeeOracle>,
    counters: OrderCounters,
}

impl OrderLedger {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        metadata: Arc<MetadataResolver>,
        oracle: Arc<dyn FeeOracle>,
    ) -> Self {
        let counters = OrderCounters::new(store.clone());
        Self {
            store,
            metadata,
            oracle,
            counters,
        }
    }

    /// Ingest a batch of signed orders for a maker.
    ///
    /// Metadata for the whole batch is resolved up front and fails closed.
    /// Each order then claims its nonce: a stale nonce rejects that order
    /// only, siblings proceed. All staged documents commit in one atomic
    /// batch; if every order was rejected the call fails with the first
    /// nonce error instead of committing nothing silently.
    pub async fn create_orders(
        &self,
        maker: &str,
        orders: &[NewOrder],
    ) -> OrdersResult<CreatedOrders> {
        let maker = trim_lower_case(maker);
        let maker_username = users::resolve_username(&*self.store, &maker).await;

        let targets: Vec<NftTargets> = orders
            .iter()
            .flat_map(|order| {
                order.signed_order.nfts.iter().map(move |nft| NftTargets {
                    chain_id: order.chain_id,
                    collection: nft.collection.clone(),
                    token_ids: nft.tokens.iter().map(|t| t.token_id.clone()).collect(),
                })
            })
            .collect();
        let meta = self.metadata.order_metadata(&targets).await?;

        let now_ms = Utc::now().timestamp_millis();
        let mut batch = WriteBatch::new();
        let mut outcome = CreatedOrders::default();

        for order in orders {
            match nonce::claim_nonce(&*self.store, &maker, order.chain_id, &order.nonce).await {
                Ok(()) => {}
                Err(OrdersError::InvalidNonce { nonce, .. }) => {
                    outcome.rejected.push(RejectedOrder {
                        nonce,
                        reason: "invalid or stale nonce".to_string(),
                    });
                    continue;
                }
                Err(err) => return Err(err),
            }

            let order_id = self
                .stage_order(&mut batch, &maker, &maker_username, order, &meta, now_ms)
                .await?;
            self.counters.record(order).await;
            outcome.created.push(order_id);
        }

        if outcome.created.is_empty() {
            if let Some(first) = outcome.rejected.first() {
                return Err(OrdersError::InvalidNonce {
                    maker,
                    nonce: first.nonce.clone(),
                });
            }
            return Ok(outcome);
        }

        self.store.commit(batch).await.map_err(|err| {
            tracing::error!(%err, maker = %maker, "failed to commit order batch");
            err
        })?;

        tracing::info!(
            maker = %maker,
            created = outcome.created.len(),
            rejected = outcome.rejected.len(),
            "orders created"
        );
        Ok(outcome)
    }

    /// Issue the next order nonce for a user
    pub async fn order_nonce(&self, user: &str, chain_id: ChainId) -> OrdersResult<String> {
        nonce::issue_nonce(&*self.store, user, chain_id).await
    }

    /// Minimum total fee floor across collections (see [`fees::min_bps`])
    pub async fn min_fee_bps(&self, chain_id: ChainId, collections: &[String]) -> u32 {
        fees::min_bps(&*self.oracle, chain_id, collections).await
    }

    /// Stage one order and its fan-out order items into the batch
    async fn stage_order(
        &self,
        batch: &mut WriteBatch,
        maker: &str,
        maker_username: &str,
        order: &NewOrder,
        meta: &OrderMetadata,
        now_ms: i64,
    ) -> OrdersResult<String> {
        let order_id = order_hash(&order.signed_order);
        let stored = Order::from_new_order(maker, maker_username, order, &order_id, now_ms);
        let order_ref = DocRef::doc(ORDERS_COLL, &order_id);
        batch.set(order_ref.clone(), to_doc(&stored)?, true);

        let mut items: Vec<(String, OrderItem)> = Vec::new();
        for nft in &order.signed_order.nfts {
            if nft.tokens.is_empty() {
                // collection-wide order: one synthetic item covering any token
                items.push(self.build_order_item(&stored, nft, None, meta).await?);
            } else {
                for token in &nft.tokens {
                    items.push(self.build_order_item(&stored, nft, Some(token), meta).await?);
                }
            }
        }
        for (item_id, item) in &items {
            batch.set(
                order_ref.child(ORDER_ITEMS_SUB_COLL, item_id),
                to_doc(item)?,
                true,
            );
        }

        feed::stage_feed_events(batch, &stored, &items, now_ms)?;
        Ok(order_id)
    }

    /// Build one order item at its deterministic document id.
    ///
    /// For buy orders with a concrete token the taker is resolved eagerly
    /// from the current on-chain owner; the owner's username is best-effort.
    async fn build_order_item(
        &self,
        order: &Order,
        nft: &ChainNfts,
        token: Option<&NftToken>,
        meta: &OrderMetadata,
    ) -> OrdersResult<(String, OrderItem)> {
        let (token_id, num_tokens) = match token {
            Some(t) => (t.token_id.trim().to_string(), t.num_tokens),
            // collection-wide default, for both ERC-721 and ERC-1155
            None => (String::new(), 1),
        };

        let (taker_address, taker_username) = if !order.is_sell_order && !token_id.is_empty() {
            let owner = self
                .oracle
                .erc721_owner(order.chain_id, &nft.collection, &token_id)
                .await?;
            let owner = trim_lower_case(&owner);
            let username = users::resolve_username(&*self.store, &owner).await;
            (owner, username)
        } else {
            (String::new(), String::new())
        };

        let collection = meta
            .collection(order.chain_id, &nft.collection)
            .cloned()
            .unwrap_or_default();
        let token_record = meta
            .token(order.chain_id, &nft.collection, &token_id)
            .cloned()
            .unwrap_or_default();

        let item = OrderItem {
            id: order.id.clone(),
            order_status: order.order_status,
            chain_id: order.chain_id,
            is_sell_order: order.is_sell_order,
            num_items: order.num_items,
            start_price_eth: order.start_price_eth,
            end_price_eth: order.end_price_eth,
            currency_address: order.currency_address.clone(),
            complication_address: order.complication_address.clone(),
            start_time_ms: order.start_time_ms,
            end_time_ms: order.end_time_ms,
            maker_address: order.maker_address.clone(),
            maker_username: order.maker_username.clone(),
            taker_address,
            taker_username: trim_lower_case(&taker_username),
            collection_address: trim_lower_case(&nft.collection),
            collection_name: collection.metadata.name.clone(),
            collection_image: collection.metadata.profile_image.clone(),
            collection_slug: collection.slug.clone(),
            has_blue_check: collection.has_blue_check,
            token_id: token_id.clone(),
            num_tokens,
            token_image: token_record.display_image().to_string(),
            token_name: token_record.metadata.name.clone(),
            token_slug: token_record.slug.clone(),
            attributes: token_record.metadata.attributes.clone(),
        };

        let item_id = doc_id_hash(order.chain_id.as_str(), &nft.collection, &token_id);
        Ok((item_id, item))
    }
}

fn to_doc<T: serde::Serialize>(value: &T) -> OrdersResult<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| OrdersError::Serialization(e.to_string()))
}
