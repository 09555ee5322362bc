//! Metadata resolver
//!
//! Resolves every collection and token referenced by a batch of orders,
//! once each, before any order document is written. Resolution fails closed:
//! an unindexed collection rejects the whole batch and asynchronously
//! enqueues the collection for backfill.

use common::{trim_lower_case, ChainId};
use docstore::{DocRef, DocumentStore, StoreError};
use futures::future::join_all;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::error::{MetadataError, MetadataResult};
use crate::indexer::CollectionIndexer;
use crate::types::{
    CollectionRecord, NftTargets, OrderMetadata, TokenRecord, COLLECTIONS_COLL, NFTS_SUB_COLL,
};

/// Resolves order metadata from the document store
pub struct MetadataResolver {
    store: Arc<dyn DocumentStore>,
    indexer: Arc<dyn CollectionIndexer>,
}

impl MetadataResolver {
    pub fn new(store: Arc<dyn DocumentStore>, indexer: Arc<dyn CollectionIndexer>) -> Self {
        Self { store, indexer }
    }

    /// Resolve every collection and token referenced by `targets`.
    ///
    /// Lookups are deduplicated across the batch: each collection and each
    /// token is fetched once regardless of how many orders reference it.
    /// Collection-wide targets (empty token list) resolve only the
    /// collection record.
    pub async fn order_metadata(&self, targets: &[NftTargets]) -> MetadataResult<OrderMetadata> {
        // chain -> collection -> token ids
        let mut wanted: BTreeMap<ChainId, BTreeMap<String, BTreeSet<String>>> = BTreeMap::new();
        for target in targets {
            let tokens = wanted
                .entry(target.chain_id)
                .or_default()
                .entry(trim_lower_case(&target.collection))
                .or_default();
            for token_id in &target.token_ids {
                if !token_id.trim().is_empty() {
                    tokens.insert(token_id.trim().to_string());
                }
            }
        }

        let mut meta = OrderMetadata::default();

        let collection_keys: Vec<(ChainId, String)> = wanted
            .iter()
            .flat_map(|(chain, collections)| {
                collections.keys().map(|addr| (*chain, addr.clone()))
            })
            .collect();

        let fetched = join_all(
            collection_keys
                .iter()
                .map(|(chain, addr)| self.fetch_collection(*chain, addr)),
        )
        .await;

        for ((chain, addr), result) in collection_keys.iter().zip(fetched) {
            match result? {
                Some(record) if record.is_fully_indexed() => {
                    meta.insert_collection(*chain, record);
                }
                incomplete => {
                    let reason = if incomplete.is_some() {
                        "collection indexing is not complete"
                    } else {
                        "collection is not indexed"
                    };
                    self.trigger_backfill(*chain, addr);
                    return Err(MetadataError::InvalidCollection {
                        address: addr.clone(),
                        chain_id: chain.as_str().to_string(),
                        reason: reason.to_string(),
                    });
                }
            }
        }

        // one multi-get round trip for every distinct token
        let mut token_keys: Vec<(ChainId, String, String)> = Vec::new();
        let mut token_refs: Vec<DocRef> = Vec::new();
        for (chain, collections) in &wanted {
            for (addr, token_ids) in collections {
                let collection_doc =
                    DocRef::doc(COLLECTIONS_COLL, &CollectionRecord::doc_id(*chain, addr));
                for token_id in token_ids {
                    token_keys.push((*chain, addr.clone(), token_id.clone()));
                    token_refs.push(collection_doc.child(NFTS_SUB_COLL, token_id));
                }
            }
        }

        let documents = self.store.get_all(&token_refs).await?;
        for ((chain, addr, token_id), document) in token_keys.into_iter().zip(documents) {
            let Some(document) = document else {
                return Err(MetadataError::InvalidToken {
                    collection: addr,
                    chain_id: chain.as_str().to_string(),
                    token_id,
                    reason: "failed to find token".to_string(),
                });
            };
            let mut record: TokenRecord = serde_json::from_value(Value::Object(document))
                .map_err(|e| StoreError::Serialization(e.to_string()))?;
            if record.token_id.is_empty() {
                record.token_id = token_id;
            }
            meta.insert_token(chain, &addr, record);
        }

        Ok(meta)
    }

    async fn fetch_collection(
        &self,
        chain_id: ChainId,
        address: &str,
    ) -> MetadataResult<Option<CollectionRecord>> {
        let doc = DocRef::doc(COLLECTIONS_COLL, &CollectionRecord::doc_id(chain_id, address));
        let Some(document) = self.store.get(&doc).await? else {
            return Ok(None);
        };
        let record = serde_json::from_value(Value::Object(document))
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(Some(record))
    }

    /// Enqueue a backfill without blocking or failing the caller
    fn trigger_backfill(&self, chain_id: ChainId, address: &str) {
        let indexer = self.indexer.clone();
        let address = address.to_string();
        tokio::spawn(async move {
            if let Err(err) = indexer.enqueue(chain_id, &address).await {
                tracing::error!(
                    %err,
                    chain = %chain_id,
                    collection = %address,
                    "failed to enqueue collection for backfill"
                );
            }
        });
    }
}
