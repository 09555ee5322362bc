//! Order nonce issuance and claims
//!
//! Nonces are per (maker, chain) and strictly increasing. Both issuance and
//! claims run as per-document transactions on the maker's user document, the
//! only cross-request mutual-exclusion boundary in the ledger: concurrent
//! callers for the same maker serialize there, nothing else does.

use common::{trim_lower_case, ChainId};
use docstore::{DocRef, DocumentStore, Document, StoreError};
use serde_json::{json, Value};

use crate::error::{OrdersError, OrdersResult};
use crate::types::USERS_COLL;

/// Field holding the last issued/claimed nonce per chain
const ORDER_NONCES_FIELD: &str = "orderNonces";
/// Field holding the per-chain floor below which nonces are void
/// (raised when a user cancels all orders on chain)
const MIN_ORDER_NONCES_FIELD: &str = "minOrderNonces";

fn nonce_field(doc: &Document, field: &str, chain_id: ChainId) -> u64 {
    doc.get(field)
        .and_then(Value::as_object)
        .and_then(|m| m.get(chain_id.as_str()))
        .and_then(Value::as_u64)
        .unwrap_or(0)
}

fn set_nonce_field(doc: &mut Document, field: &str, chain_id: ChainId, value: u64) {
    let map = doc
        .entry(field.to_string())
        .or_insert_with(|| json!({}));
    if let Value::Object(map) = map {
        map.insert(chain_id.as_str().to_string(), json!(value));
    }
}

/// Issue the next nonce for a user: `max(orderNonce, minOrderNonce) + 1`,
/// persisted before it is returned so it is never reissued.
pub async fn issue_nonce(
    store: &dyn DocumentStore,
    user: &str,
    chain_id: ChainId,
) -> OrdersResult<String> {
    let doc = DocRef::doc(USERS_COLL, &trim_lower_case(user));
    let committed = store
        .transform(&doc, &|current| {
            let mut next = current.cloned().unwrap_or_default();
            let nonce = nonce_field(&next, ORDER_NONCES_FIELD, chain_id)
                .max(nonce_field(&next, MIN_ORDER_NONCES_FIELD, chain_id))
                + 1;
            set_nonce_field(&mut next, ORDER_NONCES_FIELD, chain_id, nonce);
            Ok(next)
        })
        .await?;
    Ok(nonce_field(&committed, ORDER_NONCES_FIELD, chain_id).to_string())
}

/// Claim a submitted order's nonce for its maker.
///
/// The claim succeeds only for a nonce strictly above everything already
/// claimed (and above the maker's min-nonce floor); anything else is stale
/// and rejects the order before a single document is staged.
pub async fn claim_nonce(
    store: &dyn DocumentStore,
    maker: &str,
    chain_id: ChainId,
    nonce: &str,
) -> OrdersResult<()> {
    let maker = trim_lower_case(maker);
    let parsed: u64 = match nonce.trim().parse() {
        Ok(n) => n,
        Err(_) => {
            return Err(OrdersError::InvalidNonce {
                maker,
                nonce: nonce.to_string(),
            })
        }
    };

    let doc = DocRef::doc(USERS_COLL, &maker);
    let result = store
        .transform(&doc, &|current| {
            let mut next = current.cloned().unwrap_or_default();
            let claimed = nonce_field(&next, ORDER_NONCES_FIELD, chain_id);
            let floor = nonce_field(&next, MIN_ORDER_NONCES_FIELD, chain_id);
            if parsed <= claimed || parsed <= floor {
                return Err(StoreError::TransactionAborted(format!(
                    "nonce {} already claimed (last {}, floor {})",
                    parsed, claimed, floor
                )));
            }
            set_nonce_field(&mut next, ORDER_NONCES_FIELD, chain_id, parsed);
            Ok(next)
        })
        .await;

    match result {
        Ok(_) => Ok(()),
        Err(StoreError::TransactionAborted(reason)) => {
            tracing::warn!(maker = %maker, nonce, reason, "stale nonce rejected");
            Err(OrdersError::InvalidNonce {
                maker,
                nonce: nonce.to_string(),
            })
        }
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use docstore::MemoryStore;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_issue_is_strictly_increasing() {
        let store = MemoryStore::new();
        let first = issue_nonce(&store, "0xUser", ChainId::Mainnet).await.unwrap();
        let second = issue_nonce(&store, "0xuser", ChainId::Mainnet).await.unwrap();
        assert_eq!(first, "1");
        assert_eq!(second, "2");
    }

    #[tokio::test]
    async fn test_issue_respects_min_nonce_floor() {
        let store = MemoryStore::new();
        let doc = DocRef::doc(USERS_COLL, "0xuser");
        store
            .transform(&doc, &|_| {
                let mut next = Document::new();
                next.insert("minOrderNonces".to_string(), json!({"1": 50}));
                Ok(next)
            })
            .await
            .unwrap();

        let nonce = issue_nonce(&store, "0xuser", ChainId::Mainnet).await.unwrap();
        assert_eq!(nonce, "51");
    }

    #[tokio::test]
    async fn test_issue_is_chain_scoped() {
        let store = MemoryStore::new();
        issue_nonce(&store, "0xuser", ChainId::Mainnet).await.unwrap();
        issue_nonce(&store, "0xuser", ChainId::Mainnet).await.unwrap();
        let polygon = issue_nonce(&store, "0xuser", ChainId::Polygon).await.unwrap();
        assert_eq!(polygon, "1");
    }

    #[tokio::test]
    async fn test_concurrent_issuance_never_repeats() {
        let store = Arc::new(MemoryStore::new());
        let mut handles = Vec::new();
        for _ in 0..25 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                issue_nonce(&*store, "0xuser", ChainId::Mainnet).await.unwrap()
            }));
        }
        let mut seen = HashSet::new();
        for h in handles {
            assert!(seen.insert(h.await.unwrap()));
        }
        assert_eq!(seen.len(), 25);
    }

    #[tokio::test]
    async fn test_claim_then_stale_claim() {
        let store = MemoryStore::new();
        claim_nonce(&store, "0xmaker", ChainId::Mainnet, "5").await.unwrap();

        // replaying the same nonce is stale
        let err = claim_nonce(&store, "0xmaker", ChainId::Mainnet, "5")
            .await
            .unwrap_err();
        assert_matches!(err, OrdersError::InvalidNonce { .. });

        // lower nonces are stale too
        let err = claim_nonce(&store, "0xmaker", ChainId::Mainnet, "3")
            .await
            .unwrap_err();
        assert_matches!(err, OrdersError::InvalidNonce { .. });

        // a higher one proceeds
        claim_nonce(&store, "0xmaker", ChainId::Mainnet, "6").await.unwrap();
    }

    #[tokio::test]
    async fn test_claim_rejects_non_numeric() {
        let store = MemoryStore::new();
        let err = claim_nonce(&store, "0xmaker", ChainId::Mainnet, "not-a-number")
            .await
            .unwrap_err();
        assert_matches!(err, OrdersError::InvalidNonce { .. });
    }

    #[tokio::test]
    async fn test_claimed_nonce_blocks_issuance_below_it() {
        let store = MemoryStore::new();
        claim_nonce(&store, "0xmaker", ChainId::Mainnet, "10").await.unwrap();
        let next = issue_nonce(&store, "0xmaker", ChainId::Mainnet).await.unwrap();
        assert_eq!(next, "11");
    }
}
