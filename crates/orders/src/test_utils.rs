//! Shared fixtures for the order ledger tests

use common::ChainId;
use docstore::{DocRef, DocumentStore, MemoryStore, WriteBatch};
use serde_json::json;

use crate::types::{ChainNfts, ExecParams, NewOrder, NftToken, SignedOrderPayload};

/// A single-item sell order for collection `0xabc`, token `1`, active
/// between t=100 and t=200
pub(crate) fn sample_new_order() -> NewOrder {
    NewOrder {
        chain_id: ChainId::Mainnet,
        num_items: 1,
        start_price_eth: 1.0,
        end_price_eth: 1.0,
        start_time_ms: 100,
        end_time_ms: 200,
        max_gas_price_wei: "100000000000".to_string(),
        nonce: "1".to_string(),
        maker_address: "0xmaker".to_string(),
        exec_params: ExecParams {
            complication_address: "0xcomplication".to_string(),
            currency_address: "0xcurrency".to_string(),
        },
        signed_order: SignedOrderPayload {
            is_sell_order: true,
            signer: "0xmaker".to_string(),
            constraints: vec!["1".to_string()],
            nfts: vec![ChainNfts {
                collection: "0xabc".to_string(),
                tokens: vec![NftToken {
                    token_id: "1".to_string(),
                    num_tokens: 1,
                }],
            }],
            exec_params: vec!["0xcomplication".to_string(), "0xcurrency".to_string()],
            extra_params: String::new(),
            sig: "0xsig".to_string(),
        },
    }
}

/// Seed a fully indexed collection record
pub(crate) async fn seed_collection(store: &MemoryStore, chain: ChainId, addr: &str) {
    let mut batch = WriteBatch::new();
    batch.set(
        DocRef::doc(
            metadata::types::COLLECTIONS_COLL,
            &metadata::CollectionRecord::doc_id(chain, addr),
        ),
        json!({
            "address": addr,
            "chainId": chain.as_str(),
            "slug": "test-collection",
            "hasBlueCheck": true,
            "metadata": {"name": "Test Collection", "profileImage": "https://img/profile"},
            "state": {"create": {"step": metadata::types::CREATION_STEP_COMPLETE}},
        }),
        false,
    );
    store.commit(batch).await.unwrap();
}

/// Seed a token record under a collection
pub(crate) async fn seed_token(store: &MemoryStore, chain: ChainId, addr: &str, token_id: &str) {
    let mut batch = WriteBatch::new();
    batch.set(
        DocRef::doc(
            metadata::types::COLLECTIONS_COLL,
            &metadata::CollectionRecord::doc_id(chain, addr),
        )
        .child(metadata::types::NFTS_SUB_COLL, token_id),
        json!({
            "tokenId": token_id,
            "collectionAddress": addr,
            "slug": format!("token-{}", token_id),
            "image": {"url": format!("https://img/{}", token_id)},
            "metadata": {"name": format!("Token #{}", token_id), "attributes": []},
        }),
        false,
    );
    store.commit(batch).await.unwrap();
}

/// Seed a user profile document
pub(crate) async fn seed_user(store: &MemoryStore, address: &str, username: &str) {
    let mut batch = WriteBatch::new();
    batch.set(
        DocRef::doc(crate::types::USERS_COLL, address),
        json!({"username": username}),
        true,
    );
    store.commit(batch).await.unwrap();
}
