//! Fee floor computation
//!
//! A multi-collection order is quoted against the lowest total fee across
//! its collections: the buyer/seller must see the worst-case guaranteed
//! payout floor, so no collection's fee is silently ignored. Oracle
//! failures are logged and skipped; when nothing resolves, the answer is
//! the maximum possible fee.

use chain::FeeOracle;
use common::ChainId;

use crate::types::MAX_TOTAL_FEE_BPS;

/// Minimum total (curator + creator) fee in basis points across the given
/// collections, or [`MAX_TOTAL_FEE_BPS`] when every lookup fails.
pub async fn min_bps(oracle: &dyn FeeOracle, chain_id: ChainId, collections: &[String]) -> u32 {
    let curator = match oracle.curator_fee_bps(chain_id).await {
        Ok(bps) => Some(bps),
        Err(err) => {
            tracing::warn!(%err, chain = %chain_id, "failed to fetch curator fee");
            None
        }
    };

    let mut min: Option<u32> = None;
    for collection in collections {
        let Some(curator_bps) = curator else {
            // without the curator fee no collection's total is known
            break;
        };
        match oracle.creator_fee(chain_id, collection).await {
            Ok(fee) => {
                let total = curator_bps.saturating_add(fee.bps);
                min = Some(min.map_or(total, |m| m.min(total)));
            }
            Err(err) => {
                tracing::warn!(%err, chain = %chain_id, collection, "failed to fetch creator fee");
            }
        }
    }

    min.unwrap_or(MAX_TOTAL_FEE_BPS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain::MockFeeOracle;

    #[tokio::test]
    async fn test_min_across_collections() {
        let oracle = MockFeeOracle::new()
            .with_curator_bps(250)
            .with_creator_fee("0xaaa", "0xfee", 500)
            .with_creator_fee("0xbbb", "0xfee", 100);

        let collections = vec!["0xaaa".to_string(), "0xbbb".to_string()];
        let bps = min_bps(&oracle, ChainId::Mainnet, &collections).await;
        assert_eq!(bps, 350);

        // lower than every individual total
        assert!(bps <= 250 + 500);
        assert!(bps <= 250 + 100);
    }

    #[tokio::test]
    async fn test_all_failures_default_to_max() {
        let oracle = MockFeeOracle::new().with_failures();
        let collections = vec!["0xaaa".to_string()];
        assert_eq!(
            min_bps(&oracle, ChainId::Mainnet, &collections).await,
            MAX_TOTAL_FEE_BPS
        );
    }

    #[tokio::test]
    async fn test_no_collections_default_to_max() {
        let oracle = MockFeeOracle::new();
        assert_eq!(min_bps(&oracle, ChainId::Mainnet, &[]).await, MAX_TOTAL_FEE_BPS);
    }
}
