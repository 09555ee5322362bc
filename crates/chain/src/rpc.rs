//! JSON-RPC backed fee oracle
//!
//! Issues `eth_call` reads against per-chain RPC endpoints. The contract
//! surface is three view functions:
//!
//! - fee treasury: `curatorFeeBps() -> uint16`
//! - creators fee manager: `getCreatorsFeeInfo(address,uint256) ->
//!   (address setter, address destination, uint16 bps, uint256 amount)`
//! - any ERC-721: `ownerOf(uint256) -> address`

use async_trait::async_trait;
use common::ChainId;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;

use crate::error::{ChainError, ChainResult};
use crate::oracle::{CreatorFee, FeeOracle};

/// `curatorFeeBps()`
const SEL_CURATOR_FEE_BPS: &str = "3f0e64b3";
/// `getCreatorsFeeInfo(address,uint256)`
const SEL_CREATORS_FEE_INFO: &str = "b40716ab";
/// `ownerOf(uint256)`
const SEL_OWNER_OF: &str = "6352211e";

/// Per-chain RPC endpoint and fee contract addresses
#[derive(Debug, Clone)]
pub struct RpcEndpoint {
    pub url: String,
    pub fee_treasury: String,
    pub creators_fee_manager: String,
}

/// Fee oracle backed by JSON-RPC `eth_call`
pub struct RpcFeeOracle {
    client: reqwest::Client,
    endpoints: HashMap<ChainId, RpcEndpoint>,
}

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<String>,
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

impl RpcFeeOracle {
    /// Create an oracle over the configured chains
    pub fn new(endpoints: HashMap<ChainId, RpcEndpoint>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoints,
        }
    }

    fn endpoint(&self, chain_id: ChainId) -> ChainResult<&RpcEndpoint> {
        self.endpoints
            .get(&chain_id)
            .ok_or(ChainError::UnsupportedChain(chain_id))
    }

    async fn eth_call(&self, chain_id: ChainId, to: &str, data: String) -> ChainResult<String> {
        let endpoint = self.endpoint(chain_id)?;
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_call",
            "params": [{"to": to, "data": format!("0x{}", data)}, "latest"],
        });

        let response = self
            .client
            .post(&endpoint.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChainError::Transport(e.to_string()))?;

        let parsed: RpcResponse = response
            .json()
            .await
            .map_err(|e| ChainError::Transport(e.to_string()))?;

        if let Some(err) = parsed.error {
            return Err(ChainError::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        parsed
            .result
            .ok_or_else(|| ChainError::InvalidResult("missing result".to_string()))
    }
}

#[async_trait]
impl FeeOracle for RpcFeeOracle {
    async fn curator_fee_bps(&self, chain_id: ChainId) -> ChainResult<u32> {
        let treasury = self.endpoint(chain_id)?.fee_treasury.clone();
        let result = self
            .eth_call(chain_id, &treasury, SEL_CURATOR_FEE_BPS.to_string())
            .await?;
        let words = decode_words(&result)?;
        word_to_u32(words.first().ok_or_else(|| {
            ChainError::InvalidResult("curatorFeeBps returned no data".to_string())
        })?)
    }

    async fn creator_fee(&self, chain_id: ChainId, collection: &str) -> ChainResult<CreatorFee> {
        let manager = self.endpoint(chain_id)?.creators_fee_manager.clone();
        let data = format!(
            "{}{}{}",
            SEL_CREATORS_FEE_INFO,
            encode_address(collection)?,
            encode_u256_dec("0")?,
        );
        let result = self.eth_call(chain_id, &manager, data).await?;
        let words = decode_words(&result)?;
        if words.len() < 3 {
            return Err(ChainError::InvalidResult(format!(
                "getCreatorsFeeInfo returned {} words",
                words.len()
            )));
        }
        Ok(CreatorFee {
            recipient: word_to_address(&words[1]),
            bps: word_to_u32(&words[2])?,
        })
    }

    async fn erc721_owner(
        &self,
        chain_id: ChainId,
        collection: &str,
        token_id: &str,
    ) -> ChainResult<String> {
        let data = format!("{}{}", SEL_OWNER_OF, encode_u256_dec(token_id)?);
        let result = self.eth_call(chain_id, collection, data).await?;
        let words = decode_words(&result)?;
        words
            .first()
            .map(|w| word_to_address(w))
            .ok_or_else(|| ChainError::InvalidResult("ownerOf returned no data".to_string()))
    }
}

// ==================== ABI helpers ====================

/// Left-pad an address to a 32-byte ABI word
fn encode_address(address: &str) -> ChainResult<String> {
    let hex_part = address.trim().trim_start_matches("0x").to_lowercase();
    if hex_part.len() != 40 || !hex_part.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ChainError::InvalidResult(format!(
            "not an address: {}",
            address
        )));
    }
    Ok(format!("{:0>64}", hex_part))
}

/// Encode a decimal token id (arbitrary precision) as a uint256 ABI word
fn encode_u256_dec(decimal: &str) -> ChainResult<String> {
    let decimal = decimal.trim();
    if decimal.is_empty() || !decimal.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ChainError::InvalidTokenId(decimal.to_string()));
    }
    // base-10 to base-256, most significant byte first
    let mut bytes: Vec<u8> = vec![0];
    for digit in decimal.bytes() {
        let mut carry = (digit - b'0') as u32;
        for b in bytes.iter_mut().rev() {
            let v = (*b as u32) * 10 + carry;
            *b = (v & 0xff) as u8;
            carry = v >> 8;
        }
        while carry > 0 {
            bytes.insert(0, (carry & 0xff) as u8);
            carry >>= 8;
        }
    }
    if bytes.len() > 32 {
        return Err(ChainError::InvalidTokenId(decimal.to_string()));
    }
    let mut hex = String::with_capacity(64);
    for b in &bytes {
        hex.push_str(&format!("{:02x}", b));
    }
    Ok(format!("{:0>64}", hex))
}

/// Split call output into 32-byte words
fn decode_words(result: &str) -> ChainResult<Vec<String>> {
    let hex_part = result.trim().trim_start_matches("0x");
    if hex_part.len() % 64 != 0 {
        return Err(ChainError::InvalidResult(format!(
            "call output length {} is not word-aligned",
            hex_part.len()
        )));
    }
    Ok(hex_part
        .as_bytes()
        .chunks(64)
        .map(|c| String::from_utf8_lossy(c).to_string())
        .collect())
}

fn word_to_u32(word: &str) -> ChainResult<u32> {
    let trimmed = word.trim_start_matches('0');
    if trimmed.is_empty() {
        return Ok(0);
    }
    u32::from_str_radix(trimmed, 16)
        .map_err(|_| ChainError::InvalidResult(format!("not a u32 word: {}", word)))
}

fn word_to_address(word: &str) -> String {
    let start = word.len().saturating_sub(40);
    format!("0x{}", word[start..].to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_address() {
        let encoded = encode_address("0xAb5801a7D398351b8bE11C439e05C5B3259aeC9B").unwrap();
        assert_eq!(encoded.len(), 64);
        assert!(encoded.starts_with("000000000000000000000000ab5801a7"));
        assert!(encode_address("0x123").is_err());
    }

    #[test]
    fn test_encode_u256_small() {
        assert_eq!(
            encode_u256_dec("255").unwrap(),
            format!("{:0>64}", "ff")
        );
        assert_eq!(encode_u256_dec("0").unwrap(), "0".repeat(64));
    }

    #[test]
    fn test_encode_u256_large() {
        // 2^128 = 340282366920938463463374607431768211456
        let encoded = encode_u256_dec("340282366920938463463374607431768211456").unwrap();
        assert_eq!(encoded, format!("{:0>64}", "100000000000000000000000000000000"));
    }

    #[test]
    fn test_encode_u256_rejects_garbage() {
        assert!(encode_u256_dec("").is_err());
        assert!(encode_u256_dec("12a").is_err());
    }

    #[test]
    fn test_decode_words_and_values() {
        let result = format!(
            "0x{}{}",
            format!("{:0>64}", "ab5801a7d398351b8be11c439e05c5b3259aec9b"),
            format!("{:0>64}", "1f4"),
        );
        let words = decode_words(&result).unwrap();
        assert_eq!(words.len(), 2);
        assert_eq!(
            word_to_address(&words[0]),
            "0xab5801a7d398351b8be11c439e05c5b3259aec9b"
        );
        assert_eq!(word_to_u32(&words[1]).unwrap(), 500);
    }

    #[test]
    fn test_decode_words_rejects_misaligned() {
        assert!(decode_words("0xabcd").is_err());
    }
}
