//! API request and response models

use common::{ChainId, OrderDirection};
use serde::{Deserialize, Serialize};

use crate::ledger::CreatedOrders;
use crate::query::{OrderBy, OrderQuery};
use crate::types::{NewOrder, OrderStatus};

/// Body of `POST /v2/orders`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrdersRequest {
    pub orders: Vec<NewOrder>,
}

/// Response of `POST /v2/orders`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrdersResponse {
    pub created: Vec<String>,
    pub rejected: Vec<RejectedOrderModel>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedOrderModel {
    pub nonce: String,
    pub reason: String,
}

impl From<CreatedOrders> for CreateOrdersResponse {
    fn from(outcome: CreatedOrders) -> Self {
        Self {
            created: outcome.created,
            rejected: outcome
                .rejected
                .into_iter()
                .map(|r| RejectedOrderModel {
                    nonce: r.nonce,
                    reason: r.reason,
                })
                .collect(),
        }
    }
}

/// Query string of the order listing endpoints.
///
/// Same shape as [`OrderQuery`] except that the collection allow-list
/// arrives as one comma-separated parameter.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderListParams {
    pub chain_id: Option<ChainId>,
    pub order_status: Option<OrderStatus>,
    pub is_sell_order: Option<bool>,
    pub maker_address: Option<String>,
    pub taker_address: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub num_items: Option<u64>,
    pub collections: Option<String>,
    pub order_by: Option<OrderBy>,
    pub order_direction: Option<OrderDirection>,
    pub limit: Option<usize>,
    pub cursor: Option<String>,
}

impl From<OrderListParams> for OrderQuery {
    fn from(params: OrderListParams) -> Self {
        OrderQuery {
            chain_id: params.chain_id,
            order_status: params.order_status,
            is_sell_order: params.is_sell_order,
            maker_address: params.maker_address,
            taker_address: params.taker_address,
            min_price: params.min_price,
            max_price: params.max_price,
            num_items: params.num_items,
            collections: params
                .collections
                .map(|list| {
                    list.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
            order_by: params.order_by,
            order_direction: params.order_direction,
            limit: params.limit,
            cursor: params.cursor,
        }
    }
}

/// Query string of `GET /v2/users/{user}/nonce`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NonceParams {
    pub chain_id: Option<ChainId>,
}

/// Response of `GET /v2/users/{user}/nonce`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NonceResponse {
    pub nonce: String,
}

/// Health probe response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

/// Error envelope
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                code: code.to_string(),
                message: message.into(),
            },
        }
    }
}
