//! API handlers for the order ledger HTTP endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use common::{trim_lower_case, ChainId};
use std::sync::Arc;

use crate::api::models::*;
use crate::error::OrdersError;
use crate::ledger::OrderLedger;
use crate::matches::{MatchPage, MatchQuery, MatchQueryService};
use crate::query::{OrderListPage, OrderQuery};
use metadata::MetadataError;

/// Shared state behind the order routes
pub struct OrdersApiState {
    pub ledger: Arc<OrderLedger>,
    pub matches: Arc<MatchQueryService>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn into_api_error(err: OrdersError) -> ApiError {
    let (status, code) = match &err {
        OrdersError::BadQuery(_) => (StatusCode::BAD_REQUEST, "BAD_QUERY"),
        OrdersError::InvalidNonce { .. } => (StatusCode::BAD_REQUEST, "INVALID_NONCE"),
        OrdersError::Metadata(MetadataError::InvalidCollection { .. }) => {
            (StatusCode::BAD_REQUEST, "INVALID_COLLECTION")
        }
        OrdersError::Metadata(MetadataError::InvalidToken { .. }) => {
            (StatusCode::BAD_REQUEST, "INVALID_TOKEN")
        }
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    };
    (status, Json(ErrorResponse::new(code, err.to_string())))
}

/// Health check handler
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "orders".to_string(),
    })
}

/// Create orders for a maker
pub async fn create_orders(
    State(state): State<Arc<OrdersApiState>>,
    Json(request): Json<CreateOrdersRequest>,
) -> Result<Json<CreateOrdersResponse>, ApiError> {
    let Some(first) = request.orders.first() else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("BAD_REQUEST", "no orders in request")),
        ));
    };
    let maker = trim_lower_case(&first.maker_address);
    if request
        .orders
        .iter()
        .any(|o| trim_lower_case(&o.maker_address) != maker)
    {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(
                "BAD_REQUEST",
                "all orders in a batch must share one maker",
            )),
        ));
    }

    let outcome = state
        .ledger
        .create_orders(&maker, &request.orders)
        .await
        .map_err(into_api_error)?;
    Ok(Json(outcome.into()))
}

/// Public order listing (no user scope: maker/taker filters are rejected)
pub async fn list_orders(
    State(state): State<Arc<OrdersApiState>>,
    Query(params): Query<OrderListParams>,
) -> Result<Json<OrderListPage>, ApiError> {
    let query: OrderQuery = params.into();
    let page = state
        .ledger
        .orders(&query, None)
        .await
        .map_err(into_api_error)?;
    Ok(Json(page))
}

/// Orders scoped to a user (maker or taker side)
pub async fn user_orders(
    State(state): State<Arc<OrdersApiState>>,
    Path(user): Path<String>,
    Query(params): Query<OrderListParams>,
) -> Result<Json<OrderListPage>, ApiError> {
    let query: OrderQuery = params.into();
    let page = state
        .ledger
        .orders(&query, Some(&user))
        .await
        .map_err(into_api_error)?;
    Ok(Json(page))
}

/// Issue the next order nonce for a user
pub async fn get_nonce(
    State(state): State<Arc<OrdersApiState>>,
    Path(user): Path<String>,
    Query(params): Query<NonceParams>,
) -> Result<Json<NonceResponse>, ApiError> {
    let chain_id = params.chain_id.unwrap_or(ChainId::Mainnet);
    let nonce = state
        .ledger
        .order_nonce(&user, chain_id)
        .await
        .map_err(into_api_error)?;
    Ok(Json(NonceResponse { nonce }))
}

/// A user's order matches (listings and offers, merged)
pub async fn user_matches(
    State(state): State<Arc<OrdersApiState>>,
    Path(user): Path<String>,
    Query(query): Query<MatchQuery>,
) -> Result<Json<MatchPage>, ApiError> {
    let page = state
        .matches
        .order_matches(&user, &query)
        .await
        .map_err(into_api_error)?;
    Ok(Json(page))
}
