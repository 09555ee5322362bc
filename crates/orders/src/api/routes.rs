//! API routes for the order ledger

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::api::handlers::*;

/// Create the orders router
pub fn create_router(state: OrdersApiState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/v2/orders", post(create_orders).get(list_orders))
        .route("/v2/users/:user/orders", get(user_orders))
        .route("/v2/users/:user/nonce", get(get_nonce))
        .route("/v2/users/:user/matches", get(user_matches))
        .with_state(Arc::new(state))
}
