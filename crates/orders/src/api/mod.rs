//! HTTP API for the order ledger

pub mod handlers;
pub mod models;
pub mod routes;

pub use handlers::OrdersApiState;
pub use routes::create_router;
