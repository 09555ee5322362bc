//! Order ledger for OpenMarket
//!
//! This crate owns the write and read paths for signed off-chain orders:
//!
//! - Order ingestion: nonce claims, canonical order + fan-out order-item
//!   documents, feed events, aggregate counters, one atomic batch commit
//! - Paginated order-item queries over the flat collection-group index,
//!   regrouped into logical orders
//! - Order-match queries merging independently cursored listing/offer
//!   sub-queries
//! - Nonce issuance and fee-floor (minimum bps) computation
//!
//! # Feature Flags
//!
//! - `api` - Enable the HTTP API surface

pub mod counters;
pub mod error;
pub mod feed;
pub mod fees;
pub mod ledger;
pub mod matches;
pub mod nonce;
pub mod query;
pub mod types;
pub mod users;

#[cfg(feature = "api")]
pub mod api;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-export commonly used types
pub use error::{OrdersError, OrdersResult};
pub use ledger::{CreatedOrders, OrderLedger, RejectedOrder};
pub use matches::{MatchOrderBy, MatchPage, MatchQuery, MatchQueryService};
pub use query::{OrderBy, OrderGroup, OrderListPage, OrderQuery};
pub use types::{ChainNfts, NewOrder, NftToken, Order, OrderItem, OrderMatch, OrderStatus};
