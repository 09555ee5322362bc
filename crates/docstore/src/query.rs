//! Query model: filtered, ordered, cursored reads
//!
//! Mirrors the subset of the document database's query surface the
//! marketplace actually uses. Queries are built fluently and executed by a
//! [`DocumentStore`](crate::traits::DocumentStore) implementation.

use common::OrderDirection;
use serde_json::Value;

/// What a query reads from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuerySource {
    /// A single collection at the given path (`orders`,
    /// `orders/{id}/orderItems`)
    Collection(String),
    /// Every collection with the given name, regardless of parent
    /// (flat index over all `orderItems` subcollections)
    CollectionGroup(String),
}

/// Filter operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// Field equals value
    Eq,
    /// Field less-than-or-equal value
    Le,
    /// Field greater-than-or-equal value
    Ge,
    /// Field is one of the values in an array
    In,
    /// Field is an array containing the value
    ArrayContains,
}

/// A single field filter
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

/// A filtered, ordered, cursored query
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub source: QuerySource,
    pub filters: Vec<Filter>,
    pub order_by: Option<(String, OrderDirection)>,
    pub start_after: Option<Value>,
    pub limit: Option<usize>,
}

impl Query {
    /// Query a single collection by path
    pub fn collection(path: impl Into<String>) -> Self {
        Self {
            source: QuerySource::Collection(path.into()),
            filters: Vec::new(),
            order_by: None,
            start_after: None,
            limit: None,
        }
    }

    /// Query a collection group by name
    pub fn collection_group(name: impl Into<String>) -> Self {
        Self {
            source: QuerySource::CollectionGroup(name.into()),
            filters: Vec::new(),
            order_by: None,
            start_after: None,
            limit: None,
        }
    }

    /// Add a field filter
    pub fn where_field(mut self, field: impl Into<String>, op: FilterOp, value: Value) -> Self {
        self.filters.push(Filter {
            field: field.into(),
            op,
            value,
        });
        self
    }

    /// Order results by a field.
    ///
    /// A query has at most one order-by field; the last call wins.
    pub fn order_by(mut self, field: impl Into<String>, direction: OrderDirection) -> Self {
        self.order_by = Some((field.into(), direction));
        self
    }

    /// Resume strictly after the given value of the order-by field
    pub fn start_after(mut self, value: Value) -> Self {
        self.start_after = Some(value);
        self
    }

    /// Cap the number of returned documents
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }
}
