//! In-memory document store for tests and development
//!
//! Backed by a path-keyed map under a single lock. Good enough for the
//! request volumes of tests and local development; the production backend
//! is expected to be a hosted document database behind the same trait.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::batch::WriteBatch;
use crate::error::{StoreError, StoreResult};
use crate::query::{Filter, FilterOp, Query, QuerySource};
use crate::traits::{DocumentStore, TransformFn};
use crate::types::{DocRef, Document};
use crate::value::cmp_values;
use common::OrderDirection;

/// In-memory document store
#[derive(Default)]
pub struct MemoryStore {
    docs: RwLock<BTreeMap<String, Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents (test helper)
    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }

    fn matches_source(path: &str, source: &QuerySource) -> bool {
        match source {
            QuerySource::Collection(prefix) => path
                .strip_prefix(prefix.as_str())
                .and_then(|rest| rest.strip_prefix('/'))
                .map(|id| !id.is_empty() && !id.contains('/'))
                .unwrap_or(false),
            QuerySource::CollectionGroup(name) => {
                let segments: Vec<&str> = path.split('/').collect();
                segments.len() >= 2 && segments[segments.len() - 2] == name
            }
        }
    }

    fn matches_filter(doc: &Document, filter: &Filter) -> bool {
        // documents missing the filtered field never match
        let Some(field) = doc.get(&filter.field) else {
            return false;
        };
        match filter.op {
            FilterOp::Eq => field == &filter.value,
            FilterOp::Le => cmp_values(field, &filter.value) != Ordering::Greater,
            FilterOp::Ge => cmp_values(field, &filter.value) != Ordering::Less,
            FilterOp::In => match &filter.value {
                Value::Array(options) => options.iter().any(|v| v == field),
                _ => false,
            },
            FilterOp::ArrayContains => match field {
                Value::Array(items) => items.iter().any(|v| v == &filter.value),
                _ => false,
            },
        }
    }

    fn apply(existing: Option<&Document>, data: &Value, merge: bool) -> StoreResult<Document> {
        let Value::Object(fields) = data else {
            return Err(StoreError::Serialization(
                "write data must be a JSON object".to_string(),
            ));
        };
        let mut doc = if merge {
            existing.cloned().unwrap_or_default()
        } else {
            Document::new()
        };
        for (k, v) in fields {
            doc.insert(k.clone(), v.clone());
        }
        Ok(doc)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, doc: &DocRef) -> StoreResult<Option<Document>> {
        Ok(self.docs.read().get(doc.path()).cloned())
    }

    async fn get_all(&self, refs: &[DocRef]) -> StoreResult<Vec<Option<Document>>> {
        let docs = self.docs.read();
        Ok(refs.iter().map(|r| docs.get(r.path()).cloned()).collect())
    }

    async fn run_query(&self, query: &Query) -> StoreResult<Vec<Document>> {
        let docs = self.docs.read();

        let mut rows: Vec<(&String, &Document)> = docs
            .iter()
            .filter(|(path, _)| Self::matches_source(path, &query.source))
            .filter(|(_, doc)| query.filters.iter().all(|f| Self::matches_filter(doc, f)))
            .collect();

        if let Some((field, direction)) = &query.order_by {
            // documents missing the order-by field are excluded from ordered
            // results, matching the backing database's index behavior
            rows.retain(|(_, doc)| doc.contains_key(field.as_str()));
            rows.sort_by(|(pa, a), (pb, b)| {
                let va = a.get(field.as_str()).unwrap_or(&Value::Null);
                let vb = b.get(field.as_str()).unwrap_or(&Value::Null);
                let ord = match direction {
                    OrderDirection::Asc => cmp_values(va, vb),
                    OrderDirection::Desc => cmp_values(vb, va),
                };
                // tie-break on path for deterministic pagination
                ord.then_with(|| pa.cmp(pb))
            });

            if let Some(after) = &query.start_after {
                rows.retain(|(_, doc)| {
                    let v = doc.get(field.as_str()).unwrap_or(&Value::Null);
                    match direction {
                        OrderDirection::Asc => cmp_values(v, after) == Ordering::Greater,
                        OrderDirection::Desc => cmp_values(v, after) == Ordering::Less,
                    }
                });
            }
        } else if query.start_after.is_some() {
            return Err(StoreError::InvalidQuery(
                "start_after requires order_by".to_string(),
            ));
        }

        let limit = query.limit.unwrap_or(usize::MAX);
        Ok(rows.into_iter().take(limit).map(|(_, d)| d.clone()).collect())
    }

    async fn commit(&self, batch: WriteBatch) -> StoreResult<()> {
        // validate every write before touching the map so a bad write
        // cannot leave a partially applied batch
        let mut docs = self.docs.write();
        let mut staged: Vec<(String, Document)> = Vec::with_capacity(batch.len());
        for write in batch.writes() {
            let existing = staged
                .iter()
                .rev()
                .find(|(p, _)| p.as_str() == write.doc.path())
                .map(|(_, d)| d)
                .or_else(|| docs.get(write.doc.path()));
            let doc = Self::apply(existing, &write.data, write.merge)?;
            staged.push((write.doc.path().to_string(), doc));
        }
        for (path, doc) in staged {
            docs.insert(path, doc);
        }
        Ok(())
    }

    async fn increment(&self, doc: &DocRef, field: &str, by: f64) -> StoreResult<()> {
        let mut docs = self.docs.write();
        let entry = docs.entry(doc.path().to_string()).or_default();
        let current = match entry.get(field) {
            None | Some(Value::Null) => 0.0,
            Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
            Some(other) => {
                return Err(StoreError::Backend(format!(
                    "increment on non-numeric field {} (was {})",
                    field, other
                )))
            }
        };
        let next = serde_json::Number::from_f64(current + by)
            .ok_or_else(|| StoreError::Backend("increment overflow".to_string()))?;
        entry.insert(field.to_string(), Value::Number(next));
        Ok(())
    }

    async fn transform(&self, doc: &DocRef, f: TransformFn<'_>) -> StoreResult<Document> {
        // the write lock is held across the callback, serializing
        // transforms per store (a superset of per-document serialization)
        let mut docs = self.docs.write();
        let current = docs.get(doc.path());
        let next = f(current)?;
        docs.insert(doc.path().to_string(), next.clone());
        Ok(next)
    }
}
