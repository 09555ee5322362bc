//! Document references and document values

use serde_json::Value;

/// A stored document: a flat record of field → JSON value
pub type Document = serde_json::Map<String, Value>;

/// Reference to a document by its slash-separated path.
///
/// Paths alternate collection and document segments:
/// `orders/{orderId}`, `orders/{orderId}/orderItems/{itemId}`,
/// `users/{address}`. A valid document path always has an even number of
/// segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocRef(String);

impl DocRef {
    /// Reference a document in a top-level collection
    pub fn doc(collection: &str, id: &str) -> Self {
        Self(format!("{}/{}", collection, id))
    }

    /// Reference a document in a subcollection of this document
    pub fn child(&self, collection: &str, id: &str) -> Self {
        Self(format!("{}/{}/{}", self.0, collection, id))
    }

    /// The full path
    pub fn path(&self) -> &str {
        &self.0
    }

    /// The document id (last path segment)
    pub fn id(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or("")
    }

    /// The collection name this document lives in
    pub fn collection(&self) -> &str {
        let mut parts = self.0.rsplit('/');
        parts.next();
        parts.next().unwrap_or("")
    }

    /// The parent document, if this document lives in a subcollection
    pub fn parent(&self) -> Option<DocRef> {
        let segments: Vec<&str> = self.0.split('/').collect();
        if segments.len() < 4 {
            return None;
        }
        Some(DocRef(segments[..segments.len() - 2].join("/")))
    }
}

impl std::fmt::Display for DocRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_ref_paths() {
        let order = DocRef::doc("orders", "abc");
        assert_eq!(order.path(), "orders/abc");
        assert_eq!(order.id(), "abc");
        assert_eq!(order.collection(), "orders");
        assert!(order.parent().is_none());

        let item = order.child("orderItems", "def");
        assert_eq!(item.path(), "orders/abc/orderItems/def");
        assert_eq!(item.id(), "def");
        assert_eq!(item.collection(), "orderItems");
        assert_eq!(item.parent(), Some(order));
    }
}
