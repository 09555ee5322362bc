//! Opaque pagination cursor codec
//!
//! A cursor is a field-name → value record serialized to JSON and
//! base64-encoded. Clients treat it as opaque; the server round-trips it to
//! resume a paginated query. Cursors carry a value for every sortable field
//! so that a client may switch sort field mid-pagination without invalidating
//! its cursor. Encoding is stable across process restarts.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::Value;
use std::collections::BTreeMap;

/// A decoded cursor: last-seen value per sort field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cursor(BTreeMap<String, Value>);

impl Cursor {
    /// Empty cursor (start of a result set)
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode an opaque cursor string.
    ///
    /// Tolerant by design: an empty, undecodable, or malformed cursor decodes
    /// to the empty cursor rather than failing the query.
    pub fn decode(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return Self::default();
        }
        let bytes = match BASE64.decode(raw.trim()) {
            Ok(b) => b,
            Err(_) => return Self::default(),
        };
        match serde_json::from_slice::<BTreeMap<String, Value>>(&bytes) {
            Ok(map) => Self(map),
            Err(_) => Self::default(),
        }
    }

    /// Encode to the opaque wire form
    pub fn encode(&self) -> String {
        if self.0.is_empty() {
            return String::new();
        }
        // serialization of a BTreeMap is key-ordered, so equal cursors
        // encode identically
        let json = serde_json::to_vec(&self.0).unwrap_or_default();
        BASE64.encode(json)
    }

    /// Last-seen value for a sort field, if present
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Record the last-seen value for a sort field
    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.0.insert(field.into(), value);
    }

    /// True when the cursor carries no position at all
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_round_trip() {
        let mut cursor = Cursor::new();
        cursor.set("startPriceEth", json!(1.5));
        cursor.set("startTimeMs", json!(1700000000000_i64));

        let encoded = cursor.encode();
        let decoded = Cursor::decode(&encoded);
        assert_eq!(decoded, cursor);
        assert_eq!(decoded.get("startPriceEth"), Some(&json!(1.5)));
    }

    #[test]
    fn test_empty_and_garbage_decode_to_empty() {
        assert!(Cursor::decode("").is_empty());
        assert!(Cursor::decode("   ").is_empty());
        assert!(Cursor::decode("not base64 at all!!").is_empty());
        // valid base64, invalid json
        assert!(Cursor::decode(&BASE64.encode(b"{broken")).is_empty());
    }

    #[test]
    fn test_empty_cursor_encodes_empty() {
        assert_eq!(Cursor::new().encode(), "");
    }

    #[test]
    fn test_nested_cursor_values() {
        // match pagination stores one sub-cursor per query class
        let mut inner = Cursor::new();
        inner.set("timestamp", json!(123));
        let mut outer = Cursor::new();
        outer.set("listings", Value::String(inner.encode()));

        let decoded = Cursor::decode(&outer.encode());
        let raw = decoded.get("listings").and_then(|v| v.as_str()).unwrap();
        assert_eq!(Cursor::decode(raw).get("timestamp"), Some(&json!(123)));
    }
}
