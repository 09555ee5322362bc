//! User profile lookups
//!
//! Usernames decorate orders and feed events but are never load-bearing:
//! resolution is best-effort and failures degrade to an empty string.

use common::trim_lower_case;
use docstore::{DocRef, DocumentStore};

use crate::types::USERS_COLL;

/// Display username for an address, or the empty string when the user has
/// no profile or the lookup fails
pub async fn resolve_username(store: &dyn DocumentStore, address: &str) -> String {
    let doc = DocRef::doc(USERS_COLL, &trim_lower_case(address));
    match store.get(&doc).await {
        Ok(Some(profile)) => profile
            .get("username")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
        Ok(None) => String::new(),
        Err(err) => {
            tracing::warn!(%err, address, "failed to resolve username");
            String::new()
        }
    }
}
