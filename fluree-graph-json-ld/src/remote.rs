//! Remote context documents supplied ahead of expansion.
//!
//! The expansion engine never performs I/O. A caller walks the document with
//! [`remote_context_refs`], retrieves whatever it can, and hands the results
//! over in a [`RemoteContexts`] store. Any reference missing from the store
//! surfaces as [`JsonLdError::InvalidRemoteContext`](crate::JsonLdError).

use serde_json::Value as JsonValue;
use std::collections::HashMap;

/// Retrieved context documents keyed by the URL they were requested with.
#[derive(Debug, Clone, Default)]
pub struct RemoteContexts {
    documents: HashMap<String, JsonValue>,
}

impl RemoteContexts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the document retrieved for `url`.
    ///
    /// The document is the whole retrieved body, i.e. `{"@context": ...}`.
    pub fn insert(&mut self, url: impl Into<String>, document: JsonValue) {
        self.documents.insert(url.into(), document);
    }

    pub fn get(&self, url: &str) -> Option<&JsonValue> {
        self.documents.get(url)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.documents.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Collect every remote context reference in `value`, in document order,
/// without duplicates.
///
/// Walks the whole value, so it finds references in node-level `@context`
/// entries, in term-scoped contexts and inside retrieved context documents.
pub fn remote_context_refs(value: &JsonValue) -> Vec<String> {
    let mut refs = Vec::new();
    collect_refs(value, &mut refs);
    refs
}

fn collect_refs(value: &JsonValue, refs: &mut Vec<String>) {
    match value {
        JsonValue::Object(map) => {
            for (key, v) in map {
                if key == "@context" {
                    collect_context_value(v, refs);
                } else {
                    collect_refs(v, refs);
                }
            }
        }
        JsonValue::Array(items) => {
            for item in items {
                collect_refs(item, refs);
            }
        }
        _ => {}
    }
}

fn collect_context_value(ctx: &JsonValue, refs: &mut Vec<String>) {
    match ctx {
        JsonValue::String(url) => {
            if !refs.iter().any(|r| r == url) {
                refs.push(url.clone());
            }
        }
        JsonValue::Array(items) => {
            for item in items {
                collect_context_value(item, refs);
            }
        }
        // term definitions may carry their own scoped @context
        JsonValue::Object(_) => collect_refs(ctx, refs),
        _ => {}
    }
}
