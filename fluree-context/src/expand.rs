//! Document expansion with remote-context elision.
//!
//! Remote contexts are fetched through the injected loader up front, then the
//! document is expanded by `fluree-graph-json-ld`. A context URL the engine
//! cannot resolve is removed from the document's top-level `@context` and the
//! expansion is attempted again.

use crate::error::{ContextError, Result};
use crate::loader::DocumentLoader;
use fluree_graph_json_ld::{expand_with_remote, remote_context_refs, RemoteContexts};
use futures::future::join_all;
use serde_json::Value as JsonValue;
use std::collections::HashSet;
use tracing::{debug, warn};

#[derive(Debug)]
pub struct ExpanderAdapter<'a> {
    loader: &'a dyn DocumentLoader,
    error_on_invalid_url: bool,
}

impl<'a> ExpanderAdapter<'a> {
    pub fn new(loader: &'a dyn DocumentLoader, error_on_invalid_url: bool) -> Self {
        Self {
            loader,
            error_on_invalid_url,
        }
    }

    /// Expand `doc`, always returning the expanded form as a sequence of
    /// node objects.
    pub async fn expand(&self, doc: &JsonValue) -> Result<Vec<JsonValue>> {
        let remote = self.prefetch(doc).await;
        let mut doc = doc.clone();

        loop {
            let err = match expand_with_remote(&doc, &remote) {
                Ok(expanded) => return Ok(into_sequence(expanded)),
                Err(err) => err,
            };

            let Some(url) = err.remote_url().map(str::to_owned) else {
                return Err(err.into());
            };
            if self.error_on_invalid_url {
                return Err(ContextError::InvalidUrl { url });
            }
            if !elide_context_url(&mut doc, &url) {
                return Err(err.into());
            }
            warn!(url = %url, "dropping unresolvable context URL and expanding again");
        }
    }

    /// Fetch every remote context the document references, following
    /// references found inside fetched contexts.
    async fn prefetch(&self, doc: &JsonValue) -> RemoteContexts {
        let mut remote = RemoteContexts::new();
        let mut seen = HashSet::new();
        let mut pending = remote_context_refs(doc);

        while !pending.is_empty() {
            let batch: Vec<String> = pending.drain(..).filter(|url| seen.insert(url.clone())).collect();
            let outcomes = join_all(batch.iter().map(|url| self.loader.load_context(url))).await;

            for (url, outcome) in batch.into_iter().zip(outcomes) {
                match outcome.map(|doc| doc.document) {
                    Ok(Some(body)) if body.get("@context").is_some() => {
                        debug!(url = %url, "prefetched remote context");
                        pending.extend(remote_context_refs(&body));
                        remote.insert(url, body);
                    }
                    Ok(_) => debug!(url = %url, "remote context document has no @context"),
                    Err(e) => debug!(url = %url, error = %e, "remote context unavailable"),
                }
            }
        }

        remote
    }
}

/// Remove `url` from the top-level `@context` (a scalar counts as a
/// one-element sequence). Returns false when it was not there.
fn elide_context_url(doc: &mut JsonValue, url: &str) -> bool {
    let Some(ctx) = doc.get_mut("@context") else {
        return false;
    };

    let entries = match ctx.take() {
        JsonValue::Array(items) => items,
        other => vec![other],
    };
    let before = entries.len();
    let kept: Vec<JsonValue> = entries
        .into_iter()
        .filter(|entry| entry.as_str() != Some(url))
        .collect();
    let removed = kept.len() < before;

    *ctx = JsonValue::Array(kept);
    removed
}

fn into_sequence(expanded: JsonValue) -> Vec<JsonValue> {
    match expanded {
        JsonValue::Array(nodes) => nodes,
        JsonValue::Null => Vec::new(),
        node => vec![node],
    }
}
