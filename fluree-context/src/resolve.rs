//! Dereferencing a document's `@context` into a single term map.
//!
//! Inline term maps win over retrieved context documents; among retrieved
//! documents the first one processed wins.

use crate::error::{ContextError, LoaderError, Result};
use crate::iri;
use crate::loader::{DocumentLoader, RemoteDocument};
use futures::future::join_all;
use serde_json::{Map, Value as JsonValue};
use tracing::{debug, warn};

/// Term → definition map produced by dereferencing a context value.
///
/// A definition is either a plain IRI string or an object carrying `@id`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextMap {
    terms: Map<String, JsonValue>,
}

impl ContextMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, term: &str) -> Option<&JsonValue> {
        self.terms.get(term)
    }

    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains_key(term)
    }

    /// The `@id` of an object-shaped definition.
    pub fn definition_id(&self, term: &str) -> Option<&str> {
        self.get(term)
            .and_then(|def| def.get("@id"))
            .and_then(|id| id.as_str())
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, JsonValue> {
        &self.terms
    }

    /// Merge `map` over this one; incoming entries win.
    pub(crate) fn overlay(&mut self, map: &Map<String, JsonValue>) {
        for (term, def) in map {
            self.terms.insert(term.clone(), def.clone());
        }
    }

    /// Merge `map` under this one; existing entries win, new terms are appended.
    pub(crate) fn underlay(&mut self, map: &Map<String, JsonValue>) {
        for (term, def) in map {
            if !self.terms.contains_key(term) {
                self.terms.insert(term.clone(), def.clone());
            }
        }
    }

    /// Underlay every inline map of a retrieved `@context` (a map, or a
    /// sequence whose map elements are taken in order).
    pub(crate) fn underlay_context(&mut self, ctx: &JsonValue) {
        match ctx {
            JsonValue::Object(map) => self.underlay(map),
            JsonValue::Array(items) => {
                for item in items {
                    if let JsonValue::Object(map) = item {
                        self.underlay(map);
                    }
                }
            }
            _ => {}
        }
    }
}

impl From<Map<String, JsonValue>> for ContextMap {
    fn from(terms: Map<String, JsonValue>) -> Self {
        Self { terms }
    }
}

/// A context value split into its URL references and merged inline map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextParts {
    pub urls: Vec<String>,
    pub inline: ContextMap,
}

impl ContextParts {
    /// Split without checking URL syntax.
    pub fn split(context: &JsonValue) -> Self {
        let mut parts = ContextParts::default();
        match context {
            JsonValue::String(url) => parts.urls.push(url.clone()),
            JsonValue::Array(items) => {
                for item in items {
                    match item {
                        JsonValue::String(url) => parts.urls.push(url.clone()),
                        JsonValue::Object(map) => parts.inline.overlay(map),
                        _ => {}
                    }
                }
            }
            JsonValue::Object(map) => parts.inline.overlay(map),
            _ => {}
        }
        parts
    }

    /// Split, rejecting sequence entries that are strings but not http(s) URLs.
    pub fn split_checked(context: &JsonValue) -> Result<Self> {
        if let JsonValue::Array(items) = context {
            if let Some(bad) = items
                .iter()
                .filter_map(|item| item.as_str())
                .find(|s| !iri::is_url(s))
            {
                return Err(ContextError::MalformedContextUrl {
                    value: bad.to_string(),
                });
            }
        }
        Ok(Self::split(context))
    }
}

/// Turns a raw context value into a [`ContextMap`].
#[derive(Debug)]
pub struct ContextResolver<'a> {
    loader: &'a dyn DocumentLoader,
    error_on_lookup_failure: bool,
}

impl<'a> ContextResolver<'a> {
    pub fn new(loader: &'a dyn DocumentLoader, error_on_lookup_failure: bool) -> Self {
        Self {
            loader,
            error_on_lookup_failure,
        }
    }

    pub async fn resolve(&self, context: &JsonValue) -> Result<ContextMap> {
        let ContextParts { urls, inline } = ContextParts::split_checked(context)?;
        let mut map = inline;

        // settle every retrieval before interpreting any of them
        let outcomes: Vec<std::result::Result<RemoteDocument, LoaderError>> =
            join_all(urls.iter().map(|url| self.loader.load_context(url))).await;

        if self.error_on_lookup_failure {
            if let Some((url, _)) = urls.iter().zip(&outcomes).find(|(_, o)| o.is_err()) {
                return Err(ContextError::LookupFailure { url: url.clone() });
            }
            if let Some(empty) = outcomes
                .iter()
                .flatten()
                .find(|doc| doc.context().is_none())
            {
                return Err(ContextError::LookupFailure {
                    url: empty.document_url.clone(),
                });
            }
        }

        for (url, outcome) in urls.iter().zip(outcomes) {
            match outcome {
                Ok(doc) => match doc.context() {
                    Some(ctx) => {
                        debug!(url = %url, "merging retrieved context");
                        map.underlay_context(ctx);
                    }
                    None => warn!(url = %url, "retrieved context document has no usable @context"),
                },
                Err(e) => warn!(url = %url, error = %e, "context lookup failed, continuing without it"),
            }
        }

        Ok(map)
    }
}
