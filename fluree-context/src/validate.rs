//! Intersection of a document with a dereferenced context map.
//!
//! Keys the context does not define are dropped and recorded; everything else
//! is kept in the node's own key order. Nested node objects are checked against
//! the same map and their failures land in the same [`ValidationResult`].

use crate::error::{ContextError, Result};
use crate::iri::namespace_prefix;
use crate::options::ValidateOptions;
use crate::resolve::ContextMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use tracing::{debug, trace};

/// Outcome of validating one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    /// Bare names of dropped keys, in the order they were encountered
    /// (depth-first, document key order).
    pub errors: Vec<String>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }
}

impl ValidationResult {
    fn record(&mut self, term: &str) {
        self.is_valid = false;
        self.errors.push(term.to_string());
    }
}

/// A filtered document together with the terms that were filtered out.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedDocument {
    pub document: JsonValue,
    pub validity: ValidationResult,
}

impl ValidatedDocument {
    pub fn is_valid(&self) -> bool {
        self.validity.is_valid
    }

    pub fn into_document(self) -> JsonValue {
        self.document
    }
}

/// Argument checks shared by validation and vocabulary aggregation.
///
/// Returns the document's node object and its (non-empty) `@context`.
pub(crate) fn check_document(doc: &JsonValue) -> Result<(&Map<String, JsonValue>, &JsonValue)> {
    let node = doc.as_object().ok_or_else(ContextError::no_document)?;
    match node.get("@context") {
        None | Some(JsonValue::Null) | Some(JsonValue::Bool(false)) => {
            Err(ContextError::no_context())
        }
        Some(JsonValue::String(s)) if s.is_empty() => Err(ContextError::no_context()),
        Some(ctx) => Ok((node, ctx)),
    }
}

/// Filter `doc` against an already-dereferenced context map.
///
/// With `expand_context` the returned document's `@context` is replaced by
/// the definitions the retained keys and types use; otherwise the original
/// `@context` is kept.
pub fn validate_against(
    doc: &JsonValue,
    terms: &ContextMap,
    options: &ValidateOptions,
) -> Result<ValidatedDocument> {
    let (node, original_context) = check_document(doc)?;

    let mut intersection = Intersection::new(terms, options.expand_context);
    let mut filtered = intersection.node(node)?;
    let Intersection {
        expanded, validity, ..
    } = intersection;

    let context = if options.expand_context {
        JsonValue::Object(expanded)
    } else {
        original_context.clone()
    };
    filtered.insert("@context".to_string(), context);

    if !validity.is_valid {
        debug!(errors = ?validity.errors, "document has terms undefined by its context");
        if options.error_on_invalid {
            return Err(ContextError::ValidationFailure {
                terms: validity.errors,
            });
        }
    }

    Ok(ValidatedDocument {
        document: JsonValue::Object(filtered),
        validity,
    })
}

/// Objects that describe a node rather than a value, list or set.
fn is_node_object(value: &JsonValue) -> bool {
    value.as_object().is_some_and(|obj| {
        !obj.contains_key("@value") && !obj.contains_key("@list") && !obj.contains_key("@set")
    })
}

struct Intersection<'a> {
    terms: &'a ContextMap,
    expand_context: bool,
    /// Output context, shared by every recursion frame.
    expanded: Map<String, JsonValue>,
    validity: ValidationResult,
}

impl<'a> Intersection<'a> {
    fn new(terms: &'a ContextMap, expand_context: bool) -> Self {
        Self {
            terms,
            expand_context,
            expanded: Map::new(),
            validity: ValidationResult::default(),
        }
    }

    fn node(&mut self, node: &Map<String, JsonValue>) -> Result<Map<String, JsonValue>> {
        let mut out = Map::new();

        for (key, value) in node {
            match key.as_str() {
                "@context" | "@graph" | "@id" => {
                    out.insert(key.clone(), value.clone());
                }
                "@type" => {
                    if let Some(types) = self.types(value)? {
                        out.insert(key.clone(), types);
                    }
                }
                _ if self.terms.contains(key) => {
                    let value = self.value(value)?;
                    out.insert(key.clone(), value);
                    if self.expand_context {
                        self.copy_definition(key);
                    }
                }
                _ if namespace_prefix(key).is_some_and(|p| self.terms.contains(p)) => {
                    trace!(key = %key, "kept by namespace prefix");
                    out.insert(key.clone(), value.clone());
                    if self.expand_context {
                        self.copy_prefix(key);
                    }
                }
                _ => {
                    trace!(key = %key, "dropping undefined term");
                    self.validity.record(key);
                }
            }
        }

        Ok(out)
    }

    fn value(&mut self, value: &JsonValue) -> Result<JsonValue> {
        match value {
            JsonValue::Object(obj) if is_node_object(value) => Ok(JsonValue::Object(self.node(obj)?)),
            JsonValue::Array(items) if items.iter().all(JsonValue::is_object) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        JsonValue::Object(obj) if is_node_object(item) => {
                            out.push(JsonValue::Object(self.node(obj)?))
                        }
                        _ => out.push(item.clone()),
                    }
                }
                Ok(JsonValue::Array(out))
            }
            _ => Ok(value.clone()),
        }
    }

    /// Filtered `@type` value, or `None` when nothing survives.
    fn types(&mut self, value: &JsonValue) -> Result<Option<JsonValue>> {
        match value {
            JsonValue::Array(types) => {
                let mut kept = Vec::new();
                for ty in types {
                    if let Some(term) = ty.as_str() {
                        if self.type_matches(term)? {
                            kept.push(ty.clone());
                        }
                    }
                }
                Ok((!kept.is_empty()).then_some(JsonValue::Array(kept)))
            }
            JsonValue::String(term) => {
                Ok(self.type_matches(term)?.then(|| value.clone()))
            }
            _ => Ok(None),
        }
    }

    fn type_matches(&mut self, term: &str) -> Result<bool> {
        if self.terms.contains(term) {
            if self.expand_context {
                if definition_iri(self.terms.get(term)).is_none() {
                    return Err(ContextError::InvalidClass {
                        term: term.to_string(),
                    });
                }
                self.copy_definition(term);
            }
            return Ok(true);
        }
        if namespace_prefix(term).is_some_and(|p| self.terms.contains(p)) {
            if self.expand_context {
                self.copy_prefix(term);
            }
            return Ok(true);
        }
        Ok(false)
    }

    /// Copy the definition of the namespace prefix of a compact IRI.
    fn copy_prefix(&mut self, compact_iri: &str) {
        if let Some(prefix) = namespace_prefix(compact_iri) {
            if let Some(def) = self.terms.get(prefix) {
                self.expanded.insert(prefix.to_string(), def.clone());
            }
        }
    }

    /// Copy `term`'s definition into the output context, along with the
    /// definition of its IRI's namespace prefix when that prefix is a term.
    fn copy_definition(&mut self, term: &str) {
        let Some(def) = self.terms.get(term) else {
            return;
        };
        self.expanded.insert(term.to_string(), def.clone());

        if let Some(prefix) = definition_iri(Some(def)).and_then(namespace_prefix) {
            if let Some(prefix_def) = self.terms.get(prefix) {
                self.expanded.insert(prefix.to_string(), prefix_def.clone());
            }
        }
    }
}

/// IRI a definition maps to: the string itself, or its `@id`.
fn definition_iri(def: Option<&JsonValue>) -> Option<&str> {
    match def? {
        JsonValue::String(iri) => Some(iri),
        JsonValue::Object(obj) => obj.get("@id").and_then(JsonValue::as_str),
        _ => None,
    }
}
