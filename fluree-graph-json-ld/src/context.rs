use crate::error::{JsonLdError, Result};
use crate::iri;
use crate::remote::RemoteContexts;
use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;
use tracing::trace;

/// Container types for JSON-LD @container values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Container {
    List,
    Set,
    Language,
    Index,
}

/// Type values can be keywords or IRIs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeValue {
    Id,
    Vocab,
    Json,
    Iri(String),
}

/// A single term definition
#[derive(Debug, Clone, Default)]
pub struct ContextEntry {
    /// The expanded IRI (@id)
    pub id: Option<String>,
    /// Datatype coercion (@type)
    pub type_: Option<TypeValue>,
    /// Reverse property (@reverse)
    pub reverse: Option<String>,
    pub container: Option<Vec<Container>>,
    /// Term-scoped context (@context)
    pub context: Option<Box<ParsedContext>>,
    /// `Some(None)` means the language was explicitly cleared
    pub language: Option<Option<String>>,
}

/// The active context after processing one or more context values
#[derive(Debug, Clone, Default)]
pub struct ParsedContext {
    /// Key used for @id (can be aliased)
    pub id_key: String,
    /// Key used for @type (can be aliased)
    pub type_key: String,
    pub vocab: Option<String>,
    pub base: Option<String>,
    pub language: Option<String>,
    pub terms: HashMap<String, ContextEntry>,
}

impl ParsedContext {
    pub fn new() -> Self {
        Self {
            id_key: "@id".to_string(),
            type_key: "@type".to_string(),
            ..Default::default()
        }
    }

    pub fn get(&self, key: &str) -> Option<&ContextEntry> {
        self.terms.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.terms.contains_key(key)
    }

    /// Parse a context value that references no remote contexts.
    pub fn parse(base: Option<&ParsedContext>, context: &JsonValue) -> Result<ParsedContext> {
        Self::parse_with_remote(base, context, &RemoteContexts::new())
    }

    /// Parse a context value, resolving URL references through `remote`.
    pub fn parse_with_remote(
        base: Option<&ParsedContext>,
        context: &JsonValue,
        remote: &RemoteContexts,
    ) -> Result<ParsedContext> {
        let active = base.cloned().unwrap_or_else(ParsedContext::new);
        ContextParser::new(remote).parse(active, context)
    }

    /// Merge a term-scoped or type-scoped context over this one.
    pub(crate) fn scoped(&self, nested: &ParsedContext) -> ParsedContext {
        let mut merged = self.clone();
        merged
            .terms
            .extend(nested.terms.iter().map(|(k, v)| (k.clone(), v.clone())));
        if nested.vocab.is_some() {
            merged.vocab = nested.vocab.clone();
        }
        merged
    }
}

/// Processes context values against a remote-context store, tracking the
/// chain of URLs being dereferenced so that self-including contexts fail
/// instead of recursing forever.
struct ContextParser<'r> {
    remote: &'r RemoteContexts,
    resolving: Vec<String>,
}

impl<'r> ContextParser<'r> {
    fn new(remote: &'r RemoteContexts) -> Self {
        Self {
            remote,
            resolving: Vec::new(),
        }
    }

    fn parse(&mut self, mut active: ParsedContext, context: &JsonValue) -> Result<ParsedContext> {
        if active.id_key.is_empty() {
            active.id_key = "@id".to_string();
        }
        if active.type_key.is_empty() {
            active.type_key = "@type".to_string();
        }

        match context {
            // null resets the active context
            JsonValue::Null => Ok(ParsedContext::new()),

            JsonValue::String(url) => self.dereference(active, url),

            JsonValue::Object(map) => {
                if let Some(inner) = map.get("@context") {
                    return self.parse(active, inner);
                }
                self.parse_map(&active, map)
            }

            JsonValue::Array(items) => {
                for ctx in items {
                    active = self.parse(active, ctx)?;
                }
                Ok(active)
            }

            _ => Err(JsonLdError::InvalidContext {
                message: format!("Invalid context type: {:?}", context),
            }),
        }
    }

    fn dereference(&mut self, active: ParsedContext, url: &str) -> Result<ParsedContext> {
        if self.resolving.iter().any(|u| u == url) {
            return Err(JsonLdError::RecursiveContext {
                url: url.to_string(),
            });
        }

        let inner = self
            .remote
            .get(url)
            .and_then(|doc| doc.get("@context"))
            .ok_or_else(|| JsonLdError::InvalidRemoteContext {
                url: url.to_string(),
            })?;

        trace!(url, "applying remote context");
        self.resolving.push(url.to_string());
        let parsed = self.parse(active, inner);
        self.resolving.pop();
        parsed
    }

    fn parse_map(
        &mut self,
        base: &ParsedContext,
        map: &Map<String, JsonValue>,
    ) -> Result<ParsedContext> {
        let mut result = base.clone();

        for (key, value) in map.iter() {
            match key.as_str() {
                "@vocab" => result.vocab = compute_vocab(base, map, value)?,
                "@base" => {
                    if let JsonValue::String(s) = value {
                        result.base = Some(s.clone());
                    } else if value.is_null() {
                        result.base = None;
                    }
                }
                "@language" => result.language = value.as_str().map(str::to_string),
                _ => {}
            }
        }

        let default_vocab = result.vocab.clone();

        for (key, value) in map.iter().filter(|(k, _)| !k.starts_with('@')) {
            let entry = self.parse_entry(key, value, map, base, default_vocab.as_deref())?;

            match entry.id.as_deref() {
                Some("@id") => result.id_key = key.clone(),
                Some("@type") => result.type_key = key.clone(),
                _ => {}
            }

            result.terms.insert(key.clone(), entry);
        }

        Ok(result)
    }

    fn parse_entry(
        &mut self,
        key: &str,
        value: &JsonValue,
        local: &Map<String, JsonValue>,
        base: &ParsedContext,
        default_vocab: Option<&str>,
    ) -> Result<ContextEntry> {
        let resolve = |s: &str| resolve_compact_iri(s, local, base, default_vocab);

        match value {
            JsonValue::String(s) => {
                let target = term_target(s, local, &mut Vec::new())?;
                Ok(ContextEntry {
                    id: Some(resolve(&target)),
                    ..Default::default()
                })
            }

            JsonValue::Object(def) => {
                let mut entry = ContextEntry::default();

                for (k, v) in def.iter() {
                    match k.as_str() {
                        "@id" => entry.id = v.as_str().map(resolve),
                        "@reverse" => entry.reverse = v.as_str().map(resolve),
                        "@type" => {
                            entry.type_ = match v {
                                JsonValue::String(s) => Some(match resolve(s).as_str() {
                                    "@id" => TypeValue::Id,
                                    "@vocab" => TypeValue::Vocab,
                                    "@json" => TypeValue::Json,
                                    other => TypeValue::Iri(other.to_string()),
                                }),
                                JsonValue::Null => None,
                                _ => {
                                    return Err(JsonLdError::InvalidContext {
                                        message: format!("@type must be a string, got: {:?}", v),
                                    })
                                }
                            }
                        }
                        "@container" => entry.container = Some(parse_container(v)?),
                        "@context" => {
                            let nested = self.parse(ParsedContext::new(), v)?;
                            entry.context = Some(Box::new(nested));
                        }
                        "@language" => {
                            entry.language = Some(v.as_str().map(str::to_string));
                        }
                        _ => {}
                    }
                }

                // a definition without @id maps the term itself
                if entry.id.is_none() && entry.reverse.is_none() {
                    entry.id = Some(resolve(key));
                }

                Ok(entry)
            }

            _ => Err(JsonLdError::InvalidContext {
                message: format!("Invalid context entry for key '{}': {:?}", key, value),
            }),
        }
    }
}

/// Compute @vocab value, handling empty string and relative IRIs
fn compute_vocab(
    base_context: &ParsedContext,
    context: &Map<String, JsonValue>,
    value: &JsonValue,
) -> Result<Option<String>> {
    let local_base = context
        .get("@base")
        .and_then(|v| v.as_str())
        .or(base_context.base.as_deref());

    match value {
        JsonValue::String(s) if s.is_empty() => Ok(local_base.map(iri::add_trailing_slash)),
        JsonValue::String(s) if !iri::is_absolute(s) => Ok(Some(match local_base {
            Some(base) => iri::join(base, s),
            None => iri::add_trailing_slash(s),
        })),
        JsonValue::String(s) => Ok(Some(iri::add_trailing_slash(s))),
        JsonValue::Null => Ok(None),
        _ => Err(JsonLdError::InvalidContext {
            message: format!("@vocab must be a string, got: {:?}", value),
        }),
    }
}

/// Follow term-to-term references inside one context map until reaching an
/// IRI, compact IRI or keyword.
fn term_target(
    term: &str,
    context: &Map<String, JsonValue>,
    visited: &mut Vec<String>,
) -> Result<String> {
    let cyclic = || JsonLdError::InvalidIriMapping {
        term: term.to_string(),
        context: JsonValue::Object(context.clone()),
    };

    if visited.iter().any(|v| v == term) {
        return Err(cyclic());
    }

    match context.get(term) {
        Some(JsonValue::String(s)) if s == term => Err(cyclic()),
        Some(JsonValue::String(s)) if !s.contains(':') && !s.starts_with('@') => {
            visited.push(term.to_string());
            term_target(s, context, visited)
        }
        Some(JsonValue::Object(def)) => Ok(def
            .get("@id")
            .and_then(|id| id.as_str())
            .unwrap_or(term)
            .to_string()),
        _ => Ok(term.to_string()),
    }
}

/// Resolve a potentially compact IRI against the local map, then the
/// already-active context, then the default vocabulary.
fn resolve_compact_iri(
    value: &str,
    context: &Map<String, JsonValue>,
    base_context: &ParsedContext,
    default_vocab: Option<&str>,
) -> String {
    if let Some((prefix, suffix)) = iri::parse_prefix(value) {
        let local = context.get(&prefix).and_then(|v| match v {
            JsonValue::String(s) => Some(s.as_str()),
            JsonValue::Object(def) => def.get("@id").and_then(|id| id.as_str()),
            _ => None,
        });
        let inherited = base_context.get(&prefix).and_then(|e| e.id.as_deref());
        if let Some(prefix_iri) = local.or(inherited) {
            return format!("{}{}", prefix_iri, suffix);
        }
    }

    match default_vocab {
        Some(vocab) if !value.starts_with('@') && !iri::any_iri(value) => {
            format!("{}{}", vocab, value)
        }
        _ => value.to_string(),
    }
}

fn parse_container(value: &JsonValue) -> Result<Vec<Container>> {
    let one = |s: &str| match s {
        "@list" => Ok(Container::List),
        "@set" => Ok(Container::Set),
        "@language" => Ok(Container::Language),
        "@index" => Ok(Container::Index),
        _ => Err(JsonLdError::InvalidContext {
            message: format!("Unknown @container value: {}", s),
        }),
    };

    match value {
        JsonValue::String(s) => Ok(vec![one(s)?]),
        JsonValue::Array(items) => items
            .iter()
            .map(|item| match item.as_str() {
                Some(s) => one(s),
                None => Err(JsonLdError::InvalidContext {
                    message: format!("@container array items must be strings, got: {:?}", item),
                }),
            })
            .collect(),
        _ => Err(JsonLdError::InvalidContext {
            message: format!("@container must be a string or array, got: {:?}", value),
        }),
    }
}
