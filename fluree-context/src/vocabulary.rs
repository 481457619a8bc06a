//! Vocabulary aggregation.
//!
//! Walks the first node of the expanded document, fetches the vocabulary
//! document published at each type and property IRI, and folds the fetched
//! contexts and graphs into one result. Nodes recorded first win on `@id`
//! collisions; the emitted graph lists the most recently discovered node
//! first and the document's own node(s) last.

use crate::error::{ContextError, Result};
use crate::expand::ExpanderAdapter;
use crate::iri::is_url;
use crate::loader::DocumentLoader;
use crate::options::VocabularyOptions;
use crate::resolve::{ContextMap, ContextParts};
use crate::validate::check_document;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value as JsonValue};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Aggregated vocabulary: `{"@context": [...urls, map], "@graph": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vocabulary {
    #[serde(rename = "@context")]
    pub context: Vec<JsonValue>,
    #[serde(rename = "@graph")]
    pub graph: Vec<JsonValue>,
}

impl Vocabulary {
    pub fn node(&self, id: &str) -> Option<&JsonValue> {
        self.graph
            .iter()
            .find(|node| node.get("@id").and_then(JsonValue::as_str) == Some(id))
    }

    pub fn to_json(&self) -> JsonValue {
        json!({"@context": self.context, "@graph": self.graph})
    }
}

/// Graph nodes in merge order, deduplicated by `@id`.
#[derive(Debug, Default)]
struct GraphAccumulator {
    nodes: Vec<JsonValue>,
    ids: HashSet<String>,
}

impl GraphAccumulator {
    fn merge_node(&mut self, node: JsonValue) {
        if let Some(id) = node.get("@id").and_then(JsonValue::as_str) {
            if !self.ids.insert(id.to_string()) {
                return;
            }
        }
        self.nodes.push(node);
    }

    /// Merge a document's `@graph`, or the document itself minus `@context`.
    fn merge_document(&mut self, doc: &JsonValue) {
        match doc {
            JsonValue::Object(map) => match map.get("@graph") {
                Some(JsonValue::Array(nodes)) => {
                    for node in nodes {
                        self.merge_node(node.clone());
                    }
                }
                Some(node @ JsonValue::Object(_)) => self.merge_node(node.clone()),
                Some(_) => {}
                None => self.merge_node(JsonValue::Object(without_context(map))),
            },
            JsonValue::Array(docs) => {
                for doc in docs {
                    self.merge_document(doc);
                }
            }
            _ => {}
        }
    }

    fn into_graph(self) -> Vec<JsonValue> {
        let mut nodes = self.nodes;
        nodes.reverse();
        nodes
    }
}

fn without_context(map: &Map<String, JsonValue>) -> Map<String, JsonValue> {
    map.iter()
        .filter(|(k, _)| k.as_str() != "@context")
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

fn empty_vocabulary() -> JsonValue {
    json!({"@graph": [], "@context": []})
}

fn has_empty_graph(doc: &JsonValue) -> bool {
    doc.get("@graph")
        .and_then(JsonValue::as_array)
        .is_some_and(|nodes| nodes.is_empty())
}

pub(crate) struct VocabularyAggregator<'a> {
    loader: &'a dyn DocumentLoader,
    options: VocabularyOptions,
    urls: Vec<String>,
    terms: ContextMap,
    graph: GraphAccumulator,
}

impl<'a> VocabularyAggregator<'a> {
    pub(crate) fn new(loader: &'a dyn DocumentLoader, options: VocabularyOptions) -> Self {
        Self {
            loader,
            options,
            urls: Vec::new(),
            terms: ContextMap::new(),
            graph: GraphAccumulator::default(),
        }
    }

    pub(crate) async fn aggregate(mut self, doc: &JsonValue) -> Result<Vocabulary> {
        let (_, context) = check_document(doc)?;

        let expanded = ExpanderAdapter::new(self.loader, self.options.error_on_invalid_url)
            .expand(doc)
            .await?;

        let ContextParts { urls, inline } = ContextParts::split(context);
        self.urls = urls;
        self.terms = inline;
        self.graph.merge_document(doc);

        if let Some(JsonValue::Object(root)) = expanded.first() {
            self.collect(root).await?;
        }

        debug!(
            nodes = self.graph.nodes.len(),
            terms = self.terms.len(),
            "vocabulary aggregated"
        );

        let mut context: Vec<JsonValue> = self.urls.into_iter().map(JsonValue::String).collect();
        context.push(JsonValue::Object(self.terms.as_map().clone()));

        Ok(Vocabulary {
            context,
            graph: self.graph.into_graph(),
        })
    }

    async fn collect(&mut self, root: &Map<String, JsonValue>) -> Result<()> {
        for (key, value) in root {
            if key == "@type" {
                let types: Vec<&str> = match value {
                    JsonValue::Array(items) => items.iter().filter_map(JsonValue::as_str).collect(),
                    JsonValue::String(ty) => vec![ty.as_str()],
                    _ => Vec::new(),
                };
                if types.is_empty() || !types.iter().all(|ty| is_url(ty)) {
                    debug!(types = ?types, "skipping @type vocabulary: not every type is a URL");
                    continue;
                }

                let fetched = join_all(types.iter().map(|url| self.fetch(url))).await;
                for vocab in fetched {
                    let vocab = vocab?;
                    if !has_empty_graph(&vocab) {
                        self.merge(&vocab);
                    }
                }
            } else if is_url(key) {
                let vocab = self.fetch(key).await?;
                self.merge(&vocab);
            }
        }
        Ok(())
    }

    async fn fetch(&self, url: &str) -> Result<JsonValue> {
        match self.loader.load_vocabulary(url).await {
            Ok(vocab) => Ok(vocab),
            Err(e) if self.options.error_on_undefined_properties => {
                debug!(url = %url, error = %e, "vocabulary lookup failed");
                Err(ContextError::InvalidTypeOrProperty {
                    url: url.to_string(),
                })
            }
            Err(e) => {
                warn!(url = %url, error = %e, "vocabulary lookup failed, continuing without it");
                Ok(empty_vocabulary())
            }
        }
    }

    fn merge(&mut self, vocab: &JsonValue) {
        if let Some(ctx) = vocab.get("@context") {
            self.terms.underlay_context(ctx);
        }
        self.graph.merge_document(vocab);
    }
}
