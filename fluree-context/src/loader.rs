//! Document retrieval seam.
//!
//! Every network access goes through a [`DocumentLoader`] injected into
//! [`FlureeContext`](crate::FlureeContext). The crate ships
//! [`HttpDocumentLoader`](crate::HttpDocumentLoader) (feature `http`) and the
//! in-memory [`MemoryDocumentLoader`] for tests and offline pipelines.

use crate::error::LoaderError;
use crate::html;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

/// A retrieved context document.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteDocument {
    /// URL the document was finally retrieved from (after redirects or
    /// alternate-link hops).
    pub document_url: String,
    /// Parsed body; `None` when the response carried nothing usable.
    pub document: Option<JsonValue>,
}

impl RemoteDocument {
    pub fn new(document_url: impl Into<String>, document: JsonValue) -> Self {
        Self {
            document_url: document_url.into(),
            document: Some(document),
        }
    }

    /// A response that retrieved fine but had no content.
    pub fn empty(document_url: impl Into<String>) -> Self {
        Self {
            document_url: document_url.into(),
            document: None,
        }
    }

    /// The document's `@context`, when it is a term map or a sequence.
    pub fn context(&self) -> Option<&JsonValue> {
        self.document
            .as_ref()
            .and_then(|doc| doc.get("@context"))
            .filter(|ctx| ctx.is_object() || ctx.is_array())
    }
}

/// Retrieves context documents and vocabulary pages.
#[async_trait]
pub trait DocumentLoader: Debug + Send + Sync {
    /// Retrieve a JSON-LD context document (`Accept: application/ld+json`).
    async fn load_context(&self, url: &str) -> Result<RemoteDocument, LoaderError>;

    /// Retrieve the page at `url`, locate its embedded JSON-LD block and
    /// parse it (typically `{"@context": ..., "@graph": [...]}`).
    async fn load_vocabulary(&self, url: &str) -> Result<JsonValue, LoaderError>;
}

#[derive(Debug, Clone)]
enum VocabularySource {
    Page(String),
    Document(JsonValue),
}

/// In-memory loader serving pre-registered documents.
///
/// Records every URL requested so callers can assert on fetch behaviour.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentLoader {
    contexts: HashMap<String, RemoteDocument>,
    vocabularies: HashMap<String, VocabularySource>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MemoryDocumentLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `document` (a whole context document, `{"@context": ...}`) for `url`.
    pub fn with_context(mut self, url: impl Into<String>, document: JsonValue) -> Self {
        let url = url.into();
        self.contexts
            .insert(url.clone(), RemoteDocument::new(url, document));
        self
    }

    /// Serve a retrieval for `url` that succeeds without any content.
    pub fn with_empty_context(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.contexts.insert(url.clone(), RemoteDocument::empty(url));
        self
    }

    /// Serve an HTML page for `url`; the vocabulary is read from its embedded
    /// JSON-LD block.
    pub fn with_vocabulary_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.vocabularies
            .insert(url.into(), VocabularySource::Page(html.into()));
        self
    }

    /// Serve an already-extracted vocabulary document for `url`.
    pub fn with_vocabulary(mut self, url: impl Into<String>, document: JsonValue) -> Self {
        self.vocabularies
            .insert(url.into(), VocabularySource::Document(document));
        self
    }

    /// URLs requested so far, in request order.
    pub fn requested(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    fn record(&self, url: &str) {
        self.requests.lock().push(url.to_string());
    }
}

#[async_trait]
impl DocumentLoader for MemoryDocumentLoader {
    async fn load_context(&self, url: &str) -> Result<RemoteDocument, LoaderError> {
        self.record(url);
        self.contexts
            .get(url)
            .cloned()
            .ok_or_else(|| LoaderError::NotFound {
                url: url.to_string(),
            })
    }

    async fn load_vocabulary(&self, url: &str) -> Result<JsonValue, LoaderError> {
        self.record(url);
        match self.vocabularies.get(url) {
            Some(VocabularySource::Page(html)) => html::parse_embedded_json_ld(url, html),
            Some(VocabularySource::Document(doc)) => Ok(doc.clone()),
            None => Err(LoaderError::NotFound {
                url: url.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_memory_loader_serves_and_records() {
        let loader = MemoryDocumentLoader::new()
            .with_context("https://schema.org", json!({"@context": {"name": "https://schema.org/name"}}))
            .with_vocabulary_page(
                "https://schema.org/name",
                r#"<script type="application/ld+json">{"@graph": []}</script>"#,
            );

        let ctx = loader.load_context("https://schema.org").await.unwrap();
        assert!(ctx.context().is_some());

        let vocab = loader.load_vocabulary("https://schema.org/name").await.unwrap();
        assert_eq!(vocab, json!({"@graph": []}));

        let err = loader.load_context("https://missing.example/").await.unwrap_err();
        assert_eq!(err.url(), Some("https://missing.example/"));

        assert_eq!(
            loader.requested(),
            vec![
                "https://schema.org".to_string(),
                "https://schema.org/name".to_string(),
                "https://missing.example/".to_string()
            ]
        );
    }

    #[test]
    fn test_remote_document_context_shape() {
        assert!(RemoteDocument::empty("https://x.example/").context().is_none());
        assert!(RemoteDocument::new("https://x.example/", json!({"@context": "https://y.example/"}))
            .context()
            .is_none());
        assert!(RemoteDocument::new("https://x.example/", json!({"@context": [{"a": "b"}]}))
            .context()
            .is_some());
    }
}
