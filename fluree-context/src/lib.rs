//! Validate JSON-LD documents against their `@context` and harvest the
//! vocabulary definitions behind their types and properties.
//!
//! [`FlureeContext`] is the entry point. It owns the [`DocumentLoader`] used
//! for every retrieval, so the same code runs over HTTP
//! ([`HttpDocumentLoader`], feature `http`) or against pre-registered
//! documents ([`MemoryDocumentLoader`]).
//!
//! - [`FlureeContext::validate`] dereferences the document's context and drops
//!   every property or type it does not define.
//! - [`FlureeContext::is_valid`] answers whether nothing would be dropped.
//! - [`FlureeContext::include_vocabulary`] expands the document and merges the
//!   vocabulary documents published at its type and property IRIs.
//!
//! # Example
//!
//! ```
//! use fluree_context::{FlureeContext, MemoryDocumentLoader, ValidateOptions};
//! use serde_json::json;
//!
//! # futures::executor::block_on(async {
//! let loader = MemoryDocumentLoader::new().with_context(
//!     "https://schema.org",
//!     json!({"@context": {"schema": "https://schema.org/", "name": {"@id": "schema:name"}}}),
//! );
//! let ctx = FlureeContext::new(loader);
//!
//! let doc = json!({"@context": "https://schema.org", "name": "Arrival", "bogus": 1});
//! let validated = ctx
//!     .validate(&doc, &ValidateOptions::default().with_expand_context(false))
//!     .await
//!     .unwrap();
//!
//! assert_eq!(validated.document, json!({"@context": "https://schema.org", "name": "Arrival"}));
//! assert_eq!(validated.validity.errors, vec!["bogus"]);
//! # });
//! ```

pub mod error;
pub mod expand;
pub mod html;
#[cfg(feature = "http")]
pub mod http;
pub mod iri;
pub mod loader;
pub mod options;
pub mod resolve;
pub mod validate;
pub mod vocabulary;

pub use error::{ContextError, LoaderError, Result};
pub use expand::ExpanderAdapter;
#[cfg(feature = "http")]
pub use http::{HttpDocumentLoader, HttpLoaderConfig};
pub use loader::{DocumentLoader, MemoryDocumentLoader, RemoteDocument};
pub use options::{ValidateOptions, VocabularyOptions};
pub use resolve::{ContextMap, ContextParts, ContextResolver};
pub use validate::{validate_against, ValidatedDocument, ValidationResult};
pub use vocabulary::Vocabulary;

use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::debug;
use validate::check_document;
use vocabulary::VocabularyAggregator;

/// Validation and vocabulary aggregation over an injected [`DocumentLoader`].
///
/// Cloning is cheap; clones share the loader.
#[derive(Debug, Clone)]
pub struct FlureeContext {
    loader: Arc<dyn DocumentLoader>,
}

impl FlureeContext {
    pub fn new(loader: impl DocumentLoader + 'static) -> Self {
        Self {
            loader: Arc::new(loader),
        }
    }

    pub fn with_loader(loader: Arc<dyn DocumentLoader>) -> Self {
        Self { loader }
    }

    /// Loader backed by a default reqwest client.
    #[cfg(feature = "http")]
    pub fn http() -> Self {
        Self::new(HttpDocumentLoader::new())
    }

    #[cfg(feature = "http")]
    pub fn with_http_config(config: &HttpLoaderConfig) -> std::result::Result<Self, LoaderError> {
        Ok(Self::new(HttpDocumentLoader::from_config(config)?))
    }

    pub fn loader(&self) -> &dyn DocumentLoader {
        self.loader.as_ref()
    }

    /// Filter `doc` down to the properties and types its context defines.
    ///
    /// Undefined terms are dropped and listed in the returned
    /// [`ValidationResult`], or reported as
    /// [`ContextError::ValidationFailure`] when `error_on_invalid` is set.
    pub async fn validate(
        &self,
        doc: &JsonValue,
        options: &ValidateOptions,
    ) -> Result<ValidatedDocument> {
        let (_, context) = check_document(doc)?;

        let terms = ContextResolver::new(self.loader(), options.error_on_lookup_failure)
            .resolve(context)
            .await?;
        debug!(terms = terms.len(), "context dereferenced");

        validate_against(doc, &terms, options)
    }

    /// Whether every property and type of `doc` is defined by its context.
    ///
    /// Argument errors are returned; any other failure (malformed context
    /// URL, undefined terms, a class without `@id`) yields `Ok(false)`.
    pub async fn is_valid(&self, doc: &JsonValue) -> Result<bool> {
        let options = ValidateOptions::default().with_error_on_invalid(true);
        match self.validate(doc, &options).await {
            Ok(_) => Ok(true),
            Err(e @ ContextError::Argument(_)) => Err(e),
            Err(e) => {
                debug!(error = %e, "document is not valid");
                Ok(false)
            }
        }
    }

    /// Expand `doc` and merge in the vocabulary documents published at its
    /// type and property IRIs.
    pub async fn include_vocabulary(
        &self,
        doc: &JsonValue,
        options: &VocabularyOptions,
    ) -> Result<Vocabulary> {
        VocabularyAggregator::new(self.loader(), *options)
            .aggregate(doc)
            .await
    }
}
