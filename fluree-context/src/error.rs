//! Error types for context validation and vocabulary aggregation

use fluree_graph_json_ld::JsonLdError;
use thiserror::Error;

/// Errors surfaced by [`FlureeContext`](crate::FlureeContext) operations
#[derive(Debug, Error)]
pub enum ContextError {
    /// Missing or null document, or a document without `@context`
    #[error("{0}")]
    Argument(String),

    /// A string inside a `@context` sequence that is not an http(s) URL
    #[error("The following provided '@context' value is not a valid URL: {value}")]
    MalformedContextUrl { value: String },

    /// A context document could not be retrieved or had no usable content
    #[error("Failed to retrieve context document from {url}")]
    LookupFailure { url: String },

    /// Vocabulary lookup for an expanded type/property IRI failed
    #[error("Could not retrieve property vocabulary document at {url}")]
    InvalidTypeOrProperty { url: String },

    /// A matched `@type` term whose definition carries no `@id`
    #[error("The following @type value is invalid: {term} appears not to be a Class")]
    InvalidClass { term: String },

    /// One or more terms are not defined by the context
    #[error(
        "The following properties failed validation against the provided '@context': {}",
        .terms.join(", ")
    )]
    ValidationFailure { terms: Vec<String> },

    /// A remote context URL rejected by the expansion engine
    #[error("Invalid remote context URL: {url}")]
    InvalidUrl { url: String },

    /// Expansion failure that no retry can fix
    #[error("JSON-LD expansion failed: {0}")]
    Syntax(#[from] JsonLdError),
}

impl ContextError {
    pub(crate) fn no_document() -> Self {
        ContextError::Argument("Could not validate. No JSON-LD document provided.".to_string())
    }

    pub(crate) fn no_context() -> Self {
        ContextError::Argument("Could not validate. No '@context' property in document".to_string())
    }

    /// The URL this error is about, when there is one.
    pub fn url(&self) -> Option<&str> {
        match self {
            ContextError::LookupFailure { url }
            | ContextError::InvalidTypeOrProperty { url }
            | ContextError::InvalidUrl { url } => Some(url),
            ContextError::Syntax(e) => e.remote_url(),
            _ => None,
        }
    }
}

/// Errors from a [`DocumentLoader`](crate::DocumentLoader)
#[derive(Debug, Clone, Error)]
pub enum LoaderError {
    /// Network or HTTP client failure
    #[error("Request to {url} failed: {message}")]
    Http { url: String, message: String },

    /// Non-success HTTP status
    #[error("Request to {url} failed with status {status}")]
    Status { url: String, status: u16 },

    /// Body was not valid JSON
    #[error("Invalid JSON retrieved from {url}: {message}")]
    Json { url: String, message: String },

    /// Page has no embedded `application/ld+json` block
    #[error("No embedded JSON-LD found at {url}")]
    NoStructuredData { url: String },

    /// Nothing registered for this URL (in-memory loader)
    #[error("No document available for {url}")]
    NotFound { url: String },

    /// Loader could not be constructed
    #[error("Failed to create HTTP client: {0}")]
    Client(String),
}

impl LoaderError {
    pub fn url(&self) -> Option<&str> {
        match self {
            LoaderError::Http { url, .. }
            | LoaderError::Status { url, .. }
            | LoaderError::Json { url, .. }
            | LoaderError::NoStructuredData { url }
            | LoaderError::NotFound { url } => Some(url),
            LoaderError::Client(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ContextError>;
