use serde_json::Value as JsonValue;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum JsonLdError {
    #[error("Invalid context: {message}")]
    InvalidContext { message: String },

    /// A remote context reference that the caller could not (or did not)
    /// supply a document for.
    #[error("Invalid remote context URL: {url}")]
    InvalidRemoteContext { url: String },

    #[error("Recursive context inclusion: {url}")]
    RecursiveContext { url: String },

    #[error("Invalid IRI mapping for term '{term}'")]
    InvalidIriMapping { term: String, context: JsonValue },

    #[error("@language cannot be used for values with a specified @type")]
    LanguageWithType,

    #[error("Sequential values within sequential values not allowed at index: {idx:?}")]
    NestedSequence { idx: Vec<JsonValue> },
}

impl JsonLdError {
    /// The offending URL when this is an unresolvable remote context.
    pub fn remote_url(&self) -> Option<&str> {
        match self {
            JsonLdError::InvalidRemoteContext { url } => Some(url),
            _ => None,
        }
    }

    /// Syntax-class failures are problems with the document itself; retrying
    /// with a different set of remote contexts can never fix them.
    pub fn is_syntax(&self) -> bool {
        !matches!(self, JsonLdError::InvalidRemoteContext { .. })
    }
}

pub type Result<T> = std::result::Result<T, JsonLdError>;
