//! Minimal JSON-LD processing library
//!
//! This library provides the JSON-LD pieces needed to interpret linked-data
//! payloads:
//! - Context parsing, including remote (URL) contexts
//! - IRI expansion
//! - Document expansion
//!
//! The library performs no I/O. Remote contexts are supplied by the caller in
//! a [`RemoteContexts`] store; use [`remote_context_refs`] to discover which
//! URLs a document needs. A reference the store cannot satisfy fails with
//! [`JsonLdError::InvalidRemoteContext`], which callers can tell apart from
//! syntax errors via [`JsonLdError::is_syntax`].
//!
//! # Example
//!
//! ```
//! use fluree_graph_json_ld::{expand_with_remote, remote_context_refs, RemoteContexts};
//! use serde_json::json;
//!
//! let doc = json!({
//!     "@context": "https://schema.org",
//!     "@type": "Movie",
//!     "name": "Arrival"
//! });
//! assert_eq!(remote_context_refs(&doc), vec!["https://schema.org".to_string()]);
//!
//! let mut remote = RemoteContexts::new();
//! remote.insert("https://schema.org", json!({"@context": {"@vocab": "https://schema.org/"}}));
//!
//! let expanded = expand_with_remote(&doc, &remote).unwrap();
//! assert_eq!(expanded["@type"], json!(["https://schema.org/Movie"]));
//! ```

pub mod context;
pub mod error;
pub mod expand;
pub mod iri;
pub mod remote;

pub use context::{Container, ContextEntry, ParsedContext, TypeValue};
pub use error::{JsonLdError, Result};
pub use remote::{remote_context_refs, RemoteContexts};

use serde_json::Value as JsonValue;

/// Parse a JSON-LD context that contains no URL references.
///
/// # Example
/// ```
/// use fluree_graph_json_ld::parse_context;
/// use serde_json::json;
///
/// let ctx = parse_context(&json!({"schema": "http://schema.org/"})).unwrap();
/// assert!(ctx.contains("schema"));
/// ```
pub fn parse_context(context: &JsonValue) -> Result<ParsedContext> {
    ParsedContext::parse(None, context)
}

/// Parse a JSON-LD context, resolving URL references through `remote`.
pub fn parse_context_with_remote(
    context: &JsonValue,
    remote: &RemoteContexts,
) -> Result<ParsedContext> {
    ParsedContext::parse_with_remote(None, context, remote)
}

/// Expand a compact IRI to its full form using `@vocab` for bare terms.
///
/// # Example
/// ```
/// use fluree_graph_json_ld::{parse_context, expand_iri};
/// use serde_json::json;
///
/// let ctx = parse_context(&json!({"schema": "http://schema.org/"})).unwrap();
/// assert_eq!(expand_iri("schema:name", &ctx), "http://schema.org/name");
/// ```
pub fn expand_iri(compact_iri: &str, context: &ParsedContext) -> String {
    expand::iri(compact_iri, context, true)
}

/// Get the expanded IRI together with the term definition that produced it.
pub fn details(compact_iri: &str, context: &ParsedContext) -> (String, Option<ContextEntry>) {
    expand::details(compact_iri, context, true)
}

/// Expand a JSON-LD document whose contexts are all inline.
pub fn expand(doc: &JsonValue) -> Result<JsonValue> {
    expand::node(doc, &ParsedContext::new(), &RemoteContexts::new())
}

/// Expand a JSON-LD document, resolving remote contexts through `remote`.
pub fn expand_with_remote(doc: &JsonValue, remote: &RemoteContexts) -> Result<JsonValue> {
    expand::node(doc, &ParsedContext::new(), remote)
}
