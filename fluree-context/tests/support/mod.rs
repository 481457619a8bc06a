//! Shared fixtures for fluree-context integration tests.
//!
//! A miniature schema.org: one context document plus vocabulary pages for a
//! handful of classes and properties, served by a `MemoryDocumentLoader`.

// Not every test crate uses every fixture.
#![allow(dead_code)]

use fluree_context::{FlureeContext, MemoryDocumentLoader};
use serde_json::{json, Value as JsonValue};
use tracing_subscriber::EnvFilter;

pub const SCHEMA_CONTEXT_URL: &str = "https://schema.org";
pub const MISSING_CONTEXT_URL: &str = "https://missing.example/context.jsonld";

/// `RUST_LOG=fluree_context=debug cargo test` shows the library's logging.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn schema_context() -> JsonValue {
    json!({
        "@context": {
            "@vocab": "https://schema.org/",
            "schema": "https://schema.org/",
            "Movie": {"@id": "schema:Movie"},
            "Person": {"@id": "schema:Person"},
            "name": {"@id": "schema:name"},
            "director": {"@id": "schema:director"},
            "actor": {"@id": "schema:actor"},
            "sameAs": {"@id": "schema:sameAs", "@type": "@id"}
        }
    })
}

/// A schema.org-style term page: human-readable HTML wrapping the term's
/// machine-readable definition.
pub fn vocabulary_page(body: &JsonValue) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <title>schema.org</title>
  <script type="application/ld+json">
{body}
  </script>
</head>
<body><h1>Term</h1></body>
</html>"#
    )
}

pub fn movie_vocabulary() -> JsonValue {
    json!({
        "@context": {
            "rdf": "http://www.w3.org/1999/02/22-rdf-syntax-ns#",
            "rdfs": "http://www.w3.org/2000/01/rdf-schema#",
            "schema": "https://schema.org/"
        },
        "@graph": [{
            "@id": "schema:Movie",
            "@type": "rdfs:Class",
            "rdfs:label": "Movie",
            "rdfs:subClassOf": {"@id": "schema:CreativeWork"}
        }]
    })
}

pub fn name_vocabulary() -> JsonValue {
    json!({
        "@context": {
            "rdfs": "http://www.w3.org/2000/01/rdf-schema#",
            "schema": "http://schema.org/",
            "owl": "http://www.w3.org/2002/07/owl#"
        },
        "@graph": [
            {
                "@id": "schema:name",
                "@type": "rdf:Property",
                "rdfs:label": "name"
            },
            {
                "@id": "schema:Movie",
                "rdfs:label": "Movie (from the name page)"
            }
        ]
    })
}

pub fn director_vocabulary() -> JsonValue {
    json!({
        "@context": {"schema": "https://schema.org/"},
        "@id": "schema:director",
        "@type": "rdf:Property",
        "schema:rangeIncludes": {"@id": "schema:Person"}
    })
}

/// Loader serving the schema.org context plus Movie, name and director
/// vocabulary pages. `actor` has no page.
pub fn schema_loader() -> MemoryDocumentLoader {
    MemoryDocumentLoader::new()
        .with_context(SCHEMA_CONTEXT_URL, schema_context())
        .with_vocabulary_page("https://schema.org/Movie", vocabulary_page(&movie_vocabulary()))
        .with_vocabulary_page("https://schema.org/name", vocabulary_page(&name_vocabulary()))
        .with_vocabulary_page(
            "https://schema.org/director",
            vocabulary_page(&director_vocabulary()),
        )
}

pub fn schema_fluree_context() -> (FlureeContext, MemoryDocumentLoader) {
    init_tracing();
    let loader = schema_loader();
    (FlureeContext::new(loader.clone()), loader)
}

pub fn movie() -> JsonValue {
    json!({
        "@context": SCHEMA_CONTEXT_URL,
        "@id": "https://example.org/movies/arrival",
        "@type": ["Movie"],
        "name": "Arrival",
        "director": {"@type": "Person", "name": "Denis Villeneuve"}
    })
}
