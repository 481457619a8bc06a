//! Vocabulary aggregation integration tests.

mod support;

use fluree_context::{ContextError, FlureeContext, MemoryDocumentLoader, VocabularyOptions};
use fluree_graph_json_ld::JsonLdError;
use pretty_assertions::assert_eq;
use serde_json::{json, Value as JsonValue};
use std::collections::HashSet;
use support::{
    movie, schema_context, schema_fluree_context, vocabulary_page, MISSING_CONTEXT_URL,
    SCHEMA_CONTEXT_URL,
};

fn ids(graph: &[JsonValue]) -> Vec<&str> {
    graph
        .iter()
        .map(|node| node["@id"].as_str().unwrap_or("<none>"))
        .collect()
}

#[tokio::test]
async fn movie_vocabulary_is_aggregated() {
    let (ctx, loader) = schema_fluree_context();

    let vocab = ctx
        .include_vocabulary(&movie(), &VocabularyOptions::default())
        .await
        .unwrap();

    assert_eq!(
        vocab.context,
        vec![
            json!(SCHEMA_CONTEXT_URL),
            json!({
                "rdf": "http://www.w3.org/1999/02/22-rdf-syntax-ns#",
                "rdfs": "http://www.w3.org/2000/01/rdf-schema#",
                "schema": "https://schema.org/",
                "owl": "http://www.w3.org/2002/07/owl#"
            })
        ]
    );

    // most recently discovered first, the document itself last
    assert_eq!(
        ids(&vocab.graph),
        vec![
            "schema:director",
            "schema:name",
            "schema:Movie",
            "https://example.org/movies/arrival"
        ]
    );

    let mut own = movie();
    own.as_object_mut().unwrap().remove("@context");
    assert_eq!(vocab.graph.last(), Some(&own));

    assert_eq!(
        loader.requested(),
        vec![
            SCHEMA_CONTEXT_URL,
            "https://schema.org/Movie",
            "https://schema.org/name",
            "https://schema.org/director"
        ]
    );
}

#[tokio::test]
async fn first_recorded_node_wins() {
    let (ctx, _) = schema_fluree_context();

    let vocab = ctx
        .include_vocabulary(&movie(), &VocabularyOptions::default())
        .await
        .unwrap();

    // the name page also describes schema:Movie; the Movie page got there first
    assert_eq!(
        vocab.node("schema:Movie").unwrap()["rdfs:label"],
        json!("Movie")
    );

    let unique: HashSet<&str> = ids(&vocab.graph).into_iter().collect();
    assert_eq!(unique.len(), vocab.graph.len());
}

#[tokio::test]
async fn document_node_wins_over_vocabulary() {
    let loader = MemoryDocumentLoader::new()
        .with_context(SCHEMA_CONTEXT_URL, schema_context())
        .with_vocabulary_page(
            "https://schema.org/Movie",
            vocabulary_page(&json!({
                "@graph": [
                    {"@id": "https://example.org/movies/arrival", "name": "from the vocabulary"},
                    {"@id": "schema:Movie"}
                ]
            })),
        );
    let ctx = FlureeContext::new(loader);
    let doc = json!({
        "@context": SCHEMA_CONTEXT_URL,
        "@id": "https://example.org/movies/arrival",
        "@type": "Movie",
        "name": "Arrival"
    });

    let vocab = ctx
        .include_vocabulary(&doc, &VocabularyOptions::default())
        .await
        .unwrap();

    assert_eq!(vocab.graph.len(), 2);
    assert_eq!(
        vocab.node("https://example.org/movies/arrival").unwrap()["name"],
        json!("Arrival")
    );
}

#[tokio::test]
async fn graph_documents_seed_every_node() {
    let (ctx, _) = schema_fluree_context();
    let doc = json!({
        "@context": [SCHEMA_CONTEXT_URL, {"ex": "http://example.org/"}],
        "@graph": [
            {"@id": "ex:arrival", "@type": "Movie", "name": "Arrival"},
            {"@id": "ex:villeneuve", "@type": "Person", "name": "Denis Villeneuve"}
        ]
    });

    let vocab = ctx
        .include_vocabulary(&doc, &VocabularyOptions::default())
        .await
        .unwrap();

    assert_eq!(vocab.context[0], json!(SCHEMA_CONTEXT_URL));
    assert_eq!(vocab.context[1]["ex"], json!("http://example.org/"));

    // only the first expanded node drives lookups
    let graph_ids = ids(&vocab.graph);
    assert_eq!(
        graph_ids[graph_ids.len() - 2..].to_vec(),
        vec!["ex:villeneuve", "ex:arrival"]
    );
    assert!(vocab.node("schema:Movie").is_some());
}

#[tokio::test]
async fn missing_vocabulary_is_tolerated_unless_requested() {
    let (ctx, _) = schema_fluree_context();
    let doc = json!({
        "@context": SCHEMA_CONTEXT_URL,
        "@type": "Movie",
        "actor": {"@type": "Person", "name": "Amy Adams"}
    });

    let vocab = ctx
        .include_vocabulary(&doc, &VocabularyOptions::default())
        .await
        .unwrap();
    assert_eq!(ids(&vocab.graph), vec!["schema:Movie", "<none>"]);

    let err = ctx
        .include_vocabulary(
            &doc,
            &VocabularyOptions::default().with_error_on_undefined_properties(true),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ContextError::InvalidTypeOrProperty { .. }));
    assert_eq!(
        err.to_string(),
        "Could not retrieve property vocabulary document at https://schema.org/actor"
    );
}

#[tokio::test]
async fn non_url_type_skips_only_type_lookup() {
    let loader = MemoryDocumentLoader::new().with_vocabulary(
        "http://xmlns.com/foaf/0.1/name",
        json!({"@graph": [{"@id": "http://xmlns.com/foaf/0.1/name", "label": "name"}]}),
    );
    let ctx = FlureeContext::new(loader.clone());
    let doc = json!({
        "@context": {"name": "http://xmlns.com/foaf/0.1/name"},
        "@type": ["GLURPY"],
        "name": "x"
    });

    let vocab = ctx
        .include_vocabulary(&doc, &VocabularyOptions::default())
        .await
        .unwrap();

    assert_eq!(loader.requested(), vec!["http://xmlns.com/foaf/0.1/name"]);
    assert_eq!(ids(&vocab.graph)[0], "http://xmlns.com/foaf/0.1/name");
}

#[tokio::test]
async fn unreachable_context_is_dropped_for_expansion() {
    let (ctx, _) = schema_fluree_context();
    let doc = json!({
        "@context": [MISSING_CONTEXT_URL, SCHEMA_CONTEXT_URL],
        "@type": "Movie",
        "name": "Arrival"
    });

    let vocab = ctx
        .include_vocabulary(&doc, &VocabularyOptions::default())
        .await
        .unwrap();

    // the aggregated context still reflects the original document
    assert_eq!(
        &vocab.context[..2],
        &[json!(MISSING_CONTEXT_URL), json!(SCHEMA_CONTEXT_URL)]
    );
    assert_eq!(
        ids(&vocab.graph),
        vec!["schema:name", "schema:Movie", "<none>"]
    );
}

#[tokio::test]
async fn unreachable_context_fails_when_requested() {
    let (ctx, _) = schema_fluree_context();
    let doc = json!({"@context": MISSING_CONTEXT_URL, "name": "Arrival"});

    let err = ctx
        .include_vocabulary(&doc, &VocabularyOptions::default().with_error_on_invalid_url(true))
        .await
        .unwrap_err();

    assert!(matches!(err, ContextError::InvalidUrl { .. }));
    assert_eq!(err.url(), Some(MISSING_CONTEXT_URL));
}

#[tokio::test]
async fn typed_term_ignores_default_language() {
    let loader = MemoryDocumentLoader::new();
    let ctx = FlureeContext::new(loader.clone());
    let doc = json!({
        "@context": {
            "@language": "en",
            "born": {
                "@id": "http://schema.org/birthDate",
                "@type": "http://www.w3.org/2001/XMLSchema#date"
            }
        },
        "born": "1952-03-11"
    });

    let vocab = ctx
        .include_vocabulary(&doc, &VocabularyOptions::default())
        .await
        .unwrap();

    assert_eq!(ids(&vocab.graph), vec!["<none>"]);
    assert_eq!(vocab.graph[0]["born"], json!("1952-03-11"));
    assert_eq!(loader.requested(), vec!["http://schema.org/birthDate"]);
}

#[tokio::test]
async fn syntax_errors_are_not_retried() {
    let loader = MemoryDocumentLoader::new();
    let ctx = FlureeContext::new(loader.clone());
    let doc = json!({
        "@context": [MISSING_CONTEXT_URL, {"ex": "http://example.org/"}],
        "ex:m": [[1, 2]]
    });

    let err = ctx
        .include_vocabulary(&doc, &VocabularyOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ContextError::Syntax(JsonLdError::NestedSequence { .. })
    ));
    assert!(err.to_string().contains("Sequential values"));
    assert_eq!(loader.requested(), vec![MISSING_CONTEXT_URL]);
}

#[tokio::test]
async fn preconditions_match_validation() {
    let (ctx, _) = schema_fluree_context();

    for doc in [JsonValue::Null, json!({"name": "x"}), json!({"@context": null})] {
        let err = ctx
            .include_vocabulary(&doc, &VocabularyOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ContextError::Argument(_)));
    }
}
