//! `HttpDocumentLoader` against a local mock server.

#![cfg(feature = "http")]

mod support;

use fluree_context::{
    DocumentLoader, FlureeContext, HttpDocumentLoader, HttpLoaderConfig, LoaderError,
    ValidateOptions, VocabularyOptions,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use support::{init_tracing, movie_vocabulary, schema_context, vocabulary_page};
use wiremock::matchers::{header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn loader() -> HttpDocumentLoader {
    init_tracing();
    HttpDocumentLoader::from_config(&HttpLoaderConfig::default().with_request_timeout_ms(5_000))
        .expect("client")
}

#[tokio::test]
async fn context_is_requested_as_json_ld() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/context.jsonld"))
        .and(header_regex("accept", r"^application/ld\+json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(schema_context().to_string(), "application/ld+json"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/context.jsonld", server.uri());
    let doc = loader().load_context(&url).await.unwrap();

    assert_eq!(doc.document_url, url);
    assert_eq!(doc.context(), Some(&schema_context()["@context"]));
}

#[tokio::test]
async fn alternate_link_is_followed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<html><body>schema.org</body></html>", "text/html")
                .insert_header(
                    "link",
                    r#"</docs/jsonldcontext.jsonld>; rel="alternate"; type="application/ld+json""#,
                ),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/docs/jsonldcontext.jsonld"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(schema_context().to_string(), "application/json"),
        )
        .mount(&server)
        .await;

    let doc = loader()
        .load_context(&format!("{}/", server.uri()))
        .await
        .unwrap();

    assert!(doc.document_url.ends_with("/docs/jsonldcontext.jsonld"));
    assert!(doc.context().is_some());
}

#[tokio::test]
async fn alternate_link_can_be_disabled() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<html></html>", "text/html")
                .insert_header(
                    "link",
                    r#"</ctx>; rel="alternate"; type="application/ld+json""#,
                ),
        )
        .mount(&server)
        .await;

    let loader = HttpDocumentLoader::from_config(
        &HttpLoaderConfig::default().with_follow_alternate_links(false),
    )
    .unwrap();
    let err = loader
        .load_context(&format!("{}/", server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(err, LoaderError::Json { .. }));
}

#[tokio::test]
async fn empty_body_is_a_document_without_content() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/empty"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let doc = loader()
        .load_context(&format!("{}/empty", server.uri()))
        .await
        .unwrap();
    assert!(doc.document.is_none());
    assert!(doc.context().is_none());
}

#[tokio::test]
async fn error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let url = format!("{}/nope", server.uri());
    let err = loader().load_context(&url).await.unwrap_err();

    assert!(matches!(err, LoaderError::Status { status: 404, .. }));
    assert_eq!(err.url(), Some(url.as_str()));
}

#[tokio::test]
async fn vocabulary_page_block_is_extracted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/Movie"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(vocabulary_page(&movie_vocabulary()), "text/html"),
        )
        .mount(&server)
        .await;

    let vocab = loader()
        .load_vocabulary(&format!("{}/Movie", server.uri()))
        .await
        .unwrap();
    assert_eq!(vocab, movie_vocabulary());
}

#[tokio::test]
async fn validate_and_aggregate_over_http() {
    let server = MockServer::start().await;
    let base = server.uri();

    let context = json!({
        "@context": {
            "ex": format!("{base}/"),
            "Film": {"@id": "ex:Film"},
            "title": {"@id": "ex:title"}
        }
    });
    Mock::given(method("GET"))
        .and(path("/context.jsonld"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(context.to_string(), "application/ld+json"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/Film"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            vocabulary_page(&json!({"@graph": [{"@id": "ex:Film", "label": "Film"}]})),
            "text/html",
        ))
        .mount(&server)
        .await;

    init_tracing();
    let ctx = FlureeContext::with_http_config(&HttpLoaderConfig::default()).unwrap();
    let doc = json!({
        "@context": format!("{base}/context.jsonld"),
        "@type": "Film",
        "title": "Arrival",
        "runtime": 116
    });

    let validated = ctx.validate(&doc, &ValidateOptions::default()).await.unwrap();
    assert_eq!(validated.validity.errors, vec!["runtime"]);
    assert_eq!(
        validated.document["@context"],
        json!({
            "Film": {"@id": "ex:Film"},
            "ex": format!("{base}/"),
            "title": {"@id": "ex:title"}
        })
    );

    // the title page does not exist; that lookup is tolerated
    let vocab = ctx
        .include_vocabulary(&doc, &VocabularyOptions::default())
        .await
        .unwrap();
    assert_eq!(vocab.graph[0], json!({"@id": "ex:Film", "label": "Film"}));
    assert_eq!(vocab.graph.len(), 2);
}
