//! Locating the embedded JSON-LD block in a vocabulary page.
//!
//! Vocabulary publishers (schema.org, most OWL/RDFS term pages) ship the
//! machine-readable definition of a term inside the human-readable HTML page
//! as `<script type="application/ld+json">`.

use crate::error::LoaderError;
use regex::Regex;
use serde_json::Value as JsonValue;
use std::sync::LazyLock;

static JSON_LD_SCRIPT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)<script\b[^>]*\btype\s*=\s*["']?application/ld\+json["']?[^>]*>(.*?)</script\s*>"#,
    )
    .expect("valid regex")
});

/// Text of the first `application/ld+json` script block, if any.
pub fn embedded_json_ld(html: &str) -> Option<&str> {
    JSON_LD_SCRIPT
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|text| !text.is_empty())
}

/// Extract and parse the embedded JSON-LD document of the page served at `url`.
pub fn parse_embedded_json_ld(url: &str, html: &str) -> Result<JsonValue, LoaderError> {
    let text = embedded_json_ld(html).ok_or_else(|| LoaderError::NoStructuredData {
        url: url.to_string(),
    })?;
    serde_json::from_str(text).map_err(|e| LoaderError::Json {
        url: url.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>name - Schema.org Property</title>
  <script type="text/javascript">var x = 1;</script>
  <SCRIPT TYPE="application/ld+json">
    {"@context": {"schema": "https://schema.org/"}, "@graph": [{"@id": "schema:name"}]}
  </SCRIPT>
</head>
<body></body>
</html>"#;

    #[test]
    fn test_finds_block_case_insensitively() {
        let doc = parse_embedded_json_ld("https://schema.org/name", PAGE).unwrap();
        assert_eq!(doc["@graph"], json!([{"@id": "schema:name"}]));
    }

    #[test]
    fn test_page_without_block() {
        let err = parse_embedded_json_ld("https://example.org/", "<html><body>hi</body></html>")
            .unwrap_err();
        assert!(matches!(err, LoaderError::NoStructuredData { .. }));
        assert_eq!(err.url(), Some("https://example.org/"));
    }

    #[test]
    fn test_malformed_block() {
        let html = r#"<script type="application/ld+json">{ not json</script>"#;
        let err = parse_embedded_json_ld("https://example.org/", html).unwrap_err();
        assert!(matches!(err, LoaderError::Json { .. }));
    }
}
