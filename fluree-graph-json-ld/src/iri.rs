/// Split a compact IRI like "schema:name" into (prefix, suffix).
///
/// Absolute IRIs (`http://...`) and strings without a colon are not compact
/// IRIs and return `None`. The blank prefix form ":suffix" yields prefix ":".
pub fn parse_prefix(s: &str) -> Option<(String, String)> {
    if let Some(suffix) = s.strip_prefix(':') {
        if suffix.is_empty() {
            return None;
        }
        return Some((":".to_string(), suffix.to_string()));
    }

    let (prefix, suffix) = s.split_once(':')?;
    if prefix.is_empty() || prefix.contains('/') || suffix.starts_with("//") {
        return None;
    }
    Some((prefix.to_string(), suffix.to_string()))
}

/// Returns true if string contains a colon (looks like an IRI or compact IRI)
pub fn any_iri(s: &str) -> bool {
    s.contains(':')
}

/// Returns true if the IRI starts with an RFC 3986 scheme
/// (`ALPHA *( ALPHA / DIGIT / "+" / "-" / "." ) ":"`).
pub fn is_absolute(iri: &str) -> bool {
    match iri.split_once(':') {
        Some((scheme, _)) => {
            scheme.as_bytes().first().is_some_and(u8::is_ascii_alphabetic)
                && scheme
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'-' || b == b'.')
        }
        None => false,
    }
}

/// Ensure IRI ends with '/' or '#'
pub fn add_trailing_slash(iri: &str) -> String {
    if iri.ends_with('/') || iri.ends_with('#') {
        iri.to_string()
    } else {
        format!("{}/", iri)
    }
}

/// Join base IRI with relative IRI
pub fn join(base: &str, relative: &str) -> String {
    if relative.starts_with('#') {
        format!("{}{}", base.trim_end_matches('/'), relative)
    } else if is_absolute(relative) {
        relative.to_string()
    } else {
        format!("{}{}", add_trailing_slash(base), relative)
    }
}
