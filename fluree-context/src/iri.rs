use url::Url;

/// True for a well-formed `http`/`https` URL.
pub fn is_url(s: &str) -> bool {
    Url::parse(s).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
}

/// Text before the first colon, for strings shaped like `prefix:local`.
pub fn namespace_prefix(s: &str) -> Option<&str> {
    s.split_once(':').map(|(prefix, _)| prefix)
}
