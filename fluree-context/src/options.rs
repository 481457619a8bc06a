//! Per-call options.
//!
//! Both structs deserialize from the camelCase keys used by JSON callers
//! (`{"errorOnInvalid": true}`); missing keys take their defaults.

use serde::{Deserialize, Serialize};

/// Options for [`FlureeContext::validate`](crate::FlureeContext::validate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidateOptions {
    /// Fail with `ValidationFailure` instead of silently dropping
    /// undefined properties/types.
    pub error_on_invalid: bool,

    /// Fail when a context URL cannot be retrieved instead of validating
    /// against whatever was retrievable.
    pub error_on_lookup_failure: bool,

    /// Replace the document's `@context` with the subset of definitions the
    /// validated document actually uses.
    pub expand_context: bool,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            error_on_invalid: false,
            error_on_lookup_failure: false,
            expand_context: true,
        }
    }
}

impl ValidateOptions {
    pub fn with_error_on_invalid(mut self, enabled: bool) -> Self {
        self.error_on_invalid = enabled;
        self
    }

    pub fn with_error_on_lookup_failure(mut self, enabled: bool) -> Self {
        self.error_on_lookup_failure = enabled;
        self
    }

    pub fn with_expand_context(mut self, enabled: bool) -> Self {
        self.expand_context = enabled;
        self
    }
}

/// Options for [`FlureeContext::include_vocabulary`](crate::FlureeContext::include_vocabulary).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VocabularyOptions {
    /// Fail when a type/property IRI has no retrievable vocabulary document.
    pub error_on_undefined_properties: bool,

    /// Fail when a context URL is rejected during expansion instead of
    /// retrying without it.
    pub error_on_invalid_url: bool,
}

impl VocabularyOptions {
    pub fn with_error_on_undefined_properties(mut self, enabled: bool) -> Self {
        self.error_on_undefined_properties = enabled;
        self
    }

    pub fn with_error_on_invalid_url(mut self, enabled: bool) -> Self {
        self.error_on_invalid_url = enabled;
        self
    }
}
