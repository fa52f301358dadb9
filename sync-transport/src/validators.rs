//! Cache validators captured from successful responses

use crate::http::HttpResponse;

/// Entity tag and modification time from the last changed response.
///
/// Both values are opaque and echoed back verbatim as `If-None-Match` /
/// `If-Modified-Since`. Each field is replaced only when a 200 response carries
/// a non-empty value for it, so a response that omits one validator never
/// erases the one cached earlier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheValidators {
    pub entity_tag: Option<String>,
    pub last_modified: Option<String>,
}

impl CacheValidators {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when at least one validator is cached
    pub fn is_present(&self) -> bool {
        self.entity_tag.is_some() || self.last_modified.is_some()
    }

    /// Conditional headers to attach to the next request
    pub fn conditional_headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = Vec::with_capacity(2);
        if let Some(tag) = &self.entity_tag {
            headers.push(("If-None-Match", tag.clone()));
        }
        if let Some(modified) = &self.last_modified {
            headers.push(("If-Modified-Since", modified.clone()));
        }
        headers
    }

    /// Take whatever validators a changed response provides
    pub(crate) fn absorb(&mut self, response: &HttpResponse) {
        if let Some(tag) = non_empty(response.header("etag")) {
            self.entity_tag = Some(tag.to_string());
        }
        if let Some(modified) = non_empty(response.header("last-modified")) {
            self.last_modified = Some(modified.to_string());
        }
    }

    pub fn clear(&mut self) {
        self.entity_tag = None;
        self.last_modified = None;
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
