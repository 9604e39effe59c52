//! Query string encoding.
//!
//! The backend expects repeated parameters in bracket form
//! (`origin[]=1&origin[]=2`). Keys are written literally; only values are
//! percent-encoded. Absent values are skipped rather than sent empty.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters left unescaped in values (RFC 3986 unreserved).
const VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encode an id for use as a single path segment.
pub fn path_segment(s: &str) -> String {
    utf8_percent_encode(s, VALUE).to_string()
}

/// Ordered query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a single `key=value` pair.
    pub fn push(mut self, key: &str, value: impl ToString) -> Self {
        self.pairs.push((key.to_string(), value.to_string()));
        self
    }

    /// Add `key=value` if the value is present.
    pub fn push_opt(self, key: &str, value: Option<impl ToString>) -> Self {
        match value {
            Some(v) => self.push(key, v),
            None => self,
        }
    }

    /// Add `key[]=v` for every value.
    pub fn push_all<I, V>(mut self, key: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        let array_key = format!("{key}[]");
        for v in values {
            self.pairs.push((array_key.clone(), v.to_string()));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Encode without the leading `?`.
    pub fn encode(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| format!("{k}={}", utf8_percent_encode(v, VALUE)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Append to a URL, adding `?` only when there is something to add.
    pub fn append_to(&self, url: &str) -> String {
        if self.is_empty() {
            url.to_string()
        } else {
            format!("{url}?{}", self.encode())
        }
    }
}
