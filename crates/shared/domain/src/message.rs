//! Plain request/response shapes carried inside sealed envelopes.
//!
//! These are the only things the downstream application ever sees. They are
//! small fixed structs, not dynamic objects: method, path, a header subset and raw body bytes.

use crate::constants::is_forwarded_header;
use serde::{Deserialize, Serialize};

/// A header name/value pair. Names are stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl AsRef<str>, value: impl Into<String>) -> Self {
        Self { name: name.as_ref().to_ascii_lowercase(), value: value.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlainRequest {
    pub method: String,
    /// Path plus optional query. Always origin-relative (starts with a single `/`).
    pub path: String,
    pub headers: Vec<Header>,
    pub body: Vec<u8>,
}

impl PlainRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self { method: method.into(), path: path.into(), headers: Vec::new(), body: Vec::new() }
    }

    /// Adds a header if it is on the forwarded allow-list; other names are ignored.
    #[must_use]
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        push_forwarded(&mut self.headers, name.as_ref(), value);
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Returns `true` if the path can be dispatched locally (no scheme, no authority).
    #[must_use]
    pub fn has_relative_path(&self) -> bool {
        is_origin_relative(&self.path)
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlainResponse {
    pub status: u16,
    pub headers: Vec<Header>,
    pub body: Vec<u8>,
}

impl PlainResponse {
    #[must_use]
    pub const fn new(status: u16) -> Self {
        Self { status, headers: Vec::new(), body: Vec::new() }
    }

    #[must_use]
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        push_forwarded(&mut self.headers, name.as_ref(), value);
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

fn push_forwarded(headers: &mut Vec<Header>, name: &str, value: impl Into<String>) {
    if is_forwarded_header(name) {
        headers.push(Header::new(name, value));
    }
}

fn find_header<'a>(headers: &'a [Header], name: &str) -> Option<&'a str> {
    headers.iter().find(|h| h.name.eq_ignore_ascii_case(name)).map(|h| h.value.as_str())
}

/// `/a/b?x=1` is relative, `//host/a` and `http://host/a` are not.
#[must_use]
pub fn is_origin_relative(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//") && !path.contains('\\')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_drops_headers_off_the_allow_list() {
        let req = PlainRequest::new("GET", "/api/greet/Ada")
            .with_header("Accept", "application/json")
            .with_header("Authorization", "Bearer nope")
            .with_header("Cookie", "session=1");

        assert_eq!(req.headers.len(), 1);
        assert_eq!(req.header("accept"), Some("application/json"));
        assert!(req.header("authorization").is_none());
    }

    #[test]
    fn relative_path_detection() {
        assert!(PlainRequest::new("GET", "/api/echo?x=1").has_relative_path());
        assert!(!PlainRequest::new("GET", "//evil.example/api").has_relative_path());
        assert!(!PlainRequest::new("GET", "http://evil.example/api").has_relative_path());
        assert!(!PlainRequest::new("GET", "api/echo").has_relative_path());
        assert!(!PlainRequest::new("GET", "").has_relative_path());
    }

    #[test]
    fn response_header_lookup_is_case_insensitive() {
        let res = PlainResponse::new(200).with_header("Content-Type", "application/json");
        assert_eq!(res.header("CONTENT-TYPE"), Some("application/json"));
        assert_eq!(res.headers[0].name, "content-type");
    }
}
