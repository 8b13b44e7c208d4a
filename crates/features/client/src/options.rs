use crate::error::ClientError;
use serde::Serialize;
use sfetch_domain::PlainRequest;
use sfetch_domain::constants::is_forwarded_header;
use sfetch_domain::message::is_origin_relative;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Per-call options of [`crate::SecureClient::secure_send`], shaped like a normal fetch call.
///
/// ```rust
/// use sfetch_client::RequestOptions;
/// use std::time::Duration;
///
/// let options = RequestOptions::post()
///     .header("accept", "application/json")
///     .json(&serde_json::json!({ "name": "Ada" }))
///     .unwrap()
///     .timeout(Duration::from_secs(5));
/// assert_eq!(options.method_name(), "POST");
/// ```
#[derive(Debug, Clone)]
pub struct RequestOptions {
    method: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
    timeout: Option<Duration>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::get()
    }
}

impl RequestOptions {
    #[must_use]
    pub fn get() -> Self {
        Self::method("GET")
    }

    #[must_use]
    pub fn post() -> Self {
        Self::method("POST")
    }

    #[must_use]
    pub fn method(method: impl AsRef<str>) -> Self {
        Self {
            method: method.as_ref().to_ascii_uppercase(),
            headers: Vec::new(),
            body: Vec::new(),
            timeout: None,
        }
    }

    /// Adds a header. Only `content-type`, `accept` and `accept-language` are carried;
    /// anything else is dropped when the request is sealed.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Serializes `value` as the JSON body and sets `content-type: application/json`.
    ///
    /// # Errors
    /// Returns [`ClientError::InvalidRequest`] if `value` cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self, ClientError> {
        self.body = serde_json::to_vec(value).map_err(|e| ClientError::InvalidRequest {
            message: format!("JSON body: {e}").into(),
            context: None,
        })?;
        self.headers.retain(|(name, _)| !name.eq_ignore_ascii_case("content-type"));
        self.headers.push(("content-type".to_owned(), "application/json".to_owned()));
        Ok(self)
    }

    /// Overrides the configured deadline for this call.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn method_name(&self) -> &str {
        &self.method
    }

    pub(crate) const fn timeout_override(&self) -> Option<Duration> {
        self.timeout
    }

    /// Builds the plain request for `target` (absolute URL or origin-relative path).
    pub(crate) fn into_plain(self, target: &str, debug: bool) -> Result<PlainRequest, ClientError> {
        if self.method.is_empty() || !self.method.bytes().all(|b| b.is_ascii_alphabetic()) {
            return Err(ClientError::InvalidRequest {
                message: "method must be a non-empty ASCII token".into(),
                context: None,
            });
        }

        let path = target_path(target)?;
        let mut request = PlainRequest::new(self.method, path).with_body(self.body);
        for (name, value) in self.headers {
            if is_forwarded_header(&name) {
                request = request.with_header(name, value);
            } else if debug {
                debug!(header = %name, "Header not forwarded");
            }
        }
        Ok(request)
    }
}

/// Extracts the origin-relative path and query the middleware dispatches on.
///
/// Absolute URLs are accepted because callers typically pass the backend URL they
/// would have fetched directly; only its path and query travel, sealed.
pub(crate) fn target_path(target: &str) -> Result<String, ClientError> {
    if target.starts_with('/') {
        if is_origin_relative(target) {
            return Ok(target.to_owned());
        }
        return Err(ClientError::InvalidRequest {
            message: "target must be an origin-relative path or an absolute URL".into(),
            context: None,
        });
    }

    let url = Url::parse(target).map_err(|e| ClientError::InvalidRequest {
        message: format!("target URL: {e}").into(),
        context: None,
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ClientError::InvalidRequest {
            message: "target URL scheme must be http or https".into(),
            context: None,
        });
    }

    let mut path = url.path().to_owned();
    if let Some(query) = url.query() {
        path.push('?');
        path.push_str(query);
    }
    Ok(path)
}
