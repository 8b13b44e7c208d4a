//! Translation between the sealed plain shapes and ordinary HTTP messages.

use crate::error::ProxyError;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderValue, Method, Request, Uri, header};
use axum::response::Response;
use sfetch_domain::constants::is_forwarded_header;
use sfetch_domain::{PlainRequest, PlainResponse};

/// Builds the internal request the downstream application receives.
///
/// Only the allow-listed headers travel; nothing from the outer transport request is copied.
pub(crate) fn into_downstream_request(plain: PlainRequest) -> Result<Request<Body>, ProxyError> {
    let method = Method::from_bytes(plain.method.as_bytes()).map_err(|_| invalid("method"))?;
    if !plain.has_relative_path() {
        return Err(invalid("path"));
    }
    let uri: Uri = plain.path.parse().map_err(|_| invalid("path"))?;

    let mut request = Request::builder().method(method).uri(uri);
    for h in plain.headers.iter().filter(|h| is_forwarded_header(&h.name)) {
        let value = HeaderValue::from_str(&h.value).map_err(|_| invalid("header value"))?;
        request = request.header(h.name.as_str(), value);
    }
    if !plain.body.is_empty() {
        request = request.header(header::CONTENT_LENGTH, plain.body.len());
    }

    request.body(Body::from(plain.body)).map_err(|_| invalid("request"))
}

/// Captures status, allow-listed headers and a body of at most `limit` bytes.
pub(crate) async fn capture_response(
    response: Response,
    limit: usize,
) -> Result<PlainResponse, ProxyError> {
    let (parts, body) = response.into_parts();
    let body = to_bytes(body, limit).await.map_err(|_| ProxyError::Downstream {
        message: format!("response body exceeds {limit} bytes or failed").into(),
        context: None,
    })?;

    let mut plain = PlainResponse::new(parts.status.as_u16()).with_body(body.to_vec());
    for (name, value) in &parts.headers {
        if let Ok(value) = value.to_str() {
            plain = plain.with_header(name.as_str(), value);
        }
    }
    Ok(plain)
}

fn invalid(what: &'static str) -> ProxyError {
    ProxyError::InvalidRequest { message: what.into(), context: None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[test]
    fn builds_request_with_allow_listed_headers_only() {
        let mut plain = PlainRequest::new("POST", "/api/echo?x=1")
            .with_header("content-type", "application/json")
            .with_body(b"{}".to_vec());
        plain.headers.push(sfetch_domain::Header::new("cookie", "session=1"));

        let request = into_downstream_request(plain).unwrap();
        assert_eq!(request.method(), Method::POST);
        assert_eq!(request.uri().path(), "/api/echo");
        assert_eq!(request.uri().query(), Some("x=1"));
        assert_eq!(request.headers()[header::CONTENT_TYPE], "application/json");
        assert!(request.headers().get(header::COOKIE).is_none());
    }

    #[test]
    fn rejects_bad_methods_and_paths() {
        for (method, path) in [("GE T", "/"), ("GET", "//evil/x"), ("GET", "http://evil/x"), ("GET", "/a b")] {
            let err = into_downstream_request(PlainRequest::new(method, path)).unwrap_err();
            assert_eq!(err.kind(), "InvalidRequest", "{method} {path}");
        }
    }

    #[tokio::test]
    async fn captures_status_and_body() {
        let response =
            (StatusCode::NOT_FOUND, [(header::CONTENT_TYPE, "text/plain")], "missing").into_response();
        let plain = capture_response(response, 1024).await.unwrap();

        assert_eq!(plain.status, 404);
        assert_eq!(plain.header("content-type"), Some("text/plain"));
        assert_eq!(plain.body, b"missing");
    }

    #[tokio::test]
    async fn oversized_body_is_a_downstream_failure() {
        let response = vec![0u8; 2048].into_response();
        let err = capture_response(response, 1024).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }
}
