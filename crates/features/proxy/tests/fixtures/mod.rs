#![allow(dead_code)]

use axum::Router;
use axum::body::{Body, Bytes, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, extract::Path};
use sfetch_crypto::prelude::*;
use sfetch_domain::{PlainRequest, PlainResponse, SharedSecret};
use sfetch_envelope::CONTENT_TYPE;
use sfetch_kernel::config::ProxyConfig;
use sfetch_proxy::SecureProxyLayer;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tower::ServiceExt;

pub const SECRET: &str = "proxy-integration-secret-0123456789";
pub const BODY_LIMIT: usize = 64 * 1024;

/// Counts how often the downstream application was reached.
#[derive(Debug, Clone, Default)]
pub struct Hits(Arc<AtomicUsize>);

impl Hits {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Demo-shaped API: greet, echo, a 404 route and an oversized response.
pub fn api(hits: Hits) -> Router {
    let greet = {
        let hits = hits.clone();
        move |Path(name): Path<String>| async move {
            hits.hit();
            Json(serde_json::json!({ "message": format!("Hello, {name}") }))
        }
    };
    let echo = {
        let hits = hits.clone();
        move |req: Request<Body>| async move {
            hits.hit();
            let accept = req.headers().get(header::ACCEPT).cloned();
            let cookie = req.headers().get(header::COOKIE).cloned();
            let body = to_bytes(req.into_body(), usize::MAX).await.unwrap_or_default();
            Json(serde_json::json!({
                "you_sent": String::from_utf8_lossy(&body),
                "accept": accept.and_then(|v| v.to_str().ok().map(str::to_owned)),
                "cookie": cookie.is_some(),
            }))
        }
    };
    let huge = move || async move {
        hits.hit();
        vec![b'x'; BODY_LIMIT + 1]
    };

    Router::new()
        .route("/api/greet/{name}", get(greet))
        .route("/api/echo", post(echo))
        .route("/api/huge", get(huge))
}

/// `/secure` in front of [`api`]; the API is not reachable any other way.
/// # Panics
/// * If the proxy configuration is rejected.
pub fn app(hits: Hits) -> Router {
    let config = ProxyConfig::builder()
        .secret(SECRET)
        .max_body_bytes(BODY_LIMIT)
        .debug(true)
        .build()
        .expect("Proxy config failed");
    let layer = SecureProxyLayer::new(config).expect("Proxy setup failed");
    Router::new().nest_service("/secure", layer.wrap(api(hits)))
}

/// Client-side engine over [`SECRET`].
/// # Panics
/// * If engine setup fails.
pub fn client_engine() -> CryptoEngine {
    engine_with_secret(SECRET)
}

/// # Panics
/// * If engine setup fails.
pub fn engine_with_secret(secret: &str) -> CryptoEngine {
    CryptoEngine::builder().secret(&SharedSecret::from(secret)).build().expect("Engine setup failed")
}

/// Seals `request` and returns the wire bytes with the request nonce.
/// # Panics
/// * If sealing fails.
pub fn seal(engine: &CryptoEngine, request: &PlainRequest) -> (Nonce, Vec<u8>) {
    let envelope = engine.seal_value(MessageKind::Request, request, None).expect("Sealing failed");
    (*envelope.nonce(), envelope.to_bytes().expect("Encoding failed"))
}

pub fn envelope_post(body: impl Into<Body>) -> Request<Body> {
    Request::post("/secure")
        .header(header::CONTENT_TYPE, CONTENT_TYPE)
        .body(body.into())
        .expect("Request build failed")
}

/// Sends `request` to `app` and returns status, content type and body.
/// # Panics
/// * If the service or body fails.
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Option<String>, Bytes) {
    let response: Response = app.clone().oneshot(request).await.unwrap_or_else(|never| match never {});
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let body = to_bytes(response.into_body(), usize::MAX).await.expect("Body read failed");
    (status, content_type, body)
}

/// Opens a sealed response, checking it answers `request_nonce`.
/// # Panics
/// * If the body is not a valid response to `request_nonce`.
pub fn open(engine: &CryptoEngine, body: &[u8], request_nonce: Nonce) -> (Nonce, PlainResponse) {
    let envelope = Envelope::from_bytes(body).expect("Response envelope must decode");
    let nonce = *envelope.nonce();
    let (metadata, response) = engine
        .open_value::<PlainResponse>(&envelope, MessageKind::Response)
        .expect("Response envelope must verify");
    assert_eq!(metadata.in_reply_to, Some(request_nonce));
    (nonce, response)
}
