#![allow(dead_code)]

use axum::Router;
use axum::body::Bytes;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use sfetch_client::SecureClient;
use sfetch_crypto::prelude::*;
use sfetch_domain::{PlainRequest, PlainResponse, SharedSecret};
use sfetch_envelope::CONTENT_TYPE;
use sfetch_kernel::config::ClientConfig;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;

pub const SECRET: &str = "client-integration-secret-0123456789";

/// Serves `router` on an ephemeral port and returns its address.
/// # Panics
/// * If the listener cannot be bound.
pub async fn spawn(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("Bind failed");
    let addr = listener.local_addr().expect("Local address unavailable");
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    addr
}

/// # Panics
/// * If client setup fails.
pub fn client(addr: SocketAddr) -> SecureClient {
    client_with(addr, SECRET, Duration::from_secs(5))
}

/// # Panics
/// * If client setup fails.
pub fn client_with(addr: SocketAddr, secret: &str, timeout: Duration) -> SecureClient {
    let config = ClientConfig::builder()
        .secret(secret)
        .endpoint(format!("http://{addr}/secure"))
        .timeout(timeout)
        .debug(true)
        .build()
        .expect("Client config failed");
    SecureClient::new(config).expect("Client setup failed")
}

/// Engine of the stub endpoint, sharing [`SECRET`] with [`client`].
/// # Panics
/// * If engine setup fails.
pub fn peer() -> CryptoEngine {
    CryptoEngine::builder().secret(&SharedSecret::from(SECRET)).build().expect("Engine setup failed")
}

/// Opens a sealed request body, panicking on anything unexpected.
/// # Panics
/// * If the body is not a valid request envelope.
pub fn open_request(peer: &CryptoEngine, body: &[u8]) -> (Nonce, PlainRequest) {
    let envelope = Envelope::from_bytes(body).expect("Request envelope must decode");
    let nonce = *envelope.nonce();
    let (_, request) = peer
        .open_value::<PlainRequest>(&envelope, MessageKind::Request)
        .expect("Request envelope must verify");
    (nonce, request)
}

/// Seals `response` as the answer to `in_reply_to` and wraps it in a 200.
/// # Panics
/// * If sealing fails.
pub fn sealed(peer: &CryptoEngine, response: &PlainResponse, in_reply_to: Nonce) -> Response {
    let envelope = peer
        .seal_value(MessageKind::Response, response, Some(in_reply_to))
        .expect("Response sealing failed");
    let body = envelope.to_bytes().expect("Response encoding failed");
    (StatusCode::OK, [(header::CONTENT_TYPE, CONTENT_TYPE)], Bytes::from(body)).into_response()
}

/// # Panics
/// * If engine setup fails.
pub fn peer_with_secret(secret: &str) -> CryptoEngine {
    CryptoEngine::builder().secret(&SharedSecret::from(secret)).build().expect("Engine setup failed")
}
