#![allow(dead_code)]

use axum::Router;
use axum::extract::Path;
use axum::routing::{get, post};
use axum::{Json, body::Bytes};
use sfetch::client::{ClientConfig, SecureClient};
use sfetch::server::{ProxyConfig, mount};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};

pub const SECRET: &str = "end-to-end-shared-secret-0123456789";

/// Downstream behaviour knobs shared with the test.
#[derive(Debug, Clone, Default)]
pub struct Backend {
    pub hits: Arc<AtomicUsize>,
    /// When set, the next greet call never answers in time.
    pub hang_once: Arc<AtomicBool>,
}

impl Backend {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// The demo API: `GET /api/greet/{name}` and `POST /api/echo`.
pub fn api(backend: Backend) -> Router {
    let greet = {
        let backend = backend.clone();
        move |Path(name): Path<String>| async move {
            backend.hits.fetch_add(1, Ordering::SeqCst);
            if backend.hang_once.swap(false, Ordering::SeqCst) {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            Json(serde_json::json!({ "message": format!("Hello, {name}") }))
        }
    };
    let echo = move |body: Bytes| async move {
        backend.hits.fetch_add(1, Ordering::SeqCst);
        let sent: serde_json::Value = serde_json::from_slice(&body).unwrap_or_default();
        Json(serde_json::json!({ "you_sent": sent }))
    };

    Router::new().route("/api/greet/{name}", get(greet)).route("/api/echo", post(echo))
}

/// # Panics
/// * If the proxy cannot be configured.
pub fn secure_app(backend: Backend, secret: &str) -> Router {
    let config = ProxyConfig::builder().secret(secret).debug(true).build().expect("Proxy config failed");
    mount(config, "/secure", api(backend)).expect("Proxy setup failed")
}

/// Serves `router` on an ephemeral port.
/// # Panics
/// * If the listener cannot be bound.
pub async fn serve(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("Bind failed");
    let addr = listener.local_addr().expect("Local address unavailable");
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    addr
}

/// # Panics
/// * If the client cannot be configured.
pub fn client(addr: SocketAddr, timeout: Duration) -> SecureClient {
    let config = ClientConfig::builder()
        .secret(SECRET)
        .endpoint(format!("http://{addr}/secure"))
        .timeout(timeout)
        .debug(true)
        .build()
        .expect("Client config failed");
    SecureClient::new(config).expect("Client setup failed")
}

/// TCP relay in front of `target` that records every byte in both directions.
/// # Panics
/// * If the listener cannot be bound.
pub async fn recording_relay(target: SocketAddr) -> (SocketAddr, Arc<Mutex<Vec<u8>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("Bind failed");
    let addr = listener.local_addr().expect("Local address unavailable");
    let captured: Arc<Mutex<Vec<u8>>> = Arc::default();

    let wire = Arc::clone(&captured);
    tokio::spawn(async move {
        while let Ok((inbound, _)) = listener.accept().await {
            let Ok(outbound) = TcpStream::connect(target).await else { break };
            let wire = Arc::clone(&wire);
            tokio::spawn(async move {
                let (from_client, to_client) = inbound.into_split();
                let (from_server, to_server) = outbound.into_split();
                tokio::join!(
                    pipe(from_client, to_server, Arc::clone(&wire)),
                    pipe(from_server, to_client, wire)
                );
            });
        }
    });

    (addr, captured)
}

async fn pipe(mut from: OwnedReadHalf, mut to: OwnedWriteHalf, wire: Arc<Mutex<Vec<u8>>>) {
    let mut buf = [0u8; 8192];
    loop {
        match from.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                wire.lock().expect("Wire lock poisoned").extend_from_slice(&buf[..n]);
                if to.write_all(&buf[..n]).await.is_err() {
                    break;
                }
            },
        }
    }
    to.shutdown().await.ok();
}

pub fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}
