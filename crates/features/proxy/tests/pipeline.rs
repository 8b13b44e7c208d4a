mod fixtures;

use axum::http::StatusCode;
use fixtures::{Hits, app, client_engine, envelope_post, open, seal, send};
use sfetch_domain::PlainRequest;
use sfetch_envelope::CONTENT_TYPE;

#[tokio::test]
async fn test_greet_round_trip() {
    let hits = Hits::default();
    let app = app(hits.clone());
    let engine = client_engine();
    let (nonce, wire) = seal(&engine, &PlainRequest::new("GET", "/api/greet/Ada"));

    let (status, content_type, body) = send(&app, envelope_post(wire)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some(CONTENT_TYPE));
    assert!(!body.windows(3).any(|w| w == b"Ada"));

    let (response_nonce, response) = open(&engine, &body, nonce);
    assert_ne!(response_nonce, nonce);
    assert_eq!(response.status, 200);
    assert_eq!(response.header("content-type"), Some("application/json"));
    let json: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(json["message"], "Hello, Ada");
    assert_eq!(hits.get(), 1);
}

#[tokio::test]
async fn test_only_allow_listed_headers_reach_downstream() {
    let app = app(Hits::default());
    let engine = client_engine();
    let mut request = PlainRequest::new("POST", "/api/echo")
        .with_header("accept", "application/json")
        .with_body(b"ping".to_vec());
    request.headers.push(sfetch_domain::Header::new("cookie", "session=1"));
    let (nonce, wire) = seal(&engine, &request);

    let (_, _, body) = send(&app, envelope_post(wire)).await;
    let (_, response) = open(&engine, &body, nonce);
    let json: serde_json::Value = serde_json::from_slice(&response.body).unwrap();

    assert_eq!(json["you_sent"], "ping");
    assert_eq!(json["accept"], "application/json");
    assert_eq!(json["cookie"], false);
}

#[tokio::test]
async fn test_inner_status_travels_sealed() {
    let app = app(Hits::default());
    let engine = client_engine();
    let (nonce, wire) = seal(&engine, &PlainRequest::new("GET", "/api/missing"));

    let (status, _, body) = send(&app, envelope_post(wire)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(open(&engine, &body, nonce).1.status, 404);
}

#[tokio::test]
async fn test_invalid_path_after_verification_is_sealed_400() {
    let hits = Hits::default();
    let app = app(hits.clone());
    let engine = client_engine();

    for (method, path) in [("GET", "//evil.example/api"), ("GET", "http://evil/api"), ("G T", "/api/greet/Ada")] {
        let (nonce, wire) = seal(&engine, &PlainRequest::new(method, path));
        let (status, _, body) = send(&app, envelope_post(wire)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(open(&engine, &body, nonce).1.status, 400, "{method} {path}");
    }
    assert_eq!(hits.get(), 0);
}

#[tokio::test]
async fn test_oversized_downstream_response_is_sealed_502() {
    let app = app(Hits::default());
    let engine = client_engine();
    let (nonce, wire) = seal(&engine, &PlainRequest::new("GET", "/api/huge"));

    let (status, _, body) = send(&app, envelope_post(wire)).await;
    assert_eq!(status, StatusCode::OK);
    let (_, response) = open(&engine, &body, nonce);
    assert_eq!(response.status, 502);
    assert!(response.body.is_empty());
}
