pub mod fixtures;

use fixtures::{engine, engine_with_secret};
use sfetch_crypto::prelude::*;
use sfetch_domain::{PlainRequest, PlainResponse};
use sfetch_domain::SharedSecret;
use std::collections::HashSet;
use std::time::Duration;

#[test]
fn seal_open_round_trip_between_peers() {
    let client = engine();
    let server = engine();

    let envelope = client.seal(MessageKind::Request, b"{\"hello\":\"world\"}", None).expect("seal");
    let opened = server.open(&envelope, MessageKind::Request).expect("open");

    assert_eq!(opened.plaintext, b"{\"hello\":\"world\"}");
    assert_eq!(opened.nonce, *envelope.nonce());
    assert_eq!(opened.metadata.kind, MessageKind::Request);
    assert!(opened.metadata.in_reply_to.is_none());
}

#[test]
fn round_trip_survives_the_wire_codec() {
    let client = engine();
    let server = engine();

    let wire = client.seal(MessageKind::Request, b"payload", None).unwrap().to_bytes().unwrap();
    let decoded = Envelope::from_bytes(&wire).unwrap();
    assert_eq!(server.open(&decoded, MessageKind::Request).unwrap().plaintext, b"payload");
}

#[test]
fn typed_request_response_exchange() {
    let client = engine();
    let server = engine();

    let request = PlainRequest::new("GET", "/api/greet/Ada").with_header("accept", "application/json");
    let sealed = client.seal_value(MessageKind::Request, &request, None).unwrap();

    let (meta, received): (Metadata, PlainRequest) =
        server.open_value(&sealed, MessageKind::Request).unwrap();
    assert_eq!(received, request);
    assert_eq!(meta.kind, MessageKind::Request);

    let response = PlainResponse::new(200).with_body(b"{\"message\":\"Hello, Ada\"}".to_vec());
    let sealed_response =
        server.seal_value(MessageKind::Response, &response, Some(*sealed.nonce())).unwrap();
    assert_ne!(sealed_response.nonce(), sealed.nonce());

    let (meta, answered): (Metadata, PlainResponse) =
        client.open_value(&sealed_response, MessageKind::Response).unwrap();
    assert_eq!(answered, response);
    assert_eq!(meta.in_reply_to, Some(*sealed.nonce()));
}

#[test]
fn wrong_key_is_rejected() {
    let envelope = engine().seal(MessageKind::Request, b"payload", None).unwrap();
    let other = engine_with_secret("a-completely-different-secret-value");

    assert!(matches!(
        other.open(&envelope, MessageKind::Request),
        Err(CryptoError::AuthenticationFailed)
    ));
}

#[test]
fn replayed_envelope_is_rejected() {
    let server = engine();
    let envelope = engine().seal(MessageKind::Request, b"payload", None).unwrap();

    assert!(server.open(&envelope, MessageKind::Request).is_ok());
    assert!(matches!(
        server.open(&envelope, MessageKind::Request),
        Err(CryptoError::ReplayDetected)
    ));
}

#[test]
fn clones_share_the_replay_window() {
    let server = engine();
    let clone = server.clone();
    let envelope = engine().seal(MessageKind::Request, b"payload", None).unwrap();

    assert!(server.open(&envelope, MessageKind::Request).is_ok());
    assert!(matches!(
        clone.open(&envelope, MessageKind::Request),
        Err(CryptoError::ReplayDetected)
    ));
}

#[test]
fn request_is_not_accepted_as_response() {
    let client = engine();
    let server = engine();
    let request = client.seal(MessageKind::Request, b"payload", None).unwrap();

    assert!(matches!(
        client.open(&request, MessageKind::Response),
        Err(CryptoError::AuthenticationFailed)
    ));
    // The failed attempt must not burn the nonce for the legitimate receiver.
    assert!(server.open(&request, MessageKind::Request).is_ok());
}

#[test]
fn stale_envelope_is_rejected() {
    let client = engine();
    let server = engine();

    let mut metadata = Metadata::request();
    metadata.issued_at_ms -= i64::try_from(server.max_age().as_millis()).unwrap() + 1_000;
    let stale = client.seal_with(metadata, b"payload").unwrap();

    assert!(matches!(server.open(&stale, MessageKind::Request), Err(CryptoError::ReplayDetected)));
}

#[test]
fn far_future_envelope_is_rejected() {
    let client = engine();
    let server = engine();

    let mut metadata = Metadata::request();
    metadata.issued_at_ms += i64::try_from(server.max_skew().as_millis()).unwrap() + 1_000;
    let future = client.seal_with(metadata, b"payload").unwrap();

    assert!(matches!(server.open(&future, MessageKind::Request), Err(CryptoError::ReplayDetected)));
}

#[test]
fn envelope_ahead_within_skew_is_accepted() {
    let server = engine();

    let mut metadata = Metadata::request();
    metadata.issued_at_ms += i64::try_from(server.max_skew().as_millis()).unwrap() - 1_000;
    let ahead = engine().seal_with(metadata, b"payload").unwrap();

    assert!(server.open(&ahead, MessageKind::Request).is_ok());
}

#[test]
fn replay_after_the_window_is_still_rejected_while_fresh() {
    let server = CryptoEngine::<Aes>::builder()
        .secret(&SharedSecret::from(fixtures::SECRET))
        .replay_window(Duration::from_millis(300))
        .clock_skew(Duration::from_millis(1_500))
        .build()
        .unwrap();
    let envelope = engine().seal(MessageKind::Request, b"transfer", None).unwrap();

    assert!(server.open(&envelope, MessageKind::Request).is_ok());
    std::thread::sleep(Duration::from_millis(700));

    assert!(matches!(
        server.open(&envelope, MessageKind::Request),
        Err(CryptoError::ReplayDetected)
    ));
}

#[test]
fn flood_cannot_push_a_nonce_out_of_the_replay_set() {
    let server = CryptoEngine::<Aes>::builder()
        .secret(&SharedSecret::from(fixtures::SECRET))
        .replay_capacity(64)
        .build()
        .unwrap();
    let client = engine();
    let target = client.seal(MessageKind::Request, b"transfer", None).unwrap();
    assert!(server.open(&target, MessageKind::Request).is_ok());

    let mut refused = 0;
    for _ in 0..2_000 {
        let envelope = client.seal(MessageKind::Request, b"noise", None).unwrap();
        if matches!(server.open(&envelope, MessageKind::Request), Err(CryptoError::ReplayDetected)) {
            refused += 1;
        }
    }

    assert_eq!(refused, 2_000 - 63);
    assert!(matches!(
        server.open(&target, MessageKind::Request),
        Err(CryptoError::ReplayDetected)
    ));
}

#[test]
fn ten_thousand_seals_use_distinct_nonces() {
    let engine = engine();
    let mut seen = HashSet::with_capacity(10_000);

    for _ in 0..10_000 {
        let envelope = engine.seal(MessageKind::Request, b"", None).unwrap();
        assert!(seen.insert(*envelope.nonce()), "nonce reused");
    }

    assert_eq!(seen.len(), 10_000);
}

#[test]
fn empty_plaintext_round_trips() {
    let client = engine();
    let server = engine();
    let envelope = client.seal(MessageKind::Request, b"", None).unwrap();
    assert!(server.open(&envelope, MessageKind::Request).unwrap().plaintext.is_empty());
}

#[test]
fn oversized_plaintext_is_refused() {
    let payload = vec![0u8; sfetch_crypto::MAX_PLAINTEXT_LEN + 1];
    let err = engine().seal(MessageKind::Request, &payload, None).unwrap_err();
    assert_eq!(err.kind(), "Encryption");
}
