use crate::error::ProxyError;
use crate::forward::{capture_response, into_downstream_request};
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::response::{IntoResponse, Response};
use sfetch_crypto::{CryptoEngine, MAX_PLAINTEXT_LEN, MessageKind};
use sfetch_domain::{PlainRequest, PlainResponse};
use sfetch_envelope::{CONTENT_TYPE, Envelope, MAX_ENVELOPE_LEN, Nonce};
use sfetch_kernel::config::ProxyConfig;
use std::sync::atomic::{AtomicU64, Ordering};
use tower::{BoxError, Service, ServiceExt};
use tracing::debug;

/// Space reserved for the encoded status and headers of a sealed response.
const RESPONSE_FRAMING_RESERVE: usize = 16 * 1024;

/// A request that passed every verification gate.
struct Verified {
    nonce: Nonce,
    request: PlainRequest,
}

/// Per-layer state shared by every clone of the proxy service.
#[derive(Debug)]
pub(crate) struct ProxyState {
    pub(crate) config: ProxyConfig,
    engine: CryptoEngine,
    next_id: AtomicU64,
}

impl ProxyState {
    pub(crate) fn new(config: ProxyConfig) -> Result<Self, ProxyError> {
        let replay = config.replay();
        let engine = CryptoEngine::builder()
            .secret(config.secret())
            .replay_window(replay.window)
            .replay_capacity(replay.capacity)
            .clock_skew(replay.clock_skew)
            .build()
            .map_err(|e| ProxyError::Internal {
                message: e.to_string().into(),
                context: Some("crypto engine".into()),
            })?;

        Ok(Self { config, engine, next_id: AtomicU64::new(1) })
    }

    /// `Received → Verified → Forwarded → Sealed → Responded`.
    pub(crate) async fn handle<S>(&self, inner: S, req: Request<Body>) -> Response
    where
        S: Service<Request<Body>, Response = Response> + Send,
        S::Future: Send,
        S::Error: Into<BoxError>,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        let verified = match self.verify(id, req).await {
            Ok(verified) => verified,
            Err(err) => {
                debug!(request_id = id, gate = err.kind(), "Secure request rejected");
                return err.into_response();
            },
        };

        let Verified { nonce, request } = verified;
        let plain = match self.forward(id, inner, request).await {
            Ok(plain) => plain,
            Err(err) => {
                debug!(request_id = id, stage = err.kind(), "Answering with sealed error status");
                PlainResponse::new(err.status().as_u16())
            },
        };

        self.seal(id, &plain, nonce).unwrap_or_else(|err| {
            debug!(request_id = id, stage = err.kind(), "Response sealing failed");
            err.into_response()
        })
    }

    fn debug(&self) -> bool {
        self.config.debug()
    }

    fn request_limit(&self) -> usize {
        self.config.max_body_bytes().min(MAX_ENVELOPE_LEN)
    }

    fn response_limit(&self) -> usize {
        self.config.max_body_bytes().min(MAX_PLAINTEXT_LEN - RESPONSE_FRAMING_RESERVE)
    }

    async fn verify(&self, id: u64, req: Request<Body>) -> Result<Verified, ProxyError> {
        if !has_envelope_content_type(&req) {
            return Err(ProxyError::UnsupportedMediaType);
        }

        let limit = self.request_limit();
        let body = to_bytes(req.into_body(), limit)
            .await
            .map_err(|_| ProxyError::PayloadTooLarge { limit })?;

        let envelope = Envelope::from_bytes(&body)?;
        let nonce = *envelope.nonce();
        if self.debug() {
            debug!(
                request_id = id,
                nonce = %nonce.fingerprint(),
                envelope_bytes = body.len(),
                "Received sealed request"
            );
        }

        let (_, request) = self.engine.open_value::<PlainRequest>(&envelope, MessageKind::Request)?;
        if self.debug() {
            debug!(request_id = id, nonce = %nonce.fingerprint(), body_bytes = request.body.len(), "Verified");
        }

        Ok(Verified { nonce, request })
    }

    async fn forward<S>(&self, id: u64, inner: S, request: PlainRequest) -> Result<PlainResponse, ProxyError>
    where
        S: Service<Request<Body>, Response = Response> + Send,
        S::Future: Send,
        S::Error: Into<BoxError>,
    {
        let downstream = into_downstream_request(request)?;

        let response = inner.oneshot(downstream).await.map_err(|e| {
            let e: BoxError = e.into();
            ProxyError::Downstream { message: e.to_string().into(), context: None }
        })?;
        let status = response.status();

        let plain = capture_response(response, self.response_limit()).await?;
        if self.debug() {
            debug!(
                request_id = id,
                status = status.as_u16(),
                body_bytes = plain.body.len(),
                "Forwarded"
            );
        }
        Ok(plain)
    }

    fn seal(&self, id: u64, plain: &PlainResponse, in_reply_to: Nonce) -> Result<Response, ProxyError> {
        let envelope = self
            .engine
            .seal_value(MessageKind::Response, plain, Some(in_reply_to))
            .map_err(|e| ProxyError::Internal { message: e.kind().into(), context: None })?;
        let wire = envelope
            .to_bytes()
            .map_err(|e| ProxyError::Internal { message: e.kind().into(), context: None })?;

        if self.debug() {
            debug!(
                request_id = id,
                nonce = %envelope.nonce().fingerprint(),
                in_reply_to = %in_reply_to.fingerprint(),
                envelope_bytes = wire.len(),
                "Sealed"
            );
        }

        Ok((StatusCode::OK, [(header::CONTENT_TYPE, CONTENT_TYPE)], wire).into_response())
    }
}

fn has_envelope_content_type(req: &Request<Body>) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|v| v.trim().eq_ignore_ascii_case(CONTENT_TYPE))
}
