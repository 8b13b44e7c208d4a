use crate::error::{ClientError, from_open_error, from_seal_error};
use crate::options::RequestOptions;
use crate::response::SecureResponse;
use crate::session::SessionContext;
use bytes::BytesMut;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use sfetch_crypto::{CryptoEngine, MessageKind};
use sfetch_domain::PlainResponse;
use sfetch_envelope::{CONTENT_TYPE as ENVELOPE_CONTENT_TYPE, Envelope, MAX_ENVELOPE_LEN};
use sfetch_kernel::config::ClientConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = concat!("sfetch-client/", env!("CARGO_PKG_VERSION"));

#[derive(Debug)]
struct ClientInner {
    config: ClientConfig,
    engine: CryptoEngine,
    http: reqwest::Client,
}

/// Sends requests through a secure endpoint.
///
/// Each call seals method, path, allowed headers and body into one envelope, posts it
/// to the configured endpoint and accepts only a sealed response answering that exact
/// request. Configuration is fixed at construction; clones share the connection pool
/// and the replay window.
///
/// ```rust,no_run
/// use sfetch_client::{RequestOptions, SecureClient};
/// use sfetch_kernel::config::ClientConfig;
///
/// # async fn run() -> Result<(), sfetch_client::ClientError> {
/// let config = ClientConfig::builder()
///     .secret("correct horse battery staple")
///     .endpoint("http://localhost:3000/secure")
///     .build()?;
/// let client = SecureClient::new(config)?;
///
/// let response = client.secure_send("http://localhost:3000/api/greet/Ada", RequestOptions::get()).await?;
/// if response.ok() {
///     let greeting: serde_json::Value = response.json()?;
///     assert_eq!(greeting["message"], "Hello, Ada");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SecureClient {
    inner: Arc<ClientInner>,
}

impl SecureClient {
    /// # Errors
    /// Returns [`ClientError::Internal`] if the crypto engine rejects the replay policy,
    /// or [`ClientError::Network`] if the HTTP client cannot be created.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Self::with_http_client(config, http)
    }

    /// Uses a caller-provided `reqwest` client (proxies, TLS roots, pool settings).
    ///
    /// # Errors
    /// Returns [`ClientError::Internal`] if the crypto engine rejects the replay policy.
    pub fn with_http_client(config: ClientConfig, http: reqwest::Client) -> Result<Self, ClientError> {
        let replay = config.replay();
        let engine = CryptoEngine::builder()
            .secret(config.secret())
            .replay_window(replay.window)
            .replay_capacity(replay.capacity)
            .clock_skew(replay.clock_skew)
            .build()
            .map_err(|e| ClientError::Internal {
                message: e.to_string().into(),
                context: Some("crypto engine".into()),
            })?;

        Ok(Self { inner: Arc::new(ClientInner { config, engine, http }) })
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Sends one request through the secure endpoint.
    ///
    /// `url` is either an absolute URL (only its path and query are used) or an
    /// origin-relative path such as `/api/greet/Ada`.
    ///
    /// # Errors
    /// * [`ClientError::Timeout`] when the deadline elapses; the call may be retried.
    /// * [`ClientError::AuthenticationFailed`] when the response cannot be verified or does
    ///   not answer this request.
    /// * [`ClientError::Rejected`] when the endpoint answers with a non-success status.
    /// * [`ClientError::Network`] for connection-level failures.
    /// * [`ClientError::InvalidRequest`] for an unusable `url`, method or body.
    pub async fn secure_send(
        &self,
        url: &str,
        options: RequestOptions,
    ) -> Result<SecureResponse, ClientError> {
        let deadline = options.timeout_override().unwrap_or_else(|| self.inner.config.timeout());

        match tokio::time::timeout(deadline, self.round_trip(url, options, deadline)).await {
            Ok(result) => result,
            Err(_) => {
                if self.debug() {
                    debug!(timeout_ms = deadline.as_millis(), "Secure request timed out");
                }
                Err(ClientError::Timeout { after: deadline })
            },
        }
    }

    /// `GET url`.
    ///
    /// # Errors
    /// See [`SecureClient::secure_send`].
    pub async fn get(&self, url: &str) -> Result<SecureResponse, ClientError> {
        self.secure_send(url, RequestOptions::get()).await
    }

    /// `POST url` with a JSON body.
    ///
    /// # Errors
    /// See [`SecureClient::secure_send`].
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
    ) -> Result<SecureResponse, ClientError> {
        self.secure_send(url, RequestOptions::post().json(body)?).await
    }

    fn debug(&self) -> bool {
        self.inner.config.debug()
    }

    /// Error context is only attached in debug mode.
    fn context(&self, context: &'static str) -> Option<std::borrow::Cow<'static, str>> {
        self.debug().then_some(std::borrow::Cow::Borrowed(context))
    }

    fn network(&self, err: reqwest::Error, context: &'static str, deadline: Duration) -> ClientError {
        if err.is_timeout() {
            return ClientError::Timeout { after: deadline };
        }
        ClientError::Network { source: err, context: self.context(context) }
    }

    async fn round_trip(
        &self,
        url: &str,
        options: RequestOptions,
        deadline: Duration,
    ) -> Result<SecureResponse, ClientError> {
        let request = options.into_plain(url, self.debug())?;

        let envelope = self
            .inner
            .engine
            .seal_value(MessageKind::Request, &request, None)
            .map_err(from_seal_error)?;
        let session = SessionContext::new(*envelope.nonce());
        let wire = envelope.to_bytes().map_err(|e| ClientError::InvalidRequest {
            message: e.to_string().into(),
            context: self.context("encoding request envelope"),
        })?;
        drop(request);

        if self.debug() {
            debug!(
                nonce = %session.request_nonce().fingerprint(),
                envelope_bytes = wire.len(),
                "Sending sealed request"
            );
        }

        let response = self
            .inner
            .http
            .post(self.inner.config.endpoint().clone())
            .header(CONTENT_TYPE, ENVELOPE_CONTENT_TYPE)
            .timeout(deadline)
            .body(wire)
            .send()
            .await
            .map_err(|e| self.network(e, "sending request envelope", deadline))?;

        let status = response.status();
        if !status.is_success() {
            if self.debug() {
                debug!(
                    nonce = %session.request_nonce().fingerprint(),
                    status = status.as_u16(),
                    "Secure endpoint rejected request"
                );
            }
            return Err(ClientError::Rejected { status: status.as_u16() });
        }

        if !is_envelope_content_type(&response) {
            self.reject(&session, "content-type");
            return Err(ClientError::AuthenticationFailed);
        }

        let body = self.read_capped(response, deadline).await?.ok_or_else(|| {
            self.reject(&session, "size");
            ClientError::AuthenticationFailed
        })?;

        let envelope = Envelope::from_bytes(&body).map_err(|_| {
            self.reject(&session, "decode");
            ClientError::AuthenticationFailed
        })?;

        let (metadata, plain): (_, PlainResponse) = self
            .inner
            .engine
            .open_value(&envelope, MessageKind::Response)
            .map_err(|e| {
                self.reject(&session, e.kind());
                from_open_error(&e)
            })?;

        session.verify(&metadata).inspect_err(|_| self.reject(&session, "in_reply_to"))?;

        if self.debug() {
            debug!(
                nonce = %session.request_nonce().fingerprint(),
                status = plain.status,
                body_bytes = plain.body.len(),
                elapsed_ms = session.elapsed().as_millis(),
                "Verified sealed response"
            );
        }

        Ok(SecureResponse::from(plain))
    }

    /// Reads the body up to the envelope limit. `None` if the peer sends more.
    async fn read_capped(
        &self,
        mut response: reqwest::Response,
        deadline: Duration,
    ) -> Result<Option<BytesMut>, ClientError> {
        let limit = MAX_ENVELOPE_LEN;
        if response.content_length().is_some_and(|len| len > limit as u64) {
            return Ok(None);
        }

        let mut body = BytesMut::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| self.network(e, "reading response envelope", deadline))?
        {
            if body.len() + chunk.len() > limit {
                return Ok(None);
            }
            body.extend_from_slice(&chunk);
        }
        Ok(Some(body))
    }

    fn reject(&self, session: &SessionContext, stage: &str) {
        if self.debug() {
            debug!(nonce = %session.request_nonce().fingerprint(), stage, "Response rejected");
        }
    }
}

fn is_envelope_content_type(response: &reqwest::Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|v| v.trim().eq_ignore_ascii_case(ENVELOPE_CONTENT_TYPE))
}
