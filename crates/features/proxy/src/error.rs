use axum::body::Body;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sfetch_crypto::CryptoError;
use sfetch_envelope::EnvelopeError;
use std::borrow::Cow;

/// Failures of one proxied exchange.
///
/// Everything up to verification renders as an empty `415` or an identical empty `400`,
/// so a peer without the secret learns nothing about which gate it failed.
/// After verification the status is carried inside a sealed response instead.
#[sfetch_derive::sfetch_error]
pub enum ProxyError {
    #[error("Unsupported media type")]
    UnsupportedMediaType,

    #[error("Malformed envelope{}: {source}", format_context(.context))]
    MalformedEnvelope { source: EnvelopeError, context: Option<Cow<'static, str>> },

    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("Replay detected")]
    ReplayDetected,

    #[error("Payload exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("Invalid request{}: {message}", format_context(.context))]
    InvalidRequest { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Downstream error{}: {message}", format_context(.context))]
    Downstream { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal proxy error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl ProxyError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::Downstream { .. } => StatusCode::BAD_GATEWAY,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::MalformedEnvelope { .. }
            | Self::AuthenticationFailed
            | Self::ReplayDetected
            | Self::PayloadTooLarge { .. }
            | Self::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), Body::empty()).into_response()
    }
}

impl From<CryptoError> for ProxyError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::ReplayDetected => Self::ReplayDetected,
            CryptoError::Malformed { source, context } => Self::MalformedEnvelope { source, context },
            CryptoError::Serialization { .. } => Self::InvalidRequest {
                message: "undecodable request payload".into(),
                context: None,
            },
            CryptoError::Internal { message, context } => Self::Internal { message, context },
            _ => Self::AuthenticationFailed,
        }
    }
}
