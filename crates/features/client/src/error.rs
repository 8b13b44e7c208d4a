use sfetch_crypto::CryptoError;
use sfetch_kernel::config::ConfigError;
use std::borrow::Cow;
use std::time::Duration;

/// Typed failures of [`crate::SecureClient::secure_send`].
///
/// Verification problems of any kind (bad tag, replay, stale timestamp, unsolicited
/// response, undecodable envelope) collapse into [`ClientError::AuthenticationFailed`];
/// raw unauthenticated bytes are never attached.
#[sfetch_derive::sfetch_error]
pub enum ClientError {
    #[error("Network error{}: {source}", format_context(.context))]
    Network { source: reqwest::Error, context: Option<Cow<'static, str>> },

    /// The deadline elapsed. Safe to retry; a retry uses a new nonce.
    #[error("Request timed out after {after:?}")]
    Timeout { after: Duration },

    #[error("Authentication failed")]
    AuthenticationFailed,

    /// The secure endpoint refused the envelope at the transport level.
    #[error("Secure endpoint rejected the request with status {status}")]
    Rejected { status: u16 },

    #[error("Invalid request{}: {message}", format_context(.context))]
    InvalidRequest { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A verified response body did not match the requested JSON shape.
    #[error("Decode error{}: {source}", format_context(.context))]
    Decode { source: serde_json::Error, context: Option<Cow<'static, str>> },

    #[error("Configuration error{}: {source}", format_context(.context))]
    Config { source: ConfigError, context: Option<Cow<'static, str>> },

    #[error("Internal client error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl ClientError {
    /// Only timeouts may be retried by the caller.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Sealing failures are local problems; opening failures are authentication failures.
pub(crate) fn from_seal_error(err: CryptoError) -> ClientError {
    match err {
        CryptoError::Encryption { message, context } => {
            ClientError::InvalidRequest { message, context }
        },
        CryptoError::Serialization { source, .. } => ClientError::InvalidRequest {
            message: format!("request encoding failed: {source}").into(),
            context: None,
        },
        other => ClientError::Internal { message: other.kind().into(), context: None },
    }
}

pub(crate) fn from_open_error(err: &CryptoError) -> ClientError {
    match err {
        CryptoError::Internal { message, .. } => {
            ClientError::Internal { message: message.clone(), context: None }
        },
        _ => ClientError::AuthenticationFailed,
    }
}
