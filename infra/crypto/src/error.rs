//! # Crypto Errors
//!
//! Verification failures are unit variants on purpose: they carry nothing an
//! attacker could use to tell a bad tag from a wrong key or a tampered header.

use sfetch_envelope::EnvelopeError;
use std::borrow::Cow;

#[sfetch_derive::sfetch_error]
pub enum CryptoError {
    /// Tag mismatch, wrong key, wrong message kind or unreadable authenticated metadata.
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// Nonce already seen inside the window, or issue time outside the window.
    #[error("Replay detected")]
    ReplayDetected,

    #[error("Malformed envelope{}: {source}", format_context(.context))]
    Malformed { source: EnvelopeError, context: Option<Cow<'static, str>> },

    #[error("Invalid configuration{}: {message}", format_context(.context))]
    InvalidConfiguration { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Encryption error{}: {message}", format_context(.context))]
    Encryption { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Postcard encoding of metadata or payload failed, or an authenticated payload did not parse.
    #[error("Serialization error{}: {source}", format_context(.context))]
    Serialization { source: postcard::Error, context: Option<Cow<'static, str>> },

    #[error("Internal crypto error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl CryptoError {
    /// `true` for failures the transport boundary must report uniformly.
    #[must_use]
    pub const fn is_verification_failure(&self) -> bool {
        matches!(self, Self::AuthenticationFailed | Self::ReplayDetected | Self::Malformed { .. })
    }
}
