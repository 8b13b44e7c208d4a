use crate::error::ClientError;
use sfetch_crypto::Metadata;
use sfetch_envelope::Nonce;
use std::time::{Duration, Instant};
use subtle::ConstantTimeEq;

/// Binds one in-flight request to the response it may accept.
///
/// Owned by a single `secure_send` future; dropping the future (timeout or
/// cancellation) discards it without touching anything shared.
#[derive(Debug)]
pub(crate) struct SessionContext {
    request_nonce: Nonce,
    started: Instant,
}

impl SessionContext {
    pub(crate) fn new(request_nonce: Nonce) -> Self {
        Self { request_nonce, started: Instant::now() }
    }

    pub(crate) const fn request_nonce(&self) -> &Nonce {
        &self.request_nonce
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Accepts only a response that names this session's request nonce.
    pub(crate) fn verify(&self, metadata: &Metadata) -> Result<(), ClientError> {
        let answers_us = metadata
            .in_reply_to
            .as_ref()
            .is_some_and(|nonce| bool::from(nonce.ct_eq(&self.request_nonce)));

        if answers_us { Ok(()) } else { Err(ClientError::AuthenticationFailed) }
    }
}
