use aead::{AeadInOut, KeyInit};
use aes_gcm::Aes256Gcm;
use chacha20poly1305::ChaCha20Poly1305;
use serde::{Deserialize, Serialize};
use sfetch_envelope::{MAX_ENVELOPE_LEN, MAX_METADATA_LEN, MIN_ENVELOPE_LEN, Nonce};
use std::fmt;

// --- Aliases ---

pub type Aes = Aes256Gcm;
pub type ChaCha = ChaCha20Poly1305;

pub trait EnvelopeCipher: AeadInOut + KeyInit + 'static {}
impl<T: AeadInOut + KeyInit + 'static> EnvelopeCipher for T {}

/// Largest plaintext that still fits an envelope with maximum-size metadata.
pub const MAX_PLAINTEXT_LEN: usize = MAX_ENVELOPE_LEN - MIN_ENVELOPE_LEN - MAX_METADATA_LEN;

// --- Metadata ---

/// Direction of a sealed message. Mixed into the key schedule, so a request
/// envelope can never be opened as a response and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    Request,
    Response,
}

impl MessageKind {
    pub(crate) const fn label(self) -> u8 {
        match self {
            Self::Request => b'Q',
            Self::Response => b'R',
        }
    }
}

/// Integrity-protected header of every envelope (postcard-encoded, bound as AAD).
///
/// Carries protocol fields only; method, path and headers travel inside the ciphertext.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub kind: MessageKind,
    /// Unix time in milliseconds at sealing.
    pub issued_at_ms: i64,
    /// For responses: nonce of the request being answered.
    pub in_reply_to: Option<Nonce>,
}

impl Metadata {
    #[must_use]
    pub fn request() -> Self {
        Self { kind: MessageKind::Request, issued_at_ms: now_ms(), in_reply_to: None }
    }

    #[must_use]
    pub fn response(in_reply_to: Nonce) -> Self {
        Self {
            kind: MessageKind::Response,
            issued_at_ms: now_ms(),
            in_reply_to: Some(in_reply_to),
        }
    }

    /// Requests never answer anything; responses always do.
    pub(crate) const fn is_consistent(&self) -> bool {
        matches!(
            (self.kind, self.in_reply_to),
            (MessageKind::Request, None) | (MessageKind::Response, Some(_))
        )
    }
}

pub(crate) fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

// --- Opened ---

/// The verified contents of an envelope.
#[derive(Clone)]
pub struct Opened {
    pub nonce: Nonce,
    pub metadata: Metadata,
    pub plaintext: Vec<u8>,
}

impl fmt::Debug for Opened {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Opened")
            .field("nonce", &self.nonce)
            .field("metadata", &self.metadata)
            .field("plaintext_len", &self.plaintext.len())
            .finish()
    }
}
