//! Authenticated encryption for secure-fetch envelopes.
//!
//! The [`CryptoEngine`] owns everything derived from the shared secret and the
//! replay window. Both endpoints build one from the same secret.
//!
//! ## Key schedule
//!
//! ```text
//! PRK         = HKDF-Extract(salt = "sfetch/v1", ikm = secret)
//! message key = HKDF-Expand(PRK, "sfetch/v1/message-key" || kind || nonce, 32)
//! AAD         = VERSION || metadata
//! ```
//!
//! The raw secret is never used as a cipher key and is not retained after the
//! builder has extracted the PRK. Because the kind is part of the key, requests and
//! responses live in separate key spaces.
//!
//! ## Nonce Policy
//!
//! Every envelope uses a **random 96-bit nonce** from the OS RNG. The nonce doubles
//! as the replay identifier. `open` accepts an `issued_at` at most `window + skew` in
//! the past and `skew` in the future, and remembers the nonce for `window + 2 * skew`,
//! the whole span in which the envelope could pass that check. A full replay set
//! refuses new envelopes rather than forgetting unexpired nonces.
//!
//! ## Cipher agility
//!
//! [`Aes`] (AES-256-GCM) is the default; [`ChaCha`] (ChaCha20-Poly1305) is available for
//! targets without AES hardware. Both peers must agree.

mod builder;
mod engine;
mod error;
mod kdf;
mod replay;
mod types;

pub use builder::{
    CryptoEngineBuilder, DEFAULT_CLOCK_SKEW, DEFAULT_REPLAY_CAPACITY, DEFAULT_REPLAY_WINDOW,
    MAX_REPLAY_RETENTION,
};
pub use engine::CryptoEngine;
pub use error::{CryptoError, CryptoErrorExt};
pub use replay::{Admission, ReplayGuard};
pub use types::{Aes, ChaCha, EnvelopeCipher, MAX_PLAINTEXT_LEN, MessageKind, Metadata, Opened};

pub use sfetch_envelope as envelope;

pub mod prelude {
    pub use crate::engine::CryptoEngine;
    pub use crate::error::{CryptoError, CryptoErrorExt};
    pub use crate::types::{Aes, ChaCha, MessageKind, Metadata, Opened};
    pub use sfetch_envelope::{Envelope, Nonce};
}
