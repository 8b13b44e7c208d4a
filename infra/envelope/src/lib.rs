//! Wire codec for sealed secure-fetch messages.
//!
//! An [`Envelope`] is the only thing either endpoint puts on the wire. The format is
//! deterministic and self-delimiting, versioned by its first byte:
//!
//! ```text
//! [VERSION(1)=0x01][NONCE(12)][TAG(16)][CT_LEN(4)][CIPHERTEXT][META_LEN(2)][METADATA]
//! ```
//!
//! Decoding is defensive: a hostile length prefix can neither read past the input
//! nor force a large allocation, and exactly one encoding is accepted per envelope.
//!
//! ## Example
//! ```rust
//! use sfetch_envelope::{Envelope, Nonce, Tag};
//!
//! let env = Envelope::new(Nonce::from_bytes([7; 12]), vec![1, 2, 3], Tag::from_bytes([9; 16]), vec![]);
//! let wire = env.to_bytes().unwrap();
//! assert_eq!(Envelope::from_bytes(&wire).unwrap(), env);
//! ```

mod codec;
mod error;
mod types;

pub use codec::{decode, encode};
pub use error::{EnvelopeError, EnvelopeErrorExt};
pub use types::{
    CONTENT_TYPE, ENVELOPE_VERSION_V1, Envelope, MAX_ENVELOPE_LEN, MAX_METADATA_LEN,
    MIN_ENVELOPE_LEN, NONCE_LEN, Nonce, TAG_LEN, Tag,
};
