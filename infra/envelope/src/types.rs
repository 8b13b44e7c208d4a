use serde::{Deserialize, Serialize};
use std::fmt;
use subtle::{Choice, ConstantTimeEq};

// --- Wire format constants ---

/// Current envelope format version.
pub const ENVELOPE_VERSION_V1: u8 = 1;

/// AEAD nonce length (96-bit).
pub const NONCE_LEN: usize = 12;

/// AEAD tag length (128-bit).
pub const TAG_LEN: usize = 16;

/// Fixed prefix: `[VERSION(1)][NONCE(12)][TAG(16)][CT_LEN(4)]`.
pub(crate) const FIXED_HEADER_LEN: usize = 1 + NONCE_LEN + TAG_LEN + 4;

/// Width of the metadata length prefix.
pub(crate) const META_LEN_WIDTH: usize = 2;

/// Smallest well-formed envelope: empty ciphertext and empty metadata.
pub const MIN_ENVELOPE_LEN: usize = FIXED_HEADER_LEN + META_LEN_WIDTH;

/// Upper bound for a whole encoded envelope.
pub const MAX_ENVELOPE_LEN: usize = 8 * 1024 * 1024;

/// Upper bound for the metadata section.
pub const MAX_METADATA_LEN: usize = 1024;

/// Media type of an encoded envelope on the wire.
pub const CONTENT_TYPE: &str = "application/vnd.sfetch.envelope";

// --- Nonce ---

/// A 96-bit message nonce. Public by construction, but compared in constant time.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Nonce([u8; NONCE_LEN]);

impl Nonce {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; NONCE_LEN]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; NONCE_LEN] {
        &self.0
    }

    /// First four bytes in hex. Enough to correlate log lines, too short to matter.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl ConstantTimeEq for Nonce {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0.ct_eq(&other.0)
    }
}

impl fmt::Debug for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Nonce({}..)", self.fingerprint())
    }
}

impl AsRef<[u8]> for Nonce {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

// --- Tag ---

/// A 128-bit authentication tag. Equality is constant-time.
#[derive(Clone, Copy)]
pub struct Tag([u8; TAG_LEN]);

impl Tag {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; TAG_LEN]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; TAG_LEN] {
        &self.0
    }
}

impl ConstantTimeEq for Tag {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0.ct_eq(&other.0)
    }
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for Tag {}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Tag(..)")
    }
}

// --- Container ---

/// Wire representation of one sealed message.
///
/// ```text
/// [VERSION(1)][NONCE(12)][TAG(16)][CT_LEN(4)][CIPHERTEXT][META_LEN(2)][METADATA]
/// ```
///
/// Integers are big-endian. `metadata` is opaque at this layer; it is authenticated
/// as associated data by the crypto engine and parsed only after verification.
/// Equality compares the tag in constant time; tag verification itself belongs to the AEAD.
#[derive(Clone, PartialEq, Eq)]
pub struct Envelope {
    pub(crate) nonce: Nonce,
    pub(crate) tag: Tag,
    pub(crate) ciphertext: Vec<u8>,
    pub(crate) metadata: Vec<u8>,
}

impl Envelope {
    /// Assembles an envelope from its parts. Limits are enforced when encoding.
    #[must_use]
    pub const fn new(nonce: Nonce, ciphertext: Vec<u8>, tag: Tag, metadata: Vec<u8>) -> Self {
        Self { nonce, tag, ciphertext, metadata }
    }

    #[must_use]
    pub const fn nonce(&self) -> &Nonce {
        &self.nonce
    }

    #[must_use]
    pub const fn tag(&self) -> &Tag {
        &self.tag
    }

    #[must_use]
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    #[must_use]
    pub fn metadata(&self) -> &[u8] {
        &self.metadata
    }

    /// Format version this envelope encodes to.
    #[must_use]
    pub const fn version(&self) -> u8 {
        ENVELOPE_VERSION_V1
    }

    #[must_use]
    pub const fn encoded_len(&self) -> usize {
        MIN_ENVELOPE_LEN + self.ciphertext.len() + self.metadata.len()
    }

    /// Returns `(nonce, ciphertext, tag, metadata)`.
    #[must_use]
    pub fn into_parts(self) -> (Nonce, Vec<u8>, Tag, Vec<u8>) {
        (self.nonce, self.ciphertext, self.tag, self.metadata)
    }
}

impl fmt::Debug for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Envelope")
            .field("nonce", &self.nonce)
            .field("ciphertext_len", &self.ciphertext.len())
            .field("metadata_len", &self.metadata.len())
            .finish_non_exhaustive()
    }
}
