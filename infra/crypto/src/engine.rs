use crate::builder::CryptoEngineBuilder;
use crate::error::{CryptoError, CryptoErrorExt};
use crate::kdf::MasterKey;
use crate::replay::{Admission, ReplayGuard};
use crate::types::{
    Aes, EnvelopeCipher, MAX_PLAINTEXT_LEN, MessageKind, Metadata, Opened, now_ms,
};
use aead::inout::InOutBuf;
use getrandom::fill;
use serde::Serialize;
use serde::de::DeserializeOwned;
use sfetch_envelope::{ENVELOPE_VERSION_V1, Envelope, NONCE_LEN, Nonce, TAG_LEN, Tag};
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};

pub(crate) struct EngineInner<C = Aes>
where
    C: EnvelopeCipher,
{
    pub(crate) master: MasterKey,
    pub(crate) replay: ReplayGuard,
    /// Replay window plus clock skew, in milliseconds.
    pub(crate) max_age_ms: i64,
    /// How far `issued_at` may lie in the future, in milliseconds.
    pub(crate) max_skew_ms: i64,
    pub(crate) _cipher: PhantomData<fn() -> C>,
}

/// Seals and opens envelopes under one shared secret.
///
/// Every message gets a fresh random 96-bit nonce and its own key,
/// `HKDF-Expand(PRK, "sfetch/v1/message-key" || kind || nonce)`. The envelope
/// metadata is bound as associated data together with the format version.
///
/// `open` verifies before it releases anything, then checks freshness and finally
/// records the nonce; a forged envelope never touches the replay set.
///
/// The engine is `Send + Sync` and cheap to clone; clones share the replay window.
///
/// ### Example
/// ```rust
/// use sfetch_crypto::prelude::*;
/// use sfetch_domain::SharedSecret;
///
/// # fn main() -> Result<(), CryptoError> {
/// let secret = SharedSecret::from("correct horse battery staple");
/// let client = CryptoEngine::<Aes>::builder().secret(&secret).build()?;
/// let server = CryptoEngine::<Aes>::builder().secret(&secret).build()?;
///
/// let envelope = client.seal(MessageKind::Request, b"hello", None)?;
/// let opened = server.open(&envelope, MessageKind::Request)?;
/// assert_eq!(opened.plaintext, b"hello");
///
/// // The same envelope is refused the second time.
/// assert!(matches!(server.open(&envelope, MessageKind::Request), Err(CryptoError::ReplayDetected)));
/// # Ok(())
/// # }
/// ```
pub struct CryptoEngine<C = Aes>
where
    C: EnvelopeCipher,
{
    pub(crate) inner: Arc<EngineInner<C>>,
}

impl<C: EnvelopeCipher> std::fmt::Debug for CryptoEngine<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CryptoEngine")
            .field("cipher", &std::any::type_name::<C>())
            .field("replay", &self.inner.replay)
            .field("max_age_ms", &self.inner.max_age_ms)
            .field("max_skew_ms", &self.inner.max_skew_ms)
            .finish_non_exhaustive()
    }
}

impl<C: EnvelopeCipher> Clone for CryptoEngine<C> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<C: EnvelopeCipher> CryptoEngine<C> {
    #[must_use]
    pub fn builder() -> CryptoEngineBuilder<C> {
        CryptoEngineBuilder::<C>::new()
    }

    fn next_nonce() -> Result<Nonce, CryptoError> {
        let mut bytes = [0u8; NONCE_LEN];
        fill(&mut bytes).map_err(|e| CryptoError::Internal {
            message: format!("System RNG unavailable: {e}").into(),
            context: Some("nonce generation".into()),
        })?;
        Ok(Nonce::from_bytes(bytes))
    }

    /// Seals `plaintext` with freshly generated metadata for `kind`.
    ///
    /// `in_reply_to` must be `None` for requests and the request nonce for responses.
    ///
    /// # Errors
    /// * [`CryptoError::InvalidConfiguration`] if `in_reply_to` does not fit `kind`.
    /// * [`CryptoError::Encryption`] if the plaintext is too large or AEAD fails.
    pub fn seal(
        &self,
        kind: MessageKind,
        plaintext: &[u8],
        in_reply_to: Option<Nonce>,
    ) -> Result<Envelope, CryptoError> {
        let metadata = Metadata { kind, issued_at_ms: now_ms(), in_reply_to };
        self.seal_with(metadata, plaintext)
    }

    /// Seals `plaintext` under caller-provided metadata.
    ///
    /// # Errors
    /// See [`CryptoEngine::seal`].
    pub fn seal_with(&self, metadata: Metadata, plaintext: &[u8]) -> Result<Envelope, CryptoError> {
        if !metadata.is_consistent() {
            return Err(CryptoError::InvalidConfiguration {
                message: "in_reply_to must be set for responses and only for responses".into(),
                context: None,
            });
        }
        if plaintext.len() > MAX_PLAINTEXT_LEN {
            return Err(CryptoError::Encryption {
                message: format!("Payload of {} bytes exceeds {MAX_PLAINTEXT_LEN}", plaintext.len())
                    .into(),
                context: None,
            });
        }

        let nonce = Self::next_nonce()?;
        let meta_bytes = postcard::to_stdvec(&metadata).context("Metadata encoding failed")?;

        let cipher = self.inner.master.message_cipher::<C>(metadata.kind, &nonce)?;
        let aead_nonce = nonce.as_bytes().as_slice().try_into().map_err(|_| {
            CryptoError::InvalidConfiguration {
                message: "Cipher nonce size must be 96 bits".into(),
                context: None,
            }
        })?;

        let mut buf = plaintext.to_vec();
        let tag = cipher
            .encrypt_inout_detached(
                &aead_nonce,
                &associated_data(&meta_bytes),
                InOutBuf::from(&mut buf[..]),
            )
            .map_err(|_| CryptoError::Encryption {
                message: "Encryption failed".into(),
                context: Some("AEAD encryption failed".into()),
            })?;

        let tag: [u8; TAG_LEN] = tag.as_slice().try_into().map_err(|_| {
            CryptoError::InvalidConfiguration {
                message: "Cipher tag size must be 128 bits".into(),
                context: None,
            }
        })?;

        trace!(kind = ?metadata.kind, nonce = %nonce.fingerprint(), size = buf.len(), "Envelope sealed");

        Ok(Envelope::new(nonce, buf, Tag::from_bytes(tag), meta_bytes))
    }

    /// Verifies and decrypts `envelope`, expecting it to be a `expected` message.
    ///
    /// # Errors
    /// * [`CryptoError::AuthenticationFailed`] for a bad tag, a wrong key, a kind mismatch
    ///   or inconsistent metadata. Nothing else is revealed.
    /// * [`CryptoError::ReplayDetected`] for a stale or future `issued_at`, a nonce that is
    ///   still remembered, or a full replay set.
    pub fn open(&self, envelope: &Envelope, expected: MessageKind) -> Result<Opened, CryptoError> {
        let nonce = *envelope.nonce();

        let plaintext = self.decrypt(envelope, expected).inspect_err(|_| {
            debug!(nonce = %nonce.fingerprint(), stage = "verify", "Envelope rejected");
        })?;

        let metadata: Metadata = postcard::from_bytes(envelope.metadata())
            .map_err(|_| CryptoError::AuthenticationFailed)?;
        if metadata.kind != expected || !metadata.is_consistent() {
            debug!(nonce = %nonce.fingerprint(), stage = "metadata", "Envelope rejected");
            return Err(CryptoError::AuthenticationFailed);
        }

        let age_ms = now_ms().saturating_sub(metadata.issued_at_ms);
        if age_ms > self.inner.max_age_ms || age_ms < -self.inner.max_skew_ms {
            debug!(nonce = %nonce.fingerprint(), stage = "freshness", age_ms, "Envelope rejected");
            return Err(CryptoError::ReplayDetected);
        }

        match self.inner.replay.check_and_insert(nonce) {
            Admission::Fresh => {},
            Admission::Replayed => {
                debug!(nonce = %nonce.fingerprint(), stage = "replay", "Envelope rejected");
                return Err(CryptoError::ReplayDetected);
            },
            Admission::Full => {
                warn!(
                    nonce = %nonce.fingerprint(),
                    stage = "capacity",
                    "Replay set full, envelope refused"
                );
                return Err(CryptoError::ReplayDetected);
            },
        }

        trace!(kind = ?expected, nonce = %nonce.fingerprint(), size = plaintext.len(), "Envelope opened");

        Ok(Opened { nonce, metadata, plaintext })
    }

    /// Postcard-encodes `value` and seals it. See [`CryptoEngine::seal`].
    ///
    /// # Errors
    /// [`CryptoError::Serialization`] plus everything [`CryptoEngine::seal`] returns.
    pub fn seal_value<T: Serialize>(
        &self,
        kind: MessageKind,
        value: &T,
        in_reply_to: Option<Nonce>,
    ) -> Result<Envelope, CryptoError> {
        let bytes = postcard::to_stdvec(value).context("Payload encoding failed")?;
        self.seal(kind, &bytes, in_reply_to)
    }

    /// Opens `envelope` and postcard-decodes the plaintext.
    ///
    /// The nonce is consumed even if decoding fails, since the envelope itself was authentic.
    ///
    /// # Errors
    /// [`CryptoError::Serialization`] plus everything [`CryptoEngine::open`] returns.
    pub fn open_value<T: DeserializeOwned>(
        &self,
        envelope: &Envelope,
        expected: MessageKind,
    ) -> Result<(Metadata, T), CryptoError> {
        let opened = self.open(envelope, expected)?;
        let value = postcard::from_bytes(&opened.plaintext).context("Payload decoding failed")?;
        Ok((opened.metadata, value))
    }

    /// Shared replay window of this engine and its clones.
    #[must_use]
    pub fn replay_guard(&self) -> &ReplayGuard {
        &self.inner.replay
    }

    /// Oldest accepted `issued_at`, relative to now.
    #[must_use]
    pub fn max_age(&self) -> Duration {
        Duration::from_millis(self.inner.max_age_ms.unsigned_abs())
    }

    /// Furthest accepted `issued_at` in the future, relative to now.
    #[must_use]
    pub fn max_skew(&self) -> Duration {
        Duration::from_millis(self.inner.max_skew_ms.unsigned_abs())
    }

    fn decrypt(&self, envelope: &Envelope, kind: MessageKind) -> Result<Vec<u8>, CryptoError> {
        let cipher = self.inner.master.message_cipher::<C>(kind, envelope.nonce())?;

        let aead_nonce = envelope.nonce().as_bytes().as_slice().try_into()
            .map_err(|_| CryptoError::AuthenticationFailed)?;
        let tag = envelope.tag().as_bytes().as_slice().try_into()
            .map_err(|_| CryptoError::AuthenticationFailed)?;

        let mut buf = envelope.ciphertext().to_vec();
        cipher
            .decrypt_inout_detached(
                &aead_nonce,
                &associated_data(envelope.metadata()),
                InOutBuf::from(&mut buf[..]),
                &tag,
            )
            .map_err(|_| CryptoError::AuthenticationFailed)?;

        Ok(buf)
    }
}

/// `VERSION || metadata`.
fn associated_data(metadata: &[u8]) -> Vec<u8> {
    let mut aad = Vec::with_capacity(1 + metadata.len());
    aad.push(ENVELOPE_VERSION_V1);
    aad.extend_from_slice(metadata);
    aad
}
