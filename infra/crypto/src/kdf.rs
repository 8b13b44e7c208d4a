use crate::error::CryptoError;
use crate::types::{EnvelopeCipher, MessageKind};
use aead::Key;
use hkdf::Hkdf;
use sfetch_envelope::Nonce;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

pub(crate) const KDF_SALT: &[u8] = b"sfetch/v1";
pub(crate) const KDF_INFO_PREFIX: &[u8] = b"sfetch/v1/message-key";
pub(crate) const KEY_LEN: usize = 32;

/// HKDF pseudo-random key extracted from the shared secret. The raw secret is not kept.
#[derive(Zeroize, ZeroizeOnDrop)]
pub(crate) struct MasterKey {
    prk: [u8; KEY_LEN],
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MasterKey(**redacted**)")
    }
}

impl MasterKey {
    pub(crate) fn extract(secret: &[u8]) -> Self {
        let (mut okm, _) = Hkdf::<Sha256>::extract(Some(KDF_SALT), secret);
        let mut prk = [0u8; KEY_LEN];
        prk.copy_from_slice(&okm);
        okm.as_mut_slice().zeroize();
        Self { prk }
    }

    /// Builds the cipher for one message: `Expand(PRK, prefix || kind || nonce, 32)`.
    pub(crate) fn message_cipher<C: EnvelopeCipher>(
        &self,
        kind: MessageKind,
        nonce: &Nonce,
    ) -> Result<C, CryptoError> {
        let hk = Hkdf::<Sha256>::from_prk(&self.prk).map_err(|_| CryptoError::Internal {
            message: "Invalid PRK length".into(),
            context: None,
        })?;

        let mut info = Vec::with_capacity(KDF_INFO_PREFIX.len() + 1 + nonce.as_bytes().len());
        info.extend_from_slice(KDF_INFO_PREFIX);
        info.push(kind.label());
        info.extend_from_slice(nonce.as_bytes());

        let mut okm = [0u8; KEY_LEN];
        hk.expand(&info, &mut okm).map_err(|_| CryptoError::Internal {
            message: "HKDF expansion failed for message key".into(),
            context: None,
        })?;

        let key = Key::<C>::try_from(&okm[..]).map_err(|_| CryptoError::InvalidConfiguration {
            message: format!("Invalid key length {}, must be {KEY_LEN} bytes", okm.len()).into(),
            context: None,
        });
        okm.zeroize();

        Ok(C::new(&key?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Aes;

    #[test]
    fn same_secret_same_prk() {
        let a = MasterKey::extract(b"0123456789abcdef");
        let b = MasterKey::extract(b"0123456789abcdef");
        let c = MasterKey::extract(b"0123456789abcdeF");
        assert_eq!(a.prk, b.prk);
        assert_ne!(a.prk, c.prk);
    }

    #[test]
    fn prk_is_not_the_secret() {
        let secret = [7u8; KEY_LEN];
        assert_ne!(MasterKey::extract(&secret).prk, secret);
    }

    #[test]
    fn debug_is_redacted() {
        let key = MasterKey::extract(b"0123456789abcdef");
        assert_eq!(format!("{key:?}"), "MasterKey(**redacted**)");
    }

    #[test]
    fn message_cipher_builds_for_both_kinds() {
        let key = MasterKey::extract(b"0123456789abcdef");
        let nonce = Nonce::from_bytes([1; 12]);
        assert!(key.message_cipher::<Aes>(MessageKind::Request, &nonce).is_ok());
        assert!(key.message_cipher::<Aes>(MessageKind::Response, &nonce).is_ok());
    }
}
