use crate::engine::{CryptoEngine, EngineInner};
use crate::error::CryptoError;
use crate::kdf::MasterKey;
use crate::replay::ReplayGuard;
use crate::types::{Aes, EnvelopeCipher};
use private::Sealed;
use sfetch_domain::SharedSecret;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_REPLAY_WINDOW: Duration = Duration::from_secs(300);
pub const DEFAULT_REPLAY_CAPACITY: u64 = 100_000;
pub const DEFAULT_CLOCK_SKEW: Duration = Duration::from_secs(30);
/// Longest accepted `window + 2 * clock_skew`.
pub const MAX_REPLAY_RETENTION: Duration = Duration::from_secs(7 * 24 * 60 * 60);

#[derive(Debug, Default)]
pub struct NoSecret;
#[derive(Debug)]
pub struct WithSecret(MasterKey);

mod private {
    pub(super) trait Sealed {}
}
impl Sealed for NoSecret {}
impl Sealed for WithSecret {}

/// A builder for [`CryptoEngine`].
///
/// The shared secret is turned into an HKDF pseudo-random key as soon as it is
/// supplied; the builder never holds the raw secret.
#[allow(private_bounds)]
#[derive(Debug)]
pub struct CryptoEngineBuilder<C: EnvelopeCipher = Aes, S: Sealed = NoSecret> {
    _cipher: PhantomData<fn() -> C>,
    replay_window: Duration,
    replay_capacity: u64,
    clock_skew: Duration,
    secret: S,
}

impl<C: EnvelopeCipher> Default for CryptoEngineBuilder<C> {
    fn default() -> Self {
        Self {
            _cipher: PhantomData,
            replay_window: DEFAULT_REPLAY_WINDOW,
            replay_capacity: DEFAULT_REPLAY_CAPACITY,
            clock_skew: DEFAULT_CLOCK_SKEW,
            secret: NoSecret,
        }
    }
}

impl<C: EnvelopeCipher> CryptoEngineBuilder<C> {
    #[must_use = "Builder must be configured with `secret` before use"]
    pub fn new() -> Self {
        Self::default()
    }

    /// Supplies the shared secret both endpoints derive their keys from.
    #[must_use]
    pub fn secret(self, secret: &SharedSecret) -> CryptoEngineBuilder<C, WithSecret> {
        CryptoEngineBuilder {
            _cipher: PhantomData,
            replay_window: self.replay_window,
            replay_capacity: self.replay_capacity,
            clock_skew: self.clock_skew,
            secret: WithSecret(MasterKey::extract(secret.expose())),
        }
    }
}

#[allow(private_bounds)]
impl<C: EnvelopeCipher, S: Sealed> CryptoEngineBuilder<C, S> {
    /// How old an envelope may be, before clock skew.
    #[must_use]
    pub const fn replay_window(mut self, window: Duration) -> Self {
        self.replay_window = window;
        self
    }

    /// Upper bound of remembered nonces. A full set refuses new envelopes.
    #[must_use]
    pub const fn replay_capacity(mut self, capacity: u64) -> Self {
        self.replay_capacity = capacity;
        self
    }

    /// Tolerated clock difference between peers, in either direction.
    #[must_use]
    pub const fn clock_skew(mut self, skew: Duration) -> Self {
        self.clock_skew = skew;
        self
    }
}

impl<C: EnvelopeCipher> CryptoEngineBuilder<C, WithSecret> {
    /// Finalizes the engine.
    ///
    /// Nonces are remembered for `window + 2 * clock_skew`: the whole span during
    /// which one envelope can pass the timestamp check.
    ///
    /// # Errors
    /// Returns [`CryptoError::InvalidConfiguration`] for a zero replay window or capacity,
    /// or when the retention exceeds [`MAX_REPLAY_RETENTION`].
    pub fn build(self) -> Result<CryptoEngine<C>, CryptoError> {
        if self.replay_window.is_zero() {
            return Err(CryptoError::InvalidConfiguration {
                message: "Replay window must be greater than zero".into(),
                context: None,
            });
        }
        if self.replay_capacity == 0 {
            return Err(CryptoError::InvalidConfiguration {
                message: "Replay capacity must be greater than zero".into(),
                context: None,
            });
        }

        let retention = self
            .clock_skew
            .checked_mul(2)
            .and_then(|skew| skew.checked_add(self.replay_window))
            .filter(|retention| *retention <= MAX_REPLAY_RETENTION)
            .ok_or_else(|| CryptoError::InvalidConfiguration {
                message: format!(
                    "Replay window plus twice the clock skew must not exceed {}s",
                    MAX_REPLAY_RETENTION.as_secs()
                )
                .into(),
                context: None,
            })?;

        let max_age_ms = to_millis(self.replay_window + self.clock_skew)?;
        let max_skew_ms = to_millis(self.clock_skew)?;

        let WithSecret(master) = self.secret;

        Ok(CryptoEngine {
            inner: Arc::new(EngineInner {
                master,
                replay: ReplayGuard::new(retention, self.replay_capacity),
                max_age_ms,
                max_skew_ms,
                _cipher: PhantomData,
            }),
        })
    }
}

fn to_millis(duration: Duration) -> Result<i64, CryptoError> {
    i64::try_from(duration.as_millis()).map_err(|_| CryptoError::InvalidConfiguration {
        message: "Replay window is too large".into(),
        context: None,
    })
}
