use super::error::ConfigError;
use super::replay::ReplayPolicy;
use super::validate_secret;
use sfetch_domain::constants::DEFAULT_MAX_BODY_BYTES;
use sfetch_domain::{Settings, SharedSecret};

/// Immutable middleware configuration.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    secret: SharedSecret,
    debug: bool,
    max_body_bytes: usize,
    replay: ReplayPolicy,
}

impl ProxyConfig {
    #[must_use]
    pub fn builder() -> ProxyConfigBuilder {
        ProxyConfigBuilder::default()
    }

    /// Validates the `secret`, `debug`, `replay` and `proxy` sections of loaded settings.
    ///
    /// # Errors
    /// [`ConfigError::MissingSecret`] or [`ConfigError::Invalid`].
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        let mut builder = Self::builder()
            .debug(settings.debug)
            .max_body_bytes(settings.proxy.max_body_bytes)
            .replay(ReplayPolicy::try_from(settings.replay)?);
        if let Some(secret) = settings.secret.clone() {
            builder = builder.secret(secret);
        }
        builder.build()
    }

    #[must_use]
    pub const fn secret(&self) -> &SharedSecret {
        &self.secret
    }

    #[must_use]
    pub const fn debug(&self) -> bool {
        self.debug
    }

    #[must_use]
    pub const fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }

    #[must_use]
    pub const fn replay(&self) -> ReplayPolicy {
        self.replay
    }
}

#[derive(Debug)]
pub struct ProxyConfigBuilder {
    secret: Option<SharedSecret>,
    debug: bool,
    max_body_bytes: usize,
    replay: ReplayPolicy,
}

impl Default for ProxyConfigBuilder {
    fn default() -> Self {
        Self {
            secret: None,
            debug: false,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            replay: ReplayPolicy::default(),
        }
    }
}

impl ProxyConfigBuilder {
    #[must_use]
    pub fn secret(mut self, secret: impl Into<SharedSecret>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    #[must_use]
    pub const fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    #[must_use]
    pub const fn max_body_bytes(mut self, max: usize) -> Self {
        self.max_body_bytes = max;
        self
    }

    #[must_use]
    pub const fn replay(mut self, replay: ReplayPolicy) -> Self {
        self.replay = replay;
        self
    }

    /// # Errors
    /// Fails eagerly on a missing/short secret, a zero body cap, or a replay window that is
    /// empty or out of bounds.
    pub fn build(self) -> Result<ProxyConfig, ConfigError> {
        let secret = validate_secret(self.secret)?;

        if self.max_body_bytes == 0 {
            return Err(ConfigError::Invalid {
                message: "max_body_bytes must be greater than zero".into(),
                context: None,
            });
        }
        self.replay.validate()?;

        Ok(ProxyConfig {
            secret,
            debug: self.debug,
            max_body_bytes: self.max_body_bytes,
            replay: self.replay,
        })
    }
}
