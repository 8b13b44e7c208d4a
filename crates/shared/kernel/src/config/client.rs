use super::error::ConfigError;
use super::replay::ReplayPolicy;
use super::validate_secret;
use sfetch_domain::constants::DEFAULT_TIMEOUT_SECS;
use sfetch_domain::{Settings, SharedSecret};
use std::time::Duration;
use url::Url;

/// Immutable sender configuration: secret, secure endpoint, debug flag and per-call deadline.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    secret: SharedSecret,
    endpoint: Url,
    debug: bool,
    timeout: Duration,
    replay: ReplayPolicy,
}

impl ClientConfig {
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Validates the `secret`, `debug`, `replay` and `client` sections of loaded settings.
    ///
    /// # Errors
    /// [`ConfigError::MissingSecret`], [`ConfigError::InvalidUrl`] or [`ConfigError::Invalid`].
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        let mut builder = Self::builder()
            .debug(settings.debug)
            .timeout(Duration::from_secs(settings.client.timeout_secs))
            .replay(ReplayPolicy::try_from(settings.replay)?);
        if let Some(secret) = settings.secret.clone() {
            builder = builder.secret(secret);
        }
        if let Some(endpoint) = settings.client.endpoint.as_deref() {
            builder = builder.endpoint(endpoint);
        }
        builder.build()
    }

    #[must_use]
    pub const fn secret(&self) -> &SharedSecret {
        &self.secret
    }

    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    #[must_use]
    pub const fn debug(&self) -> bool {
        self.debug
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    #[must_use]
    pub const fn replay(&self) -> ReplayPolicy {
        self.replay
    }
}

#[derive(Debug)]
pub struct ClientConfigBuilder {
    secret: Option<SharedSecret>,
    endpoint: Option<String>,
    debug: bool,
    timeout: Duration,
    replay: ReplayPolicy,
}

impl Default for ClientConfigBuilder {
    fn default() -> Self {
        Self {
            secret: None,
            endpoint: None,
            debug: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            replay: ReplayPolicy::default(),
        }
    }
}

impl ClientConfigBuilder {
    #[must_use]
    pub fn secret(mut self, secret: impl Into<SharedSecret>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    /// Absolute `http`/`https` URL of the secure endpoint.
    #[must_use]
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    #[must_use]
    pub const fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub const fn replay(mut self, replay: ReplayPolicy) -> Self {
        self.replay = replay;
        self
    }

    /// # Errors
    /// Fails eagerly on a missing/short secret, a missing or unusable endpoint,
    /// a zero timeout, or a replay window that is empty or out of bounds.
    pub fn build(self) -> Result<ClientConfig, ConfigError> {
        let secret = validate_secret(self.secret)?;
        let endpoint = parse_endpoint(self.endpoint.as_deref())?;

        if self.timeout.is_zero() {
            return Err(ConfigError::Invalid {
                message: "timeout must be greater than zero".into(),
                context: None,
            });
        }
        self.replay.validate()?;

        Ok(ClientConfig {
            secret,
            endpoint,
            debug: self.debug,
            timeout: self.timeout,
            replay: self.replay,
        })
    }
}

fn parse_endpoint(raw: Option<&str>) -> Result<Url, ConfigError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Err(ConfigError::InvalidUrl {
            message: "no secure endpoint configured".into(),
            context: None,
        });
    };

    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
        message: format!("'{raw}': {e}").into(),
        context: None,
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl {
            message: format!("'{raw}': scheme must be http or https").into(),
            context: None,
        });
    }
    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl {
            message: format!("'{raw}': missing host").into(),
            context: None,
        });
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn builds_with_defaults() {
        let cfg = ClientConfig::builder()
            .secret(SECRET)
            .endpoint("http://localhost:3000/secure")
            .build()
            .expect("valid config");

        assert_eq!(cfg.endpoint().path(), "/secure");
        assert_eq!(cfg.timeout(), Duration::from_secs(30));
        assert!(!cfg.debug());
        assert_eq!(cfg.replay(), ReplayPolicy::default());
    }

    #[test]
    fn rejects_bad_endpoints() {
        for bad in ["", "not a url", "ftp://host/secure", "file:///tmp/x"] {
            let err = ClientConfig::builder()
                .secret(SECRET)
                .endpoint(bad)
                .build()
                .expect_err("endpoint must be rejected");
            assert_eq!(err.kind(), "InvalidUrl", "{bad}");
        }

        let err = ClientConfig::builder().secret(SECRET).build().expect_err("missing endpoint");
        assert_eq!(err.kind(), "InvalidUrl");
    }

    #[test]
    fn secret_is_checked_before_endpoint() {
        let err = ClientConfig::builder().endpoint("nope").build().expect_err("no secret");
        assert_eq!(err.kind(), "MissingSecret");
    }

    #[test]
    fn rejects_zero_timeout() {
        let err = ClientConfig::builder()
            .secret(SECRET)
            .endpoint("https://api.example.com/secure")
            .timeout(Duration::ZERO)
            .build()
            .expect_err("zero timeout");
        assert_eq!(err.kind(), "Invalid");
    }
}
