mod client;
mod error;
mod proxy;
mod replay;

pub use client::{ClientConfig, ClientConfigBuilder};
pub use error::{ConfigError, ConfigErrorExt};
pub use proxy::{ProxyConfig, ProxyConfigBuilder};
pub use replay::ReplayPolicy;

use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use sfetch_domain::constants::MIN_SECRET_LEN;
use sfetch_domain::{Settings, SettingsInner, SharedSecret};
use std::path::{Path, PathBuf};
use tracing::info;

/// Prefix of environment overrides, e.g. `SFETCH__SECRET` or `SFETCH__SERVER__PORT`.
pub const ENV_PREFIX: &str = "SFETCH";
/// Base name of the settings file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "sfetch";

/// A reusable configuration loader that combines file-based settings with environment overrides.
///
/// Layering:
/// 1. **Base File**: settings from `path` (any format the `config` crate recognizes by
///    extension). An explicit path must exist; without one, an optional `sfetch.*` file
///    in the working directory is used when present.
/// 2. **Environment Overrides**: variables prefixed with `SFETCH__`. Nested structures use
///    double underscores (`SFETCH__REPLAY__WINDOW_SECS` maps to `replay.window_secs`).
///
/// # Errors
/// Returns [`ConfigError::Source`] if an explicit file is missing or the merged values
/// do not match the shape of `T`.
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let (effective_path, required) = path.map_or_else(
        || (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        |p| (p.as_ref().to_path_buf(), true),
    );

    let builder = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(required))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .convert_case(config::Case::Snake),
        );

    info!(path = %effective_path.display(), required, "Loading config");

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}

/// Loads the shared [`Settings`] tree used by both binaries.
///
/// # Errors
/// See [`load_config`].
pub fn load_settings(path: Option<impl AsRef<Path>>) -> Result<Settings, ConfigError> {
    load_config::<SettingsInner>(path).map(Settings::from)
}

pub(crate) fn validate_secret(secret: Option<SharedSecret>) -> Result<SharedSecret, ConfigError> {
    let Some(secret) = secret.filter(|s| !s.is_empty()) else {
        return Err(ConfigError::MissingSecret {
            message: "no shared secret configured".into(),
            context: None,
        });
    };

    if secret.len() < MIN_SECRET_LEN {
        return Err(ConfigError::MissingSecret {
            message: format!("shared secret must be at least {MIN_SECRET_LEN} bytes").into(),
            context: None,
        });
    }

    Ok(secret)
}
