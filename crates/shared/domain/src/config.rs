use crate::constants::{
    DEFAULT_CLOCK_SKEW_SECS, DEFAULT_MAX_BODY_BYTES, DEFAULT_MOUNT_PATH, DEFAULT_PORT,
    DEFAULT_REPLAY_CAPACITY, DEFAULT_REPLAY_WINDOW_SECS, DEFAULT_TIMEOUT_SECS,
};
use crate::secret::SharedSecret;
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Raw, unvalidated settings as loaded from file and environment.
///
/// Both binaries read the same shape: the CLI uses `client`, the server uses
/// `server` and `proxy`. `secret`, `debug` and `replay` are shared.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SettingsInner {
    pub secret: Option<SharedSecret>,
    pub debug: bool,
    pub replay: ReplaySettings,
    pub client: ClientSettings,
    pub proxy: ProxySettings,
    pub server: ServerSettings,
    pub log: LogSettings,
}

/// Thin Arc-wrapped settings for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(flatten, default)]
    inner: Arc<SettingsInner>,
}

impl Deref for Settings {
    type Target = SettingsInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for Settings {
    fn deref_mut(&mut self) -> &mut SettingsInner {
        Arc::make_mut(&mut self.inner)
    }
}

impl From<SettingsInner> for Settings {
    fn from(inner: SettingsInner) -> Self {
        Self { inner: Arc::new(inner) }
    }
}

/// Replay window knobs. The window is also the freshness bound for `issued_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReplaySettings {
    pub window_secs: u64,
    pub capacity: u64,
    pub clock_skew_secs: u64,
}

/// Sender side.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Absolute URL of the secure endpoint, e.g. `http://localhost:3000/secure`.
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
}

/// Middleware side.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    /// Cap for both the incoming envelope and the downstream response body.
    pub max_body_bytes: usize,
    pub mount_path: String,
}

/// HTTP listener of the demo server.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub address: IpAddr,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub level: String,
    pub dir: Option<PathBuf>,
    pub json: bool,
}

// --- Default ---

impl Default for ReplaySettings {
    fn default() -> Self {
        Self {
            window_secs: DEFAULT_REPLAY_WINDOW_SECS,
            capacity: DEFAULT_REPLAY_CAPACITY,
            clock_skew_secs: DEFAULT_CLOCK_SKEW_SECS,
        }
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self { endpoint: None, timeout_secs: DEFAULT_TIMEOUT_SECS }
    }
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self { max_body_bytes: DEFAULT_MAX_BODY_BYTES, mount_path: DEFAULT_MOUNT_PATH.to_owned() }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { address: IpAddr::V4(Ipv4Addr::UNSPECIFIED), port: DEFAULT_PORT }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self { level: "info".to_owned(), dir: None, json: false }
    }
}
