//! Facade crate for secure fetch.
//! Re-exports the shared modules and, behind features, both ends of the channel.
//! Keep this crate thin: it composes other crates and implements no protocol logic.
//!
//! ## Usage
//! - `client`: [`client::SecureClient`] for sending sealed requests.
//! - `server`: [`server::SecureProxyLayer`] and [`server::mount`] for axum applications.

pub use sfetch_crypto as crypto;
pub use sfetch_domain as domain;
pub use sfetch_envelope as envelope;
pub use sfetch_kernel as kernel;

#[cfg(feature = "client")]
pub mod client {
    pub use sfetch_client::{
        ClientError, ClientErrorExt, RequestOptions, SecureClient, SecureResponse,
    };
    pub use sfetch_kernel::config::ClientConfig;
}

#[cfg(feature = "server")]
pub mod server {
    use axum::Router;
    pub use sfetch_kernel::config::ProxyConfig;
    pub use sfetch_proxy::{ProxyError, ProxyErrorExt, SecureProxy, SecureProxyLayer};

    /// Serves `api` behind the secure endpoint at `mount_path`.
    ///
    /// The API routes are reachable only through sealed envelopes; merge them into
    /// the returned router yourself if they should also be served in plain text.
    ///
    /// # Errors
    /// Returns [`ProxyError::Internal`] if the proxy cannot be built from `config`.
    pub fn mount(config: ProxyConfig, mount_path: &str, api: Router) -> Result<Router, ProxyError> {
        let layer = SecureProxyLayer::new(config)?;
        Ok(Router::new().nest_service(mount_path, layer.wrap(api)))
    }
}

/// Build-time enabled features (by Cargo feature).
pub mod features {
    pub const ENABLED: &[&str] = &[
        #[cfg(feature = "client")]
        "client",
        #[cfg(feature = "server")]
        "server",
    ];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}
