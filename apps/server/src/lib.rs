//! # Secure Fetch Demo Server
//!
//! An `Axum` backend with a tiny JSON API and the secure endpoint in front of it.
//! The same handlers are reachable in plain text and, sealed, through `/secure`.
//!
//! ## Example
//! ```no_run
//! use sfetch_server::Server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Server::builder()
//!         .secret("correct horse battery staple")
//!         .port(3000)
//!         .build()?
//!         .run()
//!         .await
//! }
//! ```

mod api;
mod health;
mod router;

use anyhow::{Context, Result};
use axum::Router;
use axum_server::Handle;
use sfetch::domain::{Settings, SharedSecret};
use sfetch::server::ProxyConfig;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// A fluent builder for configuring and initializing the [`Server`].
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct ServerBuilder {
    settings: Settings,
}

impl ServerBuilder {
    /// Replaces the whole settings tree, usually from `load_settings`.
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn secret(mut self, secret: impl Into<SharedSecret>) -> Self {
        self.settings.secret = Some(secret.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.settings.server.port = port;
        self
    }

    /// Validates the proxy configuration and assembles the router.
    ///
    /// # Errors
    /// Returns an error if the shared secret is missing or too short, or the proxy
    /// settings are invalid.
    pub fn build(self) -> Result<Server> {
        let proxy = ProxyConfig::from_settings(&self.settings)
            .context("Invalid secure endpoint configuration")?;
        let address = SocketAddr::new(self.settings.server.address, self.settings.server.port);

        info!(
            address = %address,
            mount_path = %self.settings.proxy.mount_path,
            debug = proxy.debug(),
            "Initializing server"
        );

        let router = router::init(proxy, &self.settings.proxy.mount_path)
            .context("Failed to mount the secure endpoint")?;

        Ok(Server { address, router })
    }
}

/// A fully initialized server instance ready to run.
#[must_use = "call .run().await to start the server"]
#[derive(Debug)]
pub struct Server {
    address: SocketAddr,
    router: Router,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    #[must_use]
    pub const fn address(&self) -> SocketAddr {
        self.address
    }

    /// The complete application, for embedding or in-process testing.
    #[must_use]
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Starts the server and runs until the shutdown signal is received.
    ///
    /// # Errors
    /// Returns an error if the server fails to bind to the configured address.
    pub async fn run(self) -> Result<()> {
        let address = self.address;
        info!("Starting HTTP server on http://{address}");

        let handle = Handle::<SocketAddr>::new();
        let shutdown_handle = handle.clone();

        tokio::spawn(async move {
            if let Err(e) = shutdown_signal().await {
                error!("Error while waiting for shutdown signal: {e}");
                return;
            }
            info!("Shutdown signal received, starting graceful shutdown...");
            shutdown_handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
        });

        axum_server::bind(address)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await
            .context("HTTP server failed")?;

        info!("Server shutdown complete");
        Ok(())
    }
}

/// Listens for shutdown signals (Ctrl+C, SIGTERM).
async fn shutdown_signal() -> Result<()> {
    let ctrl_c = async { signal::ctrl_c().await.context("Failed to install Ctrl+C handler") };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("Failed to install SIGTERM handler")?
            .recv()
            .await;
        Ok::<_, anyhow::Error>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<()>>();

    tokio::select! {
        res = ctrl_c => {
            res.context("Ctrl+C signal received")?;
        },
        res = terminate => {
            res.context("SIGTERM signal received")?;
        },
    }

    Ok(())
}
