use crate::error::ProxyError;
use crate::pipeline::ProxyState;
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use sfetch_kernel::config::ProxyConfig;
use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{BoxError, Layer, Service};

/// Wraps a downstream service so it can only be reached through sealed envelopes.
///
/// ```rust
/// use axum::{Router, routing::get};
/// use sfetch_kernel::config::ProxyConfig;
/// use sfetch_proxy::SecureProxyLayer;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ProxyConfig::builder().secret("correct horse battery staple").build()?;
/// let api = Router::new().route("/api/greet/{name}", get(|| async { "hello" }));
///
/// let app: Router = Router::new()
///     .nest_service("/secure", SecureProxyLayer::new(config)?.wrap(api.clone()))
///     .merge(api);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SecureProxyLayer {
    state: Arc<ProxyState>,
}

impl SecureProxyLayer {
    /// # Errors
    /// Returns [`ProxyError::Internal`] if the crypto engine rejects the replay policy.
    pub fn new(config: ProxyConfig) -> Result<Self, ProxyError> {
        Ok(Self { state: Arc::new(ProxyState::new(config)?) })
    }

    /// Same as [`Layer::layer`], without importing the trait.
    pub fn wrap<S>(&self, downstream: S) -> SecureProxy<S> {
        self.layer(downstream)
    }

    #[must_use]
    pub fn config(&self) -> &ProxyConfig {
        &self.state.config
    }
}

impl<S> Layer<S> for SecureProxyLayer {
    type Service = SecureProxy<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SecureProxy { inner, state: Arc::clone(&self.state) }
    }
}

/// The proxy service produced by [`SecureProxyLayer`].
///
/// Never fails at the service level: every outcome, including downstream errors, is a response.
#[derive(Debug, Clone)]
pub struct SecureProxy<S> {
    inner: S,
    state: Arc<ProxyState>,
}

impl<S> Service<Request<Body>> for SecureProxy<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
    S::Error: Into<BoxError>,
{
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        // Readiness of the downstream is awaited per request once it has been verified.
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let state = Arc::clone(&self.state);
        let clone = self.inner.clone();
        let inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move { Ok(state.handle(inner, req).await) })
    }
}
