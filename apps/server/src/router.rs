use crate::{api, health};
use axum::Router;
use sfetch::server::{ProxyConfig, ProxyError, mount};
use tower_http::trace::TraceLayer;

/// Plain API, health check and the secure endpoint forwarding to the same API.
pub(crate) fn init(proxy: ProxyConfig, mount_path: &str) -> Result<Router, ProxyError> {
    let api = api::router();
    let secure = mount(proxy, mount_path, api.clone())?;

    Ok(Router::new()
        .merge(api)
        .merge(health::router())
        .merge(secure)
        .layer(TraceLayer::new_for_http()))
}
