use axum::{
    routing::{any_service, get},
    Router,
};
use std::sync::Arc;

use crate::clients::kitt::KittApi;
use crate::infra::runtime::mcp_transport::{make_streamable_http_service, LocalSessionManager};
use crate::tools::kitt_router::make_factory;

/// `/healthz` + streamable MCP at `/mcp`.
pub fn build_app(api: Arc<dyn KittApi>) -> Router {
    let session_mgr = Arc::new(LocalSessionManager::default());
    let mcp_service = make_streamable_http_service(make_factory(api), session_mgr);

    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .route_service("/mcp", any_service(mcp_service))
}
