use std::net::SocketAddr;
use std::sync::Arc;

use crate::clients::kitt::{KittApi, KittClient};
use crate::infra::config::{Config, KittConfig};

/// Build the one upstream client the whole process shares.
pub fn build_api(kitt: &KittConfig) -> anyhow::Result<Arc<dyn KittApi>> {
    kitt.validate()?;
    let client = KittClient::from_config(kitt)?;
    Ok(Arc::new(client))
}

pub async fn run_server() -> anyhow::Result<()> {
    let cfg = Config::from_env();
    let kitt = KittConfig::from_env_and_toml()?;
    tracing::info!(
        mode = %cfg.mode,
        port = cfg.port,
        base_url = %kitt.base_url,
        authenticated = kitt.api_key.is_some(),
        insecure_tls = kitt.insecure_tls,
        "BOOT kitt-mcp-gateway"
    );
    let api = build_api(&kitt)?;

    if cfg.mode == "stdio" {
        crate::infra::runtime::mcp_transport::serve_stdio(crate::tools::kitt_router::make_factory(api))
            .await
            .map_err(|e| anyhow::anyhow!(e))?;
        return Ok(());
    }

    let app = crate::infra::http_app::build_app(api);
    let addr: SocketAddr = ([0, 0, 0, 0], cfg.port).into();
    tracing::info!(%addr, "listening");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;
    Ok(())
}
