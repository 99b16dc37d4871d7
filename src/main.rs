use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::info;

use skill_relay::{build_state, config::Config, create_router, utils::init_logger};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();

    // Startup validation: refuse to serve with an unusable queue configuration
    let config = Config::from_env()?;
    info!("Configuration loaded: {:?}", config);

    let state = build_state(&config)?;
    let app = create_router(state);

    let host: std::net::IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::from((host, config.server.port));
    info!("Server listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
