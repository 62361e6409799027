use anyhow::{Context, Result};
use gatekeep::{init_tracing, GatekeepConfig};
use gatekeep_server::{app, AppState, MemoryDirectory};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config_path =
        std::env::var("GATEKEEP_CONFIG").unwrap_or_else(|_| "gatekeep.toml".to_string());
    let config = GatekeepConfig::load(&config_path)?;
    init_tracing(&config.logging.level);

    let addr = config.server.addr();
    let state = AppState::new(Arc::new(MemoryDirectory::new()), config);

    tracing::info!("gatekeep server starting");
    tracing::info!("config: {}", config_path);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("listening on http://{}", addr);

    axum::serve(listener, app(state)).await?;

    Ok(())
}
