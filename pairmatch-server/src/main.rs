use pairmatch_server::{create_router, AppState, LogConfig, ServerConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    LogConfig::from_env().init()?;

    let config = ServerConfig::from_env();
    let state = AppState::new();
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.addr()).await?;
    info!(addr = %config.addr(), "signaling server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}
