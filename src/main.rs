use taskboard::{config::AppConfig, http::{routes::tasks, routing}};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    let addr = config.socket_addr()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let (service, theme) = taskboard::bootstrap(&config).await?;
    let router = routing::app(tasks::router(tasks::AppState::new(service, theme)));

    tracing::info!(%addr, database_url = %config.database_url, "listening");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal::ctrl_c;
    let _ = ctrl_c().await;
    tracing::info!("shutdown");
}
