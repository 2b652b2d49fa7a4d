use std::net::SocketAddr;
use anyhow::Context;
use dsp_api::{app, AppState};
use dsp_store::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dsp_api=debug,dsp_receipt=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting DSP receipt service on port {}", config.server.port);

    let app_state = AppState::from_config(&config);

    let output_dir = app_state.store.ensure_output_dir()?;
    tracing::info!("Writing receipts to {}", output_dir.display());
    if !config.receipt.logo_path.is_file() {
        tracing::warn!("Logo {} not found, receipts will have no logo", config.receipt.logo_path.display());
    }

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
