use audio_trimmer::app;
use audio_trimmer::config::settings::AppConfig;
use audio_trimmer::infrastructure::audio::MediaProcessor;
use audio_trimmer::infrastructure::storage::local::BlobStore;
use audio_trimmer::modules::jobs::JobRegistry;
use audio_trimmer::state::AppState;
use audio_trimmer::workers::reaper;
use dotenvy::dotenv;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting server...");

    let config = AppConfig::new()?;
    let storage = BlobStore::new(config.upload_dir.clone()).await?;
    let processor = Arc::new(MediaProcessor::new(config.ffmpeg_path.clone()));
    let state = AppState::new(config.clone(), storage, JobRegistry::new(), processor);

    tokio::spawn(reaper::start_reaper(state.clone()));

    let app = app::create_app(state).await;

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
