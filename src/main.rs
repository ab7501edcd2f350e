use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use binbot_server::config::Config;
use binbot_server::db::open_database;
use binbot_server::{router, tts, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "binbot_server=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting BinBot Server...");

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(
        "Environment: {}, Server: {}",
        config.environment,
        config.server_address()
    );

    // Open the embedded database
    let db = open_database(&config.database_path).map_err(|e| anyhow::anyhow!(e.to_string()))?;

    // Make sure the artifact directories exist before first use
    tokio::fs::create_dir_all(&config.audio_dir).await?;
    tokio::fs::create_dir_all(&config.upload_dir).await?;

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(
            config
                .allowed_origins
                .iter()
                .filter_map(|s| s.parse::<axum::http::HeaderValue>().ok())
                .collect::<Vec<_>>(),
        )
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers(Any);

    // Periodic sweep of expired audio artifacts
    spawn_audio_sweeper(
        PathBuf::from(&config.audio_dir),
        config.audio_max_age_hours,
        config.audio_cleanup_interval_secs,
    );

    let state = AppState::new(db, config.clone());

    let app = router(state).layer(cors).layer(TraceLayer::new_for_http());

    // Start server
    let addr: SocketAddr = config.server_address().parse()?;
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Background task deleting synthesized audio older than the retention window
fn spawn_audio_sweeper(audio_dir: PathBuf, max_age_hours: u64, interval_secs: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
        loop {
            interval.tick().await;
            match tts::sweep_expired(&audio_dir, max_age_hours).await {
                Ok(0) => {}
                Ok(removed) => tracing::info!("Audio sweep removed {} expired files", removed),
                Err(e) => tracing::warn!("Audio sweep failed: {}", e),
            }
        }
    });
}
