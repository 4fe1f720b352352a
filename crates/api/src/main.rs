use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use hive_detector::{Detector, UploadStaging};
use hive_storage::{ImageCatalog, MemoryObjectStore, ObjectStore, S3ObjectStore};
use hive_training::KaggleApi;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hive_api::config::ServerConfig;
use hive_api::router::build_app_router;
use hive_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hive_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let pool = hive_db::create_pool(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    hive_db::health_check(&pool)
        .await
        .context("Database health check failed")?;
    hive_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database ready");

    // --- Object store ---
    let store: Arc<dyn ObjectStore> = match &config.s3 {
        Some(s3) => Arc::new(S3ObjectStore::connect(s3).await),
        None => {
            tracing::warn!("S3_BUCKET not set, serving an empty in-memory image store");
            Arc::new(MemoryObjectStore::new())
        }
    };
    let catalog = ImageCatalog::new(store, config.reserved_key_prefix.clone());

    // --- Training ---
    let kaggle = match config.training.credentials() {
        Some((username, key)) => Some(Arc::new(KaggleApi::new(
            config.training.kaggle_base_url.clone(),
            username,
            key,
        ))),
        None => {
            tracing::warn!("Kaggle credentials not set, training endpoints disabled");
            None
        }
    };

    // --- App state ---
    let background = TaskTracker::new();
    let shutdown = CancellationToken::new();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        catalog,
        detector: Arc::new(Detector::new(config.detector.clone())),
        staging: Arc::new(UploadStaging::new(
            config.uploads_dir.clone(),
            config.sorted_dir.clone(),
        )),
        kaggle,
        background: background.clone(),
        shutdown: shutdown.clone(),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().context("Invalid HOST address")?,
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    shutdown.cancel();
    background.close();
    if tokio::time::timeout(Duration::from_secs(5), background.wait())
        .await
        .is_err()
    {
        tracing::warn!("Kernel watchers did not stop in time");
    }

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
