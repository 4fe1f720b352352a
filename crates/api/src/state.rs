use std::sync::Arc;

use hive_detector::{Detector, UploadStaging};
use hive_storage::ImageCatalog;
use hive_training::KaggleApi;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: clients are built once at startup and shared.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: hive_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Image bucket view.
    pub catalog: ImageCatalog,
    pub detector: Arc<Detector>,
    pub staging: Arc<UploadStaging>,
    /// Kaggle client; `None` when no credentials are configured.
    pub kaggle: Option<Arc<KaggleApi>>,
    /// Tracks spawned kernel watchers so shutdown can wait for them.
    pub background: TaskTracker,
    /// Cancelled when the server shuts down.
    pub shutdown: CancellationToken,
}
