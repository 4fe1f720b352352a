//! Route definitions for model training.
//!
//! Mounted at `/training` within the `/api/v1` tree.
//!
//! ```text
//! POST   /datasets                -> upload_dataset
//! POST   /kernels                 -> push_kernel
//! GET    /kernels/{slug}/status   -> kernel_status
//! ```

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::training;
use crate::state::AppState;

/// Largest accepted dataset archive.
const MAX_DATASET_BYTES: usize = 512 * 1024 * 1024;

/// Build the `/training` router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/datasets",
            post(training::upload_dataset).layer(DefaultBodyLimit::max(MAX_DATASET_BYTES)),
        )
        .route("/kernels", post(training::push_kernel))
        .route("/kernels/{slug}/status", get(training::kernel_status))
}
