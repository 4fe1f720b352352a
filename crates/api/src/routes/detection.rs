//! Route definitions for detection.
//!
//! ```text
//! GET    /detections               -> get_detection
//! POST   /detect                   -> detect_upload
//! POST   /detect/{upload}/sort     -> sort_upload
//! ```

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::detection;
use crate::state::AppState;

/// Largest accepted image upload.
const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Lookups and sorting.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/detections", get(detection::get_detection))
        .route("/detect/{upload}/sort", post(detection::sort_upload))
}

/// The detector run, kept apart so it can get a longer timeout.
pub fn detect_router() -> Router<AppState> {
    Router::new().route(
        "/detect",
        post(detection::detect_upload).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
    )
}
