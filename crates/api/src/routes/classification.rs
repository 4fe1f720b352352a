//! Route definitions for review classifications.
//!
//! Mounted at `/classifications` within the `/api/v1` tree.
//!
//! ```text
//! GET    /                    -> get_classification
//! PUT    /                    -> save_classification
//! GET    /counts              -> counts
//! GET    /labels/{label}      -> list_by_label
//! ```

use axum::routing::get;
use axum::Router;

use crate::handlers::classification;
use crate::state::AppState;

/// Build the `/classifications` router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(classification::get_classification).put(classification::save_classification),
        )
        .route("/counts", get(classification::counts))
        .route("/labels/{label}", get(classification::list_by_label))
}
