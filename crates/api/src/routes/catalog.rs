//! Route definitions for the image catalog.
//!
//! Mounted at `/catalog` within the `/api/v1` tree.
//!
//! ```text
//! GET    /dates     -> list_dates
//! GET    /images    -> image_page
//! GET    /object    -> get_object
//! ```

use axum::routing::get;
use axum::Router;

use crate::handlers::catalog;
use crate::state::AppState;

/// Build the `/catalog` router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dates", get(catalog::list_dates))
        .route("/images", get(catalog::image_page))
        .route("/object", get(catalog::get_object))
}
