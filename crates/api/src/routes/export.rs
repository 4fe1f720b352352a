use axum::routing::get;
use axum::Router;

use crate::handlers::export;
use crate::state::AppState;

/// `GET /export` -> export_archive
pub fn router() -> Router<AppState> {
    Router::new().route("/export", get(export::export_archive))
}
