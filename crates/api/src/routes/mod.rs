pub mod catalog;
pub mod classification;
pub mod detection;
pub mod export;
pub mod health;
pub mod training;

use axum::Router;

use crate::config::ServerConfig;
use crate::router::timeout_layer;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// `/detect` and `/export` run under
/// [`ServerConfig::long_request_timeout`]; everything else under the
/// ordinary request timeout.
///
/// Route hierarchy:
///
/// ```text
/// /catalog/dates                          capture dates of catalog images
/// /catalog/images                         one image of a date, by index
/// /catalog/object                         raw image bytes
///
/// /detections                             stored detection record (GET)
/// /detect                                 upload and run the detector (POST)
/// /detect/{upload}/sort                   move a staged upload by label (POST)
///
/// /classifications                        get (GET), save (PUT)
/// /classifications/counts                 Good / Bad totals
/// /classifications/labels/{label}         image ids with a label
///
/// /export                                 zip of classified images
///
/// /training/datasets                      unpack a dataset archive (POST)
/// /training/kernels                       push a training kernel (POST)
/// /training/kernels/{slug}/status         kernel run status
/// ```
pub fn api_routes(config: &ServerConfig) -> Router<AppState> {
    let long_running = Router::new()
        .merge(detection::detect_router())
        .merge(export::router())
        .layer(timeout_layer(config.long_request_timeout()));

    Router::new()
        .nest("/catalog", catalog::router())
        .merge(detection::router())
        .nest("/classifications", classification::router())
        .nest("/training", training::router())
        .layer(timeout_layer(config.request_timeout()))
        .merge(long_running)
}
