//! Handlers for browsing the image catalog.
//!
//! Reviewers pick a capture date, then step through that date's images one
//! at a time. The position lives with the client; every request carries it
//! and the server clamps it against the current list.

use axum::extract::{Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::Json;
use chrono::NaiveDate;
use hive_core::pagination::PageCursor;
use hive_db::models::classification::Classification;
use hive_db::models::detection_record::DetectionRecord;
use hive_db::repositories::{ClassificationRepo, DetectionRecordRepo};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ImagePageParams {
    /// Capture date, `YYYY-MM-DD`.
    pub date: NaiveDate,
    #[serde(default)]
    pub index: usize,
}

#[derive(Debug, Deserialize)]
pub struct ObjectParams {
    pub key: String,
}

/// One image of a date plus everything known about it.
#[derive(Debug, Serialize)]
pub struct ImagePage {
    pub date: NaiveDate,
    /// Clamped position; `0` when the date has no images.
    pub index: usize,
    pub total: usize,
    pub has_previous: bool,
    pub has_next: bool,
    pub image_id: Option<String>,
    pub detection: Option<DetectionRecord>,
    pub classification: Option<Classification>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/catalog/dates
///
/// Distinct capture dates of the catalog images, ascending.
pub async fn list_dates(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<NaiveDate>>>> {
    let dates = state.catalog.available_dates().await?;
    Ok(Json(DataResponse { data: dates }))
}

/// GET /api/v1/catalog/images?date=YYYY-MM-DD&index=N
///
/// The image at `index` among those captured on `date`, with its detection
/// record and current classification.
pub async fn image_page(
    State(state): State<AppState>,
    Query(params): Query<ImagePageParams>,
) -> AppResult<Json<DataResponse<ImagePage>>> {
    let images = state.catalog.images_on(params.date).await?;

    let Some(cursor) = PageCursor::clamped(params.index, images.len()) else {
        return Ok(Json(DataResponse {
            data: ImagePage {
                date: params.date,
                index: 0,
                total: 0,
                has_previous: false,
                has_next: false,
                image_id: None,
                detection: None,
                classification: None,
            },
        }));
    };

    let image_id = cursor.select(&images).cloned();
    let (detection, classification) = match image_id.as_deref() {
        Some(id) => (
            DetectionRecordRepo::find_by_image_id(&state.pool, id).await?,
            ClassificationRepo::find_by_image_id(&state.pool, id).await?,
        ),
        None => (None, None),
    };

    Ok(Json(DataResponse {
        data: ImagePage {
            date: params.date,
            index: cursor.index,
            total: cursor.total,
            has_previous: cursor.has_previous(),
            has_next: cursor.has_next(),
            image_id,
            detection,
            classification,
        },
    }))
}

/// GET /api/v1/catalog/object?key=...
///
/// Raw image bytes, typed by extension.
pub async fn get_object(
    State(state): State<AppState>,
    Query(params): Query<ObjectParams>,
) -> AppResult<impl IntoResponse> {
    let bytes = state.catalog.fetch(&params.key).await?;
    Ok(([(CONTENT_TYPE, content_type_for(&params.key))], bytes))
}

fn content_type_for(key: &str) -> &'static str {
    let lower = key.to_ascii_lowercase();
    if lower.ends_with(".png") {
        "image/png"
    } else if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
        "image/jpeg"
    } else {
        "application/octet-stream"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_by_extension() {
        assert_eq!(content_type_for("u1/a.png"), "image/png");
        assert_eq!(content_type_for("u1/a.JPG"), "image/jpeg");
        assert_eq!(content_type_for("u1/a.jpeg"), "image/jpeg");
        assert_eq!(content_type_for("u1/a.bin"), "application/octet-stream");
    }
}
