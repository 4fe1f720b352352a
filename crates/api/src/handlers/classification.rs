//! Handlers for review classifications.

use axum::extract::{Path, Query, State};
use axum::Json;
use hive_core::classification::{ClassificationDraft, Label};
use hive_db::models::classification::{Classification, ClassificationCounts};
use hive_db::repositories::{ClassificationRepo, DetectionRecordRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ClassificationParams {
    pub key: String,
}

/// Request body for `PUT /classifications`.
#[derive(Debug, Deserialize)]
pub struct SaveClassificationRequest {
    pub image_id: String,
    pub label: Label,
}

/// GET /api/v1/classifications?key=...
///
/// The current label of an image, or `null` when it has not been reviewed.
pub async fn get_classification(
    State(state): State<AppState>,
    Query(params): Query<ClassificationParams>,
) -> AppResult<Json<DataResponse<Option<Classification>>>> {
    let found = ClassificationRepo::find_by_image_id(&state.pool, &params.key).await?;
    Ok(Json(DataResponse { data: found }))
}

/// PUT /api/v1/classifications
///
/// Record a reviewer's verdict, replacing any earlier one. Detection
/// metadata for the image is copied onto the classification.
pub async fn save_classification(
    State(state): State<AppState>,
    Json(input): Json<SaveClassificationRequest>,
) -> AppResult<Json<DataResponse<Classification>>> {
    if input.image_id.trim().is_empty() {
        return Err(AppError::BadRequest("image_id must not be empty".into()));
    }

    let detection = DetectionRecordRepo::find_by_image_id(&state.pool, &input.image_id).await?;
    let metadata = detection.as_ref().map(|record| record.metadata());
    let draft = ClassificationDraft::new(&input.image_id, input.label, metadata.as_ref());

    let saved = ClassificationRepo::save(&state.pool, &draft).await?;
    tracing::info!(
        image_id = %saved.image_id,
        label = %saved.label,
        had_detection = detection.is_some(),
        "Classification saved",
    );
    Ok(Json(DataResponse { data: saved }))
}

/// GET /api/v1/classifications/counts
pub async fn counts(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<ClassificationCounts>>> {
    let counts = ClassificationRepo::counts(&state.pool).await?;
    Ok(Json(DataResponse { data: counts }))
}

/// GET /api/v1/classifications/labels/{label}
///
/// Image ids currently carrying `label` (`Good` or `Bad`).
pub async fn list_by_label(
    State(state): State<AppState>,
    Path(label): Path<String>,
) -> AppResult<Json<DataResponse<Vec<String>>>> {
    let label: Label = label.parse()?;
    let ids = ClassificationRepo::list_image_ids_by_label(&state.pool, label).await?;
    Ok(Json(DataResponse { data: ids }))
}
