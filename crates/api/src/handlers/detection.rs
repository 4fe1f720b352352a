//! Handlers for running and reading object detection.
//!
//! `POST /detect` stages an uploaded image, runs the detector on it and
//! stores the result as a detection record keyed by the staged name. The
//! reviewer then sorts the staged file with `POST /detect/{upload}/sort`.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use hive_core::catalog::IMAGE_EXTENSIONS;
use hive_core::classification::Label;
use hive_core::detection::{DetectionMetadata, Prediction};
use hive_core::error::CoreError;
use hive_db::models::detection_record::{CreateDetectionRecord, DetectionRecord};
use hive_db::repositories::DetectionRecordRepo;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Multipart field carrying the image.
const FILE_FIELD: &str = "file";

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct DetectionParams {
    pub key: String,
}

#[derive(Debug, Serialize)]
pub struct DetectResponse {
    /// Staged file name; pass it to the sort endpoint.
    pub upload: String,
    pub original_name: String,
    pub predictions: Vec<Prediction>,
    pub record: DetectionRecord,
}

#[derive(Debug, Deserialize)]
pub struct SortRequest {
    pub label: Label,
}

#[derive(Debug, Serialize)]
pub struct SortResponse {
    pub upload: String,
    pub label: Label,
    pub destination: String,
}

/// Fields collected from the detect form.
#[derive(Default)]
struct DetectForm {
    file: Option<(String, Vec<u8>)>,
    user_id: Option<String>,
    language: Option<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/detections?key=...
///
/// Stored detection record for an image.
pub async fn get_detection(
    State(state): State<AppState>,
    Query(params): Query<DetectionParams>,
) -> AppResult<Json<DataResponse<DetectionRecord>>> {
    let record = DetectionRecordRepo::find_by_image_id(&state.pool, &params.key)
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "Detection record",
            key: params.key.clone(),
        })?;
    Ok(Json(DataResponse { data: record }))
}

/// POST /api/v1/detect
///
/// Multipart form with a `file` part (`.png`, `.jpg` or `.jpeg`) and
/// optional `user_id` and `language` text parts.
pub async fn detect_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<DetectResponse>>)> {
    let form = read_detect_form(multipart).await?;
    let (file_name, bytes) = form
        .file
        .ok_or_else(|| AppError::BadRequest(format!("Missing '{FILE_FIELD}' part")))?;

    if !is_image_name(&file_name) {
        return Err(CoreError::Validation(format!(
            "Unsupported file '{file_name}'. Expected one of: {}",
            IMAGE_EXTENSIONS.join(", ")
        ))
        .into());
    }

    let staged = state.staging.stage(&file_name, &bytes).await?;
    let predictions = match state.detector.detect(&staged.path).await {
        Ok(predictions) => predictions,
        Err(e) => {
            discard_upload(&state, &staged.id).await;
            return Err(e.into());
        }
    };

    let now = Utc::now();
    let stored = DetectionRecordRepo::upsert(
        &state.pool,
        &CreateDetectionRecord {
            image_id: staged.id.clone(),
            metadata: DetectionMetadata {
                user_id: form.user_id,
                uploaded_at: Some(now.to_rfc3339()),
                timestamp: Some(now.format("%Y%m%d%H%M%S").to_string()),
                language: form.language,
                predictions: predictions.clone(),
            },
        },
    )
    .await;
    let record = match stored {
        Ok(record) => record,
        Err(e) => {
            discard_upload(&state, &staged.id).await;
            return Err(e.into());
        }
    };

    tracing::info!(
        upload = %staged.id,
        predictions = predictions.len(),
        "Detection recorded",
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: DetectResponse {
                upload: staged.id,
                original_name: staged.original_name,
                predictions,
                record,
            },
        }),
    ))
}

/// POST /api/v1/detect/{upload}/sort
///
/// Move a staged upload into the `correct` or `incorrect` folder.
pub async fn sort_upload(
    State(state): State<AppState>,
    Path(upload): Path<String>,
    Json(input): Json<SortRequest>,
) -> AppResult<Json<DataResponse<SortResponse>>> {
    let destination = state.staging.sort(&upload, input.label).await?;
    Ok(Json(DataResponse {
        data: SortResponse {
            upload,
            label: input.label,
            destination: destination.display().to_string(),
        },
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn read_detect_form(mut multipart: Multipart) -> AppResult<DetectForm> {
    let mut form = DetectForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            FILE_FIELD => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                form.file = Some((file_name, data.to_vec()));
            }
            "user_id" | "language" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                let value = Some(value).filter(|v| !v.trim().is_empty());
                if name == "user_id" {
                    form.user_id = value;
                } else {
                    form.language = value;
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

/// Drop a staged upload whose detection did not complete.
async fn discard_upload(state: &AppState, id: &str) {
    if let Err(e) = state.staging.discard(id).await {
        tracing::warn!(upload = %id, error = %e, "Failed to discard staged upload");
    }
}

/// Upload names are matched case-insensitively, unlike catalog keys.
fn is_image_name(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_names_ignore_case() {
        assert!(is_image_name("frame.JPG"));
        assert!(is_image_name("frame.png"));
        assert!(!is_image_name("frame.gif"));
        assert!(!is_image_name("png"));
    }
}
