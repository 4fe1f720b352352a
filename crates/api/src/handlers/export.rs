//! Zip export of reviewed images.

use axum::extract::{Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use hive_core::classification::Label;
use hive_core::export::{ExportBuilder, EXPORT_FILE_NAME};
use hive_db::repositories::{ClassificationRepo, DetectionRecordRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::router::EXPORT_ERRORS_HEADER;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ExportParams {
    /// Include `image_details.csv` (default: `true`).
    #[serde(default = "default_manifest")]
    pub manifest: bool,
}

fn default_manifest() -> bool {
    true
}

/// GET /api/v1/export?manifest=true
///
/// Every classified image under `good/` or `bad/`, plus the prediction
/// manifest. Images that cannot be fetched, lack readable detection details
/// or are not valid images are left out. They are listed in
/// `export_errors.txt` inside the archive and counted in the
/// `X-Export-Errors` header.
pub async fn export_archive(
    State(state): State<AppState>,
    Query(params): Query<ExportParams>,
) -> AppResult<impl IntoResponse> {
    let mut builder = ExportBuilder::new(params.manifest);
    let mut classified = 0usize;

    for label in Label::ALL {
        let ids = ClassificationRepo::list_image_ids_by_label(&state.pool, label).await?;
        classified += ids.len();

        for key in ids {
            let bytes = match state.catalog.fetch(&key).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    builder.record_failure(&key, e);
                    continue;
                }
            };
            let predictions =
                match DetectionRecordRepo::find_by_image_id(&state.pool, &key).await {
                    Ok(record) => record.map(|r| r.predictions.0).unwrap_or_default(),
                    Err(e) => {
                        builder.record_failure(&key, e);
                        continue;
                    }
                };

            if let Err(e) = builder.add_image(&key, label, &bytes, &predictions) {
                builder.record_failure(&key, e);
            }
        }
    }

    if classified == 0 {
        return Err(AppError::NotFound("No classified images to export".into()));
    }

    let archive = builder.finish()?;
    for error in &archive.errors {
        tracing::warn!(error = %error, "Image left out of export");
    }
    tracing::info!(
        images = archive.image_count,
        failures = archive.errors.len(),
        bytes = archive.bytes.len(),
        "Export built",
    );

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/zip"));
    headers.insert(
        CONTENT_DISPOSITION,
        HeaderValue::from_str(&format!("attachment; filename=\"{EXPORT_FILE_NAME}\""))
            .map_err(|e| AppError::InternalError(e.to_string()))?,
    );
    headers.insert(
        HeaderName::from_static(EXPORT_ERRORS_HEADER),
        HeaderValue::from(archive.errors.len()),
    );

    Ok((StatusCode::OK, headers, archive.bytes))
}
