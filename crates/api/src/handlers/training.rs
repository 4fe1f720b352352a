//! Handlers for model training.
//!
//! Dataset archives are unpacked locally; training runs are Kaggle kernels
//! rendered from a script template and watched in the background until
//! they finish.

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use hive_training::dataset::extract_dataset;
use hive_training::notebook::{kernel_slug, render_notebook};
use hive_training::{KaggleApi, KernelPush, KernelStatus};
use serde::{Deserialize, Serialize};

use crate::background::kernel_watch;
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct DatasetUploadResponse {
    /// Directory the archive was unpacked into.
    pub path: String,
    pub files: Vec<String>,
    /// Expected split folders (`train`, `test`, `valid`) that were absent.
    pub missing_splits: Vec<String>,
}

/// Request body for `POST /training/kernels`.
#[derive(Debug, Deserialize)]
pub struct PushKernelRequest {
    pub title: String,
    /// Dataset version substituted into the script template.
    pub dataset_version: u32,
}

#[derive(Debug, Serialize)]
pub struct PushKernelResponse {
    pub kernel: String,
    pub version_number: Option<u32>,
    pub url: Option<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/training/datasets
///
/// Body is a zip archive. It is unpacked into a fresh directory under the
/// configured dataset directory and the extracted files are listed.
pub async fn upload_dataset(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<(StatusCode, Json<DataResponse<DatasetUploadResponse>>)> {
    if body.is_empty() {
        return Err(AppError::BadRequest("Dataset archive is empty".into()));
    }

    let target: PathBuf = state
        .config
        .training
        .dataset_dir
        .join(Utc::now().format("%Y%m%d%H%M%S%3f").to_string());

    let extracted = {
        let target = target.clone();
        tokio::task::spawn_blocking(move || extract_dataset(&body, &target))
            .await
            .map_err(|e| AppError::InternalError(format!("Dataset extraction panicked: {e}")))??
    };

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: DatasetUploadResponse {
                path: target.display().to_string(),
                files: extracted
                    .files
                    .iter()
                    .map(|f| f.display().to_string())
                    .collect(),
                missing_splits: extracted.missing_splits,
            },
        }),
    ))
}

/// POST /api/v1/training/kernels
///
/// Render the training script for `dataset_version`, push it as a kernel
/// titled `title` and start watching the run.
pub async fn push_kernel(
    State(state): State<AppState>,
    Json(input): Json<PushKernelRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<PushKernelResponse>>)> {
    let api = kaggle(&state)?;
    let training = &state.config.training;

    let template = tokio::fs::read_to_string(&training.template_path)
        .await
        .map_err(|e| {
            AppError::InternalError(format!(
                "Failed to read training template {}: {e}",
                training.template_path.display()
            ))
        })?;
    let script = render_notebook(&template, input.dataset_version)?;
    let kernel = api.kernel_ref(&kernel_slug(&input.title)?);

    let mut push = KernelPush::script(kernel.clone(), input.title, script);
    push.enable_gpu = training.enable_gpu;
    push.is_private = !training.public;

    let pushed = api.push_kernel(&push).await?;

    state.background.spawn(kernel_watch::run(
        Arc::clone(&api),
        kernel.clone(),
        training.poll.clone(),
        state.shutdown.child_token(),
    ));

    Ok((
        StatusCode::ACCEPTED,
        Json(DataResponse {
            data: PushKernelResponse {
                kernel,
                version_number: pushed.version_number,
                url: pushed.url,
            },
        }),
    ))
}

/// GET /api/v1/training/kernels/{slug}/status
///
/// Current run status of one of the configured account's kernels.
pub async fn kernel_status(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<DataResponse<KernelStatus>>> {
    let api = kaggle(&state)?;
    let status = api.kernel_status(&api.kernel_ref(&slug)).await?;
    Ok(Json(DataResponse { data: status }))
}

fn kaggle(state: &AppState) -> AppResult<Arc<KaggleApi>> {
    state
        .kaggle
        .clone()
        .ok_or_else(|| AppError::Unavailable("Kaggle credentials are not configured".into()))
}
