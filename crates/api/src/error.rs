use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use hive_core::error::CoreError;
use hive_detector::DetectorError;
use hive_storage::StorageError;
use hive_training::TrainingError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps the error of every component and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Detector(#[from] DetectorError),

    #[error(transparent)]
    Training(#[from] TrainingError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Nothing to return for an otherwise valid request.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A feature that needs configuration the server does not have.
    #[error("Unavailable: {0}")]
    Unavailable(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

type Classified = (StatusCode, &'static str, String);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, key } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} '{key}' not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Internal(msg) => internal(msg),
            },
            AppError::Database(err) => classify_sqlx_error(err),
            AppError::Storage(err) => classify_storage_error(err),
            AppError::Detector(err) => classify_detector_error(err),
            AppError::Training(err) => classify_training_error(err),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Unavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE", msg.clone())
            }
            AppError::InternalError(msg) => internal(msg),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Log the detail, return a sanitised 500.
fn internal(detail: &str) -> Classified {
    tracing::error!(error = %detail, "Internal error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// Failure of a collaborator outside this process.
fn upstream(code: &'static str, detail: String) -> Classified {
    tracing::warn!(error = %detail, code, "Upstream call failed");
    (StatusCode::BAD_GATEWAY, code, detail)
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> Classified {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => (
            StatusCode::CONFLICT,
            "CONFLICT",
            format!("Duplicate value violates a unique constraint: {}", db_err.message()),
        ),
        other => internal(&other.to_string()),
    }
}

fn classify_storage_error(err: &StorageError) -> Classified {
    match err {
        StorageError::NotFound(key) => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("Image '{key}' not found"),
        ),
        StorageError::Backend { .. } => upstream("STORAGE_ERROR", err.to_string()),
    }
}

fn classify_detector_error(err: &DetectorError) -> Classified {
    match err {
        DetectorError::MissingInput { .. } => {
            (StatusCode::BAD_REQUEST, "MISSING_INPUT", err.to_string())
        }
        DetectorError::InvalidUpload(_) => {
            (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.to_string())
        }
        DetectorError::UploadNotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string()),
        DetectorError::Spawn(_) | DetectorError::Failed { .. } | DetectorError::Timeout { .. } => {
            upstream("DETECTOR_ERROR", err.to_string())
        }
        DetectorError::Io(e) => internal(&e.to_string()),
    }
}

fn classify_training_error(err: &TrainingError) -> Classified {
    match err {
        TrainingError::Request(_) | TrainingError::ApiError { .. } => {
            upstream("TRAINING_API_ERROR", err.to_string())
        }
        TrainingError::Timeout { .. } => {
            (StatusCode::GATEWAY_TIMEOUT, "TRAINING_TIMEOUT", err.to_string())
        }
        TrainingError::Cancelled(_) => {
            (StatusCode::SERVICE_UNAVAILABLE, "CANCELLED", err.to_string())
        }
        TrainingError::InvalidArchive(_) | TrainingError::Validation(_) => {
            (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.to_string())
        }
        TrainingError::Io(e) => internal(&e.to_string()),
    }
}
