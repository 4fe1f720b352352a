use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum DetectorError {
    #[error("Missing {what}: {}", path.display())]
    MissingInput { what: &'static str, path: PathBuf },

    #[error("Failed to launch detector: {0}")]
    Spawn(std::io::Error),

    #[error("Detector exited with code {code}: {stderr}")]
    Failed { code: i32, stderr: String },

    #[error("Detector timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    #[error("Invalid upload name '{0}'")]
    InvalidUpload(String),

    #[error("Staged upload not found: {0}")]
    UploadNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
