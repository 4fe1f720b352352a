/// Errors from the training workflow.
#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Kaggle returned a non-2xx status code or an error payload.
    #[error("Kaggle API error ({status}): {body}")]
    ApiError { status: u16, body: String },

    #[error("Kernel {slug} still running after {waited_secs}s")]
    Timeout { slug: String, waited_secs: u64 },

    #[error("Polling of kernel {0} was cancelled")]
    Cancelled(String),

    #[error("Invalid dataset archive: {0}")]
    InvalidArchive(String),

    #[error("Invalid training request: {0}")]
    Validation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
