#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Object store {operation} failed: {message}")]
    Backend {
        operation: &'static str,
        message: String,
    },
}
