/// Row identifiers in the document store.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Placeholder stored for detection metadata fields that were never supplied.
pub const NOT_AVAILABLE: &str = "N/A";
