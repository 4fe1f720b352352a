pub mod classification_repo;
pub mod detection_record_repo;

pub use classification_repo::ClassificationRepo;
pub use detection_record_repo::DetectionRecordRepo;
