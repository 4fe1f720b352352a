//! Object detection for uploaded hive images.
//!
//! The detector model is an external program; [`Detector`] launches it as a
//! subprocess and turns its output into predictions. [`UploadStaging`] holds
//! uploaded files on disk until the reviewer sorts them.

pub mod error;
pub mod runner;
pub mod staging;

pub use error::DetectorError;
pub use runner::{Detector, DetectorConfig};
pub use staging::{StagedUpload, UploadStaging};
