//! Detection records: detector output plus upload metadata, one per image.

use hive_core::detection::{DetectionMetadata, Prediction};
use hive_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `detection_records` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DetectionRecord {
    pub id: DbId,
    pub image_id: String,
    pub user_id: Option<String>,
    pub uploaded_at: Option<String>,
    pub timestamp: Option<String>,
    pub language: Option<String>,
    pub predictions: Json<Vec<Prediction>>,
    pub created_at: Timestamp,
}

impl DetectionRecord {
    /// Metadata view used when denormalising into a classification.
    pub fn metadata(&self) -> DetectionMetadata {
        DetectionMetadata {
            user_id: self.user_id.clone(),
            uploaded_at: self.uploaded_at.clone(),
            timestamp: self.timestamp.clone(),
            language: self.language.clone(),
            predictions: self.predictions.0.clone(),
        }
    }
}

/// DTO for recording a detection result.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDetectionRecord {
    pub image_id: String,
    #[serde(flatten)]
    pub metadata: DetectionMetadata,
}
