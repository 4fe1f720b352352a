//! Repository for the `detection_records` table.

use chrono::Utc;
use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::models::detection_record::{CreateDetectionRecord, DetectionRecord};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, image_id, user_id, uploaded_at, timestamp, language, \
    predictions, created_at";

/// Read access to detection results, plus the write path used by uploads.
pub struct DetectionRecordRepo;

impl DetectionRecordRepo {
    /// Find the detection record for an image.
    pub async fn find_by_image_id(
        pool: &SqlitePool,
        image_id: &str,
    ) -> Result<Option<DetectionRecord>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM detection_records WHERE image_id = ?1");
        sqlx::query_as::<_, DetectionRecord>(&query)
            .bind(image_id)
            .fetch_optional(pool)
            .await
    }

    /// Record a detection result, replacing any earlier result for the image.
    pub async fn upsert(
        pool: &SqlitePool,
        input: &CreateDetectionRecord,
    ) -> Result<DetectionRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO detection_records
                (image_id, user_id, uploaded_at, timestamp, language, predictions, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT (image_id) DO UPDATE SET
                user_id = excluded.user_id,
                uploaded_at = excluded.uploaded_at,
                timestamp = excluded.timestamp,
                language = excluded.language,
                predictions = excluded.predictions
             RETURNING {COLUMNS}"
        );
        let metadata = &input.metadata;
        sqlx::query_as::<_, DetectionRecord>(&query)
            .bind(&input.image_id)
            .bind(&metadata.user_id)
            .bind(&metadata.uploaded_at)
            .bind(&metadata.timestamp)
            .bind(&metadata.language)
            .bind(Json(&metadata.predictions))
            .bind(Utc::now())
            .fetch_one(pool)
            .await
    }
}
