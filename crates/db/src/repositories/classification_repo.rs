//! Repository for the `classifications` table.
//!
//! Saving is a single `INSERT ... ON CONFLICT (image_id) DO UPDATE`, backed
//! by the `uq_classifications_image_id` constraint. Two concurrent saves for
//! the same image therefore always leave exactly one row, holding whichever
//! write landed last.

use chrono::Utc;
use hive_core::classification::{ClassificationDraft, Label};
use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::models::classification::{Classification, ClassificationCounts};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, image_id, label, user_id, uploaded_at, timestamp, language, \
    predictions, created_at, updated_at";

/// Provides the classification store operations.
pub struct ClassificationRepo;

impl ClassificationRepo {
    /// Find the classification for an image. `None` means not yet labeled.
    pub async fn find_by_image_id(
        pool: &SqlitePool,
        image_id: &str,
    ) -> Result<Option<Classification>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM classifications WHERE image_id = ?1");
        sqlx::query_as::<_, Classification>(&query)
            .bind(image_id)
            .fetch_optional(pool)
            .await
    }

    /// Insert or replace the classification for `draft.image_id`.
    ///
    /// This is the only write path: first labels and relabels both go
    /// through here. A replaced row keeps its `id` and `created_at`; every
    /// other column is overwritten.
    pub async fn save(
        pool: &SqlitePool,
        draft: &ClassificationDraft,
    ) -> Result<Classification, sqlx::Error> {
        let query = format!(
            "INSERT INTO classifications
                (image_id, label, user_id, uploaded_at, timestamp, language, predictions,
                 created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
             ON CONFLICT (image_id) DO UPDATE SET
                label = excluded.label,
                user_id = excluded.user_id,
                uploaded_at = excluded.uploaded_at,
                timestamp = excluded.timestamp,
                language = excluded.language,
                predictions = excluded.predictions,
                updated_at = excluded.updated_at
             RETURNING {COLUMNS}"
        );
        let saved = sqlx::query_as::<_, Classification>(&query)
            .bind(&draft.image_id)
            .bind(draft.label.as_str())
            .bind(&draft.user_id)
            .bind(&draft.uploaded_at)
            .bind(&draft.timestamp)
            .bind(&draft.language)
            .bind(Json(&draft.predictions))
            .bind(Utc::now())
            .fetch_one(pool)
            .await?;

        tracing::debug!(image_id = %saved.image_id, label = %saved.label, "Classification saved");
        Ok(saved)
    }

    /// Count Good and Bad classifications. Always read fresh.
    pub async fn counts(pool: &SqlitePool) -> Result<ClassificationCounts, sqlx::Error> {
        let (good, bad): (i64, i64) = sqlx::query_as(
            "SELECT
                COALESCE(SUM(CASE WHEN label = ?1 THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN label = ?2 THEN 1 ELSE 0 END), 0)
             FROM classifications",
        )
        .bind(Label::Good.as_str())
        .bind(Label::Bad.as_str())
        .fetch_one(pool)
        .await?;

        Ok(ClassificationCounts { good, bad })
    }

    /// Image identifiers currently classified with `label`, oldest first.
    ///
    /// Rows with a blank identifier are skipped.
    pub async fn list_image_ids_by_label(
        pool: &SqlitePool,
        label: Label,
    ) -> Result<Vec<String>, sqlx::Error> {
        let ids: Vec<(String,)> = sqlx::query_as(
            "SELECT image_id FROM classifications
             WHERE label = ?1
             ORDER BY id",
        )
        .bind(label.as_str())
        .fetch_all(pool)
        .await?;

        Ok(ids
            .into_iter()
            .map(|(id,)| id)
            .filter(|id| !id.trim().is_empty())
            .collect())
    }
}
