//! Review classifications: one verdict per image.

use hive_core::classification::Label;
use hive_core::detection::Prediction;
use hive_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `classifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Classification {
    pub id: DbId,
    pub image_id: String,
    #[sqlx(try_from = "String")]
    pub label: Label,
    pub user_id: String,
    pub uploaded_at: String,
    pub timestamp: String,
    pub language: String,
    pub predictions: Json<Vec<Prediction>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Label totals across all classifications.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClassificationCounts {
    pub good: i64,
    pub bad: i64,
}
