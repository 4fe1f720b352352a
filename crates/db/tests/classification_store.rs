//! Integration tests for the classification store. Most run against an
//! in-memory SQLite database; the concurrency test uses a file on disk.

use hive_core::classification::{ClassificationDraft, Label};
use hive_core::detection::{DetectionMetadata, Prediction};
use hive_db::repositories::ClassificationRepo;
use hive_db::{create_memory_pool, create_pool, run_migrations, DbPool};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn metadata() -> DetectionMetadata {
    DetectionMetadata {
        user_id: Some("u1".into()),
        uploaded_at: Some("2024-01-15T10:30:00Z".into()),
        timestamp: Some("20240115103000".into()),
        language: Some("en".into()),
        predictions: vec![Prediction::new("Queen", 93.4)],
    }
}

async fn rows_for(pool: &DbPool, image_id: &str) -> i64 {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM classifications WHERE image_id = ?1")
            .bind(image_id)
            .fetch_one(pool)
            .await
            .unwrap();
    count
}

async fn save(pool: &DbPool, image_id: &str, label: Label) {
    let meta = metadata();
    ClassificationRepo::save(pool, &ClassificationDraft::new(image_id, label, Some(&meta)))
        .await
        .unwrap();
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unlabeled_image_is_absent() {
    let pool = create_memory_pool().await.unwrap();
    let found = ClassificationRepo::find_by_image_id(&pool, "u1/images/20240115103000.jpg")
        .await
        .unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn save_then_get_returns_label_and_single_row() {
    let pool = create_memory_pool().await.unwrap();
    let id = "u1/images/20240115103000.jpg";

    save(&pool, id, Label::Good).await;

    let found = ClassificationRepo::find_by_image_id(&pool, id)
        .await
        .unwrap()
        .expect("classification should exist");
    assert_eq!(found.label, Label::Good);
    assert_eq!(found.user_id, "u1");
    assert_eq!(found.predictions.0, vec![Prediction::new("Queen", 93.4)]);
    assert_eq!(rows_for(&pool, id).await, 1);
}

#[tokio::test]
async fn relabel_replaces_existing_row() {
    let pool = create_memory_pool().await.unwrap();
    let id = "u1/images/20240115103000.jpg";

    save(&pool, id, Label::Good).await;
    let first = ClassificationRepo::find_by_image_id(&pool, id).await.unwrap().unwrap();
    save(&pool, id, Label::Bad).await;

    let found = ClassificationRepo::find_by_image_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(found.label, Label::Bad);
    assert_eq!(found.id, first.id);
    assert_eq!(found.created_at, first.created_at);
    assert_eq!(rows_for(&pool, id).await, 1);
}

#[tokio::test]
async fn save_without_metadata_stores_sentinel() {
    let pool = create_memory_pool().await.unwrap();
    let id = "u9/images/20240201000000.png";

    let saved = ClassificationRepo::save(&pool, &ClassificationDraft::new(id, Label::Bad, None))
        .await
        .unwrap();

    assert_eq!(saved.user_id, "N/A");
    assert_eq!(saved.uploaded_at, "N/A");
    assert_eq!(saved.timestamp, "N/A");
    assert_eq!(saved.language, "N/A");
    assert!(saved.predictions.0.is_empty());
}

#[tokio::test]
async fn counts_reflect_distinct_images() {
    let pool = create_memory_pool().await.unwrap();
    for i in 0..3 {
        save(&pool, &format!("u1/images/2024011510300{i}.jpg"), Label::Good).await;
    }
    for i in 0..2 {
        save(&pool, &format!("u2/images/2024011609000{i}.jpg"), Label::Bad).await;
    }

    let counts = ClassificationRepo::counts(&pool).await.unwrap();
    assert_eq!((counts.good, counts.bad), (3, 2));
}

#[tokio::test]
async fn counts_on_empty_store_are_zero() {
    let pool = create_memory_pool().await.unwrap();
    let counts = ClassificationRepo::counts(&pool).await.unwrap();
    assert_eq!((counts.good, counts.bad), (0, 0));
}

#[tokio::test]
async fn counts_follow_relabels() {
    let pool = create_memory_pool().await.unwrap();
    let id = "u1/images/20240115103000.jpg";
    save(&pool, id, Label::Good).await;
    save(&pool, id, Label::Bad).await;

    let counts = ClassificationRepo::counts(&pool).await.unwrap();
    assert_eq!((counts.good, counts.bad), (0, 1));
}

#[tokio::test]
async fn list_by_label_skips_blank_identifiers() {
    let pool = create_memory_pool().await.unwrap();
    save(&pool, "u1/images/a.png", Label::Bad).await;
    save(&pool, "", Label::Bad).await;
    save(&pool, "u1/images/b.png", Label::Good).await;
    save(&pool, "u2/images/c.png", Label::Bad).await;

    let bad = ClassificationRepo::list_image_ids_by_label(&pool, Label::Bad)
        .await
        .unwrap();
    assert_eq!(bad, vec!["u1/images/a.png", "u2/images/c.png"]);

    let good = ClassificationRepo::list_image_ids_by_label(&pool, Label::Good)
        .await
        .unwrap();
    assert_eq!(good, vec!["u1/images/b.png"]);
}

/// File-backed pool with several connections, so writers really race.
async fn shared_file_pool() -> (TempDir, DbPool) {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("hive.db").display());
    let pool = create_pool(&url).await.unwrap();
    run_migrations(&pool).await.unwrap();
    (dir, pool)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_saves_leave_one_row() {
    let (_dir, pool) = shared_file_pool().await;
    let id = "u1/images/20240115103000.jpg";

    let mut handles = Vec::new();
    for n in 0..32 {
        let pool = pool.clone();
        let label = if n % 2 == 0 { Label::Good } else { Label::Bad };
        handles.push(tokio::spawn(async move {
            ClassificationRepo::save(&pool, &ClassificationDraft::new(id, label, None))
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(rows_for(&pool, id).await, 1);
    let saved = ClassificationRepo::find_by_image_id(&pool, id)
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(saved.label, Label::Good | Label::Bad));
}
