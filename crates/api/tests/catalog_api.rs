//! Integration tests for catalog browsing.

mod common;

use axum::http::StatusCode;
use common::{body_bytes, body_json, get, put_json, TestContext, JPEG, PNG};
use serde_json::json;

async fn seeded() -> TestContext {
    let ctx = TestContext::new().await;
    ctx.put_object("u1/images/20240115103000.jpg", JPEG).await;
    ctx.put_object("u1/images/20240115110000.png", PNG).await;
    ctx.put_object("u2/images/20240116090000.jpg", JPEG).await;
    ctx.put_object("u2/images/20240116090000.txt", b"notes").await;
    ctx.put_object("qu13edjkbs/images/20240117000000.png", PNG).await;
    ctx.put_object("weird_file.png", PNG).await;
    ctx
}

#[tokio::test]
async fn dates_exclude_reserved_and_malformed_keys() {
    let ctx = seeded().await;
    let response = get(ctx.app(), "/api/v1/catalog/dates").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"], json!(["2024-01-15", "2024-01-16"]));
}

#[tokio::test]
async fn dates_empty_bucket() {
    let ctx = TestContext::new().await;
    let json = body_json(get(ctx.app(), "/api/v1/catalog/dates").await).await;
    assert_eq!(json["data"], json!([]));
}

#[tokio::test]
async fn image_page_walks_a_date() {
    let ctx = seeded().await;

    let first = body_json(get(ctx.app(), "/api/v1/catalog/images?date=2024-01-15").await).await;
    assert_eq!(first["data"]["index"], 0);
    assert_eq!(first["data"]["total"], 2);
    assert_eq!(first["data"]["has_previous"], false);
    assert_eq!(first["data"]["has_next"], true);
    assert_eq!(first["data"]["image_id"], "u1/images/20240115103000.jpg");
    assert!(first["data"]["classification"].is_null());
    assert!(first["data"]["detection"].is_null());

    let second =
        body_json(get(ctx.app(), "/api/v1/catalog/images?date=2024-01-15&index=1").await).await;
    assert_eq!(second["data"]["image_id"], "u1/images/20240115110000.png");
    assert_eq!(second["data"]["has_next"], false);
    assert_eq!(second["data"]["has_previous"], true);
}

#[tokio::test]
async fn image_page_clamps_index() {
    let ctx = seeded().await;
    let json =
        body_json(get(ctx.app(), "/api/v1/catalog/images?date=2024-01-16&index=99").await).await;
    assert_eq!(json["data"]["index"], 0);
    assert_eq!(json["data"]["total"], 1);
    assert_eq!(json["data"]["image_id"], "u2/images/20240116090000.jpg");
}

#[tokio::test]
async fn image_page_for_empty_date() {
    let ctx = seeded().await;
    let json = body_json(get(ctx.app(), "/api/v1/catalog/images?date=2023-05-01").await).await;
    assert_eq!(json["data"]["total"], 0);
    assert!(json["data"]["image_id"].is_null());
}

#[tokio::test]
async fn image_page_includes_current_label() {
    let ctx = seeded().await;
    put_json(
        ctx.app(),
        "/api/v1/classifications",
        json!({"image_id": "u2/images/20240116090000.jpg", "label": "Bad"}),
    )
    .await;

    let json = body_json(get(ctx.app(), "/api/v1/catalog/images?date=2024-01-16").await).await;
    assert_eq!(json["data"]["classification"]["label"], "Bad");
}

#[tokio::test]
async fn malformed_date_is_rejected() {
    let ctx = seeded().await;
    let response = get(ctx.app(), "/api/v1/catalog/images?date=20240115").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn object_returns_image_bytes() {
    let ctx = seeded().await;
    let response = get(ctx.app(), "/api/v1/catalog/object?key=u1/images/20240115110000.png").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "image/png");
    assert_eq!(body_bytes(response).await.as_ref(), PNG);
}

#[tokio::test]
async fn missing_object_is_404() {
    let ctx = seeded().await;
    let response = get(ctx.app(), "/api/v1/catalog/object?key=u9/none.png").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}
