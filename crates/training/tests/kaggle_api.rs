//! Kaggle client against a local stand-in for the kernels API.

use std::sync::{Arc, Mutex};

use assert_matches::assert_matches;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use hive_training::{wait_for_completion, KaggleApi, KernelPush, PollConfig, TrainingError};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

#[derive(Clone, Default)]
struct Recorded {
    pushes: Arc<Mutex<Vec<Value>>>,
    auth: Arc<Mutex<Option<String>>>,
    status_queries: Arc<Mutex<Vec<(String, String)>>>,
}

async fn push(
    State(rec): State<Recorded>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    *rec.auth.lock().unwrap() = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let rejected = body["newTitle"] == "reject me";
    rec.pushes.lock().unwrap().push(body);

    if rejected {
        (StatusCode::OK, Json(json!({"error": "Notebook title is taken"})))
    } else {
        (
            StatusCode::OK,
            Json(json!({"ref": "/code/me/hive", "url": "https://kaggle.test/me/hive", "versionNumber": 3})),
        )
    }
}

async fn status(
    State(rec): State<Recorded>,
    Query(params): Query<std::collections::HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    let user = params.get("userName").cloned().unwrap_or_default();
    let slug = params.get("kernelSlug").cloned().unwrap_or_default();
    rec.status_queries.lock().unwrap().push((user, slug.clone()));

    match slug.as_str() {
        "missing" => (StatusCode::NOT_FOUND, Json(json!({"message": "Not found"}))),
        _ => (StatusCode::OK, Json(json!({"status": "complete", "failureMessage": ""}))),
    }
}

async fn spawn_stub() -> (String, Recorded) {
    let recorded = Recorded::default();
    let app = Router::new()
        .route("/api/v1/kernels/push", post(push))
        .route("/api/v1/kernels/status", get(status))
        .with_state(recorded.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/api/v1"), recorded)
}

#[tokio::test]
async fn push_sends_script_with_basic_auth() {
    let (base, rec) = spawn_stub().await;
    let api = KaggleApi::new(base, "me", "secret");

    let push = KernelPush::script(api.kernel_ref("hive"), "Hive".into(), "print(3)".into());
    let response = api.push_kernel(&push).await.unwrap();
    assert_eq!(response.version_number, Some(3));

    let pushes = rec.pushes.lock().unwrap();
    assert_eq!(pushes[0]["slug"], "me/hive");
    assert_eq!(pushes[0]["text"], "print(3)");
    // base64("me:secret")
    assert_eq!(rec.auth.lock().unwrap().as_deref(), Some("Basic bWU6c2VjcmV0"));
}

#[tokio::test]
async fn push_error_payload_is_an_error() {
    let (base, _rec) = spawn_stub().await;
    let api = KaggleApi::new(base, "me", "secret");

    let push = KernelPush::script("me/hive".into(), "reject me".into(), "x".into());
    assert_matches!(
        api.push_kernel(&push).await,
        Err(TrainingError::ApiError { body, .. }) if body == "Notebook title is taken"
    );
}

#[tokio::test]
async fn status_splits_kernel_ref() {
    let (base, rec) = spawn_stub().await;
    let api = KaggleApi::new(base, "me", "secret");

    let status = api.kernel_status("other/hive").await.unwrap();
    assert!(status.is_complete());
    api.kernel_status("hive").await.unwrap();

    let queries = rec.status_queries.lock().unwrap();
    assert_eq!(queries[0], ("other".to_string(), "hive".to_string()));
    assert_eq!(queries[1], ("me".to_string(), "hive".to_string()));
}

#[tokio::test]
async fn non_success_status_carries_body() {
    let (base, _rec) = spawn_stub().await;
    let api = KaggleApi::new(base, "me", "secret");

    assert_matches!(
        api.kernel_status("me/missing").await,
        Err(TrainingError::ApiError { status: 404, .. })
    );
}

#[tokio::test]
async fn wait_returns_terminal_status_from_api() {
    let (base, _rec) = spawn_stub().await;
    let api = KaggleApi::new(base, "me", "secret");

    let status = wait_for_completion(&api, "me/hive", &PollConfig::default(), &CancellationToken::new())
        .await
        .unwrap();
    assert!(status.is_complete());
}
