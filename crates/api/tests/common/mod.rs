#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tower::ServiceExt;

use hive_api::config::{ServerConfig, TrainingConfig};
use hive_api::router::build_app_router;
use hive_api::state::AppState;
use hive_db::DbPool;
use hive_detector::{Detector, DetectorConfig, UploadStaging};
use hive_storage::{ImageCatalog, MemoryObjectStore};
use hive_training::{KaggleApi, PollConfig};

/// Minimal valid-looking image payloads (magic bytes only).
pub const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
pub const JPEG: &[u8] = b"\xFF\xD8\xFF\xE0\0\x10JFIF\0";

/// Detector stand-in printing a fixed JSON prediction list.
const DETECT_SCRIPT: &str =
    "echo 'Fusing layers...'\necho '[{\"label\":\"Queen\",\"percentage\":91.5},{\"label\":\"Mite\",\"percentage\":12.0}]'\n";

const TRAINING_TEMPLATE: &str = "VERSION = \"VERSION_NUMBER_PLACEHOLDER\"\nprint(VERSION)\n";

/// Everything one test needs: a fresh database, an in-memory bucket and a
/// scratch directory for uploads, sorted files and datasets.
pub struct TestContext {
    pub pool: DbPool,
    pub store: Arc<MemoryObjectStore>,
    pub dir: TempDir,
    pub kaggle_base_url: Option<String>,
}

impl TestContext {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("detect.sh"), DETECT_SCRIPT).unwrap();
        std::fs::write(dir.path().join("weights.pt"), b"weights").unwrap();
        std::fs::write(dir.path().join("template.py"), TRAINING_TEMPLATE).unwrap();

        Self {
            pool: hive_db::create_memory_pool().await.unwrap(),
            store: Arc::new(MemoryObjectStore::new()),
            dir,
            kaggle_base_url: None,
        }
    }

    /// Point the training endpoints at a Kaggle stand-in.
    pub fn with_kaggle(mut self, base_url: String) -> Self {
        self.kaggle_base_url = Some(base_url);
        self
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Files currently waiting in the uploads directory.
    pub fn staged_uploads(&self) -> usize {
        std::fs::read_dir(self.path("uploads"))
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    pub async fn put_object(&self, key: &str, bytes: &[u8]) {
        self.store.put(key, bytes.to_vec()).await;
    }

    pub fn config(&self) -> ServerConfig {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["http://localhost:5173".to_string()],
            request_timeout_secs: 30,
            database_url: "sqlite::memory:".to_string(),
            s3: None,
            reserved_key_prefix: "qu13edjkbs".to_string(),
            detector: DetectorConfig {
                program: "sh".to_string(),
                script: self.path("detect.sh"),
                weights: self.path("weights.pt"),
                confidence: 0.1,
                timeout: Duration::from_secs(10),
            },
            uploads_dir: self.path("uploads"),
            sorted_dir: self.path("sorted"),
            training: TrainingConfig {
                kaggle_base_url: self.kaggle_base_url.clone().unwrap_or_default(),
                kaggle_username: self.kaggle_base_url.as_ref().map(|_| "beekeeper".to_string()),
                kaggle_key: self.kaggle_base_url.as_ref().map(|_| "secret".to_string()),
                template_path: self.path("template.py"),
                dataset_dir: self.path("datasets"),
                poll: PollConfig {
                    interval: Duration::from_millis(10),
                    max_wait: Some(Duration::from_secs(1)),
                },
                enable_gpu: true,
                public: false,
            },
        }
    }

    /// Build the full application router, mirroring `main.rs`.
    pub fn app(&self) -> Router {
        self.app_with(|_| {})
    }

    /// Like [`TestContext::app`], with the configuration adjusted first.
    pub fn app_with(&self, adjust: impl FnOnce(&mut ServerConfig)) -> Router {
        let mut config = self.config();
        adjust(&mut config);
        let kaggle = config.training.credentials().map(|(user, key)| {
            Arc::new(KaggleApi::new(
                config.training.kaggle_base_url.clone(),
                user,
                key,
            ))
        });

        let state = AppState {
            pool: self.pool.clone(),
            config: Arc::new(config.clone()),
            catalog: ImageCatalog::new(self.store.clone(), config.reserved_key_prefix.clone()),
            detector: Arc::new(Detector::new(config.detector.clone())),
            staging: Arc::new(UploadStaging::new(
                config.uploads_dir.clone(),
                config.sorted_dir.clone(),
            )),
            kaggle,
            background: TaskTracker::new(),
            shutdown: CancellationToken::new(),
        };

        build_app_router(state, &config)
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn send_json(app: Router, method: Method, uri: &str, body: Value) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send_json(app, Method::POST, uri, body).await
}

pub async fn put_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send_json(app, Method::PUT, uri, body).await
}

pub async fn post_bytes(
    app: Router,
    uri: &str,
    content_type: &str,
    bytes: Vec<u8>,
) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", content_type)
        .body(Body::from(bytes))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// A `multipart/form-data` body with one file part and any text parts.
pub fn multipart_body(
    file: Option<(&str, &[u8])>,
    fields: &[(&str, &str)],
) -> (String, Vec<u8>) {
    const BOUNDARY: &str = "hive-test-boundary";
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, data)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}

pub async fn body_bytes(response: Response<Body>) -> Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub fn assert_status(response: &Response<Body>, expected: StatusCode) {
    assert_eq!(response.status(), expected, "unexpected status");
}
