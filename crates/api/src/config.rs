use std::path::PathBuf;
use std::time::Duration;

use hive_core::catalog::DEFAULT_RESERVED_PREFIX;
use hive_detector::DetectorConfig;
use hive_storage::S3Config;
use hive_training::api::DEFAULT_BASE_URL;
use hive_training::PollConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development. In production,
/// override via environment variables (a `.env` file is honoured).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`). Detection and export
    /// get [`ServerConfig::long_request_timeout`] instead.
    pub request_timeout_secs: u64,
    /// SQLite database URL.
    pub database_url: String,
    /// Image bucket. `None` runs against an empty in-memory store.
    pub s3: Option<S3Config>,
    /// Keys starting with this prefix are hidden from the catalog.
    pub reserved_key_prefix: String,
    pub detector: DetectorConfig,
    /// Where detect uploads are staged.
    pub uploads_dir: PathBuf,
    /// Where staged uploads are sorted into `correct/` and `incorrect/`.
    pub sorted_dir: PathBuf,
    pub training: TrainingConfig,
}

/// Settings for the Kaggle training trigger.
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    pub kaggle_base_url: String,
    /// Kaggle account. Training endpoints are disabled when unset.
    pub kaggle_username: Option<String>,
    pub kaggle_key: Option<String>,
    /// Script template containing the dataset version placeholder.
    pub template_path: PathBuf,
    /// Working directory for extracted datasets.
    pub dataset_dir: PathBuf,
    pub poll: PollConfig,
    pub enable_gpu: bool,
    pub public: bool,
}

impl TrainingConfig {
    /// Credentials, when both halves are configured.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        Some((self.kaggle_username.as_deref()?, self.kaggle_key.as_deref()?))
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Timeout for requests that run the detector or build an export: the
    /// detector's own timeout plus the ordinary request allowance, so a
    /// detector run always ends on its own deadline first.
    pub fn long_request_timeout(&self) -> Duration {
        self.detector.timeout + self.request_timeout()
    }

    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                         |
    /// |---------------------------|---------------------------------|
    /// | `HOST`                    | `0.0.0.0`                       |
    /// | `PORT`                    | `3000`                          |
    /// | `CORS_ORIGINS`            | `http://localhost:5173`         |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                            |
    /// | `DATABASE_URL`            | `sqlite://hive.db`              |
    /// | `S3_BUCKET`               | unset (in-memory store)         |
    /// | `S3_REGION`               | `us-east-1`                     |
    /// | `S3_ACCESS_KEY`           | unset (default AWS chain)       |
    /// | `S3_SECRET_KEY`           | unset (default AWS chain)       |
    /// | `S3_ENDPOINT`             | unset                           |
    /// | `RESERVED_KEY_PREFIX`     | `qu13edjkbs`                    |
    /// | `DETECTOR_PROGRAM`        | `python3`                       |
    /// | `DETECTOR_SCRIPT`         | `yolov7/detect1.py`             |
    /// | `DETECTOR_WEIGHTS`        | `yolov7/best_v4.pt`             |
    /// | `DETECTOR_CONFIDENCE`     | `0.1`                           |
    /// | `DETECTOR_TIMEOUT_SECS`   | `300`                           |
    /// | `UPLOADS_DIR`             | `yolov7/uploads`                |
    /// | `SORTED_DIR`              | `sorted`                        |
    /// | `KAGGLE_BASE_URL`         | `https://www.kaggle.com/api/v1` |
    /// | `KAGGLE_USERNAME`         | unset                           |
    /// | `KAGGLE_KEY`              | unset                           |
    /// | `TRAINING_TEMPLATE_PATH`  | `kaggle_notebook.py`            |
    /// | `TRAINING_DATASET_DIR`    | `extracted_data`                |
    /// | `TRAINING_POLL_SECS`      | `60`                            |
    /// | `TRAINING_MAX_WAIT_SECS`  | unset (wait indefinitely)       |
    /// | `TRAINING_ENABLE_GPU`     | `true`                          |
    /// | `TRAINING_PUBLIC`         | `false`                         |
    pub fn from_env() -> Self {
        let host = env_or("HOST", "0.0.0.0");
        let port: u16 = env_or("PORT", "3000")
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = env_or("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", "30")
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let s3 = env_opt("S3_BUCKET").map(|bucket| S3Config {
            bucket,
            region: env_or("S3_REGION", "us-east-1"),
            access_key: env_opt("S3_ACCESS_KEY"),
            secret_key: env_opt("S3_SECRET_KEY"),
            endpoint: env_opt("S3_ENDPOINT"),
        });

        let detector_defaults = DetectorConfig::default();
        let detector = DetectorConfig {
            program: env_opt("DETECTOR_PROGRAM").unwrap_or(detector_defaults.program),
            script: env_opt("DETECTOR_SCRIPT")
                .map(PathBuf::from)
                .unwrap_or(detector_defaults.script),
            weights: env_opt("DETECTOR_WEIGHTS")
                .map(PathBuf::from)
                .unwrap_or(detector_defaults.weights),
            confidence: env_or("DETECTOR_CONFIDENCE", "0.1")
                .parse()
                .expect("DETECTOR_CONFIDENCE must be a number"),
            timeout: Duration::from_secs(
                env_or("DETECTOR_TIMEOUT_SECS", "300")
                    .parse()
                    .expect("DETECTOR_TIMEOUT_SECS must be a valid u64"),
            ),
        };

        let training = TrainingConfig {
            kaggle_base_url: env_or("KAGGLE_BASE_URL", DEFAULT_BASE_URL),
            kaggle_username: env_opt("KAGGLE_USERNAME"),
            kaggle_key: env_opt("KAGGLE_KEY"),
            template_path: env_or("TRAINING_TEMPLATE_PATH", "kaggle_notebook.py").into(),
            dataset_dir: env_or("TRAINING_DATASET_DIR", "extracted_data").into(),
            poll: PollConfig {
                interval: Duration::from_secs(
                    env_or("TRAINING_POLL_SECS", "60")
                        .parse()
                        .expect("TRAINING_POLL_SECS must be a valid u64"),
                ),
                max_wait: env_opt("TRAINING_MAX_WAIT_SECS").map(|v| {
                    Duration::from_secs(
                        v.parse()
                            .expect("TRAINING_MAX_WAIT_SECS must be a valid u64"),
                    )
                }),
            },
            enable_gpu: env_flag("TRAINING_ENABLE_GPU", true),
            public: env_flag("TRAINING_PUBLIC", false),
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            database_url: env_or("DATABASE_URL", "sqlite://hive.db"),
            s3,
            reserved_key_prefix: env_or("RESERVED_KEY_PREFIX", DEFAULT_RESERVED_PREFIX),
            detector,
            uploads_dir: env_or("UPLOADS_DIR", "yolov7/uploads").into(),
            sorted_dir: env_or("SORTED_DIR", "sorted").into(),
            training,
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

/// Read a variable, treating empty values as unset.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_flag(key: &str, default: bool) -> bool {
    match env_opt(key) {
        Some(v) => matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"),
        None => default,
    }
}
