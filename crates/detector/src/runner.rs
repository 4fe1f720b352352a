//! Detector subprocess execution.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use hive_core::detection::{self, Prediction};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

use crate::DetectorError;

/// Maximum stdout or stderr size captured per stream (4 MiB).
const MAX_OUTPUT_BYTES: u64 = 4 * 1024 * 1024;

/// How to invoke the detector.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Interpreter or binary to run.
    pub program: String,
    /// Script passed as the first argument to `program`.
    pub script: PathBuf,
    /// Model weights file.
    pub weights: PathBuf,
    /// Minimum confidence threshold, `0.0..=1.0`.
    pub confidence: f64,
    /// Wall-clock limit for one detection run.
    pub timeout: Duration,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            program: "python3".to_string(),
            script: PathBuf::from("yolov7/detect1.py"),
            weights: PathBuf::from("yolov7/best_v4.pt"),
            confidence: 0.1,
            timeout: Duration::from_secs(300),
        }
    }
}

/// Runs the configured detector against image files.
#[derive(Debug, Clone)]
pub struct Detector {
    config: DetectorConfig,
}

impl Detector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Run detection on one image and return its predictions.
    ///
    /// Both the weights file and the image must exist before the process is
    /// started. A detector that exits non-zero or overruns the timeout is an
    /// error; a detector that succeeds but prints nothing recognisable
    /// yields an empty list.
    pub async fn detect(&self, image_path: &Path) -> Result<Vec<Prediction>, DetectorError> {
        ensure_exists("model weights", &self.config.weights).await?;
        ensure_exists("image", image_path).await?;

        let mut cmd = Command::new(&self.config.program);
        cmd.arg(&self.config.script)
            .arg("--weights")
            .arg(&self.config.weights)
            .arg("--conf")
            .arg(self.config.confidence.to_string())
            .arg("--source")
            .arg(image_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let start = Instant::now();
        let mut child = cmd.spawn().map_err(DetectorError::Spawn)?;

        let stdout_handle = child.stdout.take();
        let stderr_handle = child.stderr.take();
        let stdout_task = tokio::spawn(async move { read_stream(stdout_handle).await });
        let stderr_task = tokio::spawn(async move { read_stream(stderr_handle).await });

        // On timeout `child` is dropped and killed.
        let status = match tokio::time::timeout(self.config.timeout, child.wait()).await {
            Ok(result) => result.map_err(DetectorError::Io)?,
            Err(_) => {
                let elapsed_ms = start.elapsed().as_millis() as u64;
                tracing::warn!(image = %image_path.display(), elapsed_ms, "Detector timed out");
                return Err(DetectorError::Timeout { elapsed_ms });
            }
        };

        let stdout_bytes = stdout_task.await.unwrap_or_default();
        let stderr_bytes = stderr_task.await.unwrap_or_default();
        let stdout = String::from_utf8_lossy(&stdout_bytes);
        let duration_ms = start.elapsed().as_millis() as u64;

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes).trim().to_string();
            let code = status.code().unwrap_or(-1);
            tracing::warn!(image = %image_path.display(), code, duration_ms, "Detector failed");
            return Err(DetectorError::Failed { code, stderr });
        }

        let predictions = match detection::parse_structured(&stdout) {
            Some(predictions) => predictions,
            None => {
                tracing::debug!(image = %image_path.display(), "No JSON output, reading legacy log");
                detection::parse_legacy_log(&stdout)
            }
        };

        tracing::info!(
            image = %image_path.display(),
            predictions = predictions.len(),
            duration_ms,
            "Detection complete",
        );
        Ok(predictions)
    }
}

async fn ensure_exists(what: &'static str, path: &Path) -> Result<(), DetectorError> {
    if tokio::fs::try_exists(path).await? {
        Ok(())
    } else {
        Err(DetectorError::MissingInput {
            what,
            path: path.to_path_buf(),
        })
    }
}

/// Read an entire output stream, capped at [`MAX_OUTPUT_BYTES`].
async fn read_stream<R: AsyncRead + Unpin>(handle: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut h) = handle {
        let _ = (&mut h).take(MAX_OUTPUT_BYTES).read_to_end(&mut buf).await;
    }
    buf
}
