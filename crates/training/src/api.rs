//! REST client for the Kaggle kernels API.

use serde::{Deserialize, Serialize};

use crate::poll::StatusSource;
use crate::TrainingError;

/// Default Kaggle API root.
pub const DEFAULT_BASE_URL: &str = "https://www.kaggle.com/api/v1";

/// HTTP client for one Kaggle account.
#[derive(Debug, Clone)]
pub struct KaggleApi {
    client: reqwest::Client,
    base_url: String,
    username: String,
    key: String,
}

/// Body of `POST /kernels/push`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KernelPush {
    /// `<username>/<kernel-slug>`.
    pub slug: String,
    pub new_title: String,
    /// Full script source.
    pub text: String,
    pub language: &'static str,
    pub kernel_type: &'static str,
    pub is_private: bool,
    pub enable_gpu: bool,
    pub enable_internet: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dataset_data_sources: Vec<String>,
}

impl KernelPush {
    /// A Python script kernel with internet access.
    pub fn script(slug: String, title: String, text: String) -> Self {
        Self {
            slug,
            new_title: title,
            text,
            language: "python",
            kernel_type: "script",
            is_private: true,
            enable_gpu: false,
            enable_internet: true,
            dataset_data_sources: Vec::new(),
        }
    }
}

/// Response to a kernel push.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PushResponse {
    #[serde(rename = "ref")]
    pub reference: Option<String>,
    pub url: Option<String>,
    pub version_number: Option<u32>,
    pub error: Option<String>,
}

/// Response of `GET /kernels/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KernelStatus {
    pub status: String,
    #[serde(default)]
    pub failure_message: Option<String>,
}

impl KernelStatus {
    pub fn is_complete(&self) -> bool {
        self.status.eq_ignore_ascii_case("complete")
    }

    pub fn is_error(&self) -> bool {
        self.status.eq_ignore_ascii_case("error")
    }

    /// Whether the kernel has stopped running.
    pub fn is_terminal(&self) -> bool {
        self.is_complete() || self.is_error()
    }
}

impl KaggleApi {
    /// * `base_url` - API root, e.g. [`DEFAULT_BASE_URL`].
    pub fn new(base_url: impl Into<String>, username: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            username: username.into(),
            key: key.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Full `<username>/<kernel>` reference for a kernel of this account.
    pub fn kernel_ref(&self, kernel_slug: &str) -> String {
        format!("{}/{kernel_slug}", self.username)
    }

    /// Create or update a kernel and queue a new run of it.
    pub async fn push_kernel(&self, push: &KernelPush) -> Result<PushResponse, TrainingError> {
        let response = self
            .client
            .post(format!("{}/kernels/push", self.base_url))
            .basic_auth(&self.username, Some(&self.key))
            .json(push)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body: PushResponse = Self::parse_response(response).await?;
        // Kaggle reports some rejections with a 200 and an `error` field.
        if let Some(error) = body.error.as_deref().filter(|e| !e.is_empty()) {
            return Err(TrainingError::ApiError {
                status,
                body: error.to_string(),
            });
        }

        tracing::info!(
            slug = %push.slug,
            version = body.version_number,
            url = body.url.as_deref().unwrap_or_default(),
            "Pushed Kaggle kernel",
        );
        Ok(body)
    }

    /// Current run status of a kernel.
    ///
    /// `kernel_ref` is `<username>/<kernel-slug>`; a bare slug is taken to
    /// belong to this account.
    pub async fn kernel_status(&self, kernel_ref: &str) -> Result<KernelStatus, TrainingError> {
        let (user, slug) = kernel_ref
            .split_once('/')
            .unwrap_or((self.username.as_str(), kernel_ref));

        let response = self
            .client
            .get(format!("{}/kernels/status", self.base_url))
            .basic_auth(&self.username, Some(&self.key))
            .query(&[("userName", user), ("kernelSlug", slug)])
            .send()
            .await?;

        Self::parse_response(response).await
    }

    // ---- private helpers ----

    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, TrainingError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(TrainingError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, TrainingError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait::async_trait]
impl StatusSource for KaggleApi {
    async fn status(&self, kernel_ref: &str) -> Result<KernelStatus, TrainingError> {
        self.kernel_status(kernel_ref).await
    }
}
