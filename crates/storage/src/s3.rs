//! S3-backed object store.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::Client;

use crate::{ObjectStore, StorageError};

/// Provider name reported for statically configured credentials.
const CREDENTIALS_PROVIDER: &str = "hive-static";

/// Connection settings for the image bucket.
#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    /// Static access key. When either half is missing the default AWS
    /// credential chain is used instead.
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    /// Custom endpoint for S3-compatible stores. Enables path-style access.
    pub endpoint: Option<String>,
}

/// [`ObjectStore`] over a single S3 bucket.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    /// Build the SDK client once; it is cheap to clone afterwards.
    pub async fn connect(config: &S3Config) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));

        if let (Some(access_key), Some(secret_key)) = (&config.access_key, &config.secret_key) {
            loader = loader.credentials_provider(Credentials::new(
                access_key,
                secret_key,
                None,
                None,
                CREDENTIALS_PROVIDER,
            ));
        }
        if let Some(endpoint) = &config.endpoint {
            loader = loader.endpoint_url(endpoint);
        }

        let sdk_config = loader.load().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.endpoint.is_some())
            .build();

        tracing::info!(
            bucket = %config.bucket,
            region = %config.region,
            custom_endpoint = config.endpoint.is_some(),
            "S3 object store configured",
        );

        Self {
            client: Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn list_keys(&self) -> Result<Vec<String>, StorageError> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| StorageError::Backend {
                operation: "list",
                message: DisplayErrorContext(&e).to_string(),
            })?;

        if output.is_truncated().unwrap_or(false) {
            tracing::warn!(bucket = %self.bucket, "Object listing truncated to first page");
        }

        Ok(output
            .contents()
            .iter()
            .filter_map(|object| object.key().map(str::to_string))
            .collect())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    StorageError::NotFound(key.to_string())
                } else {
                    StorageError::Backend {
                        operation: "get",
                        message: DisplayErrorContext(&e).to_string(),
                    }
                }
            })?;

        let body = output
            .body
            .collect()
            .await
            .map_err(|e| StorageError::Backend {
                operation: "read",
                message: e.to_string(),
            })?;
        Ok(body.into_bytes().to_vec())
    }
}
