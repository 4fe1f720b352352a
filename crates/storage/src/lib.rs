//! Object storage for uploaded hive images.
//!
//! [`ObjectStore`] is the seam between the service and the blob store. The
//! production implementation talks to S3 (or any S3-compatible endpoint);
//! [`MemoryObjectStore`] backs tests and local runs without a bucket.

pub mod catalog;
pub mod error;
pub mod memory;
pub mod s3;

use async_trait::async_trait;

pub use catalog::ImageCatalog;
pub use error::StorageError;
pub use memory::MemoryObjectStore;
pub use s3::{S3Config, S3ObjectStore};

/// Read access to a flat key/blob namespace.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Keys in the store, in listing order.
    ///
    /// Only the first page of the listing is returned; large buckets are
    /// truncated.
    async fn list_keys(&self) -> Result<Vec<String>, StorageError>;

    /// Full contents of the object at `key`.
    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError>;
}
