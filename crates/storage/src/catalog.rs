//! Image catalog: which uploaded images exist and when they were taken.

use std::sync::Arc;

use chrono::NaiveDate;
use hive_core::catalog::{self, DEFAULT_RESERVED_PREFIX};

use crate::{ObjectStore, StorageError};

/// Read-only view of the image bucket.
///
/// Owns no state beyond its configuration; every call goes back to the
/// store, so newly uploaded images show up immediately.
#[derive(Clone)]
pub struct ImageCatalog {
    store: Arc<dyn ObjectStore>,
    reserved_prefix: String,
}

impl ImageCatalog {
    pub fn new(store: Arc<dyn ObjectStore>, reserved_prefix: impl Into<String>) -> Self {
        Self {
            store,
            reserved_prefix: reserved_prefix.into(),
        }
    }

    /// Catalog using [`DEFAULT_RESERVED_PREFIX`].
    pub fn with_default_prefix(store: Arc<dyn ObjectStore>) -> Self {
        Self::new(store, DEFAULT_RESERVED_PREFIX)
    }

    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    /// Image identifiers, excluding non-images and reserved keys.
    pub async fn list_identifiers(&self) -> Result<Vec<String>, StorageError> {
        let keys = self.store.list_keys().await?;
        let listed = keys.len();
        let images = catalog::filter_image_keys(keys, &self.reserved_prefix);
        tracing::debug!(listed, images = images.len(), "Listed catalog images");
        Ok(images)
    }

    /// Sorted, distinct capture dates of the current images.
    pub async fn available_dates(&self) -> Result<Vec<NaiveDate>, StorageError> {
        let identifiers = self.list_identifiers().await?;
        Ok(catalog::available_dates(&identifiers))
    }

    /// Current images whose identifier mentions `date`.
    pub async fn images_on(&self, date: NaiveDate) -> Result<Vec<String>, StorageError> {
        let identifiers = self.list_identifiers().await?;
        Ok(catalog::filter_by_date(&identifiers, date))
    }

    /// Raw bytes of one image.
    pub async fn fetch(&self, identifier: &str) -> Result<Vec<u8>, StorageError> {
        self.store.get(identifier).await
    }
}
