//! In-process object store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{ObjectStore, StorageError};

/// Object store holding blobs in a sorted map.
///
/// Keys are listed in lexicographic order, matching what S3 returns.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `objects`.
    pub fn with_objects<I, K>(objects: I) -> Self
    where
        I: IntoIterator<Item = (K, Vec<u8>)>,
        K: Into<String>,
    {
        Self {
            objects: RwLock::new(
                objects
                    .into_iter()
                    .map(|(key, bytes)| (key.into(), bytes))
                    .collect(),
            ),
        }
    }

    /// Insert or replace an object.
    pub async fn put(&self, key: impl Into<String>, bytes: Vec<u8>) {
        self.objects.write().await.insert(key.into(), bytes);
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn list_keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.objects.read().await.keys().cloned().collect())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        self.objects
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }
}
