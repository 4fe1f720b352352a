//! On-disk staging of uploaded images.
//!
//! An upload is written to the uploads directory under a unique name. Once
//! the reviewer labels it, the file is moved into `<sorted>/correct` or
//! `<sorted>/incorrect`.

use std::path::{Path, PathBuf};

use hive_core::classification::Label;

use crate::DetectorError;

/// A file written to the uploads directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedUpload {
    /// Name of the staged file, used to refer to it later.
    pub id: String,
    /// Name the client uploaded the file under.
    pub original_name: String,
    pub path: PathBuf,
}

/// Uploads directory plus the destination for sorted files.
#[derive(Debug, Clone)]
pub struct UploadStaging {
    uploads_dir: PathBuf,
    sorted_dir: PathBuf,
}

impl UploadStaging {
    pub fn new(uploads_dir: impl Into<PathBuf>, sorted_dir: impl Into<PathBuf>) -> Self {
        Self {
            uploads_dir: uploads_dir.into(),
            sorted_dir: sorted_dir.into(),
        }
    }

    pub fn uploads_dir(&self) -> &Path {
        &self.uploads_dir
    }

    /// Write `bytes` under a fresh name derived from `original_name`.
    pub async fn stage(
        &self,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<StagedUpload, DetectorError> {
        let base = sanitize_name(original_name);
        let id = format!("{}_{base}", uuid::Uuid::now_v7().simple());

        tokio::fs::create_dir_all(&self.uploads_dir).await?;
        let path = self.uploads_dir.join(&id);
        tokio::fs::write(&path, bytes).await?;

        tracing::debug!(upload = %id, size = bytes.len(), "Staged upload");
        Ok(StagedUpload {
            id,
            original_name: original_name.to_string(),
            path,
        })
    }

    /// Path of a staged upload, refusing anything that is not a bare file
    /// name inside the uploads directory.
    pub fn staged_path(&self, id: &str) -> Result<PathBuf, DetectorError> {
        validate_name(id)?;
        Ok(self.uploads_dir.join(id))
    }

    /// Delete a staged upload that will never be sorted. A file that is
    /// already gone is not an error.
    pub async fn discard(&self, id: &str) -> Result<(), DetectorError> {
        let path = self.staged_path(id)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(upload = %id, "Discarded staged upload");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Move a staged upload into the folder for `label`.
    ///
    /// Returns the new location.
    pub async fn sort(&self, id: &str, label: Label) -> Result<PathBuf, DetectorError> {
        let source = self.staged_path(id)?;
        if !tokio::fs::try_exists(&source).await? {
            return Err(DetectorError::UploadNotFound(id.to_string()));
        }

        let target_dir = self.sorted_dir.join(label.sorted_folder());
        tokio::fs::create_dir_all(&target_dir).await?;
        let target = target_dir.join(id);

        if tokio::fs::rename(&source, &target).await.is_err() {
            // Rename fails across filesystems; fall back to copy + remove.
            tokio::fs::copy(&source, &target).await?;
            tokio::fs::remove_file(&source).await?;
        }

        tracing::info!(upload = %id, %label, target = %target.display(), "Sorted upload");
        Ok(target)
    }
}

/// Reduce a client-supplied name to a safe single path component.
fn sanitize_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

fn validate_name(id: &str) -> Result<(), DetectorError> {
    if id.is_empty() || id.starts_with('.') || id.contains(['/', '\\']) {
        return Err(DetectorError::InvalidUpload(id.to_string()));
    }
    Ok(())
}
