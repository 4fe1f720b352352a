//! Unpacking of uploaded training datasets.
//!
//! A dataset archive holds `train/`, `test/` and `valid/` folders of images
//! and YOLO label files. It is unpacked into a working directory before
//! being handed to the training run.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use crate::TrainingError;

/// Folders a complete dataset is expected to contain.
pub const EXPECTED_SPLITS: &[&str] = &["train", "test", "valid"];

/// Result of unpacking an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDataset {
    /// Extracted files, relative to the target directory, in archive order.
    pub files: Vec<PathBuf>,
    /// Entries of [`EXPECTED_SPLITS`] the archive did not contain.
    pub missing_splits: Vec<String>,
}

/// Extract a zip archive into `target`.
///
/// Entries whose path would land outside `target` (absolute paths or
/// `..` components) fail the whole extraction. Blocking; run it on a
/// blocking thread from async code.
pub fn extract_dataset(bytes: &[u8], target: &Path) -> Result<ExtractedDataset, TrainingError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| TrainingError::InvalidArchive(e.to_string()))?;

    std::fs::create_dir_all(target)?;
    let mut files = Vec::new();

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| TrainingError::InvalidArchive(e.to_string()))?;
        let relative = entry.enclosed_name().ok_or_else(|| {
            TrainingError::InvalidArchive(format!("entry '{}' escapes the target", entry.name()))
        })?;
        let out_path = target.join(&relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&out_path)?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Streamed: the size an entry declares is not trusted.
        let mut file = std::fs::File::create(&out_path)?;
        std::io::copy(&mut entry, &mut file)?;
        files.push(relative);
    }

    let missing_splits = EXPECTED_SPLITS
        .iter()
        .filter(|split| !files.iter().any(|f| f.starts_with(split)))
        .map(|split| split.to_string())
        .collect();

    tracing::info!(
        target = %target.display(),
        files = files.len(),
        "Extracted training dataset",
    );
    Ok(ExtractedDataset {
        files,
        missing_splits,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use assert_matches::assert_matches;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    use super::*;

    fn archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in entries {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn extracts_nested_files() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = archive(&[
            ("train/images/a.jpg", b"a"),
            ("train/labels/a.txt", b"0 0.5 0.5 0.1 0.1"),
            ("valid/images/b.jpg", b"b"),
            ("test/images/c.jpg", b"c"),
        ]);

        let extracted = extract_dataset(&bytes, dir.path()).unwrap();
        assert_eq!(extracted.files.len(), 4);
        assert!(extracted.missing_splits.is_empty());
        assert_eq!(std::fs::read(dir.path().join("valid/images/b.jpg")).unwrap(), b"b");
    }

    #[test]
    fn reports_missing_splits() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = archive(&[("train/images/a.jpg", b"a")]);

        let extracted = extract_dataset(&bytes, dir.path()).unwrap();
        assert_eq!(extracted.missing_splits, vec!["test", "valid"]);
    }

    /// Overwrite the uncompressed size recorded in the central directory.
    fn forge_declared_size(bytes: &mut [u8], size: u32) {
        let header = bytes
            .windows(4)
            .position(|w| w == b"PK\x01\x02")
            .expect("central directory header");
        bytes[header + 24..header + 28].copy_from_slice(&size.to_le_bytes());
    }

    #[test]
    fn declared_size_does_not_drive_allocation() {
        let dir = tempfile::tempdir().unwrap();
        let mut bytes = archive(&[("train/images/a.jpg", b"tiny")]);
        forge_declared_size(&mut bytes, 0xF000_0000);

        let extracted = extract_dataset(&bytes, dir.path()).unwrap();
        assert_eq!(extracted.files.len(), 1);
        assert_eq!(std::fs::read(dir.path().join("train/images/a.jpg")).unwrap(), b"tiny");
    }

    #[test]
    fn rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = archive(&[("../evil.txt", b"x")]);
        assert_matches!(
            extract_dataset(&bytes, &dir.path().join("data")),
            Err(TrainingError::InvalidArchive(_))
        );
        assert!(!dir.path().join("evil.txt").exists());
    }

    #[test]
    fn rejects_non_zip() {
        let dir = tempfile::tempdir().unwrap();
        assert_matches!(
            extract_dataset(b"not a zip", dir.path()),
            Err(TrainingError::InvalidArchive(_))
        );
    }
}
