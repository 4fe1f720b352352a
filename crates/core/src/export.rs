//! Zip export of classified images.
//!
//! Images land under `good/` or `bad/` by label, with an optional
//! `image_details.csv` manifest listing every prediction of every exported
//! image. A failing image never aborts the export: it is left out and an
//! error line is written to `export_errors.txt` inside the archive.
//!
//! Entries are named after the key's file name. When two keys share a file
//! name under the same label, the later one is named after its whole key
//! with `/` replaced by `_`.

use std::collections::HashSet;
use std::fmt::Display;
use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::catalog::file_name;
use crate::classification::Label;
use crate::detection::Prediction;
use crate::error::CoreError;

/// Download name offered for the archive.
pub const EXPORT_FILE_NAME: &str = "classified_images.zip";

/// Manifest entry name inside the archive.
pub const MANIFEST_FILE_NAME: &str = "image_details.csv";

/// Entry listing the images left out of the archive, present only when
/// something failed.
pub const ERRORS_FILE_NAME: &str = "export_errors.txt";

const MANIFEST_HEADER: &str = "Filename,Classification,Label,Confidence";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One manifest line: a single prediction of an exported image.
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestRow {
    pub filename: String,
    pub classification: Label,
    pub label: String,
    pub confidence: String,
}

/// A finished export.
#[derive(Debug)]
pub struct ExportArchive {
    /// Zip bytes, possibly missing entries listed in `errors`.
    pub bytes: Vec<u8>,
    /// Number of images written.
    pub image_count: usize,
    /// One line per image that could not be exported.
    pub errors: Vec<String>,
}

/// Incrementally assembles an export archive in memory.
pub struct ExportBuilder {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    manifest: Option<Vec<ManifestRow>>,
    entries: HashSet<String>,
    image_count: usize,
    errors: Vec<String>,
}

impl ExportBuilder {
    pub fn new(include_manifest: bool) -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            manifest: include_manifest.then(Vec::new),
            entries: HashSet::new(),
            image_count: 0,
            errors: Vec::new(),
        }
    }

    /// Add one image under its label folder.
    ///
    /// The blob must be a recognisable image; otherwise nothing is written
    /// and a validation error is returned so the caller can record it.
    pub fn add_image(
        &mut self,
        key: &str,
        label: Label,
        bytes: &[u8],
        predictions: &[Prediction],
    ) -> Result<(), CoreError> {
        image::guess_format(bytes)
            .map_err(|e| CoreError::Validation(format!("not a recognised image: {e}")))?;

        let entry = self.entry_name(key, label);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        self.writer
            .start_file(entry, options)
            .map_err(|e| CoreError::Internal(format!("zip entry failed: {e}")))?;
        self.writer
            .write_all(bytes)
            .map_err(|e| CoreError::Internal(format!("zip write failed: {e}")))?;

        if let Some(rows) = self.manifest.as_mut() {
            rows.extend(predictions.iter().map(|p| ManifestRow {
                filename: key.to_string(),
                classification: label,
                label: p.label.clone(),
                confidence: p.confidence_display(),
            }));
        }

        self.image_count += 1;
        Ok(())
    }

    /// Pick an archive path for `key` that no earlier entry uses.
    fn entry_name(&mut self, key: &str, label: Label) -> String {
        let folder = label.export_folder();
        let short = format!("{folder}{}", file_name(key));
        if self.entries.insert(short.clone()) {
            return short;
        }

        let flattened = key.trim_matches('/').replace('/', "_");
        let long = format!("{folder}{flattened}");
        if self.entries.insert(long.clone()) {
            return long;
        }

        let mut n = 2u32;
        loop {
            let candidate = format!("{folder}{n}_{flattened}");
            if self.entries.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Note an image that could not be exported.
    pub fn record_failure(&mut self, key: &str, error: impl Display) {
        self.errors
            .push(format!("Failed to download image {key}: {error}"));
    }

    /// Write the manifest (if enabled) and the error list (if anything
    /// failed), then close the archive.
    pub fn finish(mut self) -> Result<ExportArchive, CoreError> {
        if let Some(rows) = self.manifest.take() {
            self.write_text(MANIFEST_FILE_NAME, &build_manifest_csv(&rows))?;
        }
        if !self.errors.is_empty() {
            let mut listing = self.errors.join("\n");
            listing.push('\n');
            self.write_text(ERRORS_FILE_NAME, &listing)?;
        }

        let cursor = self
            .writer
            .finish()
            .map_err(|e| CoreError::Internal(format!("zip finalise failed: {e}")))?;

        Ok(ExportArchive {
            bytes: cursor.into_inner(),
            image_count: self.image_count,
            errors: self.errors,
        })
    }

    fn write_text(&mut self, name: &str, text: &str) -> Result<(), CoreError> {
        self.writer
            .start_file(name, SimpleFileOptions::default())
            .map_err(|e| CoreError::Internal(format!("zip entry failed: {e}")))?;
        self.writer
            .write_all(text.as_bytes())
            .map_err(|e| CoreError::Internal(format!("zip write failed: {e}")))
    }
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// Render manifest rows as CSV with a header line.
pub fn build_manifest_csv(rows: &[ManifestRow]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(MANIFEST_HEADER.to_string());
    for row in rows {
        lines.push(
            [
                csv_escape(&row.filename),
                row.classification.as_str().to_string(),
                csv_escape(&row.label),
                csv_escape(&row.confidence),
            ]
            .join(","),
        );
    }
    let mut csv = lines.join("\n");
    csv.push('\n');
    csv
}

fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
