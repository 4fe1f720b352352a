//! Human review labels and the denormalised classification payload.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::detection::{DetectionMetadata, Prediction};
use crate::error::CoreError;
use crate::types::NOT_AVAILABLE;

// ---------------------------------------------------------------------------
// Label
// ---------------------------------------------------------------------------

/// Verdict a reviewer assigns to a detection result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Label {
    Good,
    Bad,
}

impl Label {
    /// All labels, in display order.
    pub const ALL: [Label; 2] = [Label::Good, Label::Bad];

    /// Stored / wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Bad => "Bad",
        }
    }

    /// Folder used for this label inside export archives.
    pub fn export_folder(self) -> &'static str {
        match self {
            Self::Good => "good/",
            Self::Bad => "bad/",
        }
    }

    /// Folder a staged upload is moved into once sorted.
    pub fn sorted_folder(self) -> &'static str {
        match self {
            Self::Good => "correct",
            Self::Bad => "incorrect",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = CoreError;

    /// Accepts the stored form and its lowercase variant.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Good" | "good" => Ok(Self::Good),
            "Bad" | "bad" => Ok(Self::Bad),
            other => Err(CoreError::Validation(format!(
                "Invalid label '{other}'. Must be one of: Good, Bad"
            ))),
        }
    }
}

impl TryFrom<String> for Label {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ---------------------------------------------------------------------------
// ClassificationDraft
// ---------------------------------------------------------------------------

/// Everything needed to write one classification row.
///
/// Built from the reviewer's label plus whatever detection metadata exists
/// for the image. Metadata that is missing is recorded as `"N/A"`, never as
/// null, so readers never branch on absence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationDraft {
    pub image_id: String,
    pub label: Label,
    pub user_id: String,
    pub uploaded_at: String,
    pub timestamp: String,
    pub language: String,
    pub predictions: Vec<Prediction>,
}

impl ClassificationDraft {
    /// Build a draft, filling absent metadata with the `"N/A"` sentinel.
    pub fn new(image_id: &str, label: Label, metadata: Option<&DetectionMetadata>) -> Self {
        let field = |value: Option<&String>| {
            value
                .cloned()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string())
        };

        Self {
            image_id: image_id.to_string(),
            label,
            user_id: field(metadata.and_then(|m| m.user_id.as_ref())),
            uploaded_at: field(metadata.and_then(|m| m.uploaded_at.as_ref())),
            timestamp: field(metadata.and_then(|m| m.timestamp.as_ref())),
            language: field(metadata.and_then(|m| m.language.as_ref())),
            predictions: metadata.map(|m| m.predictions.clone()).unwrap_or_default(),
        }
    }
}
