//! Detector predictions and the parsing of detector process output.
//!
//! The detector is expected to print its predictions as JSON: either a bare
//! array of `{"label", "percentage"}` objects or an object with a
//! `predictions` array. Older detector builds only print a human-readable
//! log; [`parse_legacy_log`] recovers the label names from it.

use serde::{Deserialize, Serialize};

/// Line printed by the legacy detector right after the detections summary.
pub const LEGACY_RESULT_MARKER: &str = "The image with the result is saved in:";

/// Timing suffix appended to the legacy summary line.
const LEGACY_TIMING_SUFFIX: &str = ", Done.";

/// Label used when a stored prediction lacks one.
const UNKNOWN_LABEL: &str = "Unknown";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One detected class with its confidence in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    #[serde(default = "unknown_label")]
    pub label: String,
    #[serde(default)]
    pub percentage: f64,
}

fn unknown_label() -> String {
    UNKNOWN_LABEL.to_string()
}

impl Prediction {
    pub fn new(label: impl Into<String>, percentage: f64) -> Self {
        Self {
            label: label.into(),
            percentage,
        }
    }

    /// Confidence as shown in reports, e.g. `"87.25%"`.
    pub fn confidence_display(&self) -> String {
        format!("{:.2}%", self.percentage)
    }
}

/// Upload metadata attached to a detection result.
///
/// Every field is optional because detection documents are written by
/// several producers and none of them is guaranteed to be complete.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionMetadata {
    #[serde(default, alias = "userid")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub uploaded_at: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default, alias = "detection_results")]
    pub predictions: Vec<Prediction>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StructuredOutput {
    List(Vec<Prediction>),
    Wrapped { predictions: Vec<Prediction> },
}

impl From<StructuredOutput> for Vec<Prediction> {
    fn from(output: StructuredOutput) -> Self {
        match output {
            StructuredOutput::List(list) => list,
            StructuredOutput::Wrapped { predictions } => predictions,
        }
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse detector stdout, preferring the JSON contract.
///
/// Falls back to [`parse_legacy_log`] when no JSON payload is found.
pub fn parse_detector_output(stdout: &str) -> Vec<Prediction> {
    parse_structured(stdout).unwrap_or_else(|| parse_legacy_log(stdout))
}

/// Parse the JSON contract.
///
/// The whole output is tried first, then the last non-empty line, so a
/// detector may log freely as long as the JSON payload comes last.
pub fn parse_structured(stdout: &str) -> Option<Vec<Prediction>> {
    let whole = stdout.trim();
    if let Ok(output) = serde_json::from_str::<StructuredOutput>(whole) {
        return Some(output.into());
    }

    let last_line = stdout.lines().rev().map(str::trim).find(|l| !l.is_empty())?;
    serde_json::from_str::<StructuredOutput>(last_line)
        .ok()
        .map(Into::into)
}

/// Recover label names from the legacy detector log.
///
/// The summary line sits directly above [`LEGACY_RESULT_MARKER`] and looks
/// like `1 Queen, 3 Drones, Done. (14.5ms) Inference, (595.8ms) NMS`. Counts
/// and the timing suffix are dropped. The log carries no confidences, so
/// every prediction gets `0.0`. A missing marker yields no predictions.
pub fn parse_legacy_log(stdout: &str) -> Vec<Prediction> {
    let lines: Vec<&str> = stdout.lines().collect();
    let Some(marker_idx) = lines.iter().position(|l| l.contains(LEGACY_RESULT_MARKER)) else {
        return Vec::new();
    };
    let Some(summary_idx) = marker_idx.checked_sub(1) else {
        return Vec::new();
    };

    let summary = lines[summary_idx].trim();
    let summary = summary
        .split(LEGACY_TIMING_SUFFIX)
        .next()
        .unwrap_or(summary);

    summary
        .split(',')
        .map(|fragment| {
            let label: String = fragment.chars().filter(|c| !c.is_ascii_digit()).collect();
            Prediction::new(label.trim(), 0.0)
        })
        .collect()
}
