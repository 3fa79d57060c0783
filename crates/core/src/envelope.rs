//! Wire types for the processing backend's JSON responses.
//!
//! Both `/process` and `/retry_summary` answer with an envelope of the shape
//! `{"success": bool, "error"?: string, ...payload}`. List entries and the
//! free-text fields are kept as raw [`serde_json::Value`]s here so that one
//! wrongly typed value cannot fail the whole response; [`crate::validate`]
//! decodes them one by one.

use serde::Deserialize;

/// In-band message the backend puts in `summary` when summary generation
/// failed. Seeing it exposes the summary retry control.
pub const SUMMARY_FAILURE_SENTINEL: &str = "Unable to generate summary due to an error.";

/// Response body of `POST /process`.
#[derive(Debug, Clone, Deserialize)]
pub struct JobEnvelope {
    pub success: bool,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
    #[serde(default)]
    pub clips_and_frames: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub timeline_frames: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub summary: Option<serde_json::Value>,
    #[serde(default)]
    pub key_points: Option<serde_json::Value>,
    #[serde(default)]
    pub visual_description: Option<serde_json::Value>,
    /// Inline base64 frame images.
    #[serde(default)]
    pub frames: Option<Vec<serde_json::Value>>,
    /// Inline base64 image of all frames stitched together.
    #[serde(default)]
    pub combined_image: Option<serde_json::Value>,
}

/// Response body of `POST /retry_summary`.
#[derive(Debug, Clone, Deserialize)]
pub struct RetryEnvelope {
    pub success: bool,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
    #[serde(default)]
    pub summary: Option<serde_json::Value>,
    #[serde(default)]
    pub key_points: Option<serde_json::Value>,
    #[serde(default)]
    pub visual_description: Option<serde_json::Value>,
}

/// One element of `clips_and_frames`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClipEntryWire {
    pub clip: String,
    #[serde(default)]
    pub frame: Option<String>,
    #[serde(default)]
    pub frames: Option<Vec<String>>,
}

/// One element of `timeline_frames`.
#[derive(Debug, Clone, Deserialize)]
pub struct TimelineFrameWire {
    pub clip: String,
    pub path: String,
    #[serde(default)]
    pub timestamp: Option<serde_json::Value>,
}

/// Parse a `/process` response body.
///
/// Returns `Err` for malformed JSON or a body without a boolean `success`.
pub fn parse_job_envelope(text: &str) -> Result<JobEnvelope, serde_json::Error> {
    serde_json::from_str(text)
}

/// Parse a `/retry_summary` response body.
pub fn parse_retry_envelope(text: &str) -> Result<RetryEnvelope, serde_json::Error> {
    serde_json::from_str(text)
}
