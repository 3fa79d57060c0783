//! Single validation pass from raw envelopes to normalized payloads.
//!
//! Each list entry is decoded on its own. An entry that cannot be decoded
//! becomes [`Slot::Invalid`] and the rest of the payload is unaffected, so
//! the renderer never has to re-check field presence.

use base64::Engine;
use serde_json::Value;

use crate::envelope::{ClipEntryWire, JobEnvelope, RetryEnvelope, TimelineFrameWire};
use crate::error::RenderError;
use crate::payload::{ClipEntry, ClipFrames, JobPayload, SummaryPayload, TimelineFrame};
use crate::types::{Outcome, Slot};

/// Message used when the backend reports failure without saying why.
pub const DEFAULT_FAILURE_MESSAGE: &str = "An unknown error occurred";

/// Interpret a `/process` envelope.
pub fn normalize_job(envelope: JobEnvelope) -> Outcome<JobPayload> {
    if !envelope.success {
        return Outcome::Failure(failure_message(envelope.error));
    }

    let clips = envelope.clips_and_frames.map(|entries| {
        entries
            .into_iter()
            .enumerate()
            .map(|(index, value)| clip_slot(index, value))
            .collect()
    });

    let timeline = envelope.timeline_frames.map(|entries| {
        entries
            .into_iter()
            .enumerate()
            .map(|(index, value)| timeline_slot(index, value))
            .collect()
    });

    let inline_frames = envelope.frames.map(|entries| {
        entries
            .into_iter()
            .enumerate()
            .map(|(index, value)| match value {
                Value::String(encoded) => inline_image_slot(index, encoded),
                _ => Slot::Invalid(RenderError::InvalidInlineImage { index }),
            })
            .collect()
    });

    let combined_image = text_field("combined_image", envelope.combined_image)
        .map(|encoded| inline_image_slot(0, encoded));

    Outcome::Success(JobPayload {
        clips,
        timeline,
        summary: summary_payload(
            envelope.summary,
            envelope.key_points,
            envelope.visual_description,
        ),
        inline_frames,
        combined_image,
    })
}

/// Interpret a `/retry_summary` envelope.
pub fn normalize_retry(envelope: RetryEnvelope) -> Outcome<SummaryPayload> {
    if !envelope.success {
        return Outcome::Failure(failure_message(envelope.error));
    }
    Outcome::Success(summary_payload(
        envelope.summary,
        envelope.key_points,
        envelope.visual_description,
    ))
}

// ---- private helpers ----

fn failure_message(error: Option<Value>) -> String {
    text_field("error", error).unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string())
}

/// A non-blank string, or `None`. Any other JSON type is logged and dropped.
fn text_field(field: &'static str, value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(text) if !text.trim().is_empty() => Some(text),
        Value::String(_) | Value::Null => None,
        other => {
            tracing::warn!(field, value = %other, "Ignoring non-string text field");
            None
        }
    }
}

/// Finite seconds from a number or a numeric string. Anything else means
/// the tile gets no label.
fn timestamp_seconds(index: usize, value: Option<Value>) -> Option<f64> {
    let seconds = match value? {
        Value::Null => return None,
        Value::Number(n) => n.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    let seconds = seconds.filter(|t| t.is_finite());
    if seconds.is_none() {
        tracing::warn!(index, "Ignoring unusable timeline timestamp");
    }
    seconds
}

fn malformed<T>(entity: &'static str, index: usize, reason: impl Into<String>) -> Slot<T> {
    let error = RenderError::Malformed {
        entity,
        index,
        reason: reason.into(),
    };
    tracing::warn!(error = %error, "Skipping malformed payload entry");
    Slot::Invalid(error)
}

fn clip_slot(index: usize, value: Value) -> Slot<ClipEntry> {
    let wire: ClipEntryWire = match serde_json::from_value(value) {
        Ok(wire) => wire,
        Err(e) => return malformed("clip", index, e.to_string()),
    };
    if wire.clip.trim().is_empty() {
        return malformed("clip", index, "empty clip identifier");
    }

    // A non-empty `frames` sequence wins over a single `frame`.
    let frames = match (wire.frames, wire.frame) {
        (Some(frames), _) if !frames.is_empty() => ClipFrames::Sequence(
            frames
                .into_iter()
                .enumerate()
                .map(|(i, frame)| frame_slot(i, frame))
                .collect(),
        ),
        (_, Some(frame)) => ClipFrames::Single(frame_slot(0, frame)),
        _ => ClipFrames::None,
    };

    Slot::Valid(ClipEntry {
        clip: wire.clip,
        frames,
    })
}

fn frame_slot(index: usize, frame: String) -> Slot<String> {
    if frame.trim().is_empty() {
        return malformed("frame", index, "empty frame identifier");
    }
    Slot::Valid(frame)
}

fn timeline_slot(index: usize, value: Value) -> Slot<TimelineFrame> {
    let wire: TimelineFrameWire = match serde_json::from_value(value) {
        Ok(wire) => wire,
        Err(e) => return malformed("timeline frame", index, e.to_string()),
    };
    if wire.clip.trim().is_empty() || wire.path.trim().is_empty() {
        return malformed("timeline frame", index, "empty clip or path");
    }
    Slot::Valid(TimelineFrame {
        clip: wire.clip,
        path: wire.path,
        timestamp: timestamp_seconds(index, wire.timestamp),
    })
}

fn inline_image_slot(index: usize, encoded: String) -> Slot<String> {
    match base64::engine::general_purpose::STANDARD.decode(encoded.trim()) {
        Ok(_) => Slot::Valid(encoded.trim().to_string()),
        Err(e) => {
            tracing::warn!(index, error = %e, "Inline image is not valid base64");
            Slot::Invalid(RenderError::InvalidInlineImage { index })
        }
    }
}

fn summary_payload(
    summary: Option<Value>,
    key_points: Option<Value>,
    visual_description: Option<Value>,
) -> SummaryPayload {
    let key_points = match key_points {
        Some(Value::Array(points)) => points,
        None | Some(Value::Null) => Vec::new(),
        Some(other) => {
            tracing::warn!(value = %other, "Ignoring key_points that is not a list");
            Vec::new()
        }
    };
    let key_points = key_points
        .into_iter()
        .filter_map(|point| match point {
            Value::String(text) if !text.trim().is_empty() => Some(text),
            Value::String(_) => None,
            other => {
                tracing::warn!(value = %other, "Ignoring non-string key point");
                None
            }
        })
        .collect();

    SummaryPayload {
        summary: text_field("summary", summary),
        key_points,
        visual_description: text_field("visual_description", visual_description),
    }
}
