//! Normalized job payload produced by [`crate::validate`].
//!
//! Every field the renderer reads has already been checked: list entries
//! are [`Slot`]s, empty strings have become `None`, and inline images are
//! known to be valid base64.

use crate::types::Slot;

/// The frames attached to one clip.
#[derive(Debug, Clone, PartialEq)]
pub enum ClipFrames {
    /// A non-empty `frames` sequence, rendered as a carousel.
    Sequence(Vec<Slot<String>>),
    /// A single representative `frame`.
    Single(Slot<String>),
    /// Neither `frames` nor `frame` was present.
    None,
}

/// One detected scene.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipEntry {
    pub clip: String,
    pub frames: ClipFrames,
}

/// One frame of the flat, chronological timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineFrame {
    pub clip: String,
    pub path: String,
    /// Seconds from the start of the owning clip.
    pub timestamp: Option<f64>,
}

/// Summary-related outputs, shared by `/process` and `/retry_summary`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryPayload {
    pub summary: Option<String>,
    pub key_points: Vec<String>,
    pub visual_description: Option<String>,
}

/// A successful `/process` result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobPayload {
    pub clips: Option<Vec<Slot<ClipEntry>>>,
    pub timeline: Option<Vec<Slot<TimelineFrame>>>,
    pub summary: SummaryPayload,
    /// Inline base64 frame images.
    pub inline_frames: Option<Vec<Slot<String>>>,
    /// Inline base64 combined image.
    pub combined_image: Option<Slot<String>>,
}

impl JobPayload {
    pub fn clip_count(&self) -> usize {
        self.clips.as_ref().map_or(0, Vec::len)
    }

    pub fn timeline_count(&self) -> usize {
        self.timeline.as_ref().map_or(0, Vec::len)
    }
}
