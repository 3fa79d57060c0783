//! Payload to view rendering.
//!
//! [`render`] is a pure function of a validated [`JobPayload`]. Malformed
//! entries were already turned into [`Slot::Invalid`] by the validation
//! pass; here each one becomes a placeholder element in its position, so
//! the rendered counts and order always match the input lists.

use std::collections::HashSet;

use crate::envelope::SUMMARY_FAILURE_SENTINEL;
use crate::locator::{clip_anchor, clip_download_url, frame_url, inline_image_uri};
use crate::payload::{ClipEntry, ClipFrames, JobPayload, SummaryPayload, TimelineFrame};
use crate::types::Slot;
use crate::view::{
    ClipBody, ClipRegion, FrameCard, ImageElement, InlineGallery, Link, ResultView, SummaryPanel,
    TimelineTile,
};

pub const DEFAULT_SUMMARY: &str = "No summary available.";
pub const DEFAULT_KEY_POINT: &str = "No key points available.";
pub const DEFAULT_VISUAL_DESCRIPTION: &str = "No visual description available.";

/// Build the full result view for a successful job.
pub fn render(payload: &JobPayload) -> ResultView {
    ResultView {
        timeline: payload
            .timeline
            .as_deref()
            .map(render_timeline)
            .unwrap_or_default(),
        clips: payload
            .clips
            .as_deref()
            .map(render_clips)
            .unwrap_or_default(),
        inline_frames: payload.inline_frames.as_deref().map(render_inline_frames),
        combined_image: payload.combined_image.as_ref().map(|slot| match slot {
            Slot::Valid(encoded) => ImageElement::new(inline_image_uri(encoded), "Combined frames"),
            Slot::Invalid(_) => ImageElement::placeholder(),
        }),
        summary: render_summary(&payload.summary),
    }
}

/// Timeline tiles, one per entry, in input order.
pub fn render_timeline(frames: &[Slot<TimelineFrame>]) -> Vec<TimelineTile> {
    frames
        .iter()
        .map(|slot| match slot {
            Slot::Valid(frame) => timeline_tile(frame),
            Slot::Invalid(_) => TimelineTile {
                clip: None,
                image: ImageElement::placeholder(),
                label: None,
                target: None,
            },
        })
        .collect()
}

fn timeline_tile(frame: &TimelineFrame) -> TimelineTile {
    let label = frame.timestamp.map(format_timestamp);
    let alt = match &label {
        Some(label) => format!("Frame at {label}"),
        None => format!("Frame from {}", frame.clip),
    };
    TimelineTile {
        clip: Some(frame.clip.clone()),
        image: ImageElement::new(frame_url(&frame.clip, &frame.path), alt),
        label,
        target: Some(clip_anchor(&frame.clip)),
    }
}

/// Timestamp label shown next to a timeline tile.
pub fn format_timestamp(seconds: f64) -> String {
    format!("{seconds}s")
}

/// Clip regions, one per entry, in input order, with unique anchors.
///
/// The first region of every valid clip is anchored by its escaped clip id.
/// Repeated clips and placeholders get a `-N` suffix that never collides
/// with the anchor of a real clip.
pub fn render_clips(entries: &[Slot<ClipEntry>]) -> Vec<ClipRegion> {
    let reserved: HashSet<String> = entries
        .iter()
        .filter_map(|slot| slot.valid())
        .map(|entry| clip_anchor(&entry.clip))
        .collect();
    let mut used = HashSet::with_capacity(entries.len());

    entries
        .iter()
        .enumerate()
        .map(|(index, slot)| {
            let mut region = match slot {
                Slot::Valid(entry) => clip_region(entry),
                Slot::Invalid(_) => ClipRegion {
                    anchor: format!("invalid-clip-{index}"),
                    clip: None,
                    title: format!("Clip {} unavailable", index + 1),
                    download: None,
                    body: ClipBody::Single(FrameCard {
                        frame: None,
                        image: ImageElement::placeholder(),
                        clip_download: None,
                        frame_download: None,
                    }),
                },
            };

            let owns_anchor = region.clip.is_some() && !used.contains(&region.anchor);
            if !owns_anchor && (used.contains(&region.anchor) || reserved.contains(&region.anchor)) {
                let base = std::mem::take(&mut region.anchor);
                region.anchor = free_anchor(&base, &reserved, &used);
                tracing::warn!(anchor = %base, renamed = %region.anchor, "Clip anchor already taken");
            }
            used.insert(region.anchor.clone());
            region
        })
        .collect()
}

/// First `{base}-N` (N >= 2) that is neither reserved nor used.
fn free_anchor(base: &str, reserved: &HashSet<String>, used: &HashSet<String>) -> String {
    let mut n = 2;
    loop {
        let candidate = format!("{base}-{n}");
        if !reserved.contains(&candidate) && !used.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

fn clip_region(entry: &ClipEntry) -> ClipRegion {
    let clip = entry.clip.as_str();
    let body = match &entry.frames {
        ClipFrames::Sequence(frames) => ClipBody::Carousel(
            frames
                .iter()
                .enumerate()
                .map(|(i, frame)| frame_card(clip, i, frames.len(), frame))
                .collect(),
        ),
        ClipFrames::Single(frame) => ClipBody::Single(frame_card(clip, 0, 1, frame)),
        ClipFrames::None => ClipBody::Empty,
    };

    ClipRegion {
        anchor: clip_anchor(clip),
        clip: Some(clip.to_string()),
        title: clip.to_string(),
        download: Some(clip_download_link(clip)),
        body,
    }
}

fn clip_download_link(clip: &str) -> Link {
    Link {
        href: clip_download_url(clip),
        label: "Download clip".to_string(),
    }
}

fn frame_card(clip: &str, index: usize, total: usize, frame: &Slot<String>) -> FrameCard {
    match frame {
        Slot::Valid(frame) => {
            let src = frame_url(clip, frame);
            FrameCard {
                frame: Some(frame.clone()),
                image: ImageElement::new(
                    src.clone(),
                    format!("Frame {} of {} from {clip}", index + 1, total),
                ),
                clip_download: Some(clip_download_link(clip)),
                frame_download: Some(Link {
                    href: src,
                    label: "Download frame".to_string(),
                }),
            }
        }
        Slot::Invalid(_) => FrameCard {
            frame: None,
            image: ImageElement::placeholder(),
            clip_download: Some(clip_download_link(clip)),
            frame_download: None,
        },
    }
}

fn render_inline_frames(frames: &[Slot<String>]) -> InlineGallery {
    let width_percent = if frames.is_empty() {
        100.0
    } else {
        100.0 / frames.len() as f32
    };
    InlineGallery {
        images: frames
            .iter()
            .enumerate()
            .map(|(i, slot)| match slot {
                Slot::Valid(encoded) => {
                    ImageElement::new(inline_image_uri(encoded), format!("Frame {}", i + 1))
                }
                Slot::Invalid(_) => ImageElement::placeholder(),
            })
            .collect(),
        width_percent,
    }
}

/// Summary panel with placeholders for missing fields. Shared by the
/// initial render and the summary retry.
pub fn render_summary(summary: &SummaryPayload) -> SummaryPanel {
    let key_points = if summary.key_points.is_empty() {
        vec![DEFAULT_KEY_POINT.to_string()]
    } else {
        summary.key_points.clone()
    };
    SummaryPanel {
        summary: summary
            .summary
            .clone()
            .unwrap_or_else(|| DEFAULT_SUMMARY.to_string()),
        key_points,
        visual_description: summary
            .visual_description
            .clone()
            .unwrap_or_else(|| DEFAULT_VISUAL_DESCRIPTION.to_string()),
    }
}

/// Whether the panel shows the summary failure sentinel, i.e. whether the
/// retry control should be visible.
pub fn summary_needs_retry(panel: &SummaryPanel) -> bool {
    panel.summary == SUMMARY_FAILURE_SENTINEL
}
