//! Rendered result view.
//!
//! A [`ResultView`] is the whole result subtree for one job: the timeline
//! strip, the clip regions, inline media and the summary panel. It is built
//! in one go by [`crate::render::render`] and replaced wholesale on the next
//! submission; the only in-place mutations are the summary panel (retry) and
//! per-image load failures.

use serde::Serialize;

use crate::locator::{NOT_FOUND_ALT, PLACEHOLDER_IMAGE};

/// Number of clip regions laid out per row.
pub const CLIPS_PER_ROW: usize = 3;

/// An image element with its load-failure fallback.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageElement {
    pub src: String,
    pub alt: String,
    /// Set once the primary resource failed and the placeholder is shown.
    pub missing: bool,
}

impl ImageElement {
    pub fn new(src: impl Into<String>, alt: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            alt: alt.into(),
            missing: false,
        }
    }

    /// An image that starts out as the placeholder.
    pub fn placeholder() -> Self {
        Self {
            src: PLACEHOLDER_IMAGE.to_string(),
            alt: NOT_FOUND_ALT.to_string(),
            missing: true,
        }
    }

    /// Swap in the placeholder after the primary resource failed to load.
    pub fn mark_missing(&mut self) {
        self.src = PLACEHOLDER_IMAGE.to_string();
        self.alt = NOT_FOUND_ALT.to_string();
        self.missing = true;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Link {
    pub href: String,
    pub label: String,
}

/// One compact frame tile on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineTile {
    /// Owning clip; `None` for a malformed entry.
    pub clip: Option<String>,
    pub image: ImageElement,
    /// Timestamp label such as `"0.5s"`.
    pub label: Option<String>,
    /// Anchor of the clip region a click scrolls to.
    pub target: Option<String>,
}

/// One frame shown inside a clip region.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameCard {
    pub frame: Option<String>,
    pub image: ImageElement,
    /// `None` only on the placeholder card of a malformed clip entry.
    pub clip_download: Option<Link>,
    pub frame_download: Option<Link>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "cards", rename_all = "snake_case")]
pub enum ClipBody {
    /// Grouped container for a multi-frame clip.
    Carousel(Vec<FrameCard>),
    Single(FrameCard),
    Empty,
}

impl ClipBody {
    pub fn cards(&self) -> &[FrameCard] {
        match self {
            ClipBody::Carousel(cards) => cards,
            ClipBody::Single(card) => std::slice::from_ref(card),
            ClipBody::Empty => &[],
        }
    }

    fn cards_mut(&mut self) -> &mut [FrameCard] {
        match self {
            ClipBody::Carousel(cards) => cards,
            ClipBody::Single(card) => std::slice::from_mut(card),
            ClipBody::Empty => &mut [],
        }
    }
}

/// Self-contained region for one clip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClipRegion {
    /// Unique anchor identifier, the percent-escaped clip id.
    pub anchor: String,
    /// `None` for a malformed entry rendered as a placeholder.
    pub clip: Option<String>,
    pub title: String,
    pub download: Option<Link>,
    pub body: ClipBody,
}

/// Evenly-sized inline frame images.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InlineGallery {
    pub images: Vec<ImageElement>,
    /// Width of each image as a percentage of the row.
    pub width_percent: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryPanel {
    pub summary: String,
    pub key_points: Vec<String>,
    pub visual_description: String,
}

/// Address of one image inside a [`ResultView`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MediaRef {
    Timeline(usize),
    ClipFrame { clip: usize, frame: usize },
    InlineFrame(usize),
    Combined,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultView {
    pub timeline: Vec<TimelineTile>,
    pub clips: Vec<ClipRegion>,
    pub inline_frames: Option<InlineGallery>,
    pub combined_image: Option<ImageElement>,
    pub summary: SummaryPanel,
}

impl ResultView {
    /// Clip regions batched into layout rows of [`CLIPS_PER_ROW`]. The last
    /// row holds the remainder.
    pub fn clip_rows(&self) -> std::slice::Chunks<'_, ClipRegion> {
        self.clips.chunks(CLIPS_PER_ROW)
    }

    /// Index of the first region showing `clip`. Placeholder regions never
    /// match.
    pub fn find_clip_region(&self, clip: &str) -> Option<usize> {
        self.clips
            .iter()
            .position(|region| region.clip.as_deref() == Some(clip))
    }

    /// Every image in document order with its current `src`.
    pub fn media(&self) -> Vec<(MediaRef, &ImageElement)> {
        let mut media = Vec::new();
        for (i, tile) in self.timeline.iter().enumerate() {
            media.push((MediaRef::Timeline(i), &tile.image));
        }
        for (clip, region) in self.clips.iter().enumerate() {
            for (frame, card) in region.body.cards().iter().enumerate() {
                media.push((MediaRef::ClipFrame { clip, frame }, &card.image));
            }
        }
        if let Some(gallery) = &self.inline_frames {
            for (i, image) in gallery.images.iter().enumerate() {
                media.push((MediaRef::InlineFrame(i), image));
            }
        }
        if let Some(image) = &self.combined_image {
            media.push((MediaRef::Combined, image));
        }
        media
    }

    pub fn image(&self, media: MediaRef) -> Option<&ImageElement> {
        match media {
            MediaRef::Timeline(i) => self.timeline.get(i).map(|tile| &tile.image),
            MediaRef::ClipFrame { clip, frame } => self
                .clips
                .get(clip)
                .and_then(|region| region.body.cards().get(frame))
                .map(|card| &card.image),
            MediaRef::InlineFrame(i) => self
                .inline_frames
                .as_ref()
                .and_then(|gallery| gallery.images.get(i)),
            MediaRef::Combined => self.combined_image.as_ref(),
        }
    }

    fn image_mut(&mut self, media: MediaRef) -> Option<&mut ImageElement> {
        match media {
            MediaRef::Timeline(i) => self.timeline.get_mut(i).map(|tile| &mut tile.image),
            MediaRef::ClipFrame { clip, frame } => self
                .clips
                .get_mut(clip)
                .and_then(|region| region.body.cards_mut().get_mut(frame))
                .map(|card| &mut card.image),
            MediaRef::InlineFrame(i) => self
                .inline_frames
                .as_mut()
                .and_then(|gallery| gallery.images.get_mut(i)),
            MediaRef::Combined => self.combined_image.as_mut(),
        }
    }

    /// Handle a load failure for one image. Returns `false` when `media`
    /// does not address an image in this view.
    pub fn mark_missing(&mut self, media: MediaRef) -> bool {
        match self.image_mut(media) {
            Some(image) => {
                image.mark_missing();
                true
            }
            None => false,
        }
    }
}
