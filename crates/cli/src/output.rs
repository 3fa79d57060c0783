//! Plain-text rendering of the page for the terminal.

use std::fmt;

use scenecut_core::locator::is_inline;
use scenecut_core::page::Page;
use scenecut_core::view::{ClipBody, ClipRegion, ImageElement, ResultView, SummaryPanel};

/// Text view of a [`Page`].
///
/// Root-relative locators are printed against `base_url` when one is set,
/// so they can be opened directly.
pub struct PageReport<'a> {
    page: &'a Page,
    base_url: Option<&'a str>,
}

impl<'a> PageReport<'a> {
    pub fn new(page: &'a Page) -> Self {
        Self {
            page,
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, base_url: &'a str) -> Self {
        self.base_url = Some(base_url);
        self
    }

    fn locator(&self, src: &str) -> String {
        match self.base_url {
            Some(base) if src.starts_with('/') => format!("{base}{src}"),
            _ => src.to_string(),
        }
    }

    fn image(&self, image: &ImageElement) -> String {
        if image.missing {
            format!("[{}]", image.alt)
        } else if is_inline(&image.src) {
            format!("<inline image, {} bytes>", image.src.len())
        } else {
            self.locator(&image.src)
        }
    }

    fn write_timeline(&self, f: &mut fmt::Formatter<'_>, view: &ResultView) -> fmt::Result {
        if view.timeline.is_empty() {
            return Ok(());
        }
        writeln!(f, "Timeline")?;
        for (i, tile) in view.timeline.iter().enumerate() {
            let label = tile.label.as_deref().unwrap_or("-");
            let clip = tile.clip.as_deref().unwrap_or("?");
            writeln!(f, "  [{i}] {label:>8}  {clip}  {}", self.image(&tile.image))?;
        }
        writeln!(f)
    }

    fn write_clips(&self, f: &mut fmt::Formatter<'_>, view: &ResultView) -> fmt::Result {
        if view.clips.is_empty() {
            return Ok(());
        }
        writeln!(f, "Clips")?;
        for (row, regions) in view.clip_rows().enumerate() {
            writeln!(f, "  Row {}", row + 1)?;
            for region in regions {
                self.write_region(f, region)?;
            }
        }
        writeln!(f)
    }

    fn write_region(&self, f: &mut fmt::Formatter<'_>, region: &ClipRegion) -> fmt::Result {
        writeln!(f, "    {} (#{})", region.title, region.anchor)?;
        if let Some(link) = &region.download {
            writeln!(f, "      {}: {}", link.label, self.locator(&link.href))?;
        }
        let cards = region.body.cards();
        let count = cards.len();
        for (i, card) in cards.iter().enumerate() {
            let prefix = match region.body {
                ClipBody::Carousel(_) => format!("frame {}/{count}", i + 1),
                _ => "frame".to_string(),
            };
            writeln!(f, "      {prefix}: {}", self.image(&card.image))?;
        }
        Ok(())
    }

    fn write_media(&self, f: &mut fmt::Formatter<'_>, view: &ResultView) -> fmt::Result {
        if let Some(gallery) = &view.inline_frames {
            writeln!(f, "Frames ({} inline)", gallery.images.len())?;
            for image in &gallery.images {
                writeln!(f, "  {}", self.image(image))?;
            }
            writeln!(f)?;
        }
        if let Some(image) = &view.combined_image {
            writeln!(f, "Combined image: {}", self.image(image))?;
            writeln!(f)?;
        }
        Ok(())
    }

    fn write_summary(&self, f: &mut fmt::Formatter<'_>, summary: &SummaryPanel) -> fmt::Result {
        writeln!(f, "Summary")?;
        writeln!(f, "  {}", summary.summary)?;
        writeln!(f)?;
        writeln!(f, "Key points")?;
        for point in &summary.key_points {
            writeln!(f, "  - {point}")?;
        }
        writeln!(f)?;
        writeln!(f, "Visual description")?;
        writeln!(f, "  {}", summary.visual_description)
    }
}

impl fmt::Display for PageReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(error) = self.page.error() {
            writeln!(f, "{error}")?;
        }
        if !self.page.results_visible() {
            return Ok(());
        }
        let Some(view) = self.page.view() else {
            return Ok(());
        };

        if self.page.error().is_some() {
            writeln!(f)?;
        }
        self.write_timeline(f, view)?;
        self.write_clips(f, view)?;
        self.write_media(f, view)?;
        self.write_summary(f, &view.summary)?;
        if self.page.retry_visible() {
            writeln!(f)?;
            writeln!(f, "Summary generation failed; run again with --retry-summary to retry.")?;
        }
        Ok(())
    }
}
