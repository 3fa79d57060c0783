//! Post-render media probing.
//!
//! Every by-reference image in a [`ResultView`] is checked independently
//! and concurrently. A probe failure only concerns its own element; it is
//! reported back as a [`MediaRef`] for the page to swap in the placeholder.

use futures::future::join_all;
use scenecut_core::locator::is_inline;
use scenecut_core::view::{MediaRef, ResultView};

use crate::backend::Backend;

/// A media element whose primary resource failed to load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingMedia {
    pub media: MediaRef,
    pub locator: String,
}

/// Locators worth probing: by-reference images not already showing the
/// placeholder.
pub fn probe_targets(view: &ResultView) -> Vec<(MediaRef, String)> {
    view.media()
        .into_iter()
        .filter(|(_, image)| !image.missing && !is_inline(&image.src))
        .map(|(media, image)| (media, image.src.clone()))
        .collect()
}

/// Probe `targets` concurrently and return the ones that failed.
pub async fn find_missing<B: Backend>(
    backend: &B,
    targets: Vec<(MediaRef, String)>,
) -> Vec<MissingMedia> {
    let probes = targets.into_iter().map(|(media, locator)| async move {
        match backend.probe(&locator).await {
            Ok(()) => None,
            Err(e) => {
                tracing::debug!(locator = %locator, error = %e, "Media failed to load");
                Some(MissingMedia { media, locator })
            }
        }
    });

    join_all(probes).await.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use scenecut_core::envelope::parse_job_envelope;
    use scenecut_core::render::render;
    use scenecut_core::types::Outcome;
    use scenecut_core::validate::normalize_job;

    use super::*;

    #[test]
    fn inline_and_placeholder_images_are_not_probed() {
        let json = r#"{"success":true,
            "clips_and_frames":[{"clip":"c","frames":["a",""]}],
            "timeline_frames":[{"clip":"c","path":"a"},{"path":"broken"}],
            "frames":["aGk="],"combined_image":"aGk="}"#;
        let Outcome::Success(payload) = normalize_job(parse_job_envelope(json).unwrap()) else {
            panic!("Expected Success");
        };
        let view = render(&payload);

        let targets = probe_targets(&view);
        assert_eq!(
            targets,
            vec![
                (MediaRef::Timeline(0), "/download_frame/c/a".to_string()),
                (MediaRef::ClipFrame { clip: 0, frame: 0 }, "/download_frame/c/a".to_string()),
            ]
        );
    }
}
