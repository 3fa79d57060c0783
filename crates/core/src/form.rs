//! Job submission form and the request snapshot taken from it.

use std::path::PathBuf;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Smallest clip count accepted as a custom setting.
pub const MIN_CLIP_COUNT: u32 = 1;

/// Largest clip count accepted as a custom setting.
pub const MAX_CLIP_COUNT: u32 = 100;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Where the video comes from. Exactly one source per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    /// Remote video the backend downloads itself.
    Url(String),
    /// Local file uploaded with the request.
    File(PathBuf),
}

/// Snapshot of the form at submission time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequest {
    pub source: MediaSource,
    /// Present only when custom settings were enabled.
    pub num_clips: Option<u32>,
}

// ---------------------------------------------------------------------------
// Form
// ---------------------------------------------------------------------------

/// Mutable form state.
///
/// The URL and file fields are mutually exclusive: a non-empty URL clears
/// and disables the file field. The clip count keeps its value while custom
/// settings are toggled; only the toggle decides whether it is sent.
#[derive(Debug, Clone, Default)]
pub struct JobForm {
    video_url: String,
    video_file: Option<PathBuf>,
    use_custom_settings: bool,
    num_clips: Option<u32>,
}

impl JobForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_video_url(&mut self, url: impl Into<String>) {
        self.video_url = url.into().trim().to_string();
        if !self.video_url.is_empty() {
            self.video_file = None;
        }
    }

    /// Select a file to upload. Returns `false` (and changes nothing) while
    /// the file field is disabled by a non-empty URL.
    pub fn set_video_file(&mut self, path: impl Into<PathBuf>) -> bool {
        if !self.file_field_enabled() {
            return false;
        }
        self.video_file = Some(path.into());
        true
    }

    /// Drop the selected file. The URL field is left as it is.
    pub fn clear_video_file(&mut self) {
        self.video_file = None;
    }

    pub fn file_field_enabled(&self) -> bool {
        self.video_url.is_empty()
    }

    pub fn video_url(&self) -> &str {
        &self.video_url
    }

    pub fn video_file(&self) -> Option<&PathBuf> {
        self.video_file.as_ref()
    }

    pub fn set_custom_settings(&mut self, enabled: bool) {
        self.use_custom_settings = enabled;
    }

    pub fn custom_settings(&self) -> bool {
        self.use_custom_settings
    }

    pub fn set_num_clips(&mut self, num_clips: Option<u32>) {
        self.num_clips = num_clips;
    }

    pub fn num_clips(&self) -> Option<u32> {
        self.num_clips
    }

    /// Take the request snapshot sent to `/process`.
    ///
    /// Checks:
    /// - exactly one media source is present
    /// - an uploaded file path is not empty
    /// - a custom clip count, when sent, is in `MIN_CLIP_COUNT..=MAX_CLIP_COUNT`
    pub fn snapshot(&self) -> Result<JobRequest, CoreError> {
        let source = match (&self.video_file, self.video_url.is_empty()) {
            (None, false) => MediaSource::Url(self.video_url.clone()),
            (Some(path), true) => {
                if path.as_os_str().is_empty() {
                    return Err(CoreError::Validation("Video file path is empty".into()));
                }
                MediaSource::File(path.clone())
            }
            (None, true) => {
                return Err(CoreError::Validation(
                    "Provide a video URL or choose a video file".into(),
                ));
            }
            (Some(_), false) => {
                return Err(CoreError::Validation(
                    "Provide either a video URL or a video file, not both".into(),
                ));
            }
        };

        let num_clips = if self.use_custom_settings {
            self.num_clips
        } else {
            None
        };
        if let Some(n) = num_clips {
            validate_clip_count(n)?;
        }

        Ok(JobRequest { source, num_clips })
    }
}

/// Validate a custom clip count.
pub fn validate_clip_count(n: u32) -> Result<(), CoreError> {
    if !(MIN_CLIP_COUNT..=MAX_CLIP_COUNT).contains(&n) {
        return Err(CoreError::Validation(format!(
            "Number of clips must be between {MIN_CLIP_COUNT} and {MAX_CLIP_COUNT}, got {n}"
        )));
    }
    Ok(())
}
