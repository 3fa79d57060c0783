//! Page state driven by the job controller.
//!
//! The page owns four display regions (loading indicator, results, error,
//! summary retry control), the current [`ResultView`] and the last scroll
//! request issued by timeline navigation. All transitions are synchronous;
//! the controller calls them around its network awaits.

use std::fmt;

use serde::Serialize;

use crate::render::summary_needs_retry;
use crate::view::{MediaRef, ResultView, SummaryPanel};

/// Prefix that sets error text apart from normal content.
pub const ERROR_PREFIX: &str = "Error: ";

/// Lifecycle of the single job a page handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Idle,
    Submitting,
    Success,
    Failed,
    RetryingSummary,
    RetrySuccess,
    RetryFailed,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Submitting => "submitting",
            Self::Success => "success",
            Self::Failed => "failed",
            Self::RetryingSummary => "retrying_summary",
            Self::RetrySuccess => "retry_success",
            Self::RetryFailed => "retry_failed",
        }
    }

    /// States in which a rendered result is on screen.
    pub fn has_result(self) -> bool {
        matches!(
            self,
            JobState::Success
                | JobState::RetryingSummary
                | JobState::RetrySuccess
                | JobState::RetryFailed
        )
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollBehavior {
    Smooth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollAlign {
    Start,
}

/// Request to bring a clip region into view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScrollRequest {
    /// Anchor of the target clip region.
    pub anchor: String,
    /// Index of the target region in [`ResultView::clips`].
    pub region: usize,
    pub behavior: ScrollBehavior,
    pub align: ScrollAlign,
}

#[derive(Debug, Clone, Serialize)]
pub struct Page {
    state: JobState,
    loading_visible: bool,
    results_visible: bool,
    error: Option<String>,
    retry_visible: bool,
    view: Option<ResultView>,
    scroll: Option<ScrollRequest>,
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

impl Page {
    pub fn new() -> Self {
        Self {
            state: JobState::Idle,
            loading_visible: false,
            results_visible: false,
            error: None,
            retry_visible: false,
            view: None,
            scroll: None,
        }
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn loading_visible(&self) -> bool {
        self.loading_visible
    }

    pub fn results_visible(&self) -> bool {
        self.results_visible
    }

    /// Text of the error region, already prefixed with [`ERROR_PREFIX`].
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn retry_visible(&self) -> bool {
        self.retry_visible
    }

    pub fn view(&self) -> Option<&ResultView> {
        self.view.as_ref()
    }

    pub fn last_scroll(&self) -> Option<&ScrollRequest> {
        self.scroll.as_ref()
    }

    // ---- job transitions ----

    /// `* -> Submitting`: drop the previous result wholesale, hide every
    /// result region and show the loading indicator.
    pub fn begin_submission(&mut self) {
        self.state = JobState::Submitting;
        self.view = None;
        self.scroll = None;
        self.error = None;
        self.results_visible = false;
        self.retry_visible = false;
        self.loading_visible = true;
    }

    /// `Submitting -> Success`.
    pub fn show_results(&mut self, view: ResultView) {
        self.state = JobState::Success;
        self.loading_visible = false;
        self.error = None;
        self.view = Some(view);
        self.results_visible = true;
        self.refresh_retry_control();
    }

    /// `Submitting -> Failed`. Whatever was already rendered stays.
    pub fn show_error(&mut self, message: impl fmt::Display) {
        self.state = JobState::Failed;
        self.loading_visible = false;
        self.error = Some(format!("{ERROR_PREFIX}{message}"));
        self.retry_visible = false;
    }

    // ---- summary retry transitions ----

    /// Whether the retry control can be used right now.
    pub fn can_retry_summary(&self) -> bool {
        self.retry_visible && self.state.has_result() && self.state != JobState::RetryingSummary
    }

    /// `Success -> RetryingSummary`.
    pub fn begin_retry(&mut self) {
        self.state = JobState::RetryingSummary;
        self.error = None;
        self.retry_visible = false;
        self.loading_visible = true;
    }

    /// `RetryingSummary -> RetrySuccess`. Only the summary panel changes.
    pub fn apply_retry(&mut self, panel: SummaryPanel) {
        self.state = JobState::RetrySuccess;
        self.loading_visible = false;
        if let Some(view) = self.view.as_mut() {
            view.summary = panel;
        }
        self.refresh_retry_control();
    }

    /// `RetryingSummary -> RetryFailed`. The retry control comes back so the
    /// user can try again.
    pub fn fail_retry(&mut self, message: impl fmt::Display) {
        self.state = JobState::RetryFailed;
        self.loading_visible = false;
        self.error = Some(format!("{ERROR_PREFIX}{message}"));
        self.refresh_retry_control();
    }

    fn refresh_retry_control(&mut self) {
        self.retry_visible = self
            .view
            .as_ref()
            .is_some_and(|view| summary_needs_retry(&view.summary));
    }

    // ---- interaction ----

    /// Click on timeline tile `index`: scroll its owning clip region to the
    /// top of the viewport. A tile without a matching region is a no-op.
    pub fn activate_timeline_tile(&mut self, index: usize) -> Option<&ScrollRequest> {
        let view = self.view.as_ref()?;
        let Some(tile) = view.timeline.get(index) else {
            tracing::debug!(index, "No timeline tile at index");
            return None;
        };
        let Some(clip) = tile.clip.as_deref() else {
            tracing::debug!(index, "Timeline tile has no owning clip");
            return None;
        };
        let Some(region) = view.find_clip_region(clip) else {
            tracing::warn!(index, clip, "Clip region not found for timeline frame");
            return None;
        };

        self.scroll = Some(ScrollRequest {
            anchor: view.clips[region].anchor.clone(),
            region,
            behavior: ScrollBehavior::Smooth,
            align: ScrollAlign::Start,
        });
        self.scroll.as_ref()
    }

    /// Element-level load failure. Never touches the error region.
    pub fn mark_media_missing(&mut self, media: MediaRef) -> bool {
        match self.view.as_mut() {
            Some(view) => view.mark_missing(media),
            None => false,
        }
    }
}
