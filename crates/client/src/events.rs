//! Events emitted by the job controller.
//!
//! These describe state changes an observer (progress display, logging,
//! tests) may care about. They are sent on a broadcast channel; having no
//! subscribers is normal.

use chrono::Utc;
use scenecut_core::types::Timestamp;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum JobEvent {
    /// The page switched to loading; the request is about to be sent.
    Submitting { submission_id: Uuid, at: Timestamp },

    /// The job succeeded and its result was rendered.
    Succeeded {
        submission_id: Uuid,
        clip_count: usize,
        timeline_count: usize,
        /// Whether the summary came back as the failure sentinel.
        summary_retryable: bool,
        at: Timestamp,
    },

    /// The job failed; `error` is the message shown on the page.
    Failed {
        submission_id: Uuid,
        error: String,
        at: Timestamp,
    },

    RetryStarted { submission_id: Uuid, at: Timestamp },

    RetrySucceeded {
        submission_id: Uuid,
        summary_retryable: bool,
        at: Timestamp,
    },

    RetryFailed {
        submission_id: Uuid,
        error: String,
        at: Timestamp,
    },

    /// A media element failed to load and now shows the placeholder.
    MediaMissing { locator: String, at: Timestamp },

    /// A cleanup request was fired at page hide.
    CleanupRequested { at: Timestamp },
}

pub(crate) fn now() -> Timestamp {
    Utc::now()
}
