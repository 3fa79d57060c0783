//! Job controller: the request/response state machine for one page.
//!
//! [`JobController`] owns the [`Page`] and drives it through
//! `Idle -> Submitting -> Success | Failed`, plus the summary retry
//! sub-machine on a successful result. Both network operations take
//! `&mut self`, so only one of them can be in flight per controller.
//!
//! State changes are published as [`JobEvent`]s. Call
//! [`JobController::subscribe`] to receive them.

use scenecut_core::form::JobForm;
use scenecut_core::page::{JobState, Page, ScrollRequest};
use scenecut_core::render::{render, render_summary};
use scenecut_core::view::MediaRef;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::backend::Backend;
use crate::error::ClientError;
use crate::events::{now, JobEvent};
use crate::media::{find_missing, probe_targets, MissingMedia};

/// Broadcast channel capacity for controller events.
const EVENT_CHANNEL_CAPACITY: usize = 64;

pub struct JobController<B> {
    backend: B,
    page: Page,
    event_tx: broadcast::Sender<JobEvent>,
    /// Id of the submission whose result (or error) is on the page.
    submission_id: Option<Uuid>,
}

impl<B: Backend> JobController<B> {
    pub fn new(backend: B) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            backend,
            page: Page::new(),
            event_tx,
            submission_id: None,
        }
    }

    /// Subscribe to controller events.
    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.event_tx.subscribe()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn state(&self) -> JobState {
        self.page.state()
    }

    pub fn submission_id(&self) -> Option<Uuid> {
        self.submission_id
    }

    /// Submit the form and render the outcome.
    ///
    /// The page is cleared and switched to loading before the request is
    /// issued. Every failure (invalid form, transport, envelope, decode)
    /// ends in `Failed` with one error message; the controller can always
    /// be submitted again.
    pub async fn submit(&mut self, form: &JobForm) -> JobState {
        let submission_id = Uuid::new_v4();
        self.submission_id = Some(submission_id);

        self.page.begin_submission();
        self.emit(JobEvent::Submitting {
            submission_id,
            at: now(),
        });

        let result = match form.snapshot() {
            Ok(request) => {
                tracing::info!(
                    %submission_id,
                    source = ?request.source,
                    num_clips = ?request.num_clips,
                    "Submitting processing job",
                );
                self.backend.process(&request).await
            }
            Err(e) => Err(ClientError::Form(e)),
        };

        match result {
            Ok(payload) => {
                self.page.show_results(render(&payload));
                let summary_retryable = self.page.retry_visible();
                tracing::info!(
                    %submission_id,
                    clips = payload.clip_count(),
                    timeline_frames = payload.timeline_count(),
                    summary_retryable,
                    "Processing job succeeded",
                );
                self.emit(JobEvent::Succeeded {
                    submission_id,
                    clip_count: payload.clip_count(),
                    timeline_count: payload.timeline_count(),
                    summary_retryable,
                    at: now(),
                });
            }
            Err(e) => {
                tracing::error!(%submission_id, error = %e, "Processing job failed");
                self.page.show_error(&e);
                self.emit(JobEvent::Failed {
                    submission_id,
                    error: e.to_string(),
                    at: now(),
                });
            }
        }

        self.page.state()
    }

    /// Retry summary generation for the current result.
    ///
    /// Does nothing unless the retry control is visible. Only the summary
    /// panel is refreshed; clips and timeline stay as they are.
    pub async fn retry_summary(&mut self) -> JobState {
        if !self.page.can_retry_summary() {
            tracing::warn!(state = %self.page.state(), "Summary retry is not available");
            return self.page.state();
        }
        let submission_id = self.submission_id.unwrap_or_else(Uuid::nil);

        self.page.begin_retry();
        self.emit(JobEvent::RetryStarted {
            submission_id,
            at: now(),
        });
        tracing::info!(%submission_id, "Retrying summary generation");

        match self.backend.retry_summary().await {
            Ok(summary) => {
                self.page.apply_retry(render_summary(&summary));
                let summary_retryable = self.page.retry_visible();
                tracing::info!(%submission_id, summary_retryable, "Summary retry finished");
                self.emit(JobEvent::RetrySucceeded {
                    submission_id,
                    summary_retryable,
                    at: now(),
                });
            }
            Err(e) => {
                tracing::warn!(%submission_id, error = %e, "Summary retry failed");
                self.page.fail_retry(&e);
                self.emit(JobEvent::RetryFailed {
                    submission_id,
                    error: e.to_string(),
                    at: now(),
                });
            }
        }

        self.page.state()
    }

    /// Click on a timeline tile.
    pub fn activate_timeline_tile(&mut self, index: usize) -> Option<ScrollRequest> {
        self.page.activate_timeline_tile(index).cloned()
    }

    /// Load-failure notification for one rendered image.
    pub fn report_media_failure(&mut self, media: MediaRef) -> bool {
        let Some(locator) = self
            .page
            .view()
            .and_then(|view| view.image(media))
            .map(|image| image.src.clone())
        else {
            return false;
        };
        let marked = self.page.mark_media_missing(media);
        if marked {
            self.emit(JobEvent::MediaMissing { locator, at: now() });
        }
        marked
    }

    /// Probe every by-reference image of the current result and swap in
    /// the placeholder for each one that fails. Returns the failures.
    pub async fn probe_media(&mut self) -> Vec<MissingMedia> {
        let Some(view) = self.page.view() else {
            return Vec::new();
        };
        let targets = probe_targets(view);
        if targets.is_empty() {
            return Vec::new();
        }

        let missing = find_missing(&self.backend, targets).await;
        for item in &missing {
            self.report_media_failure(item.media);
        }
        if !missing.is_empty() {
            tracing::warn!(count = missing.len(), "Some media failed to load");
        }
        missing
    }

    /// The page is going away: fire the cleanup request and return at once.
    ///
    /// The controller never waits for or inspects the request. The handle
    /// is returned so an exiting process can choose to give it a moment.
    pub fn page_hide(&self) -> JoinHandle<()> {
        tracing::debug!("Page hidden, requesting backend cleanup");
        self.emit(JobEvent::CleanupRequested { at: now() });
        self.backend.request_cleanup()
    }

    fn emit(&self, event: JobEvent) {
        let _ = self.event_tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashSet, VecDeque};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use assert_matches::assert_matches;
    use scenecut_core::envelope::{parse_job_envelope, SUMMARY_FAILURE_SENTINEL};
    use scenecut_core::form::JobRequest;
    use scenecut_core::locator::PLACEHOLDER_IMAGE;
    use scenecut_core::payload::{JobPayload, SummaryPayload};
    use scenecut_core::types::Outcome;
    use scenecut_core::validate::normalize_job;

    use super::*;

    /// Backend that replays queued responses and records what it was sent.
    #[derive(Default)]
    struct ScriptedBackend {
        process: Mutex<VecDeque<Result<JobPayload, ClientError>>>,
        retry: Mutex<VecDeque<Result<SummaryPayload, ClientError>>>,
        requests: Mutex<Vec<JobRequest>>,
        retry_calls: AtomicUsize,
        cleanup_calls: AtomicUsize,
        missing: HashSet<String>,
    }

    impl ScriptedBackend {
        fn with_process(self, result: Result<JobPayload, ClientError>) -> Self {
            self.process.lock().unwrap().push_back(result);
            self
        }

        fn with_retry(self, result: Result<SummaryPayload, ClientError>) -> Self {
            self.retry.lock().unwrap().push_back(result);
            self
        }
    }

    impl Backend for ScriptedBackend {
        async fn process(&self, request: &JobRequest) -> Result<JobPayload, ClientError> {
            self.requests.lock().unwrap().push(request.clone());
            self.process
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected process call")
        }

        async fn retry_summary(&self) -> Result<SummaryPayload, ClientError> {
            self.retry_calls.fetch_add(1, Ordering::SeqCst);
            self.retry
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected retry call")
        }

        async fn probe(&self, locator: &str) -> Result<(), ClientError> {
            if self.missing.contains(locator) {
                Err(ClientError::Status {
                    status: 404,
                    body: String::new(),
                })
            } else {
                Ok(())
            }
        }

        fn request_cleanup(&self) -> JoinHandle<()> {
            self.cleanup_calls.fetch_add(1, Ordering::SeqCst);
            tokio::spawn(async {})
        }
    }

    fn payload(json: &str) -> JobPayload {
        match normalize_job(parse_job_envelope(json).unwrap()) {
            Outcome::Success(payload) => payload,
            other => panic!("Expected Success, got {other:?}"),
        }
    }

    fn scenario() -> JobPayload {
        payload(
            r#"{"success":true,
                "clips_and_frames":[{"clip":"c1","frame":"f1"},{"clip":"c2","frames":["f2a","f2b"]}],
                "timeline_frames":[{"clip":"c1","path":"f1","timestamp":0.5}],
                "summary":"Two scenes."}"#,
        )
    }

    fn failed_summary() -> JobPayload {
        payload(&format!(
            r#"{{"success":true,"clips_and_frames":[{{"clip":"c1","frame":"f1"}}],"summary":"{SUMMARY_FAILURE_SENTINEL}"}}"#
        ))
    }

    fn url_form() -> JobForm {
        let mut form = JobForm::new();
        form.set_video_url("https://example.com/watch?v=abc");
        form
    }

    #[tokio::test]
    async fn successful_submission_renders_result() {
        let mut controller = JobController::new(ScriptedBackend::default().with_process(Ok(scenario())));

        let state = controller.submit(&url_form()).await;

        assert_eq!(state, JobState::Success);
        let page = controller.page();
        assert!(!page.loading_visible());
        assert!(page.results_visible());
        assert!(page.error().is_none());
        assert!(!page.retry_visible());

        let view = page.view().unwrap();
        assert_eq!(view.clips.len(), 2);
        assert_eq!(view.clips[0].body.cards().len(), 1);
        assert_eq!(view.clips[1].body.cards().len(), 2);
        assert_eq!(view.timeline.len(), 1);
        assert_eq!(view.timeline[0].label.as_deref(), Some("0.5s"));

        let scroll = controller.activate_timeline_tile(0).unwrap();
        assert_eq!(scroll.anchor, "c1");
    }

    #[tokio::test]
    async fn application_error_shows_envelope_message() {
        let mut controller = JobController::new(
            ScriptedBackend::default()
                .with_process(Err(ClientError::Application("Video unavailable".into()))),
        );

        let state = controller.submit(&url_form()).await;

        assert_eq!(state, JobState::Failed);
        let page = controller.page();
        assert!(!page.loading_visible());
        assert!(!page.results_visible());
        assert_eq!(page.error(), Some("Error: Video unavailable"));
        assert!(page.view().is_none());
    }

    #[tokio::test]
    async fn transport_error_is_reported() {
        let mut controller = JobController::new(ScriptedBackend::default().with_process(Err(
            ClientError::Status {
                status: 502,
                body: "bad gateway".into(),
            },
        )));

        controller.submit(&url_form()).await;

        assert_eq!(
            controller.page().error(),
            Some("Error: Server responded with status 502")
        );
    }

    #[tokio::test]
    async fn invalid_form_fails_without_calling_backend() {
        let mut controller = JobController::new(ScriptedBackend::default());

        let state = controller.submit(&JobForm::new()).await;

        assert_eq!(state, JobState::Failed);
        assert!(controller.page().error().unwrap().starts_with("Error: Validation failed"));
        assert!(controller.backend().requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn custom_settings_toggle_controls_clip_count() {
        let backend = ScriptedBackend::default()
            .with_process(Ok(scenario()))
            .with_process(Ok(scenario()))
            .with_process(Ok(scenario()));
        let mut controller = JobController::new(backend);

        let mut form = url_form();
        form.set_num_clips(Some(5));
        controller.submit(&form).await;

        form.set_custom_settings(true);
        controller.submit(&form).await;

        form.set_custom_settings(false);
        controller.submit(&form).await;

        let counts: Vec<_> = controller
            .backend()
            .requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.num_clips)
            .collect();
        assert_eq!(counts, vec![None, Some(5), None]);
    }

    #[tokio::test]
    async fn resubmission_after_failure_recovers() {
        let backend = ScriptedBackend::default()
            .with_process(Err(ClientError::Application("boom".into())))
            .with_process(Ok(scenario()));
        let mut controller = JobController::new(backend);

        controller.submit(&url_form()).await;
        let first = controller.submission_id();
        let state = controller.submit(&url_form()).await;

        assert_eq!(state, JobState::Success);
        assert!(controller.page().error().is_none());
        assert_ne!(controller.submission_id(), first);
    }

    #[tokio::test]
    async fn retry_refreshes_only_summary() {
        let backend = ScriptedBackend::default()
            .with_process(Ok(failed_summary()))
            .with_retry(Ok(SummaryPayload {
                summary: Some("A person walks.".into()),
                key_points: vec!["walking".into()],
                visual_description: None,
            }));
        let mut controller = JobController::new(backend);

        controller.submit(&url_form()).await;
        assert!(controller.page().retry_visible());
        let clips_before = controller.page().view().unwrap().clips.clone();

        let state = controller.retry_summary().await;

        assert_eq!(state, JobState::RetrySuccess);
        let page = controller.page();
        assert!(!page.retry_visible());
        assert!(!page.loading_visible());
        let view = page.view().unwrap();
        assert_eq!(view.summary.summary, "A person walks.");
        assert_eq!(view.summary.key_points, vec!["walking"]);
        assert_eq!(view.clips, clips_before);
    }

    #[tokio::test]
    async fn failed_retry_can_be_retried() {
        let backend = ScriptedBackend::default()
            .with_process(Ok(failed_summary()))
            .with_retry(Err(ClientError::Application("model offline".into())))
            .with_retry(Ok(SummaryPayload {
                summary: Some("Recovered.".into()),
                ..Default::default()
            }));
        let mut controller = JobController::new(backend);
        controller.submit(&url_form()).await;

        assert_eq!(controller.retry_summary().await, JobState::RetryFailed);
        assert_eq!(controller.page().error(), Some("Error: model offline"));
        assert!(controller.page().retry_visible());
        assert!(controller.page().results_visible());

        assert_eq!(controller.retry_summary().await, JobState::RetrySuccess);
        assert!(controller.page().error().is_none());
        assert_eq!(controller.backend().retry_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn retry_is_ignored_without_sentinel() {
        let mut controller = JobController::new(ScriptedBackend::default().with_process(Ok(scenario())));
        controller.submit(&url_form()).await;

        assert_eq!(controller.retry_summary().await, JobState::Success);
        assert_eq!(controller.backend().retry_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn probe_marks_only_failed_media() {
        let mut backend = ScriptedBackend::default().with_process(Ok(scenario()));
        backend.missing.insert("/download_frame/c2/f2b".to_string());
        let mut controller = JobController::new(backend);
        controller.submit(&url_form()).await;

        let missing = controller.probe_media().await;

        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].media, MediaRef::ClipFrame { clip: 1, frame: 1 });
        let view = controller.page().view().unwrap();
        assert_eq!(view.clips[1].body.cards()[1].image.src, PLACEHOLDER_IMAGE);
        assert_eq!(view.clips[1].body.cards()[0].image.src, "/download_frame/c2/f2a");
        assert_eq!(view.timeline[0].image.src, "/download_frame/c1/f1");
        assert!(controller.page().error().is_none());
    }

    #[tokio::test]
    async fn page_hide_fires_cleanup() {
        let controller = JobController::new(ScriptedBackend::default());
        let mut events = controller.subscribe();

        let handle = controller.page_hide();

        assert_eq!(controller.backend().cleanup_calls.load(Ordering::SeqCst), 1);
        assert_matches!(events.try_recv(), Ok(JobEvent::CleanupRequested { .. }));
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn events_follow_state_machine() {
        let mut controller = JobController::new(
            ScriptedBackend::default().with_process(Err(ClientError::Application("nope".into()))),
        );
        let mut events = controller.subscribe();

        controller.submit(&url_form()).await;

        assert_matches!(events.try_recv(), Ok(JobEvent::Submitting { .. }));
        assert_matches!(
            events.try_recv(),
            Ok(JobEvent::Failed { error, .. }) if error == "nope"
        );
    }
}
