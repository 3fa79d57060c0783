//! Seam between the job controller and the processing backend.

use std::future::Future;

use scenecut_core::form::JobRequest;
use scenecut_core::payload::{JobPayload, SummaryPayload};
use tokio::task::JoinHandle;

use crate::api::ProcessingApi;
use crate::error::ClientError;

/// Operations the job controller needs from a backend.
///
/// [`ProcessingApi`] is the HTTP implementation; tests substitute scripted
/// backends.
pub trait Backend: Send + Sync {
    /// Submit a job. `Err` covers transport, envelope and decode failures.
    fn process(
        &self,
        request: &JobRequest,
    ) -> impl Future<Output = Result<JobPayload, ClientError>> + Send;

    /// Regenerate the summary of the last job.
    fn retry_summary(&self) -> impl Future<Output = Result<SummaryPayload, ClientError>> + Send;

    /// Check that one media locator loads.
    fn probe(&self, locator: &str) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Start a best-effort cleanup request and return immediately.
    fn request_cleanup(&self) -> JoinHandle<()>;
}

impl Backend for ProcessingApi {
    async fn process(&self, request: &JobRequest) -> Result<JobPayload, ClientError> {
        ProcessingApi::process(self, request).await
    }

    async fn retry_summary(&self) -> Result<SummaryPayload, ClientError> {
        ProcessingApi::retry_summary(self).await
    }

    async fn probe(&self, locator: &str) -> Result<(), ClientError> {
        ProcessingApi::probe(self, locator).await
    }

    fn request_cleanup(&self) -> JoinHandle<()> {
        self.cleanup_detached()
    }
}
