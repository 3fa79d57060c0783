//! REST client for the processing backend.
//!
//! Wraps the backend's HTTP endpoints (job submission, summary retry,
//! cleanup, artifact downloads) using [`reqwest`].

use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use scenecut_core::envelope::{parse_job_envelope, parse_retry_envelope};
use scenecut_core::form::{JobRequest, MediaSource};
use scenecut_core::payload::{JobPayload, SummaryPayload};
use scenecut_core::types::Outcome;
use scenecut_core::validate::{normalize_job, normalize_retry};

use crate::config::ClientConfig;
use crate::error::ClientError;

/// Multipart field carrying a remote video URL.
pub const FIELD_VIDEO_URL: &str = "youtube_url";
/// Multipart field carrying an uploaded video file.
pub const FIELD_VIDEO_FILE: &str = "video_file";
/// Multipart field carrying the custom clip count.
pub const FIELD_NUM_CLIPS: &str = "num_clips";

/// HTTP client for one processing backend.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct ProcessingApi {
    client: reqwest::Client,
    base_url: String,
    probe_timeout: Duration,
}

impl ProcessingApi {
    /// Create a new API client.
    ///
    /// * `base_url` - Backend base URL, e.g. `http://host:5000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            probe_timeout: ClientConfig::default().probe_timeout(),
        }
    }

    /// Build a client with the timeouts from `config`.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        let mut api = Self::with_client(client, config.base_url.clone());
        api.probe_timeout = config.probe_timeout();
        Ok(api)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a root-relative locator such as `/download/x.mp4`.
    pub fn resolve(&self, locator: &str) -> String {
        format!("{}{}", self.base_url, locator)
    }

    /// Submit a processing job.
    ///
    /// Sends a multipart `POST /process`. The URL field is always present
    /// (empty for file uploads); `num_clips` only when the request carries
    /// one.
    pub async fn process(&self, request: &JobRequest) -> Result<JobPayload, ClientError> {
        let form = build_form(request).await?;

        let response = self
            .client
            .post(self.resolve("/process"))
            .multipart(form)
            .send()
            .await?;

        let text = Self::read_body(response).await?;
        match normalize_job(parse_job_envelope(&text)?) {
            Outcome::Success(payload) => Ok(payload),
            Outcome::Failure(message) => Err(ClientError::Application(message)),
        }
    }

    /// Ask the backend to regenerate the summary of the last job.
    ///
    /// Sends `POST /retry_summary` with an empty JSON object.
    pub async fn retry_summary(&self) -> Result<SummaryPayload, ClientError> {
        let response = self
            .client
            .post(self.resolve("/retry_summary"))
            .json(&serde_json::json!({}))
            .send()
            .await?;

        let text = Self::read_body(response).await?;
        match normalize_retry(parse_retry_envelope(&text)?) {
            Outcome::Success(summary) => Ok(summary),
            Outcome::Failure(message) => Err(ClientError::Application(message)),
        }
    }

    /// Tell the backend to delete its temporary files.
    pub async fn cleanup(&self) -> Result<(), ClientError> {
        let response = self.client.post(self.resolve("/cleanup")).send().await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    /// Fire a cleanup request without waiting for it.
    ///
    /// The outcome is only logged. The returned handle may be dropped; the
    /// request then completes (or is lost) on its own.
    pub fn cleanup_detached(&self) -> tokio::task::JoinHandle<()> {
        let api = self.clone();
        tokio::spawn(async move {
            match api.cleanup().await {
                Ok(()) => tracing::debug!("Backend cleanup acknowledged"),
                Err(e) => tracing::debug!(error = %e, "Backend cleanup failed"),
            }
        })
    }

    /// Check that a media locator resolves, without downloading it.
    ///
    /// Sends `HEAD {locator}` with the probe timeout.
    pub async fn probe(&self, locator: &str) -> Result<(), ClientError> {
        let response = self
            .client
            .head(self.resolve(locator))
            .timeout(self.probe_timeout)
            .send()
            .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    /// Fetch an artifact (clip or frame) into memory.
    pub async fn fetch_artifact(&self, locator: &str) -> Result<Vec<u8>, ClientError> {
        let response = self.client.get(self.resolve(locator)).send().await?;
        let response = Self::ensure_success(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`ClientError::Status`]
    /// containing the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Read the body of a successful response as text.
    async fn read_body(response: reqwest::Response) -> Result<String, ClientError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.text().await?)
    }
}

/// Build the multipart body for `/process`.
async fn build_form(request: &JobRequest) -> Result<Form, ClientError> {
    let mut form = match &request.source {
        MediaSource::Url(url) => Form::new().text(FIELD_VIDEO_URL, url.clone()),
        MediaSource::File(path) => {
            let data = tokio::fs::read(path).await?;
            let part = Part::bytes(data).file_name(upload_file_name(path));
            Form::new()
                .text(FIELD_VIDEO_URL, String::new())
                .part(FIELD_VIDEO_FILE, part)
        }
    };

    if let Some(n) = request.num_clips {
        form = form.text(FIELD_NUM_CLIPS, n.to_string());
    }
    Ok(form)
}

fn upload_file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload.mp4".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_joins_without_double_slash() {
        let api = ProcessingApi::new("http://localhost:5000/");
        assert_eq!(api.base_url(), "http://localhost:5000");
        assert_eq!(
            api.resolve("/download/a%20b.mp4"),
            "http://localhost:5000/download/a%20b.mp4"
        );
    }

    #[test]
    fn upload_name_uses_last_path_component() {
        assert_eq!(upload_file_name(Path::new("/videos/holiday.mp4")), "holiday.mp4");
        assert_eq!(upload_file_name(Path::new("/")), "upload.mp4");
    }
}
