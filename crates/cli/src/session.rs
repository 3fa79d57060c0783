//! One run of the tool: submit, probe, optionally retry and download.

use std::path::{Path, PathBuf};

use scenecut_client::api::ProcessingApi;
use scenecut_client::controller::JobController;
use scenecut_client::download::download_clip;
use scenecut_core::form::JobForm;
use scenecut_core::page::JobState;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionOptions {
    /// Check every by-reference image after rendering.
    pub probe_media: bool,
    /// Retry summary generation once when it came back failed.
    pub retry_summary: bool,
    /// Download every clip into this directory.
    pub download_dir: Option<PathBuf>,
}

#[derive(Debug)]
pub struct SessionReport {
    pub state: JobState,
    pub missing_media: usize,
    pub downloaded: Vec<PathBuf>,
    pub failed_downloads: usize,
}

/// Drive `controller` through one submission.
///
/// Every failure ends up on the page; the report only counts what happened.
pub async fn run(
    controller: &mut JobController<ProcessingApi>,
    form: &JobForm,
    options: &SessionOptions,
) -> SessionReport {
    let mut report = SessionReport {
        state: controller.submit(form).await,
        missing_media: 0,
        downloaded: Vec::new(),
        failed_downloads: 0,
    };
    if !report.state.has_result() {
        return report;
    }

    if options.probe_media {
        report.missing_media = controller.probe_media().await.len();
    }

    if options.retry_summary && controller.page().can_retry_summary() {
        report.state = controller.retry_summary().await;
    }

    if let Some(dir) = &options.download_dir {
        download_clips(controller, dir, &mut report).await;
    }

    report
}

async fn download_clips(
    controller: &JobController<ProcessingApi>,
    dir: &Path,
    report: &mut SessionReport,
) {
    let Some(view) = controller.page().view() else {
        return;
    };
    let clips: Vec<String> = view
        .clips
        .iter()
        .filter(|region| region.download.is_some())
        .filter_map(|region| region.clip.clone())
        .collect();

    for clip in clips {
        match download_clip(controller.backend(), &clip, dir).await {
            Ok(path) => report.downloaded.push(path),
            Err(e) => {
                tracing::warn!(clip = %clip, error = %e, "Clip download failed");
                report.failed_downloads += 1;
            }
        }
    }
}
