//! `scenecut` -- submit a video to the processing backend and print the
//! resulting timeline, clips and summary.
//!
//! # Environment variables
//!
//! | Variable                        | Default                 | Description                          |
//! |---------------------------------|-------------------------|--------------------------------------|
//! | `SCENECUT_BASE_URL`             | `http://localhost:5000` | Processing backend                   |
//! | `SCENECUT_REQUEST_TIMEOUT_SECS` | `600`                   | Timeout for processing and retry     |
//! | `SCENECUT_PROBE_TIMEOUT_SECS`   | `10`                    | Timeout for one media probe          |
//! | `SCENECUT_CLEANUP_GRACE_MS`     | `500`                   | Wait for the cleanup request on exit |
//! | `RUST_LOG`                      | `scenecut=info,...`     | Log filter                           |

use std::process::ExitCode;

use clap::Parser;
use scenecut_cli::args::Args;
use scenecut_cli::output::PageReport;
use scenecut_cli::session;
use scenecut_client::api::ProcessingApi;
use scenecut_client::config::ClientConfig;
use scenecut_client::controller::JobController;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Exit code after Ctrl-C, as shells report for SIGINT.
const EXIT_INTERRUPTED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scenecut=info,scenecut_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let mut config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    args.apply_to(&mut config);

    let api = match ProcessingApi::from_config(&config) {
        Ok(api) => api,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build HTTP client");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(base_url = %config.base_url, "Starting scenecut");

    let mut controller = JobController::new(api);
    let form = args.to_form();
    let options = args.session_options();

    let report = tokio::select! {
        report = session::run(&mut controller, &form, &options) => Some(report),
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted, abandoning the current request");
            None
        }
    };

    if args.json {
        match serde_json::to_string_pretty(controller.page()) {
            Ok(json) => println!("{json}"),
            Err(e) => tracing::error!(error = %e, "Failed to serialize page"),
        }
    } else {
        print!("{}", PageReport::new(controller.page()).with_base_url(&config.base_url));
    }

    if let Some(report) = &report {
        for path in &report.downloaded {
            tracing::info!(path = %path.display(), "Saved clip");
        }
        if report.missing_media > 0 || report.failed_downloads > 0 {
            tracing::warn!(
                missing_media = report.missing_media,
                failed_downloads = report.failed_downloads,
                "Run finished with missing artifacts",
            );
        }
    }

    let cleanup = controller.page_hide();
    if tokio::time::timeout(config.cleanup_grace(), cleanup).await.is_err() {
        tracing::debug!("Cleanup request still pending at exit");
    }

    match report {
        Some(report) if report.state.has_result() => ExitCode::SUCCESS,
        Some(_) => ExitCode::FAILURE,
        None => ExitCode::from(EXIT_INTERRUPTED),
    }
}
