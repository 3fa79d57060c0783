//! Command-line arguments.

use std::path::PathBuf;

use clap::{ArgGroup, Parser};
use scenecut_client::config::ClientConfig;
use scenecut_core::form::JobForm;

use crate::session::SessionOptions;

#[derive(Debug, Parser)]
#[command(name = "scenecut")]
#[command(about = "Split a video into scene clips, then show its timeline and summary")]
#[command(group(ArgGroup::new("source").required(true).args(["url", "file"])))]
pub struct Args {
    /// Backend base URL (overrides SCENECUT_BASE_URL)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Remote video URL to process
    #[arg(long)]
    pub url: Option<String>,

    /// Local video file to upload
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Number of clips to produce (enables custom settings)
    #[arg(long)]
    pub clips: Option<u32>,

    /// Download every clip into this directory
    #[arg(long)]
    pub download_dir: Option<PathBuf>,

    /// Skip checking that frame images load
    #[arg(long)]
    pub no_probe: bool,

    /// Retry summary generation once if it failed
    #[arg(long)]
    pub retry_summary: bool,

    /// Print the page as JSON instead of text
    #[arg(long)]
    pub json: bool,
}

impl Args {
    /// Fill a form the way a user would: URL or file, and the custom
    /// settings toggle only when a clip count was given.
    pub fn to_form(&self) -> JobForm {
        let mut form = JobForm::new();
        if let Some(url) = &self.url {
            form.set_video_url(url.as_str());
        }
        if let Some(file) = &self.file {
            form.set_video_file(file.clone());
        }
        if let Some(clips) = self.clips {
            form.set_custom_settings(true);
            form.set_num_clips(Some(clips));
        }
        form
    }

    /// Apply command-line overrides to the environment configuration.
    pub fn apply_to(&self, config: &mut ClientConfig) {
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            probe_media: !self.no_probe,
            retry_summary: self.retry_summary,
            download_dir: self.download_dir.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use scenecut_core::form::MediaSource;

    use super::*;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("scenecut").chain(args.iter().copied()))
    }

    #[test]
    fn url_without_clips_omits_custom_settings() {
        let args = parse(&["--url", "https://example.com/v"]).unwrap();
        let request = args.to_form().snapshot().unwrap();
        assert_eq!(request.source, MediaSource::Url("https://example.com/v".into()));
        assert_eq!(request.num_clips, None);
    }

    #[test]
    fn clips_flag_enables_custom_settings() {
        let args = parse(&["--file", "movie.mp4", "--clips", "8"]).unwrap();
        let form = args.to_form();
        assert!(form.custom_settings());
        let request = form.snapshot().unwrap();
        assert_eq!(request.source, MediaSource::File("movie.mp4".into()));
        assert_eq!(request.num_clips, Some(8));
    }

    #[test]
    fn a_source_is_required() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["--clips", "3"]).is_err());
    }

    #[test]
    fn url_and_file_are_exclusive() {
        assert!(parse(&["--url", "https://example.com/v", "--file", "a.mp4"]).is_err());
    }

    #[test]
    fn base_url_override_wins() {
        let args = parse(&["--url", "u", "--base-url", "http://media:9000/"]).unwrap();
        let mut config = ClientConfig::default();
        args.apply_to(&mut config);
        assert_eq!(config.base_url, "http://media:9000");
    }

    #[test]
    fn session_options_follow_flags() {
        let args = parse(&["--url", "u", "--no-probe", "--retry-summary", "--download-dir", "out"]).unwrap();
        let options = args.session_options();
        assert!(!options.probe_media);
        assert!(options.retry_summary);
        assert_eq!(options.download_dir, Some(PathBuf::from("out")));
    }
}
