//! Clip and frame artifact downloads.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use scenecut_core::locator::{clip_download_url, frame_url};

use crate::api::ProcessingApi;
use tokio::io::AsyncWriteExt;

use crate::error::ClientError;

/// Local file name for a backend artifact identifier.
///
/// Identifiers may be relative server paths; only the last segment is
/// kept. Empty names and `.`/`..` are rejected. Two identifiers can share a
/// last segment, so downloads never replace an existing file.
pub fn artifact_file_name(identifier: &str) -> Result<String, ClientError> {
    let name = identifier
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .trim();
    if name.is_empty() || name == "." || name == ".." {
        return Err(ClientError::InvalidArtifactName(identifier.to_string()));
    }
    Ok(name.to_string())
}

/// Download a clip into `dir`. Returns the written path.
pub async fn download_clip(
    api: &ProcessingApi,
    clip: &str,
    dir: &Path,
) -> Result<PathBuf, ClientError> {
    let target = dir.join(artifact_file_name(clip)?);
    let bytes = api.fetch_artifact(&clip_download_url(clip)).await?;
    write_new(&target, &bytes).await?;

    tracing::info!(clip, path = %target.display(), bytes = bytes.len(), "Clip downloaded");
    Ok(target)
}

/// Download one frame of a clip into `dir`. Returns the written path.
pub async fn download_frame(
    api: &ProcessingApi,
    clip: &str,
    frame: &str,
    dir: &Path,
) -> Result<PathBuf, ClientError> {
    let target = dir.join(artifact_file_name(frame)?);
    let bytes = api.fetch_artifact(&frame_url(clip, frame)).await?;
    write_new(&target, &bytes).await?;

    tracing::debug!(clip, frame, path = %target.display(), "Frame downloaded");
    Ok(target)
}

/// Write `bytes` to a file that must not exist yet, creating parent
/// directories as needed.
async fn write_new(target: &Path, bytes: &[u8]) -> Result<(), ClientError> {
    if let Some(dir) = target.parent() {
        tokio::fs::create_dir_all(dir).await?;
    }
    let mut file = match tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)
        .await
    {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            tracing::warn!(path = %target.display(), "Refusing to overwrite existing file");
            return Err(ClientError::ArtifactExists(target.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };
    file.write_all(bytes).await?;
    file.flush().await?;
    Ok(())
}
