use std::path::PathBuf;

use scenecut_core::error::CoreError;

/// Errors from talking to the processing backend.
///
/// Every variant ends up as the single top-level error message on the page;
/// the `Display` text is what the user reads after the `"Error: "` prefix.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("Server responded with status {status}")]
    Status {
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The envelope said `success: false`.
    #[error("{0}")]
    Application(String),

    /// The body was not a valid response envelope.
    #[error("Invalid response from server: {0}")]
    Decode(#[from] serde_json::Error),

    /// The form could not be turned into a request.
    #[error(transparent)]
    Form(#[from] CoreError),

    /// Reading an upload or writing a download failed.
    #[error("File error: {0}")]
    Io(#[from] std::io::Error),

    /// An artifact identifier that cannot be used as a local file name.
    #[error("Invalid artifact name: {0:?}")]
    InvalidArtifactName(String),

    /// A download would replace a file already in the target directory.
    #[error("File already exists: {}", .0.display())]
    ArtifactExists(PathBuf),
}
