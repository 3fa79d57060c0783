use std::time::Duration;

/// Client configuration loaded from environment variables.
///
/// All fields have defaults suitable for a backend running locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base URL (default: `http://localhost:5000`).
    pub base_url: String,
    /// Timeout for `/process` and `/retry_summary` in seconds (default: `600`).
    /// Processing downloads and segments a whole video, so this is long.
    pub request_timeout_secs: u64,
    /// Timeout for a single media probe in seconds (default: `10`).
    pub probe_timeout_secs: u64,
    /// How long a process that is exiting waits for the cleanup request,
    /// in milliseconds (default: `500`).
    pub cleanup_grace_ms: u64,
}

/// Errors raised while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got {value:?}")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".into(),
            request_timeout_secs: 600,
            probe_timeout_secs: 10,
            cleanup_grace_ms: 500,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                          | Default                 |
    /// |----------------------------------|-------------------------|
    /// | `SCENECUT_BASE_URL`              | `http://localhost:5000` |
    /// | `SCENECUT_REQUEST_TIMEOUT_SECS`  | `600`                   |
    /// | `SCENECUT_PROBE_TIMEOUT_SECS`    | `10`                    |
    /// | `SCENECUT_CLEANUP_GRACE_MS`      | `500`                   |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let base_url = lookup("SCENECUT_BASE_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.base_url);

        let request_timeout_secs = parse_u64(
            &lookup,
            "SCENECUT_REQUEST_TIMEOUT_SECS",
            defaults.request_timeout_secs,
        )?;
        let probe_timeout_secs = parse_u64(
            &lookup,
            "SCENECUT_PROBE_TIMEOUT_SECS",
            defaults.probe_timeout_secs,
        )?;
        let cleanup_grace_ms =
            parse_u64(&lookup, "SCENECUT_CLEANUP_GRACE_MS", defaults.cleanup_grace_ms)?;

        Ok(Self {
            base_url,
            request_timeout_secs,
            probe_timeout_secs,
            cleanup_grace_ms,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn cleanup_grace(&self) -> Duration {
        Duration::from_millis(self.cleanup_grace_ms)
    }
}

fn parse_u64<F>(lookup: &F, var: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            var,
            expected: "a non-negative integer",
            value,
        }),
    }
}
