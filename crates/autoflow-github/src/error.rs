//! GitHub client error types.

/// Errors from publishing to GitHub.
#[derive(Debug, thiserror::Error)]
pub enum GitHubError {
    /// HTTP transport error.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// GitHub returned a non-2xx status.
    #[error("GitHub API {endpoint} returned {status}: {body}")]
    Api {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// Response deserialization failed.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The project name does not yield a usable repository name.
    #[error("cannot derive a repository name from \"{0}\"")]
    InvalidRepositoryName(String),
    /// The file set failed validation before any request was made.
    #[error("invalid file set: {0}")]
    Validation(#[from] autoflow_core::ValidationError),
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] super::config::ConfigError),
}

impl GitHubError {
    /// HTTP status returned by GitHub, if the failure was an API response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
