//! GitHub client configuration.
//!
//! Read from the environment at startup. The API base URL can point at a
//! GitHub Enterprise instance or a local mock server.

use url::Url;

/// Default REST endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Configuration for publishing to GitHub.
///
/// Custom `Debug` implementation redacts the `token` field.
#[derive(Clone)]
pub struct GitHubConfig {
    /// REST API base URL.
    pub api_url: Url,
    /// Personal access token or app token with `repo` scope.
    pub token: String,
    /// Account that owns published repositories.
    pub owner: String,
    /// Branch that receives commits and serves Pages.
    pub branch: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("api_url", &self.api_url)
            .field("token", &"[REDACTED]")
            .field("owner", &self.owner)
            .field("branch", &self.branch)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl GitHubConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `GITHUB_TOKEN` (required)
    /// - `GITHUB_OWNER` (required)
    /// - `GITHUB_API_URL` (default: `https://api.github.com`)
    /// - `GITHUB_BRANCH` (default: `main`)
    /// - `GITHUB_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        let token = non_empty_var("GITHUB_TOKEN").ok_or(ConfigError::MissingToken)?;
        let owner = non_empty_var("GITHUB_OWNER").ok_or(ConfigError::MissingOwner)?;

        Ok(Self {
            api_url: env_url("GITHUB_API_URL", DEFAULT_API_URL)?,
            token,
            owner,
            branch: non_empty_var("GITHUB_BRANCH").unwrap_or_else(|| "main".to_string()),
            timeout_secs: std::env::var("GITHUB_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
        })
    }

    /// Configuration pointing at a mock server (for testing).
    pub fn local_mock(api_url: &str, owner: &str, token: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: Url::parse(api_url)
                .map_err(|e| ConfigError::InvalidUrl(api_url.to_string(), e.to_string()))?,
            token: token.to_string(),
            owner: owner.to_string(),
            branch: "main".to_string(),
            timeout_secs: 5,
        })
    }

    /// `https://{owner}.github.io/{repo}/`
    pub fn pages_url(&self, repo: &str) -> String {
        format!("https://{}.github.io/{repo}/", self.owner.to_ascii_lowercase())
    }

    /// API URL for `path`, which must start with `/`.
    pub(crate) fn endpoint_url(&self, path: &str) -> String {
        format!("{}{path}", self.api_url.as_str().trim_end_matches('/'))
    }
}

fn non_empty_var(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}

fn env_url(var: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_string());
    Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("GITHUB_TOKEN environment variable is required")]
    MissingToken,
    #[error("GITHUB_OWNER environment variable is required")]
    MissingOwner,
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_token() {
        let cfg = GitHubConfig::local_mock("http://127.0.0.1:9000", "octo", "ghp_secret").unwrap();
        let debug = format!("{cfg:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("ghp_secret"));
    }

    #[test]
    fn pages_url_lowercases_owner() {
        let cfg = GitHubConfig::local_mock("http://127.0.0.1:9000", "OctoCat", "t").unwrap();
        assert_eq!(cfg.pages_url("my-site"), "https://octocat.github.io/my-site/");
    }

    #[test]
    fn endpoint_url_joins_without_double_slash() {
        let cfg = GitHubConfig::local_mock("http://127.0.0.1:9000/", "o", "t").unwrap();
        assert_eq!(cfg.endpoint_url("/user/repos"), "http://127.0.0.1:9000/user/repos");
    }

    #[test]
    fn env_url_uses_default_when_var_absent() {
        let url = env_url("AUTOFLOW_NONEXISTENT_VAR_12345", DEFAULT_API_URL).unwrap();
        assert_eq!(url.as_str(), "https://api.github.com/");
    }

    #[test]
    fn local_mock_rejects_invalid_url() {
        assert!(matches!(
            GitHubConfig::local_mock("not a url", "o", "t"),
            Err(ConfigError::InvalidUrl(..))
        ));
    }
}
