//! # autoflow-github -- Publish workspaces to GitHub
//!
//! Pushes a learner's workspace to a repository owned by the configured
//! account, creating the repository on first publish, and reports the
//! GitHub Pages URL the site is served from.
//!
//! ```no_run
//! # async fn demo() -> Result<(), autoflow_github::GitHubError> {
//! use autoflow_core::FileSet;
//! use autoflow_github::{GitHubClient, GitHubConfig};
//!
//! let client = GitHubClient::new(GitHubConfig::from_env()?)?;
//! let outcome = client
//!     .publish("My First Website", &FileSet::starter(), "Initial commit")
//!     .await?;
//! println!("{}", outcome.deploy_url);
//! # Ok(())
//! # }
//! ```
//!
//! This crate is the only place that talks to GitHub. The API service holds
//! an optional [`GitHubClient`]; without `GITHUB_TOKEN` and `GITHUB_OWNER`
//! publishing is reported as unavailable.

pub mod client;
pub mod config;
pub mod error;
pub mod naming;
pub(crate) mod retry;
pub mod types;

pub use client::GitHubClient;
pub use config::{ConfigError, GitHubConfig};
pub use error::GitHubError;
pub use naming::repository_name;
pub use types::PublishOutcome;
