//! Publishing a workspace through the Git Data API.
//!
//! A publish is one commit on the configured branch containing every
//! workspace file at the repository root:
//!
//! 1. `GET /repos/{owner}/{repo}`, creating the repository through
//!    `POST /user/repos` (with an initial commit) when it does not exist.
//! 2. `GET /repos/{owner}/{repo}/git/ref/heads/{branch}` and the head commit,
//!    whose tree becomes the base tree.
//! 3. `POST .../git/trees` with inline contents, `POST .../git/commits` with
//!    the head as parent, then `PATCH .../git/refs/heads/{branch}`.
//!
//! 4. `POST .../pages` serving the branch root. A 409 means Pages is
//!    already enabled.
//!
//! When the branch does not exist yet the commit has no parent and the ref
//! is created with `POST .../git/refs` instead.
//!
//! Reads and the ref update are retried on transport failure. POSTs are
//! sent once: a request that timed out may still have been applied.

use std::time::Duration;

use autoflow_core::{FileSet, ValidationError};
use serde::de::DeserializeOwned;

use crate::config::{ConfigError, GitHubConfig};
use crate::error::GitHubError;
use crate::naming::repository_name;
use crate::retry::retry_send;
use crate::types::{
    CreateCommitRequest, CreateRefRequest, CreateRepositoryRequest, CreateTreeRequest,
    EnablePagesRequest, GitCommit, GitRef, ObjectRef, PagesSource, PublishOutcome, Repository,
    TreeEntry, UpdateRefRequest,
};

const USER_AGENT: &str = concat!("autoflow-learn/", env!("CARGO_PKG_VERSION"));
const API_VERSION: &str = "2022-11-28";
const DEFAULT_COMMIT_MESSAGE: &str = "Update from AutoFlow Learn";
const REPOSITORY_DESCRIPTION: &str = "Published from AutoFlow Learn";

/// Client for publishing workspaces to GitHub.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    config: GitHubConfig,
}

impl GitHubClient {
    /// Create a client from configuration.
    pub fn new(config: GitHubConfig) -> Result<Self, GitHubError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::AUTHORIZATION,
            reqwest::header::HeaderValue::from_str(&format!("Bearer {}", config.token))
                .map_err(|_| GitHubError::Config(ConfigError::MissingToken))?,
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            reqwest::header::HeaderValue::from_static(API_VERSION),
        );

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(|e| GitHubError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        Ok(Self { http, config })
    }

    /// The configuration this client was built from.
    pub fn config(&self) -> &GitHubConfig {
        &self.config
    }

    /// Commit `files` to the repository derived from `project_name`.
    pub async fn publish(
        &self,
        project_name: &str,
        files: &FileSet,
        commit_message: &str,
    ) -> Result<PublishOutcome, GitHubError> {
        files.validate()?;
        if files.is_empty() {
            return Err(ValidationError::EmptyField("files").into());
        }
        let repo = repository_name(project_name)?;
        let message = match commit_message.trim() {
            "" => DEFAULT_COMMIT_MESSAGE,
            m => m,
        };

        let (repository, created_repository) = match self.get_repository(&repo).await? {
            Some(existing) => (existing, false),
            None => (self.create_repository(&repo).await?, true),
        };

        let commit_sha = match self.branch_head(&repo).await? {
            Some(head) => {
                let base = self.get_commit(&repo, &head).await?;
                let tree = self.create_tree(&repo, Some(base.tree.sha.as_str()), files).await?;
                let commit = self
                    .create_commit(&repo, message, &tree.sha, vec![base.sha.as_str()])
                    .await?;
                self.update_branch(&repo, &commit.sha).await?;
                commit.sha
            }
            None => {
                let tree = self.create_tree(&repo, None, files).await?;
                let commit = self.create_commit(&repo, message, &tree.sha, vec![]).await?;
                self.create_branch(&repo, &commit.sha).await?;
                commit.sha
            }
        };

        self.enable_pages(&repo).await?;

        tracing::info!(
            repository = %repository.full_name,
            branch = %self.config.branch,
            commit = %commit_sha,
            files = files.len(),
            created_repository,
            "published workspace to GitHub"
        );

        Ok(PublishOutcome {
            deploy_url: self.config.pages_url(&repository.name),
            full_name: repository.full_name,
            repository_url: repository.html_url,
            commit_sha,
            created_repository,
        })
    }

    /// Look up a repository owned by the configured account.
    ///
    /// Calls `GET /repos/{owner}/{repo}`. Returns `None` on 404.
    pub async fn get_repository(&self, repo: &str) -> Result<Option<Repository>, GitHubError> {
        let endpoint = format!("GET /repos/{}/{repo}", self.config.owner);
        let url = self.repo_url(repo, "");
        self.fetch_optional(endpoint, || self.http.get(&url)).await
    }

    /// Create a public repository with an initial commit.
    ///
    /// Calls `POST /user/repos`.
    pub async fn create_repository(&self, repo: &str) -> Result<Repository, GitHubError> {
        let body = CreateRepositoryRequest {
            name: repo,
            description: REPOSITORY_DESCRIPTION,
            private: false,
            auto_init: true,
        };
        let url = self.config.endpoint_url("/user/repos");
        let created: Repository = self
            .submit("POST /user/repos".to_string(), || self.http.post(&url).json(&body))
            .await?;
        tracing::info!(repository = %created.full_name, "created GitHub repository");
        Ok(created)
    }

    /// Serve the configured branch with GitHub Pages.
    ///
    /// Calls `POST /repos/{owner}/{repo}/pages`. A 409 means Pages is already
    /// enabled and counts as success.
    pub async fn enable_pages(&self, repo: &str) -> Result<(), GitHubError> {
        let body = EnablePagesRequest {
            source: PagesSource {
                branch: &self.config.branch,
                path: "/",
            },
        };
        let endpoint = format!("POST /repos/{}/{repo}/pages", self.config.owner);
        let url = self.repo_url(repo, "/pages");
        let resp = self
            .send(&endpoint, Attempts::Once, || self.http.post(&url).json(&body))
            .await?;
        if resp.status() == reqwest::StatusCode::CONFLICT {
            tracing::debug!(repository = %repo, "GitHub Pages already enabled");
            return Ok(());
        }
        let _: serde_json::Value = decode(endpoint, resp).await?;
        tracing::info!(repository = %repo, branch = %self.config.branch, "enabled GitHub Pages");
        Ok(())
    }

    async fn branch_head(&self, repo: &str) -> Result<Option<String>, GitHubError> {
        let path = format!("/git/ref/heads/{}", self.config.branch);
        let endpoint = format!("GET /repos/{}/{repo}{path}", self.config.owner);
        let url = self.repo_url(repo, &path);
        let reference: Option<GitRef> = self.fetch_optional(endpoint, || self.http.get(&url)).await?;
        Ok(reference.map(|r| r.object.sha))
    }

    async fn get_commit(&self, repo: &str, sha: &str) -> Result<GitCommit, GitHubError> {
        let path = format!("/git/commits/{sha}");
        let endpoint = format!("GET /repos/{}/{repo}{path}", self.config.owner);
        let url = self.repo_url(repo, &path);
        self.fetch(endpoint, || self.http.get(&url)).await
    }

    async fn create_tree(
        &self,
        repo: &str,
        base_tree: Option<&str>,
        files: &FileSet,
    ) -> Result<ObjectRef, GitHubError> {
        let body = CreateTreeRequest {
            base_tree,
            tree: files
                .iter()
                .map(|file| TreeEntry {
                    path: &file.name,
                    mode: "100644",
                    kind: "blob",
                    content: &file.content,
                })
                .collect(),
        };
        let endpoint = format!("POST /repos/{}/{repo}/git/trees", self.config.owner);
        let url = self.repo_url(repo, "/git/trees");
        self.submit(endpoint, || self.http.post(&url).json(&body)).await
    }

    async fn create_commit(
        &self,
        repo: &str,
        message: &str,
        tree: &str,
        parents: Vec<&str>,
    ) -> Result<ObjectRef, GitHubError> {
        let body = CreateCommitRequest {
            message,
            tree,
            parents,
        };
        let endpoint = format!("POST /repos/{}/{repo}/git/commits", self.config.owner);
        let url = self.repo_url(repo, "/git/commits");
        self.submit(endpoint, || self.http.post(&url).json(&body)).await
    }

    async fn update_branch(&self, repo: &str, sha: &str) -> Result<(), GitHubError> {
        let body = UpdateRefRequest { sha, force: false };
        let path = format!("/git/refs/heads/{}", self.config.branch);
        let endpoint = format!("PATCH /repos/{}/{repo}{path}", self.config.owner);
        let url = self.repo_url(repo, &path);
        let _: serde_json::Value = self
            .fetch(endpoint, || self.http.patch(&url).json(&body))
            .await?;
        Ok(())
    }

    async fn create_branch(&self, repo: &str, sha: &str) -> Result<(), GitHubError> {
        let body = CreateRefRequest {
            reference: format!("refs/heads/{}", self.config.branch),
            sha,
        };
        let endpoint = format!("POST /repos/{}/{repo}/git/refs", self.config.owner);
        let url = self.repo_url(repo, "/git/refs");
        let _: serde_json::Value = self
            .submit(endpoint, || self.http.post(&url).json(&body))
            .await?;
        Ok(())
    }

    fn repo_url(&self, repo: &str, path: &str) -> String {
        self.config
            .endpoint_url(&format!("/repos/{}/{repo}{path}", self.config.owner))
    }

    async fn send<F>(
        &self,
        endpoint: &str,
        attempts: Attempts,
        request: F,
    ) -> Result<reqwest::Response, GitHubError>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let result = match attempts {
            Attempts::Retry => retry_send(|| request().send()).await,
            Attempts::Once => request().send().await,
        };
        result.map_err(|e| GitHubError::Http {
            endpoint: endpoint.to_string(),
            source: e,
        })
    }

    /// Idempotent request, retried on transport failure.
    async fn fetch<T, F>(&self, endpoint: String, request: F) -> Result<T, GitHubError>
    where
        T: DeserializeOwned,
        F: Fn() -> reqwest::RequestBuilder,
    {
        let resp = self.send(&endpoint, Attempts::Retry, request).await?;
        decode(endpoint, resp).await
    }

    /// Request that creates something, sent exactly once.
    async fn submit<T, F>(&self, endpoint: String, request: F) -> Result<T, GitHubError>
    where
        T: DeserializeOwned,
        F: Fn() -> reqwest::RequestBuilder,
    {
        let resp = self.send(&endpoint, Attempts::Once, request).await?;
        decode(endpoint, resp).await
    }

    async fn fetch_optional<T, F>(&self, endpoint: String, request: F) -> Result<Option<T>, GitHubError>
    where
        T: DeserializeOwned,
        F: Fn() -> reqwest::RequestBuilder,
    {
        let resp = self.send(&endpoint, Attempts::Retry, request).await?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        decode(endpoint, resp).await.map(Some)
    }
}

#[derive(Debug, Clone, Copy)]
enum Attempts {
    Retry,
    Once,
}

async fn decode<T: DeserializeOwned>(
    endpoint: String,
    resp: reqwest::Response,
) -> Result<T, GitHubError> {
    if !resp.status().is_success() {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        return Err(GitHubError::Api {
            endpoint,
            status,
            body,
        });
    }
    resp.json().await.map_err(|e| GitHubError::Deserialization {
        endpoint,
        source: e,
    })
}
