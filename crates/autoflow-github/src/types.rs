//! Request and response bodies for the GitHub REST endpoints used when
//! publishing. Only the fields the publisher reads are modelled.

use serde::{Deserialize, Serialize};

/// `GET /repos/{owner}/{repo}` and `POST /user/repos` response.
#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub name: String,
    pub full_name: String,
    pub html_url: String,
    #[serde(default)]
    pub default_branch: Option<String>,
}

/// `POST /user/repos` body.
#[derive(Debug, Clone, Serialize)]
pub struct CreateRepositoryRequest<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub private: bool,
    pub auto_init: bool,
}

/// A `{ "sha": ... }` reference to a git object.
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectRef {
    pub sha: String,
}

/// `GET /repos/{o}/{r}/git/ref/heads/{branch}` response.
#[derive(Debug, Clone, Deserialize)]
pub struct GitRef {
    pub object: ObjectRef,
}

/// `GET /repos/{o}/{r}/git/commits/{sha}` response.
#[derive(Debug, Clone, Deserialize)]
pub struct GitCommit {
    pub sha: String,
    pub tree: ObjectRef,
}

/// One blob in a tree, with its content inline.
#[derive(Debug, Clone, Serialize)]
pub struct TreeEntry<'a> {
    pub path: &'a str,
    pub mode: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub content: &'a str,
}

/// `POST /repos/{o}/{r}/git/trees` body.
#[derive(Debug, Clone, Serialize)]
pub struct CreateTreeRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_tree: Option<&'a str>,
    pub tree: Vec<TreeEntry<'a>>,
}

/// `POST /repos/{o}/{r}/git/commits` body.
#[derive(Debug, Clone, Serialize)]
pub struct CreateCommitRequest<'a> {
    pub message: &'a str,
    pub tree: &'a str,
    pub parents: Vec<&'a str>,
}

/// `PATCH /repos/{o}/{r}/git/refs/heads/{branch}` body.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateRefRequest<'a> {
    pub sha: &'a str,
    pub force: bool,
}

/// `POST /repos/{o}/{r}/git/refs` body.
#[derive(Debug, Clone, Serialize)]
pub struct CreateRefRequest<'a> {
    #[serde(rename = "ref")]
    pub reference: String,
    pub sha: &'a str,
}

/// Branch and directory GitHub Pages serves from.
#[derive(Debug, Clone, Serialize)]
pub struct PagesSource<'a> {
    pub branch: &'a str,
    pub path: &'a str,
}

/// `POST /repos/{o}/{r}/pages` body.
#[derive(Debug, Clone, Serialize)]
pub struct EnablePagesRequest<'a> {
    pub source: PagesSource<'a>,
}

/// Result of a successful publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishOutcome {
    /// `owner/repo`.
    pub full_name: String,
    /// Repository web URL.
    pub repository_url: String,
    /// GitHub Pages URL the site will be served from.
    pub deploy_url: String,
    /// SHA of the new commit.
    pub commit_sha: String,
    /// Whether the repository was created by this publish.
    pub created_repository: bool,
}
