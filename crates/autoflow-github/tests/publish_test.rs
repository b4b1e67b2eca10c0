//! Contract tests for `GitHubClient::publish` against the GitHub REST API.
//!
//! ## Endpoints Exercised
//!
//! | Method | Path | Test |
//! |--------|------|------|
//! | GET    | `/repos/{owner}/{repo}` | all |
//! | POST   | `/user/repos` | `publish_creates_missing_repository` |
//! | GET    | `/repos/{owner}/{repo}/git/ref/heads/main` | all |
//! | GET    | `/repos/{owner}/{repo}/git/commits/{sha}` | `publish_*` |
//! | POST   | `/repos/{owner}/{repo}/git/trees` | `publish_*` |
//! | POST   | `/repos/{owner}/{repo}/git/commits` | `publish_*` |
//! | PATCH  | `/repos/{owner}/{repo}/git/refs/heads/main` | `publish_*` |
//! | POST   | `/repos/{owner}/{repo}/git/refs` | `publish_to_empty_repository_creates_branch` |
//! | POST   | `/repos/{owner}/{repo}/pages` | `publish_*`, `*_pages_*` |

use std::time::Duration;

use autoflow_core::{FileSet, SourceFile};
use autoflow_github::{GitHubClient, GitHubConfig, GitHubError};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(mock_server: &MockServer) -> GitHubClient {
    let config = GitHubConfig::local_mock(&mock_server.uri(), "octo", "test-token").unwrap();
    GitHubClient::new(config).unwrap()
}

fn repo_json() -> serde_json::Value {
    json!({
        "name": "my-site",
        "full_name": "octo/my-site",
        "html_url": "https://github.com/octo/my-site",
        "default_branch": "main"
    })
}

async fn mount_existing_repo(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/repos/octo/my-site"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(repo_json()))
        .mount(server)
        .await;
}

async fn mount_pages(server: &MockServer, status: u16) {
    Mock::given(method("POST"))
        .and(path("/repos/octo/my-site/pages"))
        .and(body_partial_json(json!({ "source": { "branch": "main", "path": "/" } })))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({
            "url": "https://api.github.com/repos/octo/my-site/pages",
            "html_url": "https://octo.github.io/my-site/"
        })))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_commit_flow(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/repos/octo/my-site/git/ref/heads/main"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ref": "refs/heads/main",
            "object": { "sha": "head-sha", "type": "commit" }
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/my-site/git/commits/head-sha"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sha": "head-sha",
            "tree": { "sha": "base-tree-sha" }
        })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/repos/octo/my-site/git/trees"))
        .and(body_partial_json(json!({ "base_tree": "base-tree-sha" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "sha": "new-tree-sha" })))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/repos/octo/my-site/git/commits"))
        .and(body_partial_json(json!({
            "message": "Initial commit",
            "tree": "new-tree-sha",
            "parents": ["head-sha"]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "sha": "new-commit-sha" })))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/repos/octo/my-site/git/refs/heads/main"))
        .and(body_partial_json(json!({ "sha": "new-commit-sha", "force": false })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ref": "refs/heads/main",
            "object": { "sha": "new-commit-sha" }
        })))
        .expect(1)
        .mount(server)
        .await;
}

// ── Existing repository ─────────────────────────────────────────────

#[tokio::test]
async fn publish_commits_to_existing_repository() {
    let server = MockServer::start().await;
    mount_existing_repo(&server).await;
    mount_commit_flow(&server).await;
    mount_pages(&server, 201).await;

    let client = test_client(&server);
    let outcome = client
        .publish("My Site", &FileSet::starter(), "Initial commit")
        .await
        .unwrap();

    assert_eq!(outcome.full_name, "octo/my-site");
    assert_eq!(outcome.repository_url, "https://github.com/octo/my-site");
    assert_eq!(outcome.deploy_url, "https://octo.github.io/my-site/");
    assert_eq!(outcome.commit_sha, "new-commit-sha");
    assert!(!outcome.created_repository);
}

#[tokio::test]
async fn publish_sends_inline_blobs() {
    let server = MockServer::start().await;
    mount_existing_repo(&server).await;
    mount_commit_flow(&server).await;
    mount_pages(&server, 201).await;

    let client = test_client(&server);
    client
        .publish("my-site", &FileSet::starter(), "Initial commit")
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let tree_request = requests
        .iter()
        .find(|r| r.url.path() == "/repos/octo/my-site/git/trees")
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&tree_request.body).unwrap();
    let entries = body["tree"].as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["path"], "index.html");
    assert_eq!(entries[0]["mode"], "100644");
    assert_eq!(entries[0]["type"], "blob");
    assert!(entries[0]["content"].as_str().unwrap().contains("<!DOCTYPE html>"));
}

// ── Missing repository ──────────────────────────────────────────────

#[tokio::test]
async fn publish_creates_missing_repository() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/my-site"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Not Found" })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/user/repos"))
        .and(body_partial_json(json!({ "name": "my-site", "auto_init": true })))
        .respond_with(ResponseTemplate::new(201).set_body_json(repo_json()))
        .expect(1)
        .mount(&server)
        .await;

    mount_commit_flow(&server).await;
    mount_pages(&server, 201).await;

    let client = test_client(&server);
    let outcome = client
        .publish("my site", &FileSet::starter(), "Initial commit")
        .await
        .unwrap();
    assert!(outcome.created_repository);
    assert_eq!(outcome.commit_sha, "new-commit-sha");
}

#[tokio::test]
async fn publish_to_empty_repository_creates_branch() {
    let server = MockServer::start().await;
    mount_existing_repo(&server).await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/my-site/git/ref/heads/main"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/repos/octo/my-site/git/trees"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "sha": "tree-sha" })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/repos/octo/my-site/git/commits"))
        .and(body_partial_json(json!({ "parents": [] })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "sha": "root-sha" })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/repos/octo/my-site/git/refs"))
        .and(body_partial_json(json!({ "ref": "refs/heads/main", "sha": "root-sha" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "ref": "refs/heads/main" })))
        .expect(1)
        .mount(&server)
        .await;

    mount_pages(&server, 201).await;

    let client = test_client(&server);
    let outcome = client
        .publish("my-site", &FileSet::starter(), "")
        .await
        .unwrap();
    assert_eq!(outcome.commit_sha, "root-sha");

    let requests = server.received_requests().await.unwrap();
    let tree_request = requests
        .iter()
        .find(|r| r.url.path() == "/repos/octo/my-site/git/trees")
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&tree_request.body).unwrap();
    assert!(body.get("base_tree").is_none());
}

// ── GitHub Pages ────────────────────────────────────────────────────

#[tokio::test]
async fn publish_enables_pages_after_the_commit_lands() {
    let server = MockServer::start().await;
    mount_existing_repo(&server).await;
    mount_commit_flow(&server).await;
    mount_pages(&server, 201).await;

    let client = test_client(&server);
    client
        .publish("my-site", &FileSet::starter(), "Initial commit")
        .await
        .unwrap();

    let paths: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| r.url.path().to_string())
        .collect();
    let ref_update = paths
        .iter()
        .position(|p| p == "/repos/octo/my-site/git/refs/heads/main")
        .unwrap();
    let pages = paths
        .iter()
        .position(|p| p == "/repos/octo/my-site/pages")
        .unwrap();
    assert!(pages > ref_update);
}

#[tokio::test]
async fn already_enabled_pages_is_not_an_error() {
    let server = MockServer::start().await;
    mount_existing_repo(&server).await;
    mount_commit_flow(&server).await;
    mount_pages(&server, 409).await;

    let client = test_client(&server);
    let outcome = client
        .publish("my-site", &FileSet::starter(), "Initial commit")
        .await
        .unwrap();
    assert_eq!(outcome.deploy_url, "https://octo.github.io/my-site/");
}

#[tokio::test]
async fn pages_failure_fails_the_publish() {
    let server = MockServer::start().await;
    mount_existing_repo(&server).await;
    mount_commit_flow(&server).await;

    Mock::given(method("POST"))
        .and(path("/repos/octo/my-site/pages"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Resource not accessible"))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = client
        .publish("my-site", &FileSet::starter(), "Initial commit")
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(403));
    assert!(err.to_string().contains("POST /repos/octo/my-site/pages"));
}

// ── Failures ────────────────────────────────────────────────────────

#[tokio::test]
async fn timed_out_creates_are_not_resent() {
    let server = MockServer::start().await;
    mount_existing_repo(&server).await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/my-site/git/ref/heads/main"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/repos/octo/my-site/git/trees"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "sha": "tree-sha" }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let mut config = GitHubConfig::local_mock(&server.uri(), "octo", "test-token").unwrap();
    config.timeout_secs = 1;
    let client = GitHubClient::new(config).unwrap();

    let err = client
        .publish("my-site", &FileSet::starter(), "msg")
        .await
        .unwrap_err();
    assert!(matches!(err, GitHubError::Http { .. }));

    let tree_posts = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/repos/octo/my-site/git/trees")
        .count();
    assert_eq!(tree_posts, 1);
}

#[tokio::test]
async fn api_errors_surface_status_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/my-site"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Bad credentials"))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = client
        .publish("my-site", &FileSet::starter(), "msg")
        .await
        .unwrap_err();
    match err {
        GitHubError::Api {
            endpoint,
            status,
            body,
        } => {
            assert_eq!(endpoint, "GET /repos/octo/my-site");
            assert_eq!(status, 401);
            assert_eq!(body, "Bad credentials");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn invalid_files_are_rejected_before_any_request() {
    let server = MockServer::start().await;
    let client = test_client(&server);

    let files = FileSet::from(vec![SourceFile::new("../escape.sh", "x")]);
    let err = client.publish("my-site", &files, "msg").await.unwrap_err();
    assert!(matches!(err, GitHubError::Validation(_)));

    let err = client
        .publish("my-site", &FileSet::new(), "msg")
        .await
        .unwrap_err();
    assert!(matches!(err, GitHubError::Validation(_)));

    let err = client
        .publish("???", &FileSet::starter(), "msg")
        .await
        .unwrap_err();
    assert!(matches!(err, GitHubError::InvalidRepositoryName(_)));

    assert!(server.received_requests().await.unwrap().is_empty());
}
