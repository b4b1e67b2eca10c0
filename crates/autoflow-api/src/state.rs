//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! ## Architecture
//!
//! - **Catalog**: read-only tutorial catalog, loaded once at startup.
//! - **Users / Progress / Projects**: in-memory stores, written through to
//!   PostgreSQL when `DATABASE_URL` is set and hydrated from it on startup.
//! - **Composer**: the preview composer with the service's content policy.
//! - **GitHub client**: optional; push returns 503 without it.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;

use autoflow_core::{Catalog, CatalogError, FileSet, ProgressBook, Username};
use autoflow_github::GitHubClient;
use autoflow_preview::PreviewComposer;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::middleware::rate_limit::RateLimitConfig;

// -- Generic In-Memory Store --------------------------------------------------

/// Thread-safe, cloneable in-memory key-value store.
///
/// All operations are synchronous (`parking_lot::RwLock`, not
/// `tokio::sync`); the lock is never held across `.await` points.
#[derive(Debug)]
pub struct Store<T: Clone + Send + Sync> {
    data: Arc<RwLock<HashMap<Uuid, T>>>,
}

impl<T: Clone + Send + Sync> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<T: Clone + Send + Sync> Store<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a record, returning the previous value if the key existed.
    pub fn insert(&self, id: Uuid, value: T) -> Option<T> {
        self.data.write().insert(id, value)
    }

    /// Retrieve a record by ID.
    pub fn get(&self, id: &Uuid) -> Option<T> {
        self.data.read().get(id).cloned()
    }

    /// List all records.
    pub fn list(&self) -> Vec<T> {
        self.data.read().values().cloned().collect()
    }

    /// Update a record in place. Returns the updated record, or `None` if not found.
    pub fn update(&self, id: &Uuid, f: impl FnOnce(&mut T)) -> Option<T> {
        let mut guard = self.data.write();
        let entry = guard.get_mut(id)?;
        f(entry);
        Some(entry.clone())
    }

    /// Atomically read-validate-update a record.
    ///
    /// The closure runs under a single write lock. Returns `None` if the
    /// record doesn't exist, or `Some(result)` with the closure's `Result`.
    pub fn try_update<R, E>(
        &self,
        id: &Uuid,
        f: impl FnOnce(&mut T) -> Result<R, E>,
    ) -> Option<Result<R, E>> {
        self.data.write().get_mut(id).map(f)
    }

    /// Insert `value` unless an existing record makes `conflicts` return
    /// true. Check and insert happen under one write lock.
    pub fn insert_unless(&self, id: Uuid, value: T, conflicts: impl Fn(&T) -> bool) -> bool {
        let mut guard = self.data.write();
        if guard.values().any(conflicts) {
            return false;
        }
        guard.insert(id, value);
        true
    }

    /// Check if a record exists.
    pub fn contains(&self, id: &Uuid) -> bool {
        self.data.read().contains_key(id)
    }

    /// Return the number of records.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone + Send + Sync + Default> Store<T> {
    /// Mutate the record at `id`, creating it from `T::default()` first if
    /// absent. Runs under one write lock.
    pub fn upsert_with<R>(&self, id: Uuid, f: impl FnOnce(&mut T) -> R) -> R {
        f(self.data.write().entry(id).or_default())
    }
}

impl<T: Clone + Send + Sync> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

// -- Record Types -------------------------------------------------------------

/// A learner account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserRecord {
    pub id: Uuid,
    /// Unique (case-insensitive) handle.
    pub username: Username,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_username: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A saved workspace owned by a user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProjectRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// File name to content.
    pub files: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deploy_url: Option<String>,
    pub technologies: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProjectRecord {
    /// The project's files as an ordered file set.
    pub fn file_set(&self) -> FileSet {
        FileSet::from_map(&self.files)
    }
}

// -- Application State --------------------------------------------------------

/// Application configuration.
///
/// Custom `Debug` redacts the `auth_token`.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Static bearer token. If `None`, authentication is disabled.
    pub auth_token: Option<String>,
    /// Tutorial catalog file (YAML or JSON). `None` uses the built-in catalog.
    pub tutorials_path: Option<PathBuf>,
    /// Requests allowed per key and window.
    pub rate_limit_max: u64,
    /// Rate limit window in seconds.
    pub rate_limit_window_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field(
                "auth_token",
                &self.auth_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("tutorials_path", &self.tutorials_path)
            .field("rate_limit_max", &self.rate_limit_max)
            .field("rate_limit_window_secs", &self.rate_limit_window_secs)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let rate_limit = RateLimitConfig::default();
        Self {
            port: 8080,
            auth_token: None,
            tutorials_path: None,
            rate_limit_max: rate_limit.max_requests,
            rate_limit_window_secs: rate_limit.window_secs,
        }
    }
}

impl AppConfig {
    /// Read configuration from the environment.
    ///
    /// Variables: `PORT`, `AUTH_TOKEN`, `TUTORIALS_PATH`, `RATE_LIMIT_MAX`,
    /// `RATE_LIMIT_WINDOW_SECS`. Unset or unparsable values fall back to
    /// [`AppConfig::default`]; blank strings count as unset.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        fn parse<T: std::str::FromStr>(v: Option<String>) -> Option<T> {
            v.and_then(|v| v.trim().parse().ok())
        }
        let parsed_port = |key: &str| parse(var(key));
        let parsed = |key: &str| parse::<u64>(var(key));

        Self {
            port: parsed_port("PORT").unwrap_or(defaults.port),
            auth_token: var("AUTH_TOKEN"),
            tutorials_path: var("TUTORIALS_PATH").map(PathBuf::from),
            rate_limit_max: parsed("RATE_LIMIT_MAX").unwrap_or(defaults.rate_limit_max),
            rate_limit_window_secs: parsed("RATE_LIMIT_WINDOW_SECS")
                .unwrap_or(defaults.rate_limit_window_secs),
        }
    }

    /// Rate limiter settings.
    pub fn rate_limit(&self) -> RateLimitConfig {
        RateLimitConfig {
            max_requests: self.rate_limit_max,
            window_secs: self.rate_limit_window_secs,
        }
    }
}

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub users: Store<UserRecord>,
    /// Progress book per user id.
    pub progress: Store<ProgressBook>,
    pub projects: Store<ProjectRecord>,
    pub composer: PreviewComposer,

    /// PostgreSQL pool. `None` means in-memory only.
    pub db_pool: Option<PgPool>,

    /// GitHub publisher. `None` makes `/v1/push` return 503.
    pub github: Option<GitHubClient>,

    pub config: AppConfig,
}

impl AppState {
    /// State with default configuration, the built-in catalog, and no
    /// GitHub client.
    ///
    /// # Panics
    ///
    /// Panics if the built-in catalog fails validation.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default(), None)
    }

    /// State with the given configuration and no database.
    ///
    /// # Panics
    ///
    /// Panics if the configured catalog cannot be loaded. Prefer
    /// [`AppState::try_with_config`] outside tests.
    pub fn with_config(config: AppConfig, github: Option<GitHubClient>) -> Self {
        Self::try_with_config(config, github, None).expect("tutorial catalog must load")
    }

    /// State with the given configuration, loading the catalog from
    /// `config.tutorials_path` or the built-in one.
    pub fn try_with_config(
        config: AppConfig,
        github: Option<GitHubClient>,
        db_pool: Option<PgPool>,
    ) -> Result<Self, CatalogError> {
        let catalog = match &config.tutorials_path {
            Some(path) => Catalog::from_path(path)?,
            None => Catalog::builtin()?,
        };
        tracing::info!(tutorials = catalog.len(), "tutorial catalog loaded");

        Ok(Self {
            catalog: Arc::new(catalog),
            users: Store::new(),
            progress: Store::new(),
            projects: Store::new(),
            composer: PreviewComposer::new(),
            db_pool,
            github,
            config,
        })
    }

    /// Projects owned by `user_id`, newest first.
    pub fn projects_of(&self, user_id: Uuid) -> Vec<ProjectRecord> {
        let mut projects: Vec<ProjectRecord> = self
            .projects
            .list()
            .into_iter()
            .filter(|p| p.user_id == user_id)
            .collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        projects
    }

    /// Load users, progress, and projects from the database into memory.
    ///
    /// No-op without a pool.
    pub async fn hydrate_from_db(&self) -> Result<(), String> {
        let pool = match &self.db_pool {
            Some(pool) => pool,
            None => return Ok(()),
        };

        let users = crate::db::users::load_all(pool)
            .await
            .map_err(|e| format!("failed to load users: {e}"))?;
        let user_count = users.len();
        for record in users {
            self.users.insert(record.id, record);
        }

        let progress = crate::db::progress::load_all(pool)
            .await
            .map_err(|e| format!("failed to load progress: {e}"))?;
        let progress_count = progress.len();
        for (user_id, entry) in progress {
            self.progress.upsert_with(user_id, |book| book.insert(entry));
        }

        let projects = crate::db::projects::load_all(pool)
            .await
            .map_err(|e| format!("failed to load projects: {e}"))?;
        let project_count = projects.len();
        for record in projects {
            self.projects.insert(record.id, record);
        }

        tracing::info!(
            users = user_count,
            progress_entries = progress_count,
            projects = project_count,
            "Hydrated in-memory stores from database"
        );

        Ok(())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_insert_get_update() {
        let store: Store<String> = Store::new();
        let id = Uuid::new_v4();
        assert!(store.is_empty());
        store.insert(id, "a".into());
        assert_eq!(store.get(&id).as_deref(), Some("a"));
        let updated = store.update(&id, |s| s.push('b'));
        assert_eq!(updated.as_deref(), Some("ab"));
        assert!(store.update(&Uuid::new_v4(), |_| {}).is_none());
        assert!(store.contains(&id));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn store_try_update_reports_closure_result() {
        let store: Store<u32> = Store::new();
        let id = Uuid::new_v4();
        store.insert(id, 1);
        let res: Option<Result<(), &str>> = store.try_update(&id, |_| Err("nope"));
        assert_eq!(res, Some(Err("nope")));
        assert!(store.try_update::<(), ()>(&Uuid::new_v4(), |_| Ok(())).is_none());
    }

    #[test]
    fn store_insert_unless_rejects_conflicts() {
        let store: Store<String> = Store::new();
        assert!(store.insert_unless(Uuid::new_v4(), "alice".into(), |v| v == "alice"));
        assert!(!store.insert_unless(Uuid::new_v4(), "alice".into(), |v| v == "alice"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn store_upsert_with_creates_default() {
        let store: Store<Vec<u8>> = Store::new();
        let id = Uuid::new_v4();
        store.upsert_with(id, |v| v.push(1));
        store.upsert_with(id, |v| v.push(2));
        assert_eq!(store.get(&id), Some(vec![1, 2]));
    }

    #[test]
    fn config_debug_redacts_token() {
        let config = AppConfig {
            auth_token: Some("secret-token".into()),
            ..AppConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("secret-token"));
    }

    #[test]
    fn config_from_lookup_parses_and_defaults() {
        let env: HashMap<&str, &str> = [
            ("PORT", "9090"),
            ("AUTH_TOKEN", "  "),
            ("RATE_LIMIT_MAX", "not-a-number"),
            ("RATE_LIMIT_WINDOW_SECS", "30"),
        ]
        .into_iter()
        .collect();
        let config = AppConfig::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.port, 9090);
        assert!(config.auth_token.is_none());
        assert!(config.tutorials_path.is_none());
        assert_eq!(config.rate_limit_max, 600);
        assert_eq!(config.rate_limit_window_secs, 30);
    }

    #[test]
    fn projects_of_sorts_newest_first() {
        let state = AppState::new();
        let user_id = Uuid::new_v4();
        let base = Utc::now();
        for (offset, name) in [(0, "old"), (10, "new"), (5, "mid")] {
            let at = base + chrono::Duration::seconds(offset);
            let id = Uuid::new_v4();
            state.projects.insert(
                id,
                ProjectRecord {
                    id,
                    user_id,
                    name: name.into(),
                    description: None,
                    files: BTreeMap::new(),
                    github_url: None,
                    deploy_url: None,
                    technologies: vec![],
                    created_at: at,
                    updated_at: at,
                },
            );
        }
        let names: Vec<String> = state.projects_of(user_id).into_iter().map(|p| p.name).collect();
        assert_eq!(names, ["new", "mid", "old"]);
        assert!(state.projects_of(Uuid::new_v4()).is_empty());
    }
}
