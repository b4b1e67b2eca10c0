//! Project persistence operations on the `projects` table.
//!
//! `files` and `technologies` are stored as JSONB.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::state::ProjectRecord;

fn to_json<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, sqlx::Error> {
    serde_json::to_value(value).map_err(|e| sqlx::Error::Encode(Box::new(e)))
}

/// Insert a new project.
pub async fn insert(pool: &PgPool, record: &ProjectRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO projects (id, user_id, name, description, files, github_url, deploy_url,
                               technologies, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(record.id)
    .bind(record.user_id)
    .bind(&record.name)
    .bind(&record.description)
    .bind(to_json(&record.files)?)
    .bind(&record.github_url)
    .bind(&record.deploy_url)
    .bind(to_json(&record.technologies)?)
    .bind(record.created_at)
    .bind(record.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Replace a project's files and technologies.
pub async fn update_files(pool: &PgPool, record: &ProjectRecord) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE projects SET files = $1, technologies = $2, updated_at = $3 WHERE id = $4",
    )
    .bind(to_json(&record.files)?)
    .bind(to_json(&record.technologies)?)
    .bind(record.updated_at)
    .bind(record.id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Record where a project was published.
pub async fn update_publication(
    pool: &PgPool,
    record: &ProjectRecord,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE projects SET github_url = $1, deploy_url = $2, updated_at = $3 WHERE id = $4",
    )
    .bind(&record.github_url)
    .bind(&record.deploy_url)
    .bind(record.updated_at)
    .bind(record.id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Load all projects on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<ProjectRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ProjectRow>(
        "SELECT id, user_id, name, description, files, github_url, deploy_url, technologies,
                created_at, updated_at
         FROM projects ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(ProjectRow::into_record).collect())
}

#[derive(sqlx::FromRow)]
struct ProjectRow {
    id: Uuid,
    user_id: Uuid,
    name: String,
    description: Option<String>,
    files: serde_json::Value,
    github_url: Option<String>,
    deploy_url: Option<String>,
    technologies: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProjectRow {
    fn into_record(self) -> ProjectRecord {
        let files: BTreeMap<String, String> =
            serde_json::from_value(self.files).unwrap_or_else(|e| {
                tracing::error!(
                    id = %self.id,
                    error = %e,
                    "failed to deserialize project files, defaulting to empty"
                );
                BTreeMap::new()
            });
        let technologies: Vec<String> =
            serde_json::from_value(self.technologies).unwrap_or_else(|e| {
                tracing::error!(
                    id = %self.id,
                    error = %e,
                    "failed to deserialize project technologies, defaulting to empty"
                );
                Vec::new()
            });

        ProjectRecord {
            id: self.id,
            user_id: self.user_id,
            name: self.name,
            description: self.description,
            files,
            github_url: self.github_url,
            deploy_url: self.deploy_url,
            technologies,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
