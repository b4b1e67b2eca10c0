//! User persistence operations on the `users` table.

use autoflow_core::Username;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::state::UserRecord;

/// Insert a new user. Fails on a case-insensitive username collision.
pub async fn insert(pool: &PgPool, record: &UserRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO users (id, username, display_name, github_username, created_at)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(record.id)
    .bind(record.username.as_str())
    .bind(&record.display_name)
    .bind(&record.github_username)
    .bind(record.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load all users on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<UserRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, UserRow>(
        "SELECT id, username, display_name, github_username, created_at
         FROM users ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().filter_map(UserRow::into_record).collect())
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    display_name: Option<String>,
    github_username: Option<String>,
    created_at: DateTime<Utc>,
}

impl UserRow {
    /// Rows whose username no longer validates are skipped and logged.
    fn into_record(self) -> Option<UserRecord> {
        let username = match Username::new(self.username) {
            Ok(name) => name,
            Err(e) => {
                tracing::error!(id = %self.id, error = %e, "skipping user with invalid username in database");
                return None;
            }
        };
        Some(UserRecord {
            id: self.id,
            username,
            display_name: self.display_name,
            github_username: self.github_username,
            created_at: self.created_at,
        })
    }
}
