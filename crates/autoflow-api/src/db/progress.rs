//! Tutorial progress persistence on the `tutorial_progress` table.
//!
//! One row per (user, tutorial). Writes are upserts of the whole entry;
//! the forward-only rules live in `ProgressBook`, not in SQL.

use autoflow_core::{TutorialId, TutorialProgress};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Insert or replace one progress entry.
pub async fn upsert(
    pool: &PgPool,
    user_id: Uuid,
    entry: &TutorialProgress,
) -> Result<(), sqlx::Error> {
    let current_step = i32::try_from(entry.current_step)
        .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

    sqlx::query(
        "INSERT INTO tutorial_progress (user_id, tutorial_id, current_step, completed, completed_at)
         VALUES ($1, $2, $3, $4, $5)
         ON CONFLICT (user_id, tutorial_id) DO UPDATE
         SET current_step = EXCLUDED.current_step,
             completed = EXCLUDED.completed,
             completed_at = EXCLUDED.completed_at",
    )
    .bind(user_id)
    .bind(entry.tutorial_id.as_str())
    .bind(current_step)
    .bind(entry.completed)
    .bind(entry.completed_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load every progress entry on startup, paired with its user id.
pub async fn load_all(pool: &PgPool) -> Result<Vec<(Uuid, TutorialProgress)>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ProgressRow>(
        "SELECT user_id, tutorial_id, current_step, completed, completed_at
         FROM tutorial_progress ORDER BY user_id, tutorial_id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().filter_map(ProgressRow::into_entry).collect())
}

#[derive(sqlx::FromRow)]
struct ProgressRow {
    user_id: Uuid,
    tutorial_id: String,
    current_step: i32,
    completed: bool,
    completed_at: Option<DateTime<Utc>>,
}

impl ProgressRow {
    fn into_entry(self) -> Option<(Uuid, TutorialProgress)> {
        let tutorial_id = match TutorialId::new(self.tutorial_id) {
            Ok(id) => id,
            Err(e) => {
                tracing::error!(user_id = %self.user_id, error = %e, "skipping progress row with invalid tutorial id");
                return None;
            }
        };
        Some((
            self.user_id,
            TutorialProgress {
                tutorial_id,
                current_step: u32::try_from(self.current_step).unwrap_or(0),
                completed: self.completed,
                completed_at: self.completed_at,
            },
        ))
    }
}
