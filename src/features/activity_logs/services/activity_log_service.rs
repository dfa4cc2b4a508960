use sqlx::PgExecutor;
use crate::core::error::{AppError, Result};
use crate::features::activity_logs::models::NewActivityLog;
#[cfg(test)]
use crate::features::activity_logs::models::ActivityLog;

/// Writes audit entries on whatever executor the caller holds.
///
/// Passing a transaction makes the entry commit or roll back together with
/// the change it records.
pub struct ActivityLogService;

impl ActivityLogService {
    /// Append one entry.
    ///
    /// `user_id` is resolved against `users`: an id with no matching user is
    /// stored as NULL instead of failing the insert.
    pub async fn append<'e, E>(executor: E, entry: &NewActivityLog) -> Result<i64>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar(
            r#"
            INSERT INTO activity_logs (user_id, file_id, action, ip_address, user_agent)
            VALUES ((SELECT id FROM users WHERE id = $1), $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(entry.user_id)
        .bind(entry.file_id)
        .bind(entry.action)
        .bind(entry.client.ip_address.as_deref())
        .bind(entry.client.user_agent.as_deref())
        .fetch_one(executor)
        .await
        .map_err(|e| {
            tracing::error!(
                file_id = %entry.file_id,
                action = %entry.action,
                "Failed to append activity log: {:?}",
                e
            );
            AppError::Database(e)
        })
    }

    /// Entries recorded for a file, oldest first
    #[cfg(test)]
    pub async fn list_for_file<'e, E>(executor: E, file_id: uuid::Uuid) -> Result<Vec<ActivityLog>>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as(
            r#"
            SELECT id, user_id, file_id, action, ip_address, user_agent, created_at
            FROM activity_logs
            WHERE file_id = $1
            ORDER BY id
            "#,
        )
        .bind(file_id)
        .fetch_all(executor)
        .await
        .map_err(AppError::Database)
    }
}
