//! Repository for the `sync_logs` table.

use sqlx::PgPool;

use crate::models::sync_log::{CreateSyncLog, SyncLog};

const COLUMNS: &str = "id, user_id, success, error_code, message, total_items, created_at";

/// Append-only access to the sync audit trail.
pub struct SyncLogRepo;

impl SyncLogRepo {
    /// Record one sync attempt.
    pub async fn create(pool: &PgPool, input: &CreateSyncLog) -> Result<SyncLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO sync_logs (user_id, success, error_code, message, total_items)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SyncLog>(&query)
            .bind(input.user_id)
            .bind(input.success)
            .bind(&input.error_code)
            .bind(&input.message)
            .bind(input.total_items)
            .fetch_one(pool)
            .await
    }
}
