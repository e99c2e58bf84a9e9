//! Sync audit log model.

use grail_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `sync_logs` table (append-only).
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncLog {
    pub id: DbId,
    pub user_id: DbId,
    pub success: bool,
    pub error_code: Option<String>,
    pub message: Option<String>,
    pub total_items: Option<i32>,
    pub created_at: Timestamp,
}

/// DTO for recording a sync attempt.
#[derive(Debug, Clone)]
pub struct CreateSyncLog {
    pub user_id: DbId,
    pub success: bool,
    pub error_code: Option<String>,
    pub message: Option<String>,
    pub total_items: Option<i32>,
}
