//! Repository for the `user_statistics` table.

use grail_core::statistics::NextStatistics;
use grail_core::types::DbId;
use sqlx::{PgConnection, PgExecutor};

use crate::models::statistics::UserStatistics;

const COLUMNS: &str = "\
    id, user_id, first_item_at, last_item_at, grail_started_at, items_per_day, \
    current_streak, longest_streak, last_streak_day, created_at, updated_at";

/// Provides read and upsert operations for per-user statistics.
pub struct StatisticsRepo;

impl StatisticsRepo {
    /// Find the statistics row for a user.
    pub async fn find_by_user<'e>(
        executor: impl PgExecutor<'e>,
        user_id: DbId,
    ) -> Result<Option<UserStatistics>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_statistics WHERE user_id = $1");
        sqlx::query_as::<_, UserStatistics>(&query)
            .bind(user_id)
            .fetch_optional(executor)
            .await
    }

    /// Write the statistics computed by a sync.
    pub async fn upsert(
        conn: &mut PgConnection,
        user_id: DbId,
        next: &NextStatistics,
    ) -> Result<UserStatistics, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_statistics
                (user_id, first_item_at, last_item_at, grail_started_at, items_per_day,
                 current_streak, longest_streak, last_streak_day)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             ON CONFLICT (user_id) DO UPDATE SET
                first_item_at = EXCLUDED.first_item_at,
                last_item_at = EXCLUDED.last_item_at,
                grail_started_at = EXCLUDED.grail_started_at,
                items_per_day = EXCLUDED.items_per_day,
                current_streak = EXCLUDED.current_streak,
                longest_streak = EXCLUDED.longest_streak,
                last_streak_day = EXCLUDED.last_streak_day
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserStatistics>(&query)
            .bind(user_id)
            .bind(next.first_item_at)
            .bind(next.last_item_at)
            .bind(next.grail_started_at)
            .bind(next.items_per_day)
            .bind(next.streak.current)
            .bind(next.streak.longest)
            .bind(next.streak.last_day)
            .fetch_one(conn)
            .await
    }
}
