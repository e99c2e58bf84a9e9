//! Repository for the `achievements` and `user_achievements` tables.

use grail_core::types::DbId;
use sqlx::PgPool;

use crate::models::achievement::{
    Achievement, UnlockedAchievement, UpsertAchievement, UserAchievement,
};

// ---------------------------------------------------------------------------
// Column lists
// ---------------------------------------------------------------------------

const COLUMNS: &str = "\
    id, key, name, description, points, rarity, category, conditions, created_at, updated_at";

const UNLOCK_COLUMNS: &str = "id, user_id, achievement_id, progress, unlocked_at";

const UNLOCKED_LIST_COLUMNS: &str = "\
    a.id AS achievement_id, a.key, a.name, a.description, a.points, a.rarity, a.category, \
    ua.progress, ua.unlocked_at";

/// Provides catalog and unlock-ledger operations.
pub struct AchievementRepo;

impl AchievementRepo {
    // -----------------------------------------------------------------------
    // Catalog
    // -----------------------------------------------------------------------

    /// List the whole catalog.
    pub async fn list(pool: &PgPool) -> Result<Vec<Achievement>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM achievements ORDER BY category, points, key");
        sqlx::query_as::<_, Achievement>(&query)
            .fetch_all(pool)
            .await
    }

    /// Seed the catalog. Idempotent: entries are upserted by `key`.
    ///
    /// Runs in a single transaction so a partially seeded catalog is never
    /// visible. Returns the number of entries written.
    pub async fn seed(pool: &PgPool, entries: &[UpsertAchievement]) -> Result<usize, sqlx::Error> {
        let query = format!(
            "INSERT INTO achievements (key, name, description, points, rarity, category, conditions)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT (key) DO UPDATE SET
                name = EXCLUDED.name,
                description = EXCLUDED.description,
                points = EXCLUDED.points,
                rarity = EXCLUDED.rarity,
                category = EXCLUDED.category,
                conditions = EXCLUDED.conditions
             RETURNING {COLUMNS}"
        );

        let mut tx = pool.begin().await?;
        for entry in entries {
            sqlx::query_as::<_, Achievement>(&query)
                .bind(&entry.key)
                .bind(&entry.name)
                .bind(&entry.description)
                .bind(entry.points)
                .bind(&entry.rarity)
                .bind(&entry.category)
                .bind(&entry.conditions)
                .fetch_one(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(entries.len())
    }

    // -----------------------------------------------------------------------
    // Unlock ledger
    // -----------------------------------------------------------------------

    /// IDs of every achievement the user has unlocked.
    pub async fn unlocked_ids(pool: &PgPool, user_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        let rows: Vec<(DbId,)> =
            sqlx::query_as("SELECT achievement_id FROM user_achievements WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(pool)
                .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Record an unlock at 100% progress.
    ///
    /// A duplicate `(user_id, achievement_id)` pair is a no-op and returns
    /// `None`, so overlapping syncs can race on the same unlock safely.
    pub async fn record_unlock(
        pool: &PgPool,
        user_id: DbId,
        achievement_id: DbId,
    ) -> Result<Option<UserAchievement>, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_achievements (user_id, achievement_id, progress)
             VALUES ($1, $2, 100)
             ON CONFLICT ON CONSTRAINT uq_user_achievements_user_achievement DO NOTHING
             RETURNING {UNLOCK_COLUMNS}"
        );
        sqlx::query_as::<_, UserAchievement>(&query)
            .bind(user_id)
            .bind(achievement_id)
            .fetch_optional(pool)
            .await
    }

    /// A user's unlocks joined with their catalog entries, newest first.
    pub async fn list_unlocked(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<UnlockedAchievement>, sqlx::Error> {
        let query = format!(
            "SELECT {UNLOCKED_LIST_COLUMNS}
             FROM user_achievements ua
             JOIN achievements a ON a.id = ua.achievement_id
             WHERE ua.user_id = $1
             ORDER BY ua.unlocked_at DESC, a.key"
        );
        sqlx::query_as::<_, UnlockedAchievement>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }
}
