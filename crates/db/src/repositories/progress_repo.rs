//! Repository for the `grail_progress` table.

use grail_core::grail::GrailConfiguration;
use grail_core::progress::DerivedProgress;
use grail_core::types::DbId;
use sqlx::{PgConnection, PgExecutor, PgPool};

use crate::models::progress::{GrailProgress, SnapshotCollections};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, user_id, game_mode, grail_type, include_runes, include_runewords, locked, \
    items, eth_items, runes, runewords, \
    total_items, total_eth_items, total_runes, total_runewords, \
    armor_owned, armor_exists, weapons_owned, weapons_exists, \
    other_owned, other_exists, sets_owned, sets_exists, \
    eth_armor_owned, eth_armor_exists, eth_weapons_owned, eth_weapons_exists, \
    eth_other_owned, eth_other_exists, \
    normal_completion, ethereal_completion, rune_completion, runeword_completion, \
    overall_completion, created_at, updated_at";

/// Provides read and upsert operations for progress snapshots.
pub struct ProgressRepo;

impl ProgressRepo {
    /// Find the progress record for a user.
    pub async fn find_by_user<'e>(
        executor: impl PgExecutor<'e>,
        user_id: DbId,
    ) -> Result<Option<GrailProgress>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM grail_progress WHERE user_id = $1");
        sqlx::query_as::<_, GrailProgress>(&query)
            .bind(user_id)
            .fetch_optional(executor)
            .await
    }

    /// Whether the user has a progress record whose configuration is locked.
    ///
    /// A registration-time default record does not count until its first sync.
    pub async fn is_locked_for_user(pool: &PgPool, user_id: DbId) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM grail_progress WHERE user_id = $1 AND locked)",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Create an unlocked record with the default configuration.
    ///
    /// Called at registration time. Returns `None` if the user already has a
    /// record, which is left untouched.
    pub async fn create_default(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<GrailProgress>, sqlx::Error> {
        let config = GrailConfiguration::default();
        let query = format!(
            "INSERT INTO grail_progress
                (user_id, game_mode, grail_type, include_runes, include_runewords, locked)
             VALUES ($1, $2, $3, $4, $5, false)
             ON CONFLICT (user_id) DO NOTHING
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, GrailProgress>(&query)
            .bind(user_id)
            .bind(config.game_mode.as_str())
            .bind(config.grail_type.as_str())
            .bind(config.include_runes)
            .bind(config.include_runewords)
            .fetch_optional(pool)
            .await
    }

    /// Insert or replace the user's snapshot, locking its configuration.
    ///
    /// Every derived column is overwritten. The configuration columns are
    /// only written when the existing row is not yet locked, so a locked
    /// configuration survives even if a caller skipped the lock check.
    pub async fn upsert(
        conn: &mut PgConnection,
        user_id: DbId,
        config: &GrailConfiguration,
        collections: SnapshotCollections<'_>,
        derived: &DerivedProgress,
    ) -> Result<GrailProgress, sqlx::Error> {
        let query = format!(
            "INSERT INTO grail_progress (
                user_id, game_mode, grail_type, include_runes, include_runewords, locked,
                items, eth_items, runes, runewords,
                total_items, total_eth_items, total_runes, total_runewords,
                armor_owned, armor_exists, weapons_owned, weapons_exists,
                other_owned, other_exists, sets_owned, sets_exists,
                eth_armor_owned, eth_armor_exists, eth_weapons_owned, eth_weapons_exists,
                eth_other_owned, eth_other_exists,
                normal_completion, ethereal_completion, rune_completion,
                runeword_completion, overall_completion
             )
             VALUES (
                $1, $2, $3, $4, $5, true,
                $6, $7, $8, $9,
                $10, $11, $12, $13,
                $14, $15, $16, $17,
                $18, $19, $20, $21,
                $22, $23, $24, $25,
                $26, $27,
                $28, $29, $30,
                $31, $32
             )
             ON CONFLICT (user_id) DO UPDATE SET
                game_mode = CASE WHEN grail_progress.locked
                    THEN grail_progress.game_mode ELSE EXCLUDED.game_mode END,
                grail_type = CASE WHEN grail_progress.locked
                    THEN grail_progress.grail_type ELSE EXCLUDED.grail_type END,
                include_runes = CASE WHEN grail_progress.locked
                    THEN grail_progress.include_runes ELSE EXCLUDED.include_runes END,
                include_runewords = CASE WHEN grail_progress.locked
                    THEN grail_progress.include_runewords ELSE EXCLUDED.include_runewords END,
                locked = true,
                items = EXCLUDED.items,
                eth_items = EXCLUDED.eth_items,
                runes = EXCLUDED.runes,
                runewords = EXCLUDED.runewords,
                total_items = EXCLUDED.total_items,
                total_eth_items = EXCLUDED.total_eth_items,
                total_runes = EXCLUDED.total_runes,
                total_runewords = EXCLUDED.total_runewords,
                armor_owned = EXCLUDED.armor_owned,
                armor_exists = EXCLUDED.armor_exists,
                weapons_owned = EXCLUDED.weapons_owned,
                weapons_exists = EXCLUDED.weapons_exists,
                other_owned = EXCLUDED.other_owned,
                other_exists = EXCLUDED.other_exists,
                sets_owned = EXCLUDED.sets_owned,
                sets_exists = EXCLUDED.sets_exists,
                eth_armor_owned = EXCLUDED.eth_armor_owned,
                eth_armor_exists = EXCLUDED.eth_armor_exists,
                eth_weapons_owned = EXCLUDED.eth_weapons_owned,
                eth_weapons_exists = EXCLUDED.eth_weapons_exists,
                eth_other_owned = EXCLUDED.eth_other_owned,
                eth_other_exists = EXCLUDED.eth_other_exists,
                normal_completion = EXCLUDED.normal_completion,
                ethereal_completion = EXCLUDED.ethereal_completion,
                rune_completion = EXCLUDED.rune_completion,
                runeword_completion = EXCLUDED.runeword_completion,
                overall_completion = EXCLUDED.overall_completion
             RETURNING {COLUMNS}"
        );

        let as_json = |map: Option<&serde_json::Map<String, serde_json::Value>>| {
            serde_json::Value::Object(map.cloned().unwrap_or_default())
        };

        sqlx::query_as::<_, GrailProgress>(&query)
            .bind(user_id)
            .bind(config.game_mode.as_str())
            .bind(config.grail_type.as_str())
            .bind(config.include_runes)
            .bind(config.include_runewords)
            .bind(as_json(Some(collections.items)))
            .bind(as_json(Some(collections.eth_items)))
            .bind(as_json(collections.runes))
            .bind(as_json(collections.runewords))
            .bind(derived.total_items)
            .bind(derived.total_eth_items)
            .bind(derived.total_runes)
            .bind(derived.total_runewords)
            .bind(derived.armor.owned)
            .bind(derived.armor.exists)
            .bind(derived.weapons.owned)
            .bind(derived.weapons.exists)
            .bind(derived.other.owned)
            .bind(derived.other.exists)
            .bind(derived.sets.owned)
            .bind(derived.sets.exists)
            .bind(derived.eth_armor.owned)
            .bind(derived.eth_armor.exists)
            .bind(derived.eth_weapons.owned)
            .bind(derived.eth_weapons.exists)
            .bind(derived.eth_other.owned)
            .bind(derived.eth_other.exists)
            .bind(derived.normal_completion)
            .bind(derived.ethereal_completion)
            .bind(derived.rune_completion)
            .bind(derived.runeword_completion)
            .bind(derived.overall_completion)
            .fetch_one(conn)
            .await
    }
}
