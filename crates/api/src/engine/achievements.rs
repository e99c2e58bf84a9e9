//! Achievement evaluation against a committed progress snapshot.

use std::collections::{BTreeSet, HashSet};

use grail_core::achievements::{default_catalog, qualifying_rules, Facts};
use grail_core::catalog::ItemCatalog;
use grail_core::error::CoreError;
use grail_core::types::DbId;
use grail_db::models::achievement::{Achievement, UpsertAchievement};
use grail_db::models::progress::GrailProgress;
use grail_db::repositories::{AchievementRepo, StatisticsRepo};
use sqlx::PgPool;

/// Any failure while evaluating or recording unlocks.
///
/// Never surfaced to the client; the sync engine logs and drops it.
#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    #[error("Failed to load or record achievements: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Stored progress is not evaluable: {0}")]
    InvalidProgress(#[from] CoreError),
}

/// Evaluate every not-yet-unlocked achievement for `user_id` and record
/// the ones that now qualify.
///
/// Returns the keys that were actually inserted. An unlock that a
/// concurrent sync recorded first is skipped and not reported.
pub async fn evaluate_achievements(
    pool: &PgPool,
    catalog: &ItemCatalog,
    user_id: DbId,
    progress: &GrailProgress,
) -> Result<BTreeSet<String>, EvaluationError> {
    let rules: Vec<_> = AchievementRepo::list(pool)
        .await?
        .iter()
        .map(Achievement::to_rule)
        .collect();
    let unlocked: HashSet<DbId> = AchievementRepo::unlocked_ids(pool, user_id)
        .await?
        .into_iter()
        .collect();

    let mut facts = Facts::from_progress(
        &progress.derived(),
        &progress.configuration()?,
        catalog.completed_sets(progress.item_keys()),
    );
    if let Some(stats) = StatisticsRepo::find_by_user(pool, user_id).await? {
        facts = facts.with_statistics(&stats.as_previous().streak, stats.items_per_day);
    }

    let mut newly_unlocked = BTreeSet::new();
    for rule in qualifying_rules(&rules, &unlocked, &facts) {
        if AchievementRepo::record_unlock(pool, user_id, rule.id)
            .await?
            .is_some()
        {
            tracing::info!(user_id, achievement_key = %rule.key, "Achievement unlocked");
            newly_unlocked.insert(rule.key.clone());
        }
    }

    Ok(newly_unlocked)
}

/// Upsert the built-in achievement catalog. Safe to run on every startup.
pub async fn seed_default_achievements(pool: &PgPool) -> Result<usize, sqlx::Error> {
    let entries: Vec<UpsertAchievement> = default_catalog()
        .iter()
        .map(UpsertAchievement::from)
        .collect();
    AchievementRepo::seed(pool, &entries).await
}
