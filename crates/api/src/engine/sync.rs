//! Progress reconciliation: validate, lock-check, derive, persist.
//!
//! Everything up to and including the `last_sync_at` stamp runs in one
//! transaction that begins by row-locking the user, so concurrent syncs for
//! the same user are serialized and a rejected or aborted sync leaves no
//! trace. Achievement evaluation and the audit row happen after commit.

use std::collections::BTreeSet;

use chrono::Utc;
use grail_core::catalog::ItemCatalog;
use grail_core::error::CoreError;
use grail_core::grail::{check_configuration_lock, resolve_configuration};
use grail_core::progress::{derive_progress, SyncSnapshot};
use grail_core::statistics::{is_new_find, next_statistics};
use grail_core::types::DbId;
use grail_db::models::progress::{GrailProgress, SnapshotCollections};
use grail_db::models::statistics::UserStatistics;
use grail_db::models::sync_log::CreateSyncLog;
use grail_db::repositories::{ProgressRepo, StatisticsRepo, SyncLogRepo, UserRepo};
use sqlx::PgPool;

use crate::engine::achievements::evaluate_achievements;
use crate::error::{AppError, AppResult};

/// The result of a successful sync.
#[derive(Debug)]
pub struct SyncOutcome {
    /// The record as committed.
    pub progress: GrailProgress,
    /// Achievement keys unlocked by this sync.
    pub new_achievements: BTreeSet<String>,
}

/// Reconcile `snapshot` into the stored progress for `user_id`.
///
/// Validation and lock failures are returned without touching progress,
/// statistics, or achievements. Achievement evaluation failures are logged
/// and do not fail the sync.
pub async fn sync_progress(
    pool: &PgPool,
    catalog: &ItemCatalog,
    user_id: DbId,
    snapshot: &SyncSnapshot,
) -> AppResult<SyncOutcome> {
    let result = persist_snapshot(pool, catalog, user_id, snapshot).await;
    record_attempt(pool, user_id, result.as_ref()).await;
    let progress = result?;

    let new_achievements = match evaluate_achievements(pool, catalog, user_id, &progress).await {
        Ok(keys) => keys,
        Err(e) => {
            tracing::error!(user_id, error = %e, "Achievement evaluation failed");
            BTreeSet::new()
        }
    };

    Ok(SyncOutcome {
        progress,
        new_achievements,
    })
}

async fn persist_snapshot(
    pool: &PgPool,
    catalog: &ItemCatalog,
    user_id: DbId,
    snapshot: &SyncSnapshot,
) -> AppResult<GrailProgress> {
    let validated = snapshot.validate()?;

    let mut tx = pool.begin().await?;

    if !UserRepo::lock_for_sync(&mut *tx, user_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }));
    }

    let existing = ProgressRepo::find_by_user(&mut *tx, user_id).await?;
    let stored = existing
        .as_ref()
        .map(GrailProgress::stored_configuration)
        .transpose()?;

    if let Err(e) = check_configuration_lock(stored.as_ref(), &validated.configuration) {
        let mismatched = stored
            .map(|s| s.configuration.mismatched_fields(&validated.configuration))
            .unwrap_or_default();
        tracing::warn!(user_id, ?mismatched, "Sync rejected: grail configuration is locked");
        return Err(e.into());
    }

    let configuration = resolve_configuration(stored.as_ref(), &validated.configuration);
    let derived = derive_progress(&validated, catalog);
    let collections = SnapshotCollections {
        items: validated.items,
        eth_items: validated.eth_items,
        runes: validated.runes,
        runewords: validated.runewords,
    };

    let progress =
        ProgressRepo::upsert(&mut *tx, user_id, &configuration, collections, &derived).await?;

    let now = Utc::now();
    let found_new = is_new_find(
        existing.as_ref().map(|p| p.derived().found_count()),
        derived.found_count(),
    );
    let previous = StatisticsRepo::find_by_user(&mut *tx, user_id)
        .await?
        .as_ref()
        .map(UserStatistics::as_previous);
    let next = next_statistics(previous.as_ref(), found_new, derived.total_items, now);
    StatisticsRepo::upsert(&mut *tx, user_id, &next).await?;

    UserRepo::touch_last_sync(&mut *tx, user_id, now).await?;

    tx.commit().await?;

    tracing::info!(
        user_id,
        total_items = progress.total_items,
        total_eth_items = progress.total_eth_items,
        total_runes = progress.total_runes,
        total_runewords = progress.total_runewords,
        overall_completion = progress.overall_completion,
        found_new,
        current_streak = next.streak.current,
        "Progress synced",
    );

    Ok(progress)
}

/// Audit a sync whose request body could not be decoded into a snapshot.
pub async fn record_rejected_payload(pool: &PgPool, user_id: DbId, err: &AppError) {
    tracing::warn!(user_id, error = %err, "Sync rejected: undecodable payload");
    record_attempt(pool, user_id, Err(err)).await;
}

/// Write the audit row for a sync attempt. Failures are only logged.
async fn record_attempt(pool: &PgPool, user_id: DbId, result: Result<&GrailProgress, &AppError>) {
    let input = match result {
        Ok(progress) => CreateSyncLog {
            user_id,
            success: true,
            error_code: None,
            message: None,
            total_items: Some(progress.total_items),
        },
        Err(err) => CreateSyncLog {
            user_id,
            success: false,
            error_code: Some(failure_code(err).to_string()),
            message: Some(err.to_string()),
            total_items: None,
        },
    };

    if let Err(e) = SyncLogRepo::create(pool, &input).await {
        tracing::warn!(user_id, error = %e, "Failed to write sync log");
    }
}

fn failure_code(err: &AppError) -> &'static str {
    match err {
        AppError::Core(CoreError::Validation(_)) => "VALIDATION_ERROR",
        AppError::BadRequest(_) => "BAD_REQUEST",
        AppError::Core(CoreError::ConfigurationLocked { .. }) => "CONFIGURATION_LOCKED",
        AppError::Core(CoreError::NotFound { .. }) => "NOT_FOUND",
        _ => "INTERNAL_ERROR",
    }
}
