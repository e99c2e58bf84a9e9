//! Integration tests for the achievement evaluation engine, called directly
//! against committed progress.

mod common;

use grail_api::engine::achievements::{evaluate_achievements, seed_default_achievements};
use grail_core::catalog::ItemCatalog;
use grail_core::progress::{derive_progress, SyncSnapshot};
use grail_core::types::DbId;
use grail_db::models::progress::{GrailProgress, SnapshotCollections};
use grail_db::repositories::{AchievementRepo, ProgressRepo};
use serde_json::json;
use sqlx::PgPool;

async fn store_progress(pool: &PgPool, user_id: DbId, percentage: f64) -> GrailProgress {
    let snapshot: SyncSnapshot = serde_json::from_value(json!({
        "gameMode": "softcore",
        "grailType": "normal",
        "items": { "shako": {}, "windforce": {} },
        "ethItems": {},
        "stats": { "total": 500, "found": 2, "percentage": percentage }
    }))
    .unwrap();
    let validated = snapshot.validate().unwrap();
    let derived = derive_progress(&validated, &ItemCatalog::default());
    let collections = SnapshotCollections {
        items: validated.items,
        eth_items: validated.eth_items,
        runes: validated.runes,
        runewords: validated.runewords,
    };
    let mut conn = pool.acquire().await.unwrap();
    ProgressRepo::upsert(&mut conn, user_id, &validated.configuration, collections, &derived)
        .await
        .unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn evaluating_twice_unlocks_once(pool: PgPool) {
    seed_default_achievements(&pool).await.unwrap();
    let (user_id, _) = common::create_user_with_key(&pool, "twice").await;
    let progress = store_progress(&pool, user_id, 30.0).await;
    let catalog = ItemCatalog::default();

    let first = evaluate_achievements(&pool, &catalog, user_id, &progress).await.unwrap();
    let second = evaluate_achievements(&pool, &catalog, user_id, &progress).await.unwrap();

    assert!(first.contains("first_unique"));
    assert!(first.contains("grail_25"));
    assert!(!first.contains("grail_50"));
    assert!(second.is_empty());

    let unlocked = AchievementRepo::unlocked_ids(&pool, user_id).await.unwrap();
    assert_eq!(unlocked.len(), first.len());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn streak_conditions_stay_unsatisfied_without_statistics(pool: PgPool) {
    seed_default_achievements(&pool).await.unwrap();
    let (user_id, _) = common::create_user_with_key(&pool, "nostats").await;
    let progress = store_progress(&pool, user_id, 1.0).await;

    let unlocked = evaluate_achievements(&pool, &ItemCatalog::default(), user_id, &progress)
        .await
        .unwrap();

    assert!(!unlocked.contains("speed_demon"));
    assert!(!unlocked.contains("streak_7"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn empty_catalog_unlocks_nothing(pool: PgPool) {
    let (user_id, _) = common::create_user_with_key(&pool, "empty").await;
    let progress = store_progress(&pool, user_id, 100.0).await;

    let unlocked = evaluate_achievements(&pool, &ItemCatalog::default(), user_id, &progress)
        .await
        .unwrap();

    assert!(unlocked.is_empty());
}
