//! Integration tests for the achievement catalog and unlock ledger.

use grail_core::achievements::default_catalog;
use grail_core::types::DbId;
use grail_db::models::achievement::{Achievement, UpsertAchievement};
use grail_db::models::sync_log::CreateSyncLog;
use grail_db::models::user::CreateUser;
use grail_db::repositories::{AchievementRepo, SyncLogRepo, UserRepo};
use serde_json::json;
use sqlx::PgPool;

async fn create_user(pool: &PgPool, username: &str) -> DbId {
    let input = CreateUser {
        username: username.to_string(),
        email: format!("{username}@test.com"),
    };
    UserRepo::create(pool, &input).await.unwrap().id
}

async fn catalog_entry(pool: &PgPool, key: &str) -> Achievement {
    AchievementRepo::list(pool)
        .await
        .unwrap()
        .into_iter()
        .find(|a| a.key == key)
        .unwrap_or_else(|| panic!("{key} should be in the catalog"))
}

fn default_entries() -> Vec<UpsertAchievement> {
    default_catalog().iter().map(UpsertAchievement::from).collect()
}

// ---------------------------------------------------------------------------
// Catalog seeding
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn seeding_twice_does_not_duplicate(pool: PgPool) {
    let entries = default_entries();

    AchievementRepo::seed(&pool, &entries).await.unwrap();
    AchievementRepo::seed(&pool, &entries).await.unwrap();

    let all = AchievementRepo::list(&pool).await.unwrap();
    assert_eq!(all.len(), entries.len());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn reseeding_updates_existing_entry(pool: PgPool) {
    AchievementRepo::seed(&pool, &default_entries()).await.unwrap();

    let mut changed = default_entries();
    let first = changed.iter_mut().find(|e| e.key == "first_unique").unwrap();
    first.points = 99;
    AchievementRepo::seed(&pool, &changed).await.unwrap();

    let row = catalog_entry(&pool, "first_unique").await;
    assert_eq!(row.points, 99);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn seeded_conditions_parse_back_into_rules(pool: PgPool) {
    AchievementRepo::seed(&pool, &default_entries()).await.unwrap();

    for row in AchievementRepo::list(&pool).await.unwrap() {
        let rule = row.to_rule();
        assert!(rule.predicate.is_some(), "{} should have a valid predicate", row.key);
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn malformed_conditions_yield_rule_without_predicate(pool: PgPool) {
    let entry = UpsertAchievement {
        key: "broken".into(),
        name: "Broken".into(),
        description: "Has nonsense conditions".into(),
        points: 5,
        rarity: "common".into(),
        category: "special".into(),
        conditions: json!({ "totalItems": "lots" }),
    };
    AchievementRepo::seed(&pool, &[entry]).await.unwrap();

    let row = catalog_entry(&pool, "broken").await;
    assert!(row.to_rule().predicate.is_none());
}

// ---------------------------------------------------------------------------
// Unlock ledger
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_unlock_is_a_no_op(pool: PgPool) {
    AchievementRepo::seed(&pool, &default_entries()).await.unwrap();
    let user_id = create_user(&pool, "hunter").await;
    let achievement = catalog_entry(&pool, "first_unique").await;

    let first = AchievementRepo::record_unlock(&pool, user_id, achievement.id).await.unwrap();
    let second = AchievementRepo::record_unlock(&pool, user_id, achievement.id).await.unwrap();

    let unlock = first.expect("first unlock should insert");
    assert_eq!(unlock.progress, 100);
    assert!(second.is_none());
    let unlocked = AchievementRepo::unlocked_ids(&pool, user_id).await.unwrap();
    assert_eq!(unlocked, vec![achievement.id]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_unlocked_joins_catalog(pool: PgPool) {
    AchievementRepo::seed(&pool, &default_entries()).await.unwrap();
    let user_id = create_user(&pool, "collector").await;
    let other_id = create_user(&pool, "bystander").await;
    let achievement = catalog_entry(&pool, "items_10").await;

    AchievementRepo::record_unlock(&pool, user_id, achievement.id).await.unwrap();

    let mine = AchievementRepo::list_unlocked(&pool, user_id).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].key, "items_10");
    assert_eq!(mine[0].name, achievement.name);

    assert!(AchievementRepo::list_unlocked(&pool, other_id).await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Sync log
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn sync_log_records_each_attempt(pool: PgPool) {
    let user_id = create_user(&pool, "logger").await;
    for (success, total) in [(true, Some(3)), (false, None)] {
        let input = CreateSyncLog {
            user_id,
            success,
            error_code: (!success).then(|| "VALIDATION_ERROR".to_string()),
            message: None,
            total_items: total,
        };
        let log = SyncLogRepo::create(&pool, &input).await.unwrap();
        assert_eq!(log.user_id, user_id);
        assert_eq!(log.success, success);
        assert_eq!(log.total_items, total);
    }

    let rows: Vec<(bool, Option<String>)> =
        sqlx::query_as("SELECT success, error_code FROM sync_logs WHERE user_id = $1 ORDER BY id")
            .bind(user_id)
            .fetch_all(&pool)
            .await
            .unwrap();
    assert_eq!(
        rows,
        vec![(true, None), (false, Some("VALIDATION_ERROR".to_string()))]
    );
}
