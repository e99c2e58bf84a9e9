//! Achievement catalog and unlock ledger models.

use grail_core::achievements::{AchievementDefinition, AchievementRule, Predicate};
use grail_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `achievements` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: DbId,
    pub key: String,
    pub name: String,
    pub description: String,
    pub points: i32,
    pub rarity: String,
    pub category: String,
    pub conditions: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Achievement {
    /// Parse the stored conditions into an evaluable rule.
    ///
    /// Unparseable conditions yield a rule that never qualifies.
    pub fn to_rule(&self) -> AchievementRule {
        let predicate = match Predicate::from_conditions(&self.conditions) {
            Ok(p) => Some(p),
            Err(e) => {
                tracing::warn!(
                    achievement_key = %self.key,
                    error = %e,
                    "Ignoring achievement with invalid conditions",
                );
                None
            }
        };
        AchievementRule {
            id: self.id,
            key: self.key.clone(),
            predicate,
        }
    }
}

/// A row from the `user_achievements` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAchievement {
    pub id: DbId,
    pub user_id: DbId,
    pub achievement_id: DbId,
    pub progress: i16,
    pub unlocked_at: Timestamp,
}

/// An unlock joined with its catalog entry, for listing a user's achievements.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockedAchievement {
    pub achievement_id: DbId,
    pub key: String,
    pub name: String,
    pub description: String,
    pub points: i32,
    pub rarity: String,
    pub category: String,
    pub progress: i16,
    pub unlocked_at: Timestamp,
}

/// DTO for seeding one catalog entry.
#[derive(Debug, Clone)]
pub struct UpsertAchievement {
    pub key: String,
    pub name: String,
    pub description: String,
    pub points: i32,
    pub rarity: String,
    pub category: String,
    pub conditions: serde_json::Value,
}

impl From<&AchievementDefinition> for UpsertAchievement {
    fn from(def: &AchievementDefinition) -> Self {
        Self {
            key: def.key.to_string(),
            name: def.name.to_string(),
            description: def.description.to_string(),
            points: def.points,
            rarity: def.rarity.as_str().to_string(),
            category: def.category.as_str().to_string(),
            conditions: def.predicate.to_conditions(),
        }
    }
}
