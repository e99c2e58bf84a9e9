//! Per-user statistics model.

use chrono::NaiveDate;
use grail_core::statistics::{PreviousStatistics, StreakState};
use grail_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `user_statistics` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatistics {
    pub id: DbId,
    pub user_id: DbId,
    pub first_item_at: Option<Timestamp>,
    pub last_item_at: Option<Timestamp>,
    pub grail_started_at: Timestamp,
    pub items_per_day: f64,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub last_streak_day: Option<NaiveDate>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl UserStatistics {
    /// The row as input to the next statistics computation.
    pub fn as_previous(&self) -> PreviousStatistics {
        PreviousStatistics {
            first_item_at: self.first_item_at,
            grail_started_at: self.grail_started_at,
            streak: StreakState {
                current: self.current_streak,
                longest: self.longest_streak,
                last_day: self.last_streak_day,
            },
            updated_at: self.updated_at,
        }
    }
}
