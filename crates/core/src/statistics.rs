//! Per-user statistics: find rate and daily streaks.
//!
//! Day boundaries are UTC calendar days. A "find" is a sync whose combined
//! found count (items, ethereal items, runes, runewords) is larger than the
//! previous snapshot's.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::types::Timestamp;

/// Streak counters carried between syncs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StreakState {
    pub current: i32,
    pub longest: i32,
    /// UTC day of the most recent find.
    pub last_day: Option<NaiveDate>,
}

/// Statistics as they stood before this sync.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviousStatistics {
    pub first_item_at: Option<Timestamp>,
    pub grail_started_at: Timestamp,
    pub streak: StreakState,
    pub updated_at: Timestamp,
}

/// Statistics to persist after this sync.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NextStatistics {
    pub first_item_at: Option<Timestamp>,
    pub last_item_at: Timestamp,
    pub grail_started_at: Timestamp,
    pub items_per_day: f64,
    pub streak: StreakState,
}

/// Whether this sync found anything new.
///
/// With no previous snapshot, any non-zero count is a find.
pub fn is_new_find(previous_found: Option<i64>, current_found: i64) -> bool {
    current_found > previous_found.unwrap_or(0)
}

/// Advance the streak counters for a sync on `today`.
pub fn advance_streak(prev: StreakState, found_new: bool, today: NaiveDate) -> StreakState {
    let yesterday = today - Duration::days(1);

    if !found_new {
        // The streak only lapses once a full day has passed without a find.
        let current = match prev.last_day {
            Some(day) if day >= yesterday => prev.current,
            _ => 0,
        };
        return StreakState {
            current,
            longest: prev.longest.max(current),
            last_day: prev.last_day,
        };
    }

    let current = match prev.last_day {
        Some(day) if day == today => prev.current.max(1),
        Some(day) if day == yesterday => prev.current + 1,
        _ => 1,
    };
    StreakState {
        current,
        longest: prev.longest.max(current),
        last_day: Some(today),
    }
}

/// Total items divided by whole days since the previous statistics update.
///
/// The divisor is never below one day.
pub fn items_per_day(total_items: i32, previous_update: Option<Timestamp>, now: Timestamp) -> f64 {
    let days = previous_update
        .map(|at| (now - at).num_days())
        .unwrap_or(1)
        .max(1);
    f64::from(total_items) / days as f64
}

/// Compute the statistics row written by a sync.
pub fn next_statistics(
    prev: Option<&PreviousStatistics>,
    found_new: bool,
    total_items: i32,
    now: Timestamp,
) -> NextStatistics {
    let today = now.date_naive();
    let streak = advance_streak(prev.map(|p| p.streak).unwrap_or_default(), found_new, today);

    let first_item_at = match prev.and_then(|p| p.first_item_at) {
        Some(at) => Some(at),
        None if found_new => Some(now),
        None => None,
    };

    NextStatistics {
        first_item_at,
        last_item_at: now,
        grail_started_at: prev.map_or(now, |p| p.grail_started_at),
        items_per_day: items_per_day(total_items, prev.map(|p| p.updated_at), now),
        streak,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> Timestamp {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn first_find_starts_streak() {
        let s = advance_streak(StreakState::default(), true, day(2024, 3, 1));
        assert_eq!(s, StreakState { current: 1, longest: 1, last_day: Some(day(2024, 3, 1)) });
    }

    #[test]
    fn consecutive_days_extend_streak() {
        let mut s = StreakState::default();
        for d in 1..=4 {
            s = advance_streak(s, true, day(2024, 3, d));
        }
        assert_eq!(s.current, 4);
        assert_eq!(s.longest, 4);
    }

    #[test]
    fn same_day_finds_do_not_double_count() {
        let s = advance_streak(StreakState::default(), true, day(2024, 3, 1));
        let s = advance_streak(s, true, day(2024, 3, 1));
        assert_eq!(s.current, 1);
    }

    #[test]
    fn gap_resets_current_but_keeps_longest() {
        let mut s = StreakState::default();
        for d in 1..=3 {
            s = advance_streak(s, true, day(2024, 3, d));
        }
        let s = advance_streak(s, true, day(2024, 3, 10));
        assert_eq!(s.current, 1);
        assert_eq!(s.longest, 3);
    }

    #[test]
    fn sync_without_finds_lapses_stale_streak() {
        let s = StreakState { current: 5, longest: 7, last_day: Some(day(2024, 3, 1)) };
        let kept = advance_streak(s, false, day(2024, 3, 2));
        assert_eq!(kept.current, 5);
        let lapsed = advance_streak(s, false, day(2024, 3, 3));
        assert_eq!(lapsed.current, 0);
        assert_eq!(lapsed.longest, 7);
        assert_eq!(lapsed.last_day, Some(day(2024, 3, 1)));
    }

    #[test]
    fn new_find_detection() {
        assert!(is_new_find(None, 1));
        assert!(!is_new_find(None, 0));
        assert!(is_new_find(Some(4), 5));
        assert!(!is_new_find(Some(5), 5));
        assert!(!is_new_find(Some(6), 5));
    }

    #[test]
    fn items_per_day_uses_minimum_of_one_day() {
        let now = at(2024, 3, 10, 12);
        assert_eq!(items_per_day(30, None, now), 30.0);
        assert_eq!(items_per_day(30, Some(at(2024, 3, 10, 1)), now), 30.0);
        assert_eq!(items_per_day(30, Some(at(2024, 3, 7, 12)), now), 10.0);
    }

    #[test]
    fn next_statistics_for_new_user() {
        let now = at(2024, 3, 10, 12);
        let next = next_statistics(None, true, 5, now);
        assert_eq!(next.first_item_at, Some(now));
        assert_eq!(next.grail_started_at, now);
        assert_eq!(next.last_item_at, now);
        assert_eq!(next.streak.current, 1);
    }

    #[test]
    fn next_statistics_preserves_first_item_and_start() {
        let started = at(2024, 1, 1, 0);
        let first = at(2024, 1, 2, 0);
        let prev = PreviousStatistics {
            first_item_at: Some(first),
            grail_started_at: started,
            streak: StreakState { current: 2, longest: 2, last_day: Some(day(2024, 3, 9)) },
            updated_at: at(2024, 3, 9, 12),
        };
        let now = at(2024, 3, 10, 12);
        let next = next_statistics(Some(&prev), true, 10, now);
        assert_eq!(next.first_item_at, Some(first));
        assert_eq!(next.grail_started_at, started);
        assert_eq!(next.streak.current, 3);
        assert_eq!(next.items_per_day, 10.0);
    }

    #[test]
    fn no_find_leaves_first_item_unset() {
        let next = next_statistics(None, false, 0, at(2024, 3, 10, 12));
        assert_eq!(next.first_item_at, None);
        assert_eq!(next.streak.current, 0);
    }
}
