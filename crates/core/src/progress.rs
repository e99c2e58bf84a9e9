//! Snapshot validation and derived progress computation.
//!
//! The desktop client submits a full snapshot of found items on every
//! sync. This module validates it and recomputes every derived count and
//! percentage from scratch, so nothing stale survives a sync.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::catalog::ItemCatalog;
use crate::error::CoreError;
use crate::grail::{GameMode, GrailConfiguration, GrailType};

/// Found-item collection: item identifier to opaque client metadata.
pub type FoundMap = serde_json::Map<String, serde_json::Value>;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Top-level summary reported by the client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotSummary {
    #[serde(default)]
    pub total: Option<f64>,
    #[serde(default)]
    pub found: Option<f64>,
    #[serde(default)]
    pub percentage: Option<f64>,
}

/// Owned/exists/percent for a single category, as computed by the client.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Validate)]
pub struct CategoryStat {
    #[validate(range(min = 0.0))]
    pub owned: f64,
    #[validate(range(min = 0.0))]
    pub exists: f64,
    #[serde(default)]
    pub percent: f64,
}

/// Optional per-category breakdown. Preferred over map counting when present.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DetailedStats {
    #[validate(nested)]
    pub armor: Option<CategoryStat>,
    #[validate(nested)]
    pub weapons: Option<CategoryStat>,
    #[validate(nested)]
    pub other: Option<CategoryStat>,
    #[validate(nested)]
    pub sets: Option<CategoryStat>,
    #[validate(nested)]
    pub eth_armor: Option<CategoryStat>,
    #[validate(nested)]
    pub eth_weapons: Option<CategoryStat>,
    #[validate(nested)]
    pub eth_other: Option<CategoryStat>,
    #[validate(nested)]
    pub runes: Option<CategoryStat>,
    #[validate(nested)]
    pub runewords: Option<CategoryStat>,
}

/// The sync request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSnapshot {
    pub game_mode: String,
    pub grail_type: String,
    #[serde(default)]
    pub include_runes: bool,
    #[serde(default)]
    pub include_runewords: bool,
    #[serde(default)]
    pub items: Option<FoundMap>,
    #[serde(default)]
    pub eth_items: Option<FoundMap>,
    #[serde(default)]
    pub runes: Option<FoundMap>,
    #[serde(default)]
    pub runewords: Option<FoundMap>,
    #[serde(default)]
    pub stats: Option<SnapshotSummary>,
    #[serde(default)]
    pub detailed_stats: Option<DetailedStats>,
}

/// A snapshot that passed validation. Borrowed from the request body.
#[derive(Debug, Clone)]
pub struct ValidatedSnapshot<'a> {
    pub configuration: GrailConfiguration,
    pub items: &'a FoundMap,
    pub eth_items: &'a FoundMap,
    pub runes: Option<&'a FoundMap>,
    pub runewords: Option<&'a FoundMap>,
    pub stats: Option<&'a SnapshotSummary>,
    pub detailed_stats: Option<&'a DetailedStats>,
}

impl SyncSnapshot {
    /// Validate the snapshot before anything touches the database.
    ///
    /// `items` and `ethItems` must both be present. Configuration strings
    /// must name known values. Detailed category counts must be non-negative.
    pub fn validate(&self) -> Result<ValidatedSnapshot<'_>, CoreError> {
        let (items, eth_items) = match (&self.items, &self.eth_items) {
            (Some(items), Some(eth_items)) => (items, eth_items),
            _ => {
                return Err(CoreError::Validation(
                    "Invalid data format: items and ethItems are required".into(),
                ))
            }
        };

        let configuration = GrailConfiguration {
            game_mode: GameMode::from_str_value(&self.game_mode)?,
            grail_type: GrailType::from_str_value(&self.grail_type)?,
            include_runes: self.include_runes,
            include_runewords: self.include_runewords,
        };

        if let Some(detailed) = &self.detailed_stats {
            Validate::validate(detailed)
                .map_err(|e| CoreError::Validation(format!("Invalid detailedStats: {e}")))?;
        }

        Ok(ValidatedSnapshot {
            configuration,
            items,
            eth_items,
            runes: self.runes.as_ref(),
            runewords: self.runewords.as_ref(),
            stats: self.stats.as_ref(),
            detailed_stats: self.detailed_stats.as_ref(),
        })
    }
}

// ---------------------------------------------------------------------------
// Derived values
// ---------------------------------------------------------------------------

/// Owned/exists pair persisted per category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub owned: i32,
    pub exists: i32,
}

impl From<&CategoryStat> for CategoryCount {
    fn from(stat: &CategoryStat) -> Self {
        Self {
            owned: to_count(stat.owned),
            exists: to_count(stat.exists),
        }
    }
}

/// Every derived field written by a sync.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedProgress {
    pub total_items: i32,
    pub total_eth_items: i32,
    pub total_runes: i32,
    pub total_runewords: i32,
    pub armor: CategoryCount,
    pub weapons: CategoryCount,
    pub other: CategoryCount,
    pub sets: CategoryCount,
    pub eth_armor: CategoryCount,
    pub eth_weapons: CategoryCount,
    pub eth_other: CategoryCount,
    pub normal_completion: f64,
    pub ethereal_completion: f64,
    pub rune_completion: f64,
    pub runeword_completion: f64,
    pub overall_completion: f64,
}

impl DerivedProgress {
    /// Combined found count across every collection, used for streak detection.
    pub fn found_count(&self) -> i64 {
        i64::from(self.total_items)
            + i64::from(self.total_eth_items)
            + i64::from(self.total_runes)
            + i64::from(self.total_runewords)
    }
}

/// Recompute every derived field from a validated snapshot.
///
/// Items and ethereal items are always counted from the submitted maps.
/// Rune and runeword counts prefer the client's detailed breakdown, since
/// ownership there spans several saves. The overall percentage is taken
/// from the client summary as reported.
pub fn derive_progress(snapshot: &ValidatedSnapshot<'_>, catalog: &ItemCatalog) -> DerivedProgress {
    let detailed = snapshot.detailed_stats;
    let config = &snapshot.configuration;

    let total_items = len_as_count(snapshot.items.len());
    let total_eth_items = len_as_count(snapshot.eth_items.len());

    let detailed_runes = detailed.and_then(|d| d.runes.as_ref());
    let detailed_runewords = detailed.and_then(|d| d.runewords.as_ref());

    let total_runes = match detailed_runes {
        Some(stat) => to_count(stat.owned),
        None => len_as_count(snapshot.runes.map_or(0, |m| m.len())),
    };
    let total_runewords = match detailed_runewords {
        Some(stat) => to_count(stat.owned),
        None => len_as_count(snapshot.runewords.map_or(0, |m| m.len())),
    };

    let overall_completion = clamp_pct(
        snapshot
            .stats
            .and_then(|s| s.percentage)
            .unwrap_or(0.0),
    );

    let count = |pick: fn(&DetailedStats) -> Option<&CategoryStat>| -> CategoryCount {
        detailed
            .and_then(pick)
            .map(CategoryCount::from)
            .unwrap_or_default()
    };
    let armor = count(|d| d.armor.as_ref());
    let weapons = count(|d| d.weapons.as_ref());
    let other = count(|d| d.other.as_ref());
    let sets = count(|d| d.sets.as_ref());
    let eth_armor = count(|d| d.eth_armor.as_ref());
    let eth_weapons = count(|d| d.eth_weapons.as_ref());
    let eth_other = count(|d| d.eth_other.as_ref());

    let (normal_completion, ethereal_completion) = if detailed.is_some() {
        (
            ratio_pct(&[armor, weapons, other, sets]),
            ratio_pct(&[eth_armor, eth_weapons, eth_other]),
        )
    } else {
        (overall_completion, overall_completion)
    };

    let rune_completion = match detailed_runes {
        Some(stat) => clamp_pct(stat.percent),
        None if config.include_runes && total_runes > 0 => {
            clamp_pct(f64::from(total_runes) / f64::from(catalog.totals.runes) * 100.0)
        }
        None => overall_completion,
    };
    let runeword_completion = match detailed_runewords {
        Some(stat) => clamp_pct(stat.percent),
        None if config.include_runewords && total_runewords > 0 => {
            clamp_pct(f64::from(total_runewords) / f64::from(catalog.totals.runewords) * 100.0)
        }
        None => overall_completion,
    };

    DerivedProgress {
        total_items,
        total_eth_items,
        total_runes,
        total_runewords,
        armor,
        weapons,
        other,
        sets,
        eth_armor,
        eth_weapons,
        eth_other,
        normal_completion,
        ethereal_completion,
        rune_completion,
        runeword_completion,
        overall_completion,
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Sum owned over sum exists, as a percentage. The denominator is at least 1.
fn ratio_pct(counts: &[CategoryCount]) -> f64 {
    let owned: i64 = counts.iter().map(|c| i64::from(c.owned)).sum();
    let exists: i64 = counts.iter().map(|c| i64::from(c.exists)).sum();
    clamp_pct(owned as f64 * 100.0 / exists.max(1) as f64)
}

/// Clamp a percentage to `[0, 100]`. Non-finite values become 0.
pub fn clamp_pct(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

fn to_count(value: f64) -> i32 {
    if value.is_finite() {
        value.round().clamp(0.0, f64::from(i32::MAX)) as i32
    } else {
        0
    }
}

fn len_as_count(len: usize) -> i32 {
    i32::try_from(len).unwrap_or(i32::MAX)
}
