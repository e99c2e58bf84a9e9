//! Grail progress snapshot model.

use grail_core::error::CoreError;
use grail_core::grail::{GameMode, GrailConfiguration, GrailType, StoredConfiguration};
use grail_core::progress::{CategoryCount, DerivedProgress};
use grail_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `grail_progress` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrailProgress {
    pub id: DbId,
    pub user_id: DbId,
    pub game_mode: String,
    pub grail_type: String,
    pub include_runes: bool,
    pub include_runewords: bool,
    pub locked: bool,
    pub items: serde_json::Value,
    pub eth_items: serde_json::Value,
    pub runes: serde_json::Value,
    pub runewords: serde_json::Value,
    pub total_items: i32,
    pub total_eth_items: i32,
    pub total_runes: i32,
    pub total_runewords: i32,
    pub armor_owned: i32,
    pub armor_exists: i32,
    pub weapons_owned: i32,
    pub weapons_exists: i32,
    pub other_owned: i32,
    pub other_exists: i32,
    pub sets_owned: i32,
    pub sets_exists: i32,
    pub eth_armor_owned: i32,
    pub eth_armor_exists: i32,
    pub eth_weapons_owned: i32,
    pub eth_weapons_exists: i32,
    pub eth_other_owned: i32,
    pub eth_other_exists: i32,
    pub normal_completion: f64,
    pub ethereal_completion: f64,
    pub rune_completion: f64,
    pub runeword_completion: f64,
    pub overall_completion: f64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl GrailProgress {
    /// Parse the stored configuration columns.
    pub fn configuration(&self) -> Result<GrailConfiguration, CoreError> {
        Ok(GrailConfiguration {
            game_mode: GameMode::from_str_value(&self.game_mode)?,
            grail_type: GrailType::from_str_value(&self.grail_type)?,
            include_runes: self.include_runes,
            include_runewords: self.include_runewords,
        })
    }

    /// Configuration plus lock flag, as consumed by the lock check.
    pub fn stored_configuration(&self) -> Result<StoredConfiguration, CoreError> {
        Ok(StoredConfiguration {
            configuration: self.configuration()?,
            locked: self.locked,
        })
    }

    /// The derived fields as a domain value.
    pub fn derived(&self) -> DerivedProgress {
        let pair = |owned, exists| CategoryCount { owned, exists };
        DerivedProgress {
            total_items: self.total_items,
            total_eth_items: self.total_eth_items,
            total_runes: self.total_runes,
            total_runewords: self.total_runewords,
            armor: pair(self.armor_owned, self.armor_exists),
            weapons: pair(self.weapons_owned, self.weapons_exists),
            other: pair(self.other_owned, self.other_exists),
            sets: pair(self.sets_owned, self.sets_exists),
            eth_armor: pair(self.eth_armor_owned, self.eth_armor_exists),
            eth_weapons: pair(self.eth_weapons_owned, self.eth_weapons_exists),
            eth_other: pair(self.eth_other_owned, self.eth_other_exists),
            normal_completion: self.normal_completion,
            ethereal_completion: self.ethereal_completion,
            rune_completion: self.rune_completion,
            runeword_completion: self.runeword_completion,
            overall_completion: self.overall_completion,
        }
    }

    /// Identifiers of every found normal item.
    pub fn item_keys(&self) -> impl Iterator<Item = &str> {
        self.items
            .as_object()
            .into_iter()
            .flat_map(|m| m.keys().map(String::as_str))
    }
}

/// The raw collections written alongside the derived fields.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotCollections<'a> {
    pub items: &'a serde_json::Map<String, serde_json::Value>,
    pub eth_items: &'a serde_json::Map<String, serde_json::Value>,
    pub runes: Option<&'a serde_json::Map<String, serde_json::Value>>,
    pub runewords: Option<&'a serde_json::Map<String, serde_json::Value>>,
}
