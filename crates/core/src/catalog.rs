//! Static item catalog.
//!
//! Maps item identifiers to their category and set membership, and records
//! how many runes and runewords exist. Loaded once at startup and shared
//! read-only across requests.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Number of runes in the game.
pub const DEFAULT_TOTAL_RUNES: u32 = 33;

/// Number of runewords in the game.
pub const DEFAULT_TOTAL_RUNEWORDS: u32 = 50;

/// Top-level category of a catalog item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemCategory {
    Armor,
    Weapons,
    Other,
    Sets,
}

/// A single catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogItem {
    pub category: ItemCategory,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub tier: Option<String>,
    /// Name of the set this item belongs to, for set pieces.
    #[serde(default)]
    pub set: Option<String>,
}

/// Fixed totals used when the client does not send a detailed breakdown.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogTotals {
    #[serde(default = "default_total_runes")]
    pub runes: u32,
    #[serde(default = "default_total_runewords")]
    pub runewords: u32,
}

fn default_total_runes() -> u32 {
    DEFAULT_TOTAL_RUNES
}

fn default_total_runewords() -> u32 {
    DEFAULT_TOTAL_RUNEWORDS
}

impl Default for CatalogTotals {
    fn default() -> Self {
        Self {
            runes: DEFAULT_TOTAL_RUNES,
            runewords: DEFAULT_TOTAL_RUNEWORDS,
        }
    }
}

/// The read-only item catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemCatalog {
    #[serde(default)]
    pub totals: CatalogTotals,
    #[serde(default)]
    pub items: BTreeMap<String, CatalogItem>,
}

impl ItemCatalog {
    /// Parse a catalog from its JSON representation.
    pub fn from_json_str(json: &str) -> Result<Self, CoreError> {
        let catalog: ItemCatalog = serde_json::from_str(json)
            .map_err(|e| CoreError::Validation(format!("Invalid item catalog: {e}")))?;
        if catalog.totals.runes == 0 || catalog.totals.runewords == 0 {
            return Err(CoreError::Validation(
                "Item catalog totals for runes and runewords must be positive".into(),
            ));
        }
        Ok(catalog)
    }

    /// Members of every named set, keyed by set name.
    pub fn sets(&self) -> BTreeMap<&str, Vec<&str>> {
        let mut sets: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for (id, item) in &self.items {
            if let Some(set) = item.set.as_deref() {
                sets.entry(set).or_default().push(id.as_str());
            }
        }
        sets
    }

    /// Count the sets whose every member appears in `found`.
    pub fn completed_sets<'a>(&self, found: impl IntoIterator<Item = &'a str>) -> u32 {
        let found: HashSet<&str> = found.into_iter().collect();
        self.sets()
            .values()
            .filter(|members| members.iter().all(|m| found.contains(m)))
            .count() as u32
    }
}
