//! Achievement rules and their evaluation.
//!
//! Conditions are stored as JSON objects (`{"field": {"min": N}}`,
//! `{"field": {"max": N}}`, `{"field": true}`), with all entries ANDed. They
//! parse into a closed [`Predicate`] type and are evaluated against a
//! [`Facts`] table built from the user's persisted progress. A field that
//! is not in the table never satisfies a predicate.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::grail::{GameMode, GrailConfiguration};
use crate::progress::DerivedProgress;
use crate::statistics::StreakState;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Fact field names
// ---------------------------------------------------------------------------

/// Field names available to achievement conditions.
pub mod fields {
    pub const TOTAL_ITEMS: &str = "totalItems";
    pub const TOTAL_ETH_ITEMS: &str = "totalEthItems";
    pub const TOTAL_RUNES: &str = "totalRunes";
    pub const TOTAL_RUNEWORDS: &str = "totalRunewords";
    pub const NORMAL_COMPLETION: &str = "normalCompletion";
    pub const ETHEREAL_COMPLETION: &str = "etherealCompletion";
    pub const RUNE_COMPLETION: &str = "runeCompletion";
    pub const RUNEWORD_COMPLETION: &str = "runewordCompletion";
    pub const OVERALL_COMPLETION: &str = "overallCompletion";
    pub const ARMOR_OWNED: &str = "armorOwned";
    pub const WEAPONS_OWNED: &str = "weaponsOwned";
    pub const OTHER_OWNED: &str = "otherOwned";
    pub const SETS_OWNED: &str = "setsOwned";
    pub const ETH_ARMOR_OWNED: &str = "ethArmorOwned";
    pub const ETH_WEAPONS_OWNED: &str = "ethWeaponsOwned";
    pub const ETH_OTHER_OWNED: &str = "ethOtherOwned";
    pub const CURRENT_STREAK: &str = "currentStreak";
    pub const LONGEST_STREAK: &str = "longestStreak";
    pub const ITEMS_PER_DAY: &str = "itemsPerDay";
    pub const COMPLETED_SETS: &str = "completedSets";
    pub const HARDCORE: &str = "hardcore";
    pub const INCLUDE_RUNES: &str = "includeRunes";
    pub const INCLUDE_RUNEWORDS: &str = "includeRunewords";
    pub const GRAIL_COMPLETE: &str = "grailComplete";
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

pub const RARITY_COMMON: &str = "common";
pub const RARITY_RARE: &str = "rare";
pub const RARITY_EPIC: &str = "epic";
pub const RARITY_LEGENDARY: &str = "legendary";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Common => RARITY_COMMON,
            Self::Rare => RARITY_RARE,
            Self::Epic => RARITY_EPIC,
            Self::Legendary => RARITY_LEGENDARY,
        }
    }
}

pub const CATEGORY_MILESTONE: &str = "milestone";
pub const CATEGORY_COMPLETION: &str = "completion";
pub const CATEGORY_SPEED: &str = "speed";
pub const CATEGORY_SPECIAL: &str = "special";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AchievementCategory {
    Milestone,
    Completion,
    Speed,
    Special,
}

impl AchievementCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Milestone => CATEGORY_MILESTONE,
            Self::Completion => CATEGORY_COMPLETION,
            Self::Speed => CATEGORY_SPEED,
            Self::Special => CATEGORY_SPECIAL,
        }
    }
}

// ---------------------------------------------------------------------------
// Facts
// ---------------------------------------------------------------------------

/// A single value a condition can test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fact {
    Number(f64),
    Flag(bool),
}

/// The values achievement conditions are evaluated against.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Facts(BTreeMap<&'static str, Fact>);

impl Facts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn number(mut self, field: &'static str, value: f64) -> Self {
        self.0.insert(field, Fact::Number(value));
        self
    }

    pub fn flag(mut self, field: &'static str, value: bool) -> Self {
        self.0.insert(field, Fact::Flag(value));
        self
    }

    pub fn get(&self, field: &str) -> Option<Fact> {
        self.0.get(field).copied()
    }

    /// Build the fact table for a freshly persisted snapshot.
    pub fn from_progress(
        progress: &DerivedProgress,
        configuration: &GrailConfiguration,
        completed_sets: u32,
    ) -> Self {
        use fields::*;

        Facts::new()
            .number(TOTAL_ITEMS, f64::from(progress.total_items))
            .number(TOTAL_ETH_ITEMS, f64::from(progress.total_eth_items))
            .number(TOTAL_RUNES, f64::from(progress.total_runes))
            .number(TOTAL_RUNEWORDS, f64::from(progress.total_runewords))
            .number(NORMAL_COMPLETION, progress.normal_completion)
            .number(ETHEREAL_COMPLETION, progress.ethereal_completion)
            .number(RUNE_COMPLETION, progress.rune_completion)
            .number(RUNEWORD_COMPLETION, progress.runeword_completion)
            .number(OVERALL_COMPLETION, progress.overall_completion)
            .number(ARMOR_OWNED, f64::from(progress.armor.owned))
            .number(WEAPONS_OWNED, f64::from(progress.weapons.owned))
            .number(OTHER_OWNED, f64::from(progress.other.owned))
            .number(SETS_OWNED, f64::from(progress.sets.owned))
            .number(ETH_ARMOR_OWNED, f64::from(progress.eth_armor.owned))
            .number(ETH_WEAPONS_OWNED, f64::from(progress.eth_weapons.owned))
            .number(ETH_OTHER_OWNED, f64::from(progress.eth_other.owned))
            .number(COMPLETED_SETS, f64::from(completed_sets))
            .flag(HARDCORE, configuration.game_mode == GameMode::Hardcore)
            .flag(INCLUDE_RUNES, configuration.include_runes)
            .flag(INCLUDE_RUNEWORDS, configuration.include_runewords)
            .flag(GRAIL_COMPLETE, progress.overall_completion >= 100.0)
    }

    /// Add the streak and find-rate fields.
    ///
    /// Left out for users without a statistics row, so those conditions
    /// stay unsatisfied rather than reading as zero.
    pub fn with_statistics(self, streak: &StreakState, items_per_day: f64) -> Self {
        self.number(fields::CURRENT_STREAK, f64::from(streak.current))
            .number(fields::LONGEST_STREAK, f64::from(streak.longest))
            .number(fields::ITEMS_PER_DAY, items_per_day)
    }
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

/// A parsed achievement condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    MinThreshold { field: String, value: f64 },
    MaxThreshold { field: String, value: f64 },
    BooleanFlag { field: String, expected: bool },
    All(Vec<Predicate>),
}

impl Predicate {
    pub fn min(field: &str, value: f64) -> Self {
        Self::MinThreshold { field: field.to_string(), value }
    }

    pub fn max(field: &str, value: f64) -> Self {
        Self::MaxThreshold { field: field.to_string(), value }
    }

    pub fn flag(field: &str, expected: bool) -> Self {
        Self::BooleanFlag { field: field.to_string(), expected }
    }

    /// Parse a stored conditions object.
    ///
    /// Every entry becomes one or two leaf predicates; multiple leaves are
    /// wrapped in [`Predicate::All`]. An empty object is rejected so that a
    /// blank condition can never unlock anything.
    pub fn from_conditions(conditions: &Value) -> Result<Self, CoreError> {
        let object = conditions.as_object().ok_or_else(|| {
            CoreError::Validation("Achievement conditions must be a JSON object".into())
        })?;

        let mut leaves = Vec::new();
        for (field, spec) in object {
            match spec {
                Value::Bool(expected) => leaves.push(Predicate::flag(field, *expected)),
                Value::Object(bounds) => {
                    let before = leaves.len();
                    for (bound, value) in bounds {
                        let value = value.as_f64().ok_or_else(|| {
                            CoreError::Validation(format!(
                                "Condition bound '{field}.{bound}' must be a number"
                            ))
                        })?;
                        match bound.as_str() {
                            "min" => leaves.push(Predicate::min(field, value)),
                            "max" => leaves.push(Predicate::max(field, value)),
                            other => {
                                return Err(CoreError::Validation(format!(
                                    "Unknown condition bound '{other}' on '{field}'"
                                )))
                            }
                        }
                    }
                    if leaves.len() == before {
                        return Err(CoreError::Validation(format!(
                            "Condition on '{field}' has no bounds"
                        )));
                    }
                }
                _ => {
                    return Err(CoreError::Validation(format!(
                        "Unsupported condition shape for '{field}'"
                    )))
                }
            }
        }

        match leaves.len() {
            0 => Err(CoreError::Validation("Achievement conditions are empty".into())),
            1 => Ok(leaves.remove(0)),
            _ => Ok(Predicate::All(leaves)),
        }
    }

    /// Render back into the stored conditions form.
    pub fn to_conditions(&self) -> Value {
        let mut object = Map::new();
        self.write_into(&mut object);
        Value::Object(object)
    }

    fn write_into(&self, object: &mut Map<String, Value>) {
        match self {
            Self::MinThreshold { field, value } => insert_bound(object, field, "min", *value),
            Self::MaxThreshold { field, value } => insert_bound(object, field, "max", *value),
            Self::BooleanFlag { field, expected } => {
                object.insert(field.clone(), Value::Bool(*expected));
            }
            Self::All(parts) => parts.iter().for_each(|p| p.write_into(object)),
        }
    }

    /// Evaluate against `facts`. Missing or mistyped fields are not satisfied.
    pub fn is_satisfied(&self, facts: &Facts) -> bool {
        match self {
            Self::MinThreshold { field, value } => {
                matches!(facts.get(field), Some(Fact::Number(n)) if n >= *value)
            }
            Self::MaxThreshold { field, value } => {
                matches!(facts.get(field), Some(Fact::Number(n)) if n <= *value)
            }
            Self::BooleanFlag { field, expected } => {
                matches!(facts.get(field), Some(Fact::Flag(b)) if b == *expected)
            }
            Self::All(parts) => !parts.is_empty() && parts.iter().all(|p| p.is_satisfied(facts)),
        }
    }
}

fn insert_bound(object: &mut Map<String, Value>, field: &str, bound: &str, value: f64) {
    let entry = object
        .entry(field.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if let Value::Object(bounds) = entry {
        bounds.insert(bound.to_string(), Value::from(value));
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// A catalog achievement ready for evaluation.
///
/// `predicate` is `None` when the stored conditions failed to parse; such
/// achievements are never awarded.
#[derive(Debug, Clone)]
pub struct AchievementRule {
    pub id: DbId,
    pub key: String,
    pub predicate: Option<Predicate>,
}

/// Rules that are not yet unlocked and whose predicate now holds.
///
/// Each rule is evaluated independently; the output follows input order
/// but callers must not attach meaning to it.
pub fn qualifying_rules<'a>(
    rules: &'a [AchievementRule],
    unlocked: &HashSet<DbId>,
    facts: &Facts,
) -> Vec<&'a AchievementRule> {
    rules
        .iter()
        .filter(|rule| !unlocked.contains(&rule.id))
        .filter(|rule| rule.predicate.as_ref().is_some_and(|p| p.is_satisfied(facts)))
        .collect()
}

// ---------------------------------------------------------------------------
// Default catalog
// ---------------------------------------------------------------------------

/// A seedable achievement definition.
#[derive(Debug, Clone)]
pub struct AchievementDefinition {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub points: i32,
    pub rarity: Rarity,
    pub category: AchievementCategory,
    pub predicate: Predicate,
}

/// The built-in achievement catalog, seeded by key at startup.
pub fn default_catalog() -> Vec<AchievementDefinition> {
    use fields::*;
    use AchievementCategory::{Completion, Milestone, Special, Speed};
    use Rarity::{Common, Epic, Legendary, Rare};

    vec![
        AchievementDefinition {
            key: "first_unique",
            name: "First Find",
            description: "Find your first grail item.",
            points: 10,
            rarity: Common,
            category: Milestone,
            predicate: Predicate::min(TOTAL_ITEMS, 1.0),
        },
        AchievementDefinition {
            key: "items_10",
            name: "Treasure Hunter",
            description: "Find 10 grail items.",
            points: 15,
            rarity: Common,
            category: Milestone,
            predicate: Predicate::min(TOTAL_ITEMS, 10.0),
        },
        AchievementDefinition {
            key: "items_100",
            name: "Hoarder",
            description: "Find 100 grail items.",
            points: 30,
            rarity: Rare,
            category: Milestone,
            predicate: Predicate::min(TOTAL_ITEMS, 100.0),
        },
        AchievementDefinition {
            key: "items_250",
            name: "Vault Keeper",
            description: "Find 250 grail items.",
            points: 50,
            rarity: Epic,
            category: Milestone,
            predicate: Predicate::min(TOTAL_ITEMS, 250.0),
        },
        AchievementDefinition {
            key: "grail_25",
            name: "Quarter Grail",
            description: "Reach 25% overall completion.",
            points: 25,
            rarity: Common,
            category: Completion,
            predicate: Predicate::min(OVERALL_COMPLETION, 25.0),
        },
        AchievementDefinition {
            key: "grail_50",
            name: "Half Grail",
            description: "Reach 50% overall completion.",
            points: 50,
            rarity: Rare,
            category: Completion,
            predicate: Predicate::min(OVERALL_COMPLETION, 50.0),
        },
        AchievementDefinition {
            key: "grail_75",
            name: "Almost There",
            description: "Reach 75% overall completion.",
            points: 75,
            rarity: Epic,
            category: Completion,
            predicate: Predicate::min(OVERALL_COMPLETION, 75.0),
        },
        AchievementDefinition {
            key: "grail_100",
            name: "Holy Grail",
            description: "Complete the grail.",
            points: 200,
            rarity: Legendary,
            category: Completion,
            predicate: Predicate::min(OVERALL_COMPLETION, 100.0),
        },
        AchievementDefinition {
            key: "first_ethereal",
            name: "Ghostly",
            description: "Find your first ethereal item.",
            points: 15,
            rarity: Common,
            category: Milestone,
            predicate: Predicate::min(TOTAL_ETH_ITEMS, 1.0),
        },
        AchievementDefinition {
            key: "ethereal_50",
            name: "Ethereal Devotee",
            description: "Reach 50% ethereal completion.",
            points: 60,
            rarity: Epic,
            category: Completion,
            predicate: Predicate::min(ETHEREAL_COMPLETION, 50.0),
        },
        AchievementDefinition {
            key: "first_rune",
            name: "Rune Seeker",
            description: "Find your first rune.",
            points: 10,
            rarity: Common,
            category: Milestone,
            predicate: Predicate::All(vec![
                Predicate::flag(INCLUDE_RUNES, true),
                Predicate::min(TOTAL_RUNES, 1.0),
            ]),
        },
        AchievementDefinition {
            key: "rune_master",
            name: "Rune Master",
            description: "Own every rune.",
            points: 100,
            rarity: Legendary,
            category: Completion,
            predicate: Predicate::min(RUNE_COMPLETION, 100.0),
        },
        AchievementDefinition {
            key: "first_runeword",
            name: "Runesmith",
            description: "Craft your first runeword.",
            points: 10,
            rarity: Common,
            category: Milestone,
            predicate: Predicate::All(vec![
                Predicate::flag(INCLUDE_RUNEWORDS, true),
                Predicate::min(TOTAL_RUNEWORDS, 1.0),
            ]),
        },
        AchievementDefinition {
            key: "set_collector",
            name: "Set Collector",
            description: "Complete every piece of a set.",
            points: 40,
            rarity: Rare,
            category: Special,
            predicate: Predicate::min(COMPLETED_SETS, 1.0),
        },
        AchievementDefinition {
            key: "streak_7",
            name: "Week of Luck",
            description: "Find something new 7 days in a row.",
            points: 40,
            rarity: Rare,
            category: Speed,
            predicate: Predicate::min(CURRENT_STREAK, 7.0),
        },
        AchievementDefinition {
            key: "speed_demon",
            name: "Speed Demon",
            description: "Average 10 or more items per day.",
            points: 50,
            rarity: Epic,
            category: Speed,
            predicate: Predicate::min(ITEMS_PER_DAY, 10.0),
        },
        AchievementDefinition {
            key: "hardcore_hero",
            name: "Hardcore Hero",
            description: "Reach 25% completion in hardcore.",
            points: 75,
            rarity: Epic,
            category: Special,
            predicate: Predicate::All(vec![
                Predicate::flag(HARDCORE, true),
                Predicate::min(OVERALL_COMPLETION, 25.0),
            ]),
        },
        AchievementDefinition {
            key: "community_helper",
            name: "Community Helper",
            description: "Earn 100 community points.",
            points: 30,
            rarity: Rare,
            category: Special,
            predicate: Predicate::min("communityPoints", 100.0),
        },
        AchievementDefinition {
            key: "beta_tester",
            name: "Beta Tester",
            description: "Took part in the beta.",
            points: 20,
            rarity: Rare,
            category: Special,
            predicate: Predicate::flag("betaParticipant", true),
        },
    ]
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    fn facts() -> Facts {
        Facts::new()
            .number(fields::TOTAL_ITEMS, 5.0)
            .number(fields::OVERALL_COMPLETION, 26.0)
            .flag(fields::HARDCORE, false)
    }

    #[test]
    fn parses_min_threshold() {
        let p = Predicate::from_conditions(&json!({ "totalItems": { "min": 1 } })).unwrap();
        assert_eq!(p, Predicate::min("totalItems", 1.0));
    }

    #[test]
    fn parses_conjunction_of_entries() {
        let p = Predicate::from_conditions(&json!({
            "hardcore": true,
            "overallCompletion": { "min": 25, "max": 50 }
        }))
        .unwrap();
        assert_matches!(p, Predicate::All(ref parts) if parts.len() == 3);
    }

    #[test]
    fn rejects_malformed_conditions() {
        for bad in [
            json!([]),
            json!({}),
            json!({ "totalItems": {} }),
            json!({ "totalItems": { "min": "one" } }),
            json!({ "totalItems": { "atLeast": 1 } }),
            json!({ "totalItems": 3 }),
        ] {
            assert_matches!(
                Predicate::from_conditions(&bad),
                Err(CoreError::Validation(_)),
                "{bad}"
            );
        }
    }

    #[test]
    fn min_and_max_thresholds() {
        assert!(Predicate::min("totalItems", 5.0).is_satisfied(&facts()));
        assert!(!Predicate::min("totalItems", 6.0).is_satisfied(&facts()));
        assert!(Predicate::max("totalItems", 5.0).is_satisfied(&facts()));
        assert!(!Predicate::max("totalItems", 4.0).is_satisfied(&facts()));
    }

    #[test]
    fn boolean_flag_equality() {
        assert!(Predicate::flag("hardcore", false).is_satisfied(&facts()));
        assert!(!Predicate::flag("hardcore", true).is_satisfied(&facts()));
    }

    #[test]
    fn missing_field_is_never_satisfied() {
        assert!(!Predicate::min("communityPoints", 0.0).is_satisfied(&facts()));
        assert!(!Predicate::max("communityPoints", 1e9).is_satisfied(&facts()));
        assert!(!Predicate::flag("betaParticipant", false).is_satisfied(&facts()));
    }

    #[test]
    fn mistyped_field_is_never_satisfied() {
        assert!(!Predicate::min("hardcore", 0.0).is_satisfied(&facts()));
        assert!(!Predicate::flag("totalItems", true).is_satisfied(&facts()));
    }

    #[test]
    fn conjunction_requires_all_parts() {
        let p = Predicate::All(vec![
            Predicate::min("totalItems", 1.0),
            Predicate::min("overallCompletion", 50.0),
        ]);
        assert!(!p.is_satisfied(&facts()));
        assert!(!Predicate::All(vec![]).is_satisfied(&facts()));
    }

    #[test]
    fn conditions_render_back_to_stored_form() {
        let stored = json!({
            "hardcore": true,
            "overallCompletion": { "min": 25.0, "max": 50.0 }
        });
        let p = Predicate::from_conditions(&stored).unwrap();
        assert_eq!(p.to_conditions(), stored);
    }

    #[test]
    fn qualifying_rules_skip_unlocked_and_unparsed() {
        let rules = vec![
            AchievementRule {
                id: 1,
                key: "first_unique".into(),
                predicate: Some(Predicate::min("totalItems", 1.0)),
            },
            AchievementRule {
                id: 2,
                key: "grail_25".into(),
                predicate: Some(Predicate::min("overallCompletion", 25.0)),
            },
            AchievementRule {
                id: 3,
                key: "grail_50".into(),
                predicate: Some(Predicate::min("overallCompletion", 50.0)),
            },
            AchievementRule {
                id: 4,
                key: "broken".into(),
                predicate: None,
            },
        ];
        let unlocked: HashSet<DbId> = [1].into_iter().collect();
        let keys: Vec<&str> = qualifying_rules(&rules, &unlocked, &facts())
            .into_iter()
            .map(|r| r.key.as_str())
            .collect();
        assert_eq!(keys, vec!["grail_25"]);
    }

    #[test]
    fn grail_25_threshold_boundary() {
        let p = Predicate::min(fields::OVERALL_COMPLETION, 25.0);
        assert!(!p.is_satisfied(&Facts::new().number(fields::OVERALL_COMPLETION, 24.0)));
        assert!(p.is_satisfied(&Facts::new().number(fields::OVERALL_COMPLETION, 26.0)));
    }

    #[test]
    fn default_catalog_keys_are_unique_and_round_trip() {
        let catalog = default_catalog();
        let keys: HashSet<&str> = catalog.iter().map(|d| d.key).collect();
        assert_eq!(keys.len(), catalog.len());
        for def in &catalog {
            let reparsed = Predicate::from_conditions(&def.predicate.to_conditions()).unwrap();
            assert_eq!(reparsed, def.predicate, "{}", def.key);
        }
    }

    #[test]
    fn untracked_achievements_never_fire_from_progress_facts() {
        let progress = DerivedProgress {
            total_items: 500,
            total_eth_items: 100,
            total_runes: 33,
            total_runewords: 50,
            armor: Default::default(),
            weapons: Default::default(),
            other: Default::default(),
            sets: Default::default(),
            eth_armor: Default::default(),
            eth_weapons: Default::default(),
            eth_other: Default::default(),
            normal_completion: 100.0,
            ethereal_completion: 100.0,
            rune_completion: 100.0,
            runeword_completion: 100.0,
            overall_completion: 100.0,
        };
        let facts = Facts::from_progress(&progress, &GrailConfiguration::default(), 3);
        for def in default_catalog() {
            if def.key == "community_helper" || def.key == "beta_tester" {
                assert!(!def.predicate.is_satisfied(&facts), "{}", def.key);
            }
        }
        assert!(Predicate::min(fields::COMPLETED_SETS, 3.0).is_satisfied(&facts));
        assert!(Predicate::flag(fields::GRAIL_COMPLETE, true).is_satisfied(&facts));
        assert!(!Predicate::min(fields::CURRENT_STREAK, 0.0).is_satisfied(&facts));

        let streak = StreakState { current: 7, longest: 9, last_day: None };
        let facts = facts.with_statistics(&streak, 12.5);
        assert!(Predicate::min(fields::CURRENT_STREAK, 7.0).is_satisfied(&facts));
        assert!(Predicate::min(fields::ITEMS_PER_DAY, 10.0).is_satisfied(&facts));
    }
}
