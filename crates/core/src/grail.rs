//! Grail configuration and the configuration-lock rule.
//!
//! A user's tracking parameters (game mode, grail type, rune and runeword
//! inclusion) become immutable once the first sync has been persisted.
//! The lock check here is pure: the caller loads the stored record and
//! passes its configuration in.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const GAME_MODE_SOFTCORE: &str = "softcore";
pub const GAME_MODE_HARDCORE: &str = "hardcore";
pub const GAME_MODE_MANUAL: &str = "manual";

pub const VALID_GAME_MODES: &[&str] = &[GAME_MODE_SOFTCORE, GAME_MODE_HARDCORE, GAME_MODE_MANUAL];

pub const GRAIL_TYPE_NORMAL: &str = "normal";
pub const GRAIL_TYPE_ETHEREAL: &str = "ethereal";
pub const GRAIL_TYPE_EACH: &str = "each";
pub const GRAIL_TYPE_BOTH: &str = "both";

pub const VALID_GRAIL_TYPES: &[&str] = &[
    GRAIL_TYPE_NORMAL,
    GRAIL_TYPE_ETHEREAL,
    GRAIL_TYPE_EACH,
    GRAIL_TYPE_BOTH,
];

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which save files the desktop client scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Softcore,
    Hardcore,
    Manual,
}

impl GameMode {
    /// Convert from a database or wire string value.
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            GAME_MODE_SOFTCORE => Ok(Self::Softcore),
            GAME_MODE_HARDCORE => Ok(Self::Hardcore),
            GAME_MODE_MANUAL => Ok(Self::Manual),
            _ => Err(CoreError::Validation(format!(
                "Invalid gameMode '{s}'. Must be one of: {}",
                VALID_GAME_MODES.join(", ")
            ))),
        }
    }

    /// Convert to the database string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Softcore => GAME_MODE_SOFTCORE,
            Self::Hardcore => GAME_MODE_HARDCORE,
            Self::Manual => GAME_MODE_MANUAL,
        }
    }
}

/// Which item variants count toward the grail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrailType {
    Normal,
    Ethereal,
    Each,
    Both,
}

impl GrailType {
    /// Convert from a database or wire string value.
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            GRAIL_TYPE_NORMAL => Ok(Self::Normal),
            GRAIL_TYPE_ETHEREAL => Ok(Self::Ethereal),
            GRAIL_TYPE_EACH => Ok(Self::Each),
            GRAIL_TYPE_BOTH => Ok(Self::Both),
            _ => Err(CoreError::Validation(format!(
                "Invalid grailType '{s}'. Must be one of: {}",
                VALID_GRAIL_TYPES.join(", ")
            ))),
        }
    }

    /// Convert to the database string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => GRAIL_TYPE_NORMAL,
            Self::Ethereal => GRAIL_TYPE_ETHEREAL,
            Self::Each => GRAIL_TYPE_EACH,
            Self::Both => GRAIL_TYPE_BOTH,
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// The four lockable tracking parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrailConfiguration {
    pub game_mode: GameMode,
    pub grail_type: GrailType,
    pub include_runes: bool,
    pub include_runewords: bool,
}

impl Default for GrailConfiguration {
    /// The configuration assigned at registration, before the first sync.
    fn default() -> Self {
        Self {
            game_mode: GameMode::Softcore,
            grail_type: GrailType::Normal,
            include_runes: false,
            include_runewords: false,
        }
    }
}

impl GrailConfiguration {
    /// Names of the fields where `self` and `other` disagree, in wire form.
    pub fn mismatched_fields(&self, other: &GrailConfiguration) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.game_mode != other.game_mode {
            fields.push("gameMode");
        }
        if self.grail_type != other.grail_type {
            fields.push("grailType");
        }
        if self.include_runes != other.include_runes {
            fields.push("includeRunes");
        }
        if self.include_runewords != other.include_runewords {
            fields.push("includeRunewords");
        }
        fields
    }

    /// Short human-readable form, used in error messages.
    pub fn describe(&self) -> String {
        format!(
            "gameMode={}, grailType={}, includeRunes={}, includeRunewords={}",
            self.game_mode.as_str(),
            self.grail_type.as_str(),
            self.include_runes,
            self.include_runewords
        )
    }
}

/// A configuration as stored alongside a progress record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoredConfiguration {
    pub configuration: GrailConfiguration,
    pub locked: bool,
}

/// Enforce the configuration lock.
///
/// Passes when there is no stored record, when the stored record is not
/// yet locked, or when the incoming configuration matches the locked one
/// field-for-field. Otherwise returns [`CoreError::ConfigurationLocked`]
/// carrying the locked values.
pub fn check_configuration_lock(
    stored: Option<&StoredConfiguration>,
    incoming: &GrailConfiguration,
) -> Result<(), CoreError> {
    match stored {
        Some(s) if s.locked && s.configuration != *incoming => {
            Err(CoreError::ConfigurationLocked {
                locked: s.configuration,
            })
        }
        _ => Ok(()),
    }
}

/// The configuration that will be persisted by a sync that passed the lock check.
///
/// A locked record keeps its stored values; anything else takes the
/// incoming values. The result is always locked.
pub fn resolve_configuration(
    stored: Option<&StoredConfiguration>,
    incoming: &GrailConfiguration,
) -> GrailConfiguration {
    match stored {
        Some(s) if s.locked => s.configuration,
        _ => *incoming,
    }
}
