//! Stat value object - the fighter characteristics that effects modify.
//!
//! Provides type safety for stat references instead of passing around
//! column names like "toughness" or "weapon_skill".

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

/// Fighter characteristics.
///
/// Serialized in snake_case so the wire format matches the stat column
/// names used by modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    Movement,
    WeaponSkill,
    BallisticSkill,
    Strength,
    Toughness,
    Wounds,
    Initiative,
    Attacks,
    Leadership,
    Cool,
    Willpower,
    Intelligence,
}

impl Stat {
    /// Returns the snake_case column name (e.g., "weapon_skill").
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Movement => "movement",
            Self::WeaponSkill => "weapon_skill",
            Self::BallisticSkill => "ballistic_skill",
            Self::Strength => "strength",
            Self::Toughness => "toughness",
            Self::Wounds => "wounds",
            Self::Initiative => "initiative",
            Self::Attacks => "attacks",
            Self::Leadership => "leadership",
            Self::Cool => "cool",
            Self::Willpower => "willpower",
            Self::Intelligence => "intelligence",
        }
    }

    /// Returns the short profile label (e.g., "WS", "Ld").
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::Movement => "M",
            Self::WeaponSkill => "WS",
            Self::BallisticSkill => "BS",
            Self::Strength => "S",
            Self::Toughness => "T",
            Self::Wounds => "W",
            Self::Initiative => "I",
            Self::Attacks => "A",
            Self::Leadership => "Ld",
            Self::Cool => "Cl",
            Self::Willpower => "Wil",
            Self::Intelligence => "Int",
        }
    }

    /// All characteristics in fighter-profile order.
    pub fn all() -> [Stat; 12] {
        [
            Self::Movement,
            Self::WeaponSkill,
            Self::BallisticSkill,
            Self::Strength,
            Self::Toughness,
            Self::Wounds,
            Self::Initiative,
            Self::Attacks,
            Self::Leadership,
            Self::Cool,
            Self::Willpower,
            Self::Intelligence,
        ]
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Stat {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        Stat::all()
            .into_iter()
            .find(|stat| stat.as_str() == lowered || stat.short_name().to_lowercase() == lowered)
            .ok_or_else(|| DomainError::parse(format!("Unknown stat: {}", s)))
    }
}

/// Direction of a modifier value.
///
/// Effect types are catalogued per `(stat, sign)` so the consolidator can
/// find the right definition when it has to create a fresh modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierSign {
    Positive,
    Negative,
}

impl ModifierSign {
    /// Sign of a non-zero value. Zero has no sign.
    pub fn of(value: i32) -> Option<Self> {
        match value {
            v if v > 0 => Some(Self::Positive),
            v if v < 0 => Some(Self::Negative),
            _ => None,
        }
    }
}
