//! Fighter lifecycle state and the status actions that move between states.
//!
//! Replaces independent `killed` / `retired` / `enslaved` / `starved` flags
//! with one enum so a fighter can never be both killed and retired.
//! `captured` and `recovery` remain independent flags on the fighter.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

/// Fighter lifecycle state
///
/// # State Transitions
///
/// ```text
/// Active  <-> Killed    (kill)
/// Active  <-> Retired   (retire)
/// Active   -> Enslaved  (sell)
/// Enslaved -> Active    (rescue)
/// Active   -> Starved   (starve)
/// Starved  -> Active    (starve again = feed, consumes one meat)
/// ```
///
/// Any non-active state can also be entered directly from another one
/// (e.g. a starved fighter can be killed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FighterState {
    #[default]
    Active,
    Killed,
    Retired,
    Enslaved,
    Starved,
}

impl FighterState {
    /// Whether a fighter in this state contributes its cost to gang rating.
    ///
    /// Starved fighters are still on the roster and keep counting.
    ///
    /// ```
    /// use gangbook_domain::FighterState;
    ///
    /// assert!(FighterState::Active.counts_toward_rating());
    /// assert!(FighterState::Starved.counts_toward_rating());
    /// assert!(!FighterState::Killed.counts_toward_rating());
    /// ```
    #[inline]
    pub fn counts_toward_rating(self) -> bool {
        !matches!(self, Self::Killed | Self::Retired | Self::Enslaved)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Killed => "killed",
            Self::Retired => "retired",
            Self::Enslaved => "enslaved",
            Self::Starved => "starved",
        }
    }
}

impl fmt::Display for FighterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FighterState {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "killed" => Ok(Self::Killed),
            "retired" => Ok(Self::Retired),
            "enslaved" => Ok(Self::Enslaved),
            "starved" => Ok(Self::Starved),
            other => Err(DomainError::parse(format!("Unknown fighter state: {}", other))),
        }
    }
}

/// A status action requested from the roster screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusAction {
    Kill,
    Retire,
    Sell,
    Rescue,
    Starve,
    Recover,
    Capture,
    Delete,
}

impl StatusAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Kill => "kill",
            Self::Retire => "retire",
            Self::Sell => "sell",
            Self::Rescue => "rescue",
            Self::Starve => "starve",
            Self::Recover => "recover",
            Self::Capture => "capture",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for StatusAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusAction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kill" => Ok(Self::Kill),
            "retire" => Ok(Self::Retire),
            "sell" => Ok(Self::Sell),
            "rescue" => Ok(Self::Rescue),
            "starve" => Ok(Self::Starve),
            "recover" => Ok(Self::Recover),
            "capture" => Ok(Self::Capture),
            "delete" => Ok(Self::Delete),
            other => Err(DomainError::validation(format!("Unknown status action: {}", other))),
        }
    }
}

/// How a transition moves the fighter relative to the gang rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingShift {
    Unchanged,
    /// Fighter starts counting: rating goes up by its total cost.
    Add,
    /// Fighter stops counting: rating goes down by its total cost.
    Remove,
}

impl RatingShift {
    pub fn between(counted_before: bool, counts_after: bool) -> Self {
        match (counted_before, counts_after) {
            (false, true) => Self::Add,
            (true, false) => Self::Remove,
            _ => Self::Unchanged,
        }
    }

    /// Signed rating delta for a fighter worth `total_cost`.
    pub fn delta(self, total_cost: i64) -> i64 {
        match self {
            Self::Unchanged => 0,
            Self::Add => total_cost,
            Self::Remove => -total_cost,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_action_is_a_validation_error() {
        let err = StatusAction::from_str("resurrect").unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn action_serde_roundtrips_snake_case() {
        let json = serde_json::to_string(&StatusAction::Recover).unwrap();
        assert_eq!(json, "\"recover\"");
        let parsed: StatusAction = serde_json::from_str("\"capture\"").unwrap();
        assert_eq!(parsed, StatusAction::Capture);
    }

    #[test]
    fn rating_shift_follows_rating_boundary() {
        assert_eq!(RatingShift::between(true, false), RatingShift::Remove);
        assert_eq!(RatingShift::between(false, true), RatingShift::Add);
        assert_eq!(RatingShift::between(false, false), RatingShift::Unchanged);
        assert_eq!(RatingShift::Remove.delta(120), -120);
        assert_eq!(RatingShift::Unchanged.delta(120), 0);
    }

    #[test]
    fn enslaved_and_retired_do_not_count() {
        assert!(!FighterState::Enslaved.counts_toward_rating());
        assert!(!FighterState::Retired.counts_toward_rating());
    }
}
