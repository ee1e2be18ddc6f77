//! Fighter entity - a roster member of a gang
//!
//! Status changes are planned against the current fighter (and the gang's
//! meat) before anything is written, so the server and the optimistic
//! client compute exactly the same transition.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{FighterId, GangId};
use crate::value_objects::{ensure_non_negative, FighterState, RatingShift, StatusAction};

/// A roster member.
///
/// Public fields: the only invariant worth protecting (mutually exclusive
/// lifecycle states) is carried by [`FighterState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fighter {
    pub id: FighterId,
    pub gang_id: GangId,
    pub name: String,
    pub label: Option<String>,
    pub notes: Option<String>,
    pub fighter_class: Option<String>,
    pub fighter_type: Option<String>,
    pub fighter_sub_type: Option<String>,
    /// Cost of the fighter itself, before equipment, effects and skills
    pub base_cost: i64,
    /// Manual signed modifier to the fighter's cost
    pub cost_adjustment: i64,
    /// Experience; deltas are applied without clamping
    pub xp: i64,
    pub kills: u32,
    pub state: FighterState,
    pub captured: bool,
    pub recovery: bool,
    /// Set when this fighter is an exotic beast owned by another fighter
    pub beast_owner_id: Option<FighterId>,
}

impl Fighter {
    pub fn new(gang_id: GangId, name: impl Into<String>, base_cost: i64) -> Self {
        Self {
            id: FighterId::new(),
            gang_id,
            name: name.into(),
            label: None,
            notes: None,
            fighter_class: None,
            fighter_type: None,
            fighter_sub_type: None,
            base_cost,
            cost_adjustment: 0,
            xp: 0,
            kills: 0,
            state: FighterState::Active,
            captured: false,
            recovery: false,
            beast_owner_id: None,
        }
    }

    pub fn with_id(mut self, id: FighterId) -> Self {
        self.id = id;
        self
    }

    pub fn with_xp(mut self, xp: i64) -> Self {
        self.xp = xp;
        self
    }

    pub fn with_state(mut self, state: FighterState) -> Self {
        self.state = state;
        self
    }

    pub fn with_cost_adjustment(mut self, cost_adjustment: i64) -> Self {
        self.cost_adjustment = cost_adjustment;
        self
    }

    pub fn with_beast_owner(mut self, owner: FighterId) -> Self {
        self.beast_owner_id = Some(owner);
        self
    }

    #[inline]
    pub fn counts_toward_rating(&self) -> bool {
        self.state.counts_toward_rating()
    }

    /// Work out what `action` does to this fighter and its gang.
    ///
    /// `sell_value` is only read for [`StatusAction::Sell`]; `gang_meat` only
    /// for the feed branch of [`StatusAction::Starve`].
    pub fn plan_status_change(
        &self,
        action: StatusAction,
        sell_value: Option<i64>,
        gang_meat: i64,
    ) -> Result<StatusChange, DomainError> {
        let mut change = StatusChange {
            action,
            state: self.state,
            captured: self.captured,
            recovery: self.recovery,
            rating_shift: RatingShift::Unchanged,
            credits_delta: 0,
            meat_delta: 0,
            deletes_fighter: false,
        };

        match action {
            StatusAction::Kill => {
                change.state = toggle(self.state, FighterState::Killed);
            }
            StatusAction::Retire => {
                change.state = toggle(self.state, FighterState::Retired);
            }
            StatusAction::Sell => {
                let value = sell_value
                    .ok_or_else(|| DomainError::validation("sell_value is required to sell"))?;
                change.credits_delta = ensure_non_negative("sell_value", value)?;
                change.state = FighterState::Enslaved;
            }
            StatusAction::Rescue => {
                if self.state != FighterState::Enslaved {
                    return Err(DomainError::invalid_state_transition(format!(
                        "cannot rescue a fighter who is {}",
                        self.state
                    )));
                }
                change.state = FighterState::Active;
            }
            StatusAction::Starve => match self.state {
                FighterState::Starved => {
                    // Feeding a starved fighter costs one meat
                    if gang_meat < 1 {
                        return Err(DomainError::insufficient("meat", 1, gang_meat));
                    }
                    change.meat_delta = -1;
                    change.state = FighterState::Active;
                }
                FighterState::Active => {
                    change.state = FighterState::Starved;
                }
                other => {
                    return Err(DomainError::invalid_state_transition(format!(
                        "cannot starve a fighter who is {other}"
                    )));
                }
            },
            StatusAction::Recover => {
                change.recovery = !self.recovery;
            }
            StatusAction::Capture => {
                change.captured = !self.captured;
            }
            StatusAction::Delete => {
                change.deletes_fighter = true;
                change.rating_shift = RatingShift::between(self.counts_toward_rating(), false);
                return Ok(change);
            }
        }

        change.rating_shift = RatingShift::between(
            self.counts_toward_rating(),
            change.state.counts_toward_rating(),
        );
        Ok(change)
    }

    /// Write a planned change onto the fighter. Deletion is the caller's job.
    pub fn apply_status_change(&mut self, change: &StatusChange) {
        self.state = change.state;
        self.captured = change.captured;
        self.recovery = change.recovery;
    }

    /// Apply a sparse details patch. Only `Some` fields are written.
    pub fn apply_details(&mut self, patch: &FighterDetailsPatch) -> Result<DetailsChange, DomainError> {
        if let Some(name) = &patch.name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("Fighter name cannot be empty"));
            }
        }

        let mut changed = Vec::new();
        let old_adjustment = self.cost_adjustment;

        set_if_present(&mut self.name, &patch.name, "name", &mut changed);
        set_opt_if_present(&mut self.label, &patch.label, "label", &mut changed);
        set_opt_if_present(&mut self.notes, &patch.notes, "notes", &mut changed);
        set_opt_if_present(&mut self.fighter_class, &patch.fighter_class, "fighter_class", &mut changed);
        set_opt_if_present(&mut self.fighter_type, &patch.fighter_type, "fighter_type", &mut changed);
        set_opt_if_present(
            &mut self.fighter_sub_type,
            &patch.fighter_sub_type,
            "fighter_sub_type",
            &mut changed,
        );
        set_if_present(
            &mut self.cost_adjustment,
            &patch.cost_adjustment,
            "cost_adjustment",
            &mut changed,
        );

        let adjustment_delta = self.cost_adjustment - old_adjustment;
        let rating_delta = if self.counts_toward_rating() {
            adjustment_delta
        } else {
            0
        };

        Ok(DetailsChange {
            changed_fields: changed,
            cost_adjustment_delta: adjustment_delta,
            rating_delta,
        })
    }
}

fn toggle(current: FighterState, target: FighterState) -> FighterState {
    if current == target {
        FighterState::Active
    } else {
        target
    }
}

fn set_if_present<T: Clone>(
    slot: &mut T,
    value: &Option<T>,
    field: &'static str,
    changed: &mut Vec<&'static str>,
) {
    if let Some(v) = value {
        *slot = v.clone();
        changed.push(field);
    }
}

fn set_opt_if_present<T: Clone>(
    slot: &mut Option<T>,
    value: &Option<T>,
    field: &'static str,
    changed: &mut Vec<&'static str>,
) {
    if let Some(v) = value {
        *slot = Some(v.clone());
        changed.push(field);
    }
}

/// Outcome of [`Fighter::plan_status_change`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub action: StatusAction,
    pub state: FighterState,
    pub captured: bool,
    pub recovery: bool,
    pub rating_shift: RatingShift,
    /// Credits the gang receives (sell value)
    pub credits_delta: i64,
    /// Meat consumed by feeding (-1) or zero
    pub meat_delta: i64,
    pub deletes_fighter: bool,
}

/// Sparse update of a fighter's descriptive fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FighterDetailsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fighter_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fighter_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fighter_sub_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_adjustment: Option<i64>,
}

impl FighterDetailsPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Outcome of [`Fighter::apply_details`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailsChange {
    pub changed_fields: Vec<&'static str>,
    pub cost_adjustment_delta: i64,
    /// Rating delta for the gang (zero when the fighter does not count)
    pub rating_delta: i64,
}
