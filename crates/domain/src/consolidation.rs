//! Effect-modifier consolidation.
//!
//! Turns a requested `stat -> delta` map into the smallest set of modifier
//! updates, creations and deletions over a fighter's user adjustments.
//!
//! Per stat (zero deltas are ignored):
//!
//! 1. Split the stat's modifiers into same-sign and opposite-sign groups.
//! 2. Same-sign present: fold the whole delta into the first one and delete
//!    every other same-sign modifier. Opposite-sign modifiers are left alone.
//! 3. Only opposite-sign present: cancel against them in order. Whatever is
//!    left over becomes a new effect.
//! 4. Nothing present: create a new effect for the full delta.
//!
//! An effect whose last modifier is deleted is deleted too. New effects need
//! an [`EffectType`] for `(stat, sign)`; without one the creation is skipped.
//! A delta that would push a modifier outside `i32` is a validation error.

use std::collections::{BTreeMap, HashMap};

use crate::entities::{EffectCategory, EffectType, FighterEffect, FighterEffectModifier};
use crate::error::DomainError;
use crate::ids::{FighterEffectId, FighterEffectModifierId, FighterId, UserId};
use crate::value_objects::{ModifierSign, Stat};

/// New value for an existing modifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifierUpdate {
    pub modifier_id: FighterEffectModifierId,
    pub effect_id: FighterEffectId,
    pub stat: Stat,
    pub value: i32,
}

/// A fresh effect + modifier for a delta nothing could absorb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifierCreate {
    pub stat: Stat,
    pub value: i32,
    pub effect_type: EffectType,
}

impl ModifierCreate {
    pub fn to_effect(&self, fighter_id: FighterId, user_id: Option<UserId>) -> FighterEffect {
        FighterEffect::from_effect_type(fighter_id, &self.effect_type, self.value, user_id)
    }
}

/// Everything a consolidation pass wants written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModifierPlan {
    pub updates: Vec<ModifierUpdate>,
    pub creates: Vec<ModifierCreate>,
    /// Removed in one batch
    pub modifier_deletes: Vec<FighterEffectModifierId>,
    /// Emptied effects, removed in one batch after the modifiers
    pub effect_deletes: Vec<FighterEffectId>,
    /// Stats whose leftover delta had no matching effect type
    pub skipped: Vec<Stat>,
}

impl ModifierPlan {
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
            && self.creates.is_empty()
            && self.modifier_deletes.is_empty()
            && self.effect_deletes.is_empty()
    }

    fn delete(&mut self, modifier: &FighterEffectModifier, remaining: &mut HashMap<FighterEffectId, usize>) {
        self.modifier_deletes.push(modifier.id);
        if let Some(count) = remaining.get_mut(&modifier.effect_id) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.effect_deletes.push(modifier.effect_id);
            }
        }
    }

    fn update(&mut self, modifier: &FighterEffectModifier, value: i32) {
        self.updates.push(ModifierUpdate {
            modifier_id: modifier.id,
            effect_id: modifier.effect_id,
            stat: modifier.stat,
            value,
        });
    }

    /// Apply the plan to an in-memory effect list.
    ///
    /// `next_id` supplies ids for created effects; the created ids are
    /// returned in creation order.
    pub fn apply_to(
        &self,
        effects: &mut Vec<FighterEffect>,
        fighter_id: FighterId,
        user_id: Option<UserId>,
        mut next_id: impl FnMut() -> FighterEffectId,
    ) -> Vec<FighterEffectId> {
        for update in &self.updates {
            if let Some(modifier) = effects
                .iter_mut()
                .flat_map(|e| e.modifiers.iter_mut())
                .find(|m| m.id == update.modifier_id)
            {
                modifier.value = update.value;
            }
        }

        for effect in effects.iter_mut() {
            effect
                .modifiers
                .retain(|m| !self.modifier_deletes.contains(&m.id));
        }
        effects.retain(|e| !self.effect_deletes.contains(&e.id));

        self.creates
            .iter()
            .map(|create| {
                let effect = create.to_effect(fighter_id, user_id).with_id(next_id());
                let id = effect.id;
                effects.push(effect);
                id
            })
            .collect()
    }
}

/// Plan the writes needed to move each requested stat by its delta.
///
/// Only [`EffectCategory::User`] effects are considered; advancements,
/// injuries and equipment effects are never rewritten here.
pub fn plan_stat_changes<F>(
    effects: &[FighterEffect],
    requested: &BTreeMap<Stat, i32>,
    mut find_effect_type: F,
) -> Result<ModifierPlan, DomainError>
where
    F: FnMut(Stat, ModifierSign) -> Option<EffectType>,
{
    let adjustable: Vec<&FighterEffect> = effects
        .iter()
        .filter(|e| e.category == EffectCategory::User)
        .collect();
    let mut remaining: HashMap<FighterEffectId, usize> = adjustable
        .iter()
        .map(|e| (e.id, e.modifiers.len()))
        .collect();
    let mut plan = ModifierPlan::default();

    for (&stat, &delta) in requested {
        let Some(sign) = ModifierSign::of(delta) else {
            continue;
        };

        let (same, opposite): (Vec<&FighterEffectModifier>, Vec<&FighterEffectModifier>) = adjustable
            .iter()
            .flat_map(|e| e.modifiers.iter())
            .filter(|m| m.stat == stat && m.value != 0)
            .partition(|m| ModifierSign::of(m.value) == Some(sign));

        if let Some((first, rest)) = same.split_first() {
            let value = first.value.checked_add(delta).ok_or_else(|| {
                DomainError::validation(format!(
                    "{} adjustment out of range: {} + {delta}",
                    stat, first.value
                ))
            })?;
            if value == 0 {
                plan.delete(first, &mut remaining);
            } else {
                plan.update(first, value);
            }
            for extra in rest {
                plan.delete(extra, &mut remaining);
            }
            continue;
        }

        let mut left = delta;
        for modifier in opposite {
            let magnitude = modifier.value.unsigned_abs();
            if magnitude == left.unsigned_abs() {
                plan.delete(modifier, &mut remaining);
                left = 0;
                break;
            } else if magnitude > left.unsigned_abs() {
                plan.update(modifier, modifier.value + left);
                left = 0;
                break;
            } else {
                plan.delete(modifier, &mut remaining);
                left += modifier.value;
            }
        }

        if let Some(left_sign) = ModifierSign::of(left) {
            match find_effect_type(stat, left_sign) {
                Some(effect_type) => plan.creates.push(ModifierCreate {
                    stat,
                    value: left,
                    effect_type,
                }),
                None => plan.skipped.push(stat),
            }
        }
    }

    Ok(plan)
}
