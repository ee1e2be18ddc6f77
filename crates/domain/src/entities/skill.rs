//! Skills learned by fighters and the advancement bookkeeping around them.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{FighterEffectId, FighterId, FighterSkillId, SkillId};
use crate::value_objects::ensure_non_negative;

/// A skill the fighter has learned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FighterSkill {
    pub id: FighterSkillId,
    pub fighter_id: FighterId,
    pub skill_id: SkillId,
    pub name: String,
    pub xp_cost: i64,
    pub credits_increase: i64,
}

impl FighterSkill {
    pub fn new(fighter_id: FighterId, skill_id: SkillId, name: impl Into<String>, cost: AdvancementCost) -> Self {
        Self {
            id: FighterSkillId::new(),
            fighter_id,
            skill_id,
            name: name.into(),
            xp_cost: cost.xp_cost,
            credits_increase: cost.credits_increase,
        }
    }
}

/// What an advancement purchase costs and adds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvancementCost {
    pub xp_cost: i64,
    pub credits_increase: i64,
}

impl AdvancementCost {
    pub fn new(xp_cost: i64, credits_increase: i64) -> Result<Self, DomainError> {
        Ok(Self {
            xp_cost: ensure_non_negative("xp_cost", xp_cost)?,
            credits_increase: ensure_non_negative("credits_increase", credits_increase)?,
        })
    }

    /// Check the fighter can pay for this advancement.
    pub fn ensure_affordable(&self, available_xp: i64) -> Result<(), DomainError> {
        if available_xp < self.xp_cost {
            return Err(DomainError::insufficient("xp", self.xp_cost, available_xp));
        }
        Ok(())
    }
}

/// Reference to a purchased advancement, used to undo it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum AdvancementRef {
    Characteristic(FighterEffectId),
    Skill(FighterSkillId),
}
