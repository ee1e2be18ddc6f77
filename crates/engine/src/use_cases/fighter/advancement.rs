//! Advancement purchase and undo.
//!
//! A characteristic advancement is stored as an `Advancement` effect with a
//! single +1 modifier; a skill advancement as a `FighterSkill`. Both carry
//! their XP cost and credits increase so an undo refunds exactly what the
//! purchase took.

use std::sync::Arc;

use gangbook_domain::{
    AdvancementCost, AdvancementRef, EffectCategory, Fighter, FighterEffect, FighterId,
    FighterSkill, GangDelta, SkillId, Stat,
};
use gangbook_shared::{AdvancementPayload, AdvancementRecord};

use crate::infrastructure::ports::{
    AuditAction, EffectRepo, FighterRepo, GangRepo, MutationContext, SkillRepo,
};

use super::{adjust_gang_then, load_fighter, load_gang, FighterError, MutationNotifier};

fn rating_for(fighter: &Fighter, credits: i64) -> GangDelta {
    if fighter.counts_toward_rating() {
        GangDelta::rating(credits)
    } else {
        GangDelta::default()
    }
}

pub struct PurchaseAdvancement {
    fighters: Arc<dyn FighterRepo>,
    gangs: Arc<dyn GangRepo>,
    effects: Arc<dyn EffectRepo>,
    skills: Arc<dyn SkillRepo>,
    notifier: MutationNotifier,
}

impl PurchaseAdvancement {
    pub fn new(
        fighters: Arc<dyn FighterRepo>,
        gangs: Arc<dyn GangRepo>,
        effects: Arc<dyn EffectRepo>,
        skills: Arc<dyn SkillRepo>,
        notifier: MutationNotifier,
    ) -> Self {
        Self {
            fighters,
            gangs,
            effects,
            skills,
            notifier,
        }
    }

    /// Raise one characteristic by one step.
    pub async fn characteristic(
        &self,
        ctx: &MutationContext,
        fighter_id: FighterId,
        stat: Stat,
        cost: AdvancementCost,
    ) -> Result<AdvancementPayload, FighterError> {
        let fighter = load_fighter(self.fighters.as_ref(), fighter_id).await?;
        cost.ensure_affordable(fighter.xp)?;

        let effect = FighterEffect::new(
            fighter_id,
            format!("{} advancement", stat.as_str()),
            EffectCategory::Advancement,
        )
        .with_modifier(stat, 1)
        .with_costs(cost.xp_cost, cost.credits_increase)
        .with_user(ctx.user_id);
        self.effects.create(&effect).await?;

        let (xp, gang) = self.charge(ctx, &fighter, cost, effect.name.clone()).await?;
        Ok(AdvancementPayload {
            fighter_id,
            xp,
            record: Some(AdvancementRecord::Characteristic(effect)),
            gang,
        })
    }

    pub async fn skill(
        &self,
        ctx: &MutationContext,
        fighter_id: FighterId,
        skill_id: SkillId,
        name: &str,
        cost: AdvancementCost,
    ) -> Result<AdvancementPayload, FighterError> {
        if name.trim().is_empty() {
            return Err(FighterError::validation("Skill name cannot be empty"));
        }
        let fighter = load_fighter(self.fighters.as_ref(), fighter_id).await?;
        cost.ensure_affordable(fighter.xp)?;

        let skill = FighterSkill::new(fighter_id, skill_id, name.trim(), cost);
        self.skills.create(&skill).await?;

        let (xp, gang) = self.charge(ctx, &fighter, cost, skill.name.clone()).await?;
        Ok(AdvancementPayload {
            fighter_id,
            xp,
            record: Some(AdvancementRecord::Skill(skill)),
            gang,
        })
    }

    /// Deduct XP, raise the rating and record the purchase.
    async fn charge(
        &self,
        ctx: &MutationContext,
        fighter: &Fighter,
        cost: AdvancementCost,
        description: String,
    ) -> Result<(i64, gangbook_domain::Gang), FighterError> {
        let gang = load_gang(self.gangs.as_ref(), fighter.gang_id).await?;
        let mut updated = fighter.clone();
        updated.xp -= cost.xp_cost;
        let gang = adjust_gang_then(
            self.gangs.as_ref(),
            gang,
            rating_for(fighter, cost.credits_increase),
            self.fighters.save(&updated),
        )
        .await?;

        tracing::info!(
            correlation_id = %ctx.correlation_id.short(),
            fighter_id = %fighter.id,
            advancement = %description,
            xp_cost = cost.xp_cost,
            credits_increase = cost.credits_increase,
            "Advancement purchased"
        );
        self.notifier.audit(
            self.notifier
                .entry(ctx, fighter, AuditAction::AdvancementPurchased)
                .with_new_value(description),
        );
        self.notifier.fighter_changed(fighter);

        Ok((updated.xp, gang))
    }
}

pub struct UndoAdvancement {
    fighters: Arc<dyn FighterRepo>,
    gangs: Arc<dyn GangRepo>,
    effects: Arc<dyn EffectRepo>,
    skills: Arc<dyn SkillRepo>,
    notifier: MutationNotifier,
}

impl UndoAdvancement {
    pub fn new(
        fighters: Arc<dyn FighterRepo>,
        gangs: Arc<dyn GangRepo>,
        effects: Arc<dyn EffectRepo>,
        skills: Arc<dyn SkillRepo>,
        notifier: MutationNotifier,
    ) -> Self {
        Self {
            fighters,
            gangs,
            effects,
            skills,
            notifier,
        }
    }

    /// Remove a purchased advancement and refund its XP and rating.
    pub async fn execute(
        &self,
        ctx: &MutationContext,
        fighter_id: FighterId,
        advancement: AdvancementRef,
    ) -> Result<AdvancementPayload, FighterError> {
        let fighter = load_fighter(self.fighters.as_ref(), fighter_id).await?;

        let (description, xp_cost, credits_increase) = match advancement {
            AdvancementRef::Characteristic(effect_id) => {
                let effect = self
                    .effects
                    .get(effect_id)
                    .await?
                    .filter(|e| e.fighter_id == fighter_id && e.category == EffectCategory::Advancement)
                    .ok_or_else(|| FighterError::AdvancementNotFound(effect_id.to_string()))?;
                self.effects.delete_effects(&[effect.id]).await?;
                (effect.name, effect.xp_cost, effect.credits_increase)
            }
            AdvancementRef::Skill(skill_id) => {
                let skill = self
                    .skills
                    .get(skill_id)
                    .await?
                    .filter(|s| s.fighter_id == fighter_id)
                    .ok_or_else(|| FighterError::AdvancementNotFound(skill_id.to_string()))?;
                self.skills.delete(skill.id).await?;
                (skill.name, skill.xp_cost, skill.credits_increase)
            }
        };

        let gang = load_gang(self.gangs.as_ref(), fighter.gang_id).await?;
        let mut updated = fighter.clone();
        updated.xp += xp_cost;
        let gang = adjust_gang_then(
            self.gangs.as_ref(),
            gang,
            rating_for(&fighter, -credits_increase),
            self.fighters.save(&updated),
        )
        .await?;

        tracing::info!(
            correlation_id = %ctx.correlation_id.short(),
            fighter_id = %fighter_id,
            advancement = %description,
            xp_refund = xp_cost,
            "Advancement undone"
        );
        self.notifier.audit(
            self.notifier
                .entry(ctx, &fighter, AuditAction::AdvancementUndone)
                .with_change(description, "removed"),
        );
        self.notifier.fighter_changed(&fighter);

        Ok(AdvancementPayload {
            fighter_id,
            xp: updated.xp,
            record: None,
            gang,
        })
    }
}
