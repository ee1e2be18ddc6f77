//! User stat adjustments through the effect-modifier consolidator.

use std::collections::BTreeMap;
use std::sync::Arc;

use gangbook_domain::{plan_stat_changes, FighterId, Stat};
use gangbook_shared::FighterEffectsPayload;

use crate::infrastructure::ports::{EffectRepo, FighterRepo, MutationContext};

use super::{load_fighter, FighterError, MutationNotifier};

pub struct UpdateFighterEffects {
    fighters: Arc<dyn FighterRepo>,
    effects: Arc<dyn EffectRepo>,
    notifier: MutationNotifier,
}

impl UpdateFighterEffects {
    pub fn new(
        fighters: Arc<dyn FighterRepo>,
        effects: Arc<dyn EffectRepo>,
        notifier: MutationNotifier,
    ) -> Self {
        Self {
            fighters,
            effects,
            notifier,
        }
    }

    /// Move each requested stat by its delta and return the fighter's
    /// effects as stored afterwards.
    ///
    /// Updates and creations are written per stat; modifier deletions and
    /// effect deletions each go out as one batch.
    pub async fn execute(
        &self,
        ctx: &MutationContext,
        fighter_id: FighterId,
        stats: &BTreeMap<Stat, i32>,
    ) -> Result<FighterEffectsPayload, FighterError> {
        let fighter = load_fighter(self.fighters.as_ref(), fighter_id).await?;
        let existing = self.effects.list_for_fighter(fighter_id).await?;
        let effect_types = self.effects.list_effect_types().await?;

        let plan = plan_stat_changes(&existing, stats, |stat, sign| {
            effect_types
                .iter()
                .find(|t| t.stat == stat && t.sign == sign)
                .cloned()
        })?;

        if plan.is_empty() && plan.skipped.is_empty() {
            return Ok(FighterEffectsPayload {
                fighter_id,
                effects: existing,
            });
        }

        for stat in &plan.skipped {
            tracing::warn!(
                fighter_id = %fighter_id,
                stat = stat.as_str(),
                "No effect type for stat adjustment, skipping"
            );
        }

        for update in &plan.updates {
            self.effects
                .update_modifier(update.modifier_id, update.value)
                .await?;
        }
        for create in &plan.creates {
            let effect = create.to_effect(fighter_id, Some(ctx.user_id));
            self.effects.create(&effect).await?;
        }
        if !plan.modifier_deletes.is_empty() {
            self.effects.delete_modifiers(&plan.modifier_deletes).await?;
        }
        if !plan.effect_deletes.is_empty() {
            self.effects.delete_effects(&plan.effect_deletes).await?;
        }

        tracing::info!(
            correlation_id = %ctx.correlation_id.short(),
            fighter_id = %fighter_id,
            updated = plan.updates.len(),
            created = plan.creates.len(),
            modifiers_deleted = plan.modifier_deletes.len(),
            effects_deleted = plan.effect_deletes.len(),
            "Fighter effects consolidated"
        );
        self.notifier.fighter_changed(&fighter);

        let effects = self.effects.list_for_fighter(fighter_id).await?;
        Ok(FighterEffectsPayload {
            fighter_id,
            effects,
        })
    }
}
