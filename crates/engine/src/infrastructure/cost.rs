//! Fighter total cost computed from the repositories.

use std::sync::Arc;

use async_trait::async_trait;
use gangbook_domain::{CostBreakdown, FighterEquipment, FighterId};

use crate::infrastructure::ports::{
    EffectRepo, EquipmentRepo, FighterCostPort, FighterRepo, RepoError, SkillRepo,
};

/// Sums base cost, carried equipment, effect and skill credit increases, and
/// the manual adjustment.
pub struct RepoFighterCost {
    fighters: Arc<dyn FighterRepo>,
    equipment: Arc<dyn EquipmentRepo>,
    effects: Arc<dyn EffectRepo>,
    skills: Arc<dyn SkillRepo>,
}

impl RepoFighterCost {
    pub fn new(
        fighters: Arc<dyn FighterRepo>,
        equipment: Arc<dyn EquipmentRepo>,
        effects: Arc<dyn EffectRepo>,
        skills: Arc<dyn SkillRepo>,
    ) -> Self {
        Self {
            fighters,
            equipment,
            effects,
            skills,
        }
    }
}

#[async_trait]
impl FighterCostPort for RepoFighterCost {
    async fn total_cost(&self, fighter_id: FighterId) -> i64 {
        match self.breakdown(fighter_id).await {
            Ok(breakdown) => breakdown.total(),
            Err(e) => {
                tracing::error!(error = %e, fighter_id = %fighter_id, "Fighter cost lookup failed, using 0");
                0
            }
        }
    }

    async fn breakdown(&self, fighter_id: FighterId) -> Result<CostBreakdown, RepoError> {
        let fighter = self
            .fighters
            .get(fighter_id)
            .await?
            .ok_or_else(|| RepoError::not_found("Fighter", fighter_id))?;
        let equipment = self.equipment.list_for_fighter(fighter_id).await?;
        let effects = self.effects.list_for_fighter(fighter_id).await?;
        let skills = self.skills.list_for_fighter(fighter_id).await?;

        Ok(CostBreakdown {
            base: fighter.base_cost,
            equipment: FighterEquipment::carried_by(&equipment, fighter_id)
                .map(|e| e.cost)
                .sum(),
            effects: effects.iter().map(|e| e.credits_increase).sum(),
            skills: skills.iter().map(|s| s.credits_increase).sum(),
            adjustment: fighter.cost_adjustment,
        })
    }
}
