//! Read side: fighter snapshots and total cost.

use std::sync::Arc;

use gangbook_domain::FighterId;
use gangbook_shared::{FighterSnapshot, FighterTotalCostPayload};

use crate::infrastructure::cache::SnapshotCache;
use crate::infrastructure::ports::{
    EffectRepo, EquipmentRepo, FighterCostPort, FighterRepo, GangRepo, SkillRepo,
};

use super::{load_fighter, load_gang, FighterError};

pub struct FighterQueries {
    fighters: Arc<dyn FighterRepo>,
    gangs: Arc<dyn GangRepo>,
    equipment: Arc<dyn EquipmentRepo>,
    effects: Arc<dyn EffectRepo>,
    skills: Arc<dyn SkillRepo>,
    cost: Arc<dyn FighterCostPort>,
    cache: Arc<SnapshotCache>,
}

impl FighterQueries {
    pub fn new(
        fighters: Arc<dyn FighterRepo>,
        gangs: Arc<dyn GangRepo>,
        equipment: Arc<dyn EquipmentRepo>,
        effects: Arc<dyn EffectRepo>,
        skills: Arc<dyn SkillRepo>,
        cost: Arc<dyn FighterCostPort>,
        cache: Arc<SnapshotCache>,
    ) -> Self {
        Self {
            fighters,
            gangs,
            equipment,
            effects,
            skills,
            cost,
            cache,
        }
    }

    /// Everything the client caches for one fighter, served from the
    /// snapshot cache while fresh.
    pub async fn snapshot(&self, fighter_id: FighterId) -> Result<FighterSnapshot, FighterError> {
        if let Some(snapshot) = self.cache.get(fighter_id).await {
            tracing::debug!(fighter_id = %fighter_id, "Snapshot cache hit");
            return Ok(snapshot);
        }

        let fighter = load_fighter(self.fighters.as_ref(), fighter_id).await?;
        let gang = load_gang(self.gangs.as_ref(), fighter.gang_id).await?;
        let equipment = self.equipment.list_for_fighter(fighter_id).await?;
        let effects = self.effects.list_for_fighter(fighter_id).await?;
        let skills = self.skills.list_for_fighter(fighter_id).await?;
        let total_cost = self.cost.total_cost(fighter_id).await;

        let snapshot = FighterSnapshot {
            fighter,
            gang,
            equipment,
            effects,
            skills,
            total_cost,
        };
        self.cache.insert(snapshot.clone()).await;
        Ok(snapshot)
    }

    /// Never fails: an unknown fighter or a store error reads as 0.
    pub async fn total_cost(&self, fighter_id: FighterId) -> FighterTotalCostPayload {
        FighterTotalCostPayload {
            fighter_id,
            total_cost: self.cost.total_cost(fighter_id).await,
        }
    }
}
