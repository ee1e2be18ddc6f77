//! Equipment purchase, sale and stashing.

use std::sync::Arc;

use gangbook_domain::{
    ensure_non_negative, DomainError, EquipmentId, FighterEquipment, FighterEquipmentId, FighterId,
    GangDelta,
};
use gangbook_shared::{EquipmentPurchasePayload, EquipmentRemovalPayload};

use crate::infrastructure::ports::{
    AuditAction, EffectRepo, EquipmentRepo, FighterRepo, GangRepo, MutationContext, RepoError,
};

use super::{adjust_gang_then, load_fighter, load_gang, FighterError, MutationNotifier};

/// Buy a catalogue item for a fighter out of gang credits.
pub struct BuyEquipment {
    fighters: Arc<dyn FighterRepo>,
    gangs: Arc<dyn GangRepo>,
    equipment: Arc<dyn EquipmentRepo>,
    notifier: MutationNotifier,
}

impl BuyEquipment {
    pub fn new(
        fighters: Arc<dyn FighterRepo>,
        gangs: Arc<dyn GangRepo>,
        equipment: Arc<dyn EquipmentRepo>,
        notifier: MutationNotifier,
    ) -> Self {
        Self {
            fighters,
            gangs,
            equipment,
            notifier,
        }
    }

    pub async fn execute(
        &self,
        ctx: &MutationContext,
        fighter_id: FighterId,
        equipment_id: EquipmentId,
        master_crafted: bool,
        cost_override: Option<i64>,
    ) -> Result<EquipmentPurchasePayload, FighterError> {
        if let Some(cost) = cost_override {
            ensure_non_negative("cost_override", cost)?;
        }

        let fighter = load_fighter(self.fighters.as_ref(), fighter_id).await?;
        let gang = load_gang(self.gangs.as_ref(), fighter.gang_id).await?;
        let item = self
            .equipment
            .get_catalog_item(equipment_id)
            .await?
            .ok_or_else(|| FighterError::EquipmentNotFound(equipment_id.to_string()))?;

        let bought =
            FighterEquipment::purchased(gang.id, fighter_id, &item, master_crafted, cost_override);
        if gang.credits < bought.cost {
            return Err(DomainError::insufficient("credits", bought.cost, gang.credits).into());
        }

        let rating = if fighter.counts_toward_rating() {
            bought.cost
        } else {
            0
        };
        let gang = adjust_gang_then(
            self.gangs.as_ref(),
            gang,
            GangDelta {
                credits: -bought.cost,
                rating,
                meat: 0,
            },
            self.equipment.save(&bought),
        )
        .await?;

        tracing::info!(
            correlation_id = %ctx.correlation_id.short(),
            fighter_id = %fighter_id,
            equipment = %bought.name,
            cost = bought.cost,
            "Equipment purchased"
        );
        self.notifier.audit(
            self.notifier
                .entry(ctx, &fighter, AuditAction::EquipmentPurchased)
                .with_new_value(format!("{} ({})", bought.name, bought.cost)),
        );
        self.notifier.fighter_changed(&fighter);

        Ok(EquipmentPurchasePayload {
            equipment: bought,
            gang,
        })
    }
}

/// Load an equipment row and everything mounted on it.
async fn load_group(
    equipment: &dyn EquipmentRepo,
    id: FighterEquipmentId,
) -> Result<(FighterEquipment, Vec<FighterEquipment>), FighterError> {
    let item = equipment
        .get(id)
        .await?
        .ok_or_else(|| FighterError::EquipmentNotFound(id.to_string()))?;
    let group = match item.fighter_id {
        Some(fighter_id) => {
            let carried = equipment.list_for_fighter(fighter_id).await?;
            FighterEquipment::with_mounted(&carried, id)
                .into_iter()
                .cloned()
                .collect()
        }
        None => vec![item.clone()],
    };
    Ok((item, group))
}

/// Sell a fighter's (or the stash's) equipment back for credits.
pub struct SellEquipment {
    fighters: Arc<dyn FighterRepo>,
    gangs: Arc<dyn GangRepo>,
    equipment: Arc<dyn EquipmentRepo>,
    effects: Arc<dyn EffectRepo>,
    notifier: MutationNotifier,
}

impl SellEquipment {
    pub fn new(
        fighters: Arc<dyn FighterRepo>,
        gangs: Arc<dyn GangRepo>,
        equipment: Arc<dyn EquipmentRepo>,
        effects: Arc<dyn EffectRepo>,
        notifier: MutationNotifier,
    ) -> Self {
        Self {
            fighters,
            gangs,
            equipment,
            effects,
            notifier,
        }
    }

    pub async fn execute(
        &self,
        ctx: &MutationContext,
        fighter_equipment_id: FighterEquipmentId,
        sell_value: i64,
    ) -> Result<EquipmentRemovalPayload, FighterError> {
        ensure_non_negative("sell_value", sell_value)?;

        let (item, group) = load_group(self.equipment.as_ref(), fighter_equipment_id).await?;
        let gang = load_gang(self.gangs.as_ref(), item.gang_id).await?;
        let owner = match item.fighter_id {
            Some(id) => Some(load_fighter(self.fighters.as_ref(), id).await?),
            None => None,
        };

        let ids: Vec<FighterEquipmentId> = group.iter().map(|e| e.id).collect();
        let group_cost: i64 = group.iter().map(|e| e.cost).sum();

        let rating = match &owner {
            Some(fighter) if fighter.counts_toward_rating() => -group_cost,
            _ => 0,
        };
        let write = async {
            self.effects.delete_for_equipment(&ids).await?;
            self.equipment.delete(&ids).await
        };
        let gang = adjust_gang_then(
            self.gangs.as_ref(),
            gang,
            GangDelta {
                credits: sell_value,
                rating,
                meat: 0,
            },
            write,
        )
        .await?;

        tracing::info!(
            correlation_id = %ctx.correlation_id.short(),
            equipment_id = %fighter_equipment_id,
            removed = ids.len(),
            sell_value,
            "Equipment sold"
        );
        if let Some(fighter) = &owner {
            self.notifier.audit(
                self.notifier
                    .entry(ctx, fighter, AuditAction::EquipmentSold)
                    .with_change(format!("{} ({})", item.name, group_cost), sell_value),
            );
            self.notifier.fighter_changed(fighter);
        }

        Ok(EquipmentRemovalPayload { removed: ids, gang })
    }
}

/// Move a fighter's equipment into the gang stash.
pub struct StashEquipment {
    fighters: Arc<dyn FighterRepo>,
    gangs: Arc<dyn GangRepo>,
    equipment: Arc<dyn EquipmentRepo>,
    effects: Arc<dyn EffectRepo>,
    notifier: MutationNotifier,
}

impl StashEquipment {
    pub fn new(
        fighters: Arc<dyn FighterRepo>,
        gangs: Arc<dyn GangRepo>,
        equipment: Arc<dyn EquipmentRepo>,
        effects: Arc<dyn EffectRepo>,
        notifier: MutationNotifier,
    ) -> Self {
        Self {
            fighters,
            gangs,
            equipment,
            effects,
            notifier,
        }
    }

    pub async fn execute(
        &self,
        ctx: &MutationContext,
        fighter_equipment_id: FighterEquipmentId,
    ) -> Result<EquipmentRemovalPayload, FighterError> {
        let (item, group) = load_group(self.equipment.as_ref(), fighter_equipment_id).await?;
        let Some(fighter_id) = item.fighter_id else {
            return Err(FighterError::validation("Equipment is already in the stash"));
        };
        let fighter = load_fighter(self.fighters.as_ref(), fighter_id).await?;
        let gang = load_gang(self.gangs.as_ref(), fighter.gang_id).await?;

        let ids: Vec<FighterEquipmentId> = group.iter().map(|e| e.id).collect();
        let group_cost: i64 = group.iter().map(|e| e.cost).sum();

        let rating = if fighter.counts_toward_rating() {
            -group_cost
        } else {
            0
        };
        let write = async {
            // Stashed gear grants nothing, so its fighter effects go
            self.effects.delete_for_equipment(&ids).await?;
            for mut row in group {
                row.fighter_id = None;
                self.equipment.save(&row).await?;
            }
            Ok::<(), RepoError>(())
        };
        let gang =
            adjust_gang_then(self.gangs.as_ref(), gang, GangDelta::rating(rating), write).await?;

        tracing::info!(
            correlation_id = %ctx.correlation_id.short(),
            fighter_id = %fighter_id,
            equipment_id = %fighter_equipment_id,
            "Equipment stashed"
        );
        self.notifier.audit(
            self.notifier
                .entry(ctx, &fighter, AuditAction::EquipmentStashed)
                .with_new_value(&item.name),
        );
        self.notifier.fighter_changed(&fighter);

        Ok(EquipmentRemovalPayload { removed: ids, gang })
    }
}
