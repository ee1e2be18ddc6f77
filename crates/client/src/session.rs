//! One fighter's optimistic session: cache, patches, gateway, reconcile.

use std::collections::BTreeMap;

use gangbook_domain::{
    AdvancementCost, AdvancementRef, EquipmentCatalogItem, FighterDetailsPatch,
    FighterEquipmentId, FighterId, SkillId, Stat, StatusAction, UserId,
};
use gangbook_shared::{
    AdvancementPayload, EquipmentPurchasePayload, EquipmentRemovalPayload, FighterDetailsPayload,
    FighterEffectsPayload, FighterStatusPayload, FighterXpPayload,
};

use crate::cache::FighterCache;
use crate::error::ClientError;
use crate::gateway::FighterGateway;
use crate::optimistic::Optimistic;
use crate::patches;
use crate::reconcile;
use crate::temp_id::TempId;

/// Every mutation the roster screen can make on one fighter.
///
/// Each method patches the cache immediately, calls the engine, then either
/// reconciles with the answer or rolls the cache back.
pub struct FighterSession {
    fighter_id: FighterId,
    user_id: Option<UserId>,
    cache: Optimistic<FighterCache>,
    gateway: FighterGateway,
}

impl FighterSession {
    pub fn new(cache: FighterCache, gateway: FighterGateway, user_id: Option<UserId>) -> Self {
        Self {
            fighter_id: cache.fighter.id,
            user_id,
            cache: Optimistic::new(cache),
            gateway,
        }
    }

    /// Fetch the fighter and open a session over it.
    pub async fn open(
        gateway: FighterGateway,
        fighter_id: FighterId,
        user_id: Option<UserId>,
    ) -> Result<Self, ClientError> {
        let snapshot = gateway.snapshot(fighter_id).await?;
        Ok(Self::new(FighterCache::from(snapshot), gateway, user_id))
    }

    pub fn fighter_id(&self) -> FighterId {
        self.fighter_id
    }

    pub fn state(&self) -> &Optimistic<FighterCache> {
        &self.cache
    }

    pub async fn current(&self) -> FighterCache {
        self.cache.current().await
    }

    /// Drop local state and reload from the engine.
    pub async fn refresh(&self) -> Result<(), ClientError> {
        let snapshot = self.gateway.snapshot(self.fighter_id).await?;
        self.cache.reset(FighterCache::from(snapshot)).await;
        Ok(())
    }

    pub async fn edit_status(
        &self,
        action: StatusAction,
        sell_value: Option<i64>,
    ) -> Result<FighterStatusPayload, ClientError> {
        let id = self.fighter_id;
        self.cache
            .mutate(
                |c| Ok(patches::status(c, action, sell_value)?),
                || self.gateway.edit_status(id, action, sell_value),
                reconcile::status,
            )
            .await
    }

    pub async fn update_xp(&self, xp_to_add: i64) -> Result<FighterXpPayload, ClientError> {
        let id = self.fighter_id;
        self.cache
            .mutate(
                |c| Ok(patches::xp(c, xp_to_add)?),
                || self.gateway.update_xp(id, xp_to_add),
                reconcile::xp,
            )
            .await
    }

    pub async fn update_xp_with_ooa(
        &self,
        xp_to_add: i64,
        ooa_count: Option<i64>,
    ) -> Result<FighterXpPayload, ClientError> {
        let id = self.fighter_id;
        self.cache
            .mutate(
                |c| Ok(patches::xp_with_ooa(c, xp_to_add, ooa_count)?),
                || self.gateway.update_xp_with_ooa(id, xp_to_add, ooa_count),
                reconcile::xp,
            )
            .await
    }

    pub async fn update_details(
        &self,
        patch: FighterDetailsPatch,
    ) -> Result<FighterDetailsPayload, ClientError> {
        let id = self.fighter_id;
        let local = patch.clone();
        self.cache
            .mutate(
                move |c| Ok(patches::details(c, &local)?),
                || self.gateway.update_details(id, patch),
                reconcile::details,
            )
            .await
    }

    pub async fn update_effects(
        &self,
        stats: BTreeMap<Stat, i32>,
    ) -> Result<FighterEffectsPayload, ClientError> {
        let id = self.fighter_id;
        let user_id = self.user_id;
        let local = stats.clone();
        self.cache
            .mutate(
                move |c| Ok(patches::effects(c, &local, user_id)?),
                || self.gateway.update_effects(id, stats),
                reconcile::effects,
            )
            .await
    }

    pub async fn buy_equipment(
        &self,
        item: &EquipmentCatalogItem,
        master_crafted: bool,
        cost_override: Option<i64>,
    ) -> Result<EquipmentPurchasePayload, ClientError> {
        let id = self.fighter_id;
        let temp = TempId::new();
        self.cache
            .mutate(
                |c| Ok(patches::buy_equipment(c, item, master_crafted, cost_override, temp)?),
                || {
                    self.gateway
                        .buy_equipment(id, item.id, master_crafted, cost_override)
                },
                |c, answer| reconcile::equipment_purchase(c, temp, answer),
            )
            .await
    }

    pub async fn sell_equipment(
        &self,
        equipment_id: FighterEquipmentId,
        sell_value: i64,
    ) -> Result<EquipmentRemovalPayload, ClientError> {
        self.cache
            .mutate(
                |c| Ok(patches::sell_equipment(c, equipment_id, sell_value)?),
                || self.gateway.sell_equipment(equipment_id, sell_value),
                reconcile::equipment_removal,
            )
            .await
    }

    pub async fn stash_equipment(
        &self,
        equipment_id: FighterEquipmentId,
    ) -> Result<EquipmentRemovalPayload, ClientError> {
        self.cache
            .mutate(
                |c| Ok(patches::stash_equipment(c, equipment_id)?),
                || self.gateway.stash_equipment(equipment_id),
                reconcile::equipment_removal,
            )
            .await
    }

    pub async fn purchase_characteristic(
        &self,
        stat: Stat,
        cost: AdvancementCost,
    ) -> Result<AdvancementPayload, ClientError> {
        let id = self.fighter_id;
        let user_id = self.user_id;
        let temp = TempId::new();
        self.cache
            .mutate(
                |c| Ok(patches::purchase_characteristic(c, stat, cost, user_id, temp)?),
                || self.gateway.purchase_characteristic(id, stat, cost),
                |c, answer| reconcile::advancement(c, Some(temp), answer),
            )
            .await
    }

    pub async fn purchase_skill(
        &self,
        skill_id: SkillId,
        name: &str,
        cost: AdvancementCost,
    ) -> Result<AdvancementPayload, ClientError> {
        let id = self.fighter_id;
        let temp = TempId::new();
        self.cache
            .mutate(
                |c| Ok(patches::purchase_skill(c, skill_id, name, cost, temp)?),
                || self.gateway.purchase_skill(id, skill_id, name, cost),
                |c, answer| reconcile::advancement(c, Some(temp), answer),
            )
            .await
    }

    pub async fn undo_advancement(
        &self,
        advancement: AdvancementRef,
    ) -> Result<AdvancementPayload, ClientError> {
        let id = self.fighter_id;
        self.cache
            .mutate(
                |c| Ok(patches::undo_advancement(c, advancement)?),
                || self.gateway.undo_advancement(id, advancement),
                |c, answer| reconcile::advancement(c, None, answer),
            )
            .await
    }
}
