//! Client-side cache of one fighter and its gang.

use std::collections::HashSet;

use uuid::Uuid;

use gangbook_domain::{
    EffectType, Fighter, FighterEffect, FighterEquipment, FighterSkill, Gang,
    ModifierSign, Stat,
};
use gangbook_shared::FighterSnapshot;

use crate::temp_id::TempId;

/// Everything the roster screen shows for one fighter.
///
/// Patches produce a new `FighterCache` from an old one; reconciliation
/// folds the server's answer back in. `total_cost` is the cached value the
/// server last reported, kept current by local patches in between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FighterCache {
    pub fighter: Fighter,
    pub gang: Gang,
    pub equipment: Vec<FighterEquipment>,
    pub effects: Vec<FighterEffect>,
    pub skills: Vec<FighterSkill>,
    pub total_cost: i64,
    /// Set once a delete has been applied; the entry is kept for rollback
    pub deleted: bool,
    effect_types: Vec<EffectType>,
    temp_ids: HashSet<Uuid>,
}

impl FighterCache {
    pub fn new(snapshot: FighterSnapshot, effect_types: Vec<EffectType>) -> Self {
        Self {
            fighter: snapshot.fighter,
            gang: snapshot.gang,
            equipment: snapshot.equipment,
            effects: snapshot.effects,
            skills: snapshot.skills,
            total_cost: snapshot.total_cost,
            deleted: false,
            effect_types,
            temp_ids: HashSet::new(),
        }
    }

    /// Cache over the stock `(stat, sign)` effect types.
    pub fn from_snapshot(snapshot: FighterSnapshot) -> Self {
        Self::new(snapshot, EffectType::default_catalogue())
    }

    pub fn effect_type(&self, stat: Stat, sign: ModifierSign) -> Option<EffectType> {
        self.effect_types
            .iter()
            .find(|t| t.stat == stat && t.sign == sign)
            .cloned()
    }

    /// Remember a placeholder until the server replaces it.
    pub(crate) fn hold(&mut self, temp: TempId) {
        self.temp_ids.insert(temp.as_uuid());
    }

    pub fn is_temp(&self, id: &Uuid) -> bool {
        self.temp_ids.contains(id)
    }

    /// Placeholders still waiting for a server id, in `temp-` form.
    pub fn pending_temp_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .temp_ids
            .iter()
            .map(|id| TempId::from_uuid(*id).to_string())
            .collect();
        ids.sort();
        ids
    }

    pub(crate) fn forget_temp(&mut self, id: &Uuid) -> bool {
        self.temp_ids.remove(id)
    }

    /// Drop placeholders no cached row refers to any more.
    pub(crate) fn prune_temp_ids(&mut self) {
        let live: HashSet<Uuid> = self
            .effects
            .iter()
            .map(|e| e.id.to_uuid())
            .chain(self.equipment.iter().map(|e| e.id.to_uuid()))
            .chain(self.skills.iter().map(|s| s.id.to_uuid()))
            .collect();
        self.temp_ids.retain(|id| live.contains(id));
    }
}

impl From<FighterSnapshot> for FighterCache {
    fn from(snapshot: FighterSnapshot) -> Self {
        Self::from_snapshot(snapshot)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use gangbook_domain::{EffectCategory, EquipmentCatalogItem};

    /// A 100-credit fighter carrying a 15-credit lasgun and one +1 toughness
    /// user adjustment, in a gang with 200 credits, 1000 rating and 1 meat.
    pub fn cache() -> FighterCache {
        let gang = Gang::new("Goliath")
            .with_credits(200)
            .with_rating(1000)
            .with_meat(1);
        let fighter = Fighter::new(gang.id, "Brute", 100).with_xp(10);
        let gun = FighterEquipment::purchased(
            gang.id,
            fighter.id,
            &EquipmentCatalogItem::new("Lasgun", 15),
            false,
            None,
        );
        let toughness = FighterEffect::new(fighter.id, "T increase", EffectCategory::User)
            .with_modifier(Stat::Toughness, 1);
        FighterCache::from_snapshot(FighterSnapshot {
            fighter,
            gang,
            equipment: vec![gun],
            effects: vec![toughness],
            skills: Vec::new(),
            total_cost: 115,
        })
    }
}
