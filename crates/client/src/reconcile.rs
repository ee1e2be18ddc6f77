//! Fold server answers back into the cache.
//!
//! The server is authoritative for counters and rows it returns. Placeholder
//! rows are swapped for the server's rows by exact id match, never by
//! position or name.

use gangbook_domain::{FighterEffectId, FighterEquipmentId, FighterSkillId};
use gangbook_shared::{
    AdvancementPayload, AdvancementRecord, EquipmentPurchasePayload, EquipmentRemovalPayload,
    FighterDetailsPayload, FighterEffectsPayload, FighterStatusPayload, FighterXpPayload,
};

use crate::cache::FighterCache;
use crate::temp_id::TempId;

pub fn xp(cache: &mut FighterCache, payload: &FighterXpPayload) {
    cache.fighter.xp = payload.xp;
    cache.fighter.kills = payload.kills;
}

pub fn status(cache: &mut FighterCache, payload: &FighterStatusPayload) {
    cache.gang = payload.gang.clone();
    match &payload.fighter {
        Some(fighter) => {
            cache.fighter = fighter.clone();
            cache.deleted = false;
        }
        None => cache.deleted = true,
    }
}

pub fn details(cache: &mut FighterCache, payload: &FighterDetailsPayload) {
    cache.total_cost += payload.fighter.cost_adjustment - cache.fighter.cost_adjustment;
    cache.fighter = payload.fighter.clone();
    cache.gang = payload.gang.clone();
}

/// The server's effect list replaces the speculative one wholesale.
pub fn effects(cache: &mut FighterCache, payload: &FighterEffectsPayload) {
    cache.effects = payload.effects.clone();
    cache.prune_temp_ids();
}

pub fn equipment_purchase(
    cache: &mut FighterCache,
    temp: TempId,
    payload: &EquipmentPurchasePayload,
) {
    let placeholder = FighterEquipmentId::from_uuid(temp.as_uuid());
    let bought = &payload.equipment;
    match cache.equipment.iter_mut().find(|e| e.id == placeholder) {
        Some(row) => {
            cache.total_cost += bought.cost - row.cost;
            *row = bought.clone();
        }
        None => {
            if !cache.equipment.iter().any(|e| e.id == bought.id) {
                cache.total_cost += bought.cost;
                cache.equipment.push(bought.clone());
            }
        }
    }
    cache.gang = payload.gang.clone();
    cache.forget_temp(&temp.as_uuid());
}

pub fn equipment_removal(cache: &mut FighterCache, payload: &EquipmentRemovalPayload) {
    let removed_cost: i64 = cache
        .equipment
        .iter()
        .filter(|e| payload.removed.contains(&e.id))
        .map(|e| e.cost)
        .sum();
    cache.equipment.retain(|e| !payload.removed.contains(&e.id));
    cache.effects.retain(|e| {
        e.fighter_equipment_id
            .map_or(true, |owner| !payload.removed.contains(&owner))
    });
    cache.total_cost -= removed_cost;
    cache.gang = payload.gang.clone();
}

/// `temp` is the placeholder the purchase patch created; `None` for an undo.
pub fn advancement(cache: &mut FighterCache, temp: Option<TempId>, payload: &AdvancementPayload) {
    cache.fighter.xp = payload.xp;
    cache.gang = payload.gang.clone();

    let Some(temp) = temp else {
        return;
    };
    match &payload.record {
        Some(AdvancementRecord::Characteristic(effect)) => {
            let placeholder = FighterEffectId::from_uuid(temp.as_uuid());
            match cache.effects.iter_mut().find(|e| e.id == placeholder) {
                Some(row) => *row = effect.clone(),
                None => cache.effects.push(effect.clone()),
            }
        }
        Some(AdvancementRecord::Skill(skill)) => {
            let placeholder = FighterSkillId::from_uuid(temp.as_uuid());
            match cache.skills.iter_mut().find(|s| s.id == placeholder) {
                Some(row) => *row = skill.clone(),
                None => cache.skills.push(skill.clone()),
            }
        }
        None => {}
    }
    cache.forget_temp(&temp.as_uuid());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::fixtures::cache;
    use crate::patches;
    use gangbook_domain::{
        AdvancementCost, EquipmentCatalogItem, FighterEquipment, FighterId, Stat,
    };
    use std::collections::BTreeMap;

    #[test]
    fn server_xp_overrides_speculation() {
        let mut speculative = patches::xp(&cache(), 5).unwrap();
        xp(
            &mut speculative,
            &FighterXpPayload {
                fighter_id: FighterId::new(),
                xp: 14,
                kills: 1,
            },
        );
        assert_eq!((speculative.fighter.xp, speculative.fighter.kills), (14, 1));
    }

    #[test]
    fn purchase_replaces_placeholder_by_id() {
        let start = cache();
        let temp = TempId::new();
        let item = EquipmentCatalogItem::new("Plasma pistol", 65);
        let mut speculative = patches::buy_equipment(&start, &item, true, None, temp).unwrap();
        assert_eq!(speculative.pending_temp_ids(), vec![temp.to_string()]);

        let real = FighterEquipment::purchased(start.gang.id, start.fighter.id, &item, true, None);
        let mut gang = start.gang.clone();
        gang.credits = 115;
        gang.rating = 1085;
        equipment_purchase(
            &mut speculative,
            temp,
            &EquipmentPurchasePayload {
                equipment: real.clone(),
                gang,
            },
        );

        assert_eq!(speculative.equipment.len(), 2);
        assert_eq!(speculative.equipment[1], real);
        assert!(speculative.pending_temp_ids().is_empty());
        assert_eq!(speculative.total_cost, 200);
    }

    #[test]
    fn server_effects_replace_placeholders() {
        let start = cache();
        let stats = BTreeMap::from([(Stat::Cool, 1)]);
        let mut speculative = patches::effects(&start, &stats, None).unwrap();
        assert_eq!(speculative.pending_temp_ids().len(), 1);

        let mut server_effects = speculative.effects.clone();
        server_effects[1] = server_effects[1].clone().with_id(FighterEffectId::new());
        effects(
            &mut speculative,
            &FighterEffectsPayload {
                fighter_id: start.fighter.id,
                effects: server_effects.clone(),
            },
        );

        assert_eq!(speculative.effects, server_effects);
        assert!(speculative.pending_temp_ids().is_empty());
    }

    #[test]
    fn skill_record_swaps_in_and_gang_is_authoritative() {
        let start = cache();
        let temp = TempId::new();
        let cost = AdvancementCost::new(6, 20).unwrap();
        let mut speculative =
            patches::purchase_skill(&start, gangbook_domain::SkillId::new(), "Catfall", cost, temp)
                .unwrap();

        let skill = gangbook_domain::FighterSkill::new(
            start.fighter.id,
            speculative.skills[0].skill_id,
            "Catfall",
            cost,
        );
        let mut gang = start.gang.clone();
        gang.rating = 1025;
        advancement(
            &mut speculative,
            Some(temp),
            &AdvancementPayload {
                fighter_id: start.fighter.id,
                xp: 4,
                record: Some(AdvancementRecord::Skill(skill.clone())),
                gang,
            },
        );

        assert_eq!(speculative.skills, vec![skill]);
        assert_eq!(speculative.gang.rating, 1025);
        assert!(speculative.pending_temp_ids().is_empty());
    }

    #[test]
    fn deleted_fighter_stays_marked() {
        let mut speculative = patches::status(
            &cache(),
            gangbook_domain::StatusAction::Delete,
            None,
        )
        .unwrap();
        let gang = speculative.gang.clone();
        status(
            &mut speculative,
            &FighterStatusPayload {
                fighter: None,
                gang,
                rating_delta: -115,
            },
        );
        assert!(speculative.deleted);
    }
}
