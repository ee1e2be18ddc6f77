//! Speculative cache patches.
//!
//! Each patch is a pure function from the cached state to the state the
//! server is expected to produce. They run the same domain rules the engine
//! runs, so a request the server would refuse usually fails here first and
//! is never sent. Rating deltas use the cached `total_cost`.

use std::collections::BTreeMap;

use gangbook_domain::{
    ensure_non_negative, plan_stat_changes, AdvancementCost, AdvancementRef, DomainError,
    EffectCategory, EquipmentCatalogItem, Fighter, FighterDetailsPatch, FighterEffect,
    FighterEffectId, FighterEquipment, FighterEquipmentId, FighterSkill, FighterSkillId,
    GangDelta, SkillId, Stat, StatusAction, UserId,
};

use crate::cache::FighterCache;
use crate::temp_id::TempId;

fn rating_for(fighter: &Fighter, credits: i64) -> i64 {
    if fighter.counts_toward_rating() {
        credits
    } else {
        0
    }
}

pub fn xp(cache: &FighterCache, xp_to_add: i64) -> Result<FighterCache, DomainError> {
    xp_with_ooa(cache, xp_to_add, None)
}

pub fn xp_with_ooa(
    cache: &FighterCache,
    xp_to_add: i64,
    ooa_count: Option<i64>,
) -> Result<FighterCache, DomainError> {
    let ooa = match ooa_count {
        Some(n) => u32::try_from(ensure_non_negative("ooa_count", n)?)
            .map_err(|_| DomainError::validation(format!("ooa_count too large: {n}")))?,
        None => 0,
    };

    let mut next = cache.clone();
    next.fighter.xp = cache
        .fighter
        .xp
        .checked_add(xp_to_add)
        .ok_or_else(|| DomainError::validation("xp overflow"))?;
    next.fighter.kills = cache
        .fighter
        .kills
        .checked_add(ooa)
        .ok_or_else(|| DomainError::validation("kills overflow"))?;
    Ok(next)
}

pub fn status(
    cache: &FighterCache,
    action: StatusAction,
    sell_value: Option<i64>,
) -> Result<FighterCache, DomainError> {
    let change = cache
        .fighter
        .plan_status_change(action, sell_value, cache.gang.meat)?;

    let mut next = cache.clone();
    next.gang.apply(GangDelta {
        credits: change.credits_delta,
        rating: change.rating_shift.delta(cache.total_cost),
        meat: change.meat_delta,
    });
    if change.deletes_fighter {
        next.deleted = true;
    } else {
        next.fighter.apply_status_change(&change);
    }
    Ok(next)
}

pub fn details(
    cache: &FighterCache,
    patch: &FighterDetailsPatch,
) -> Result<FighterCache, DomainError> {
    let mut next = cache.clone();
    let change = next.fighter.apply_details(patch)?;
    next.gang.rating += change.rating_delta;
    next.total_cost += change.cost_adjustment_delta;
    Ok(next)
}

/// Consolidate the requested stat deltas into the cached user effects.
///
/// Newly created effects get placeholder ids held by the cache.
pub fn effects(
    cache: &FighterCache,
    stats: &BTreeMap<Stat, i32>,
    user_id: Option<UserId>,
) -> Result<FighterCache, DomainError> {
    let plan = plan_stat_changes(&cache.effects, stats, |stat, sign| {
        cache.effect_type(stat, sign)
    })?;

    let mut next = cache.clone();
    let mut effects = std::mem::take(&mut next.effects);
    let mut minted = Vec::new();
    plan.apply_to(&mut effects, cache.fighter.id, user_id, || {
        let temp = TempId::new();
        minted.push(temp);
        FighterEffectId::from_uuid(temp.as_uuid())
    });
    next.effects = effects;
    for temp in minted {
        next.hold(temp);
    }
    Ok(next)
}

pub fn buy_equipment(
    cache: &FighterCache,
    item: &EquipmentCatalogItem,
    master_crafted: bool,
    cost_override: Option<i64>,
    temp: TempId,
) -> Result<FighterCache, DomainError> {
    if let Some(cost) = cost_override {
        ensure_non_negative("cost_override", cost)?;
    }

    let mut bought = FighterEquipment::purchased(
        cache.gang.id,
        cache.fighter.id,
        item,
        master_crafted,
        cost_override,
    );
    bought.id = FighterEquipmentId::from_uuid(temp.as_uuid());
    if cache.gang.credits < bought.cost {
        return Err(DomainError::insufficient(
            "credits",
            bought.cost,
            cache.gang.credits,
        ));
    }

    let mut next = cache.clone();
    next.gang.apply(GangDelta {
        credits: -bought.cost,
        rating: rating_for(&cache.fighter, bought.cost),
        meat: 0,
    });
    next.total_cost += bought.cost;
    next.equipment.push(bought);
    next.hold(temp);
    Ok(next)
}

/// Rows leaving the fighter: the item and anything mounted on it.
fn take_group(
    next: &mut FighterCache,
    id: FighterEquipmentId,
) -> Result<i64, DomainError> {
    let group: Vec<FighterEquipmentId> = FighterEquipment::with_mounted(&next.equipment, id)
        .into_iter()
        .map(|e| e.id)
        .collect();
    if !group.contains(&id) {
        return Err(DomainError::validation(format!(
            "Equipment {id} is not carried by this fighter"
        )));
    }

    let cost: i64 = next
        .equipment
        .iter()
        .filter(|e| group.contains(&e.id))
        .map(|e| e.cost)
        .sum();
    next.equipment.retain(|e| !group.contains(&e.id));
    next.effects.retain(|e| {
        e.fighter_equipment_id
            .map_or(true, |owner| !group.contains(&owner))
    });
    Ok(cost)
}

pub fn sell_equipment(
    cache: &FighterCache,
    id: FighterEquipmentId,
    sell_value: i64,
) -> Result<FighterCache, DomainError> {
    let sell_value = ensure_non_negative("sell_value", sell_value)?;

    let mut next = cache.clone();
    let cost = take_group(&mut next, id)?;
    next.gang.apply(GangDelta {
        credits: sell_value,
        rating: -rating_for(&cache.fighter, cost),
        meat: 0,
    });
    next.total_cost -= cost;
    Ok(next)
}

pub fn stash_equipment(
    cache: &FighterCache,
    id: FighterEquipmentId,
) -> Result<FighterCache, DomainError> {
    let mut next = cache.clone();
    let cost = take_group(&mut next, id)?;
    next.gang.rating -= rating_for(&cache.fighter, cost);
    next.total_cost -= cost;
    Ok(next)
}

fn charge(next: &mut FighterCache, cost: AdvancementCost) -> Result<(), DomainError> {
    cost.ensure_affordable(next.fighter.xp)?;
    next.fighter.xp -= cost.xp_cost;
    next.gang.rating += rating_for(&next.fighter, cost.credits_increase);
    next.total_cost += cost.credits_increase;
    Ok(())
}

pub fn purchase_characteristic(
    cache: &FighterCache,
    stat: Stat,
    cost: AdvancementCost,
    user_id: Option<UserId>,
    temp: TempId,
) -> Result<FighterCache, DomainError> {
    let mut next = cache.clone();
    charge(&mut next, cost)?;

    let mut effect = FighterEffect::new(
        cache.fighter.id,
        format!("{} advancement", stat.as_str()),
        EffectCategory::Advancement,
    )
    .with_modifier(stat, 1)
    .with_costs(cost.xp_cost, cost.credits_increase)
    .with_id(FighterEffectId::from_uuid(temp.as_uuid()));
    effect.user_id = user_id;
    next.effects.push(effect);
    next.hold(temp);
    Ok(next)
}

pub fn purchase_skill(
    cache: &FighterCache,
    skill_id: SkillId,
    name: &str,
    cost: AdvancementCost,
    temp: TempId,
) -> Result<FighterCache, DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("Skill name cannot be empty"));
    }

    let mut next = cache.clone();
    charge(&mut next, cost)?;

    let mut skill = FighterSkill::new(cache.fighter.id, skill_id, name, cost);
    skill.id = FighterSkillId::from_uuid(temp.as_uuid());
    next.skills.push(skill);
    next.hold(temp);
    Ok(next)
}

pub fn undo_advancement(
    cache: &FighterCache,
    advancement: AdvancementRef,
) -> Result<FighterCache, DomainError> {
    let mut next = cache.clone();
    let (xp_cost, credits_increase) = match advancement {
        AdvancementRef::Characteristic(id) => {
            let position = next
                .effects
                .iter()
                .position(|e| e.id == id && e.category == EffectCategory::Advancement)
                .ok_or_else(|| DomainError::validation(format!("Advancement {id} not found")))?;
            let effect = next.effects.remove(position);
            (effect.xp_cost, effect.credits_increase)
        }
        AdvancementRef::Skill(id) => {
            let position = next
                .skills
                .iter()
                .position(|s| s.id == id)
                .ok_or_else(|| DomainError::validation(format!("Advancement {id} not found")))?;
            let skill = next.skills.remove(position);
            (skill.xp_cost, skill.credits_increase)
        }
    };

    next.fighter.xp += xp_cost;
    next.gang.rating -= rating_for(&next.fighter, credits_increase);
    next.total_cost -= credits_increase;
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::fixtures::cache;
    use gangbook_domain::{stat_total, FighterState};

    #[test]
    fn xp_is_added_without_clamping() {
        let next = xp(&cache(), -25).unwrap();
        assert_eq!(next.fighter.xp, -15);
    }

    #[test]
    fn negative_ooa_is_refused() {
        assert!(xp_with_ooa(&cache(), 1, Some(-1)).is_err());
        let next = xp_with_ooa(&cache(), 3, Some(2)).unwrap();
        assert_eq!((next.fighter.xp, next.fighter.kills), (13, 2));
    }

    #[test]
    fn kill_removes_cached_total_from_rating() {
        let next = status(&cache(), StatusAction::Kill, None).unwrap();
        assert_eq!(next.fighter.state, FighterState::Killed);
        assert_eq!(next.gang.rating, 1000 - 115);
    }

    #[test]
    fn feed_spends_meat_and_refuses_without_it() {
        let mut starved = cache();
        starved.fighter.state = FighterState::Starved;
        let fed = status(&starved, StatusAction::Starve, None).unwrap();
        assert_eq!(fed.gang.meat, 0);
        assert_eq!(fed.fighter.state, FighterState::Active);

        let err = status(&fed.clone_with_state(FighterState::Starved), StatusAction::Starve, None)
            .unwrap_err();
        assert!(err.is_precondition());
    }

    #[test]
    fn starving_a_killed_fighter_is_refused_and_rating_stays() {
        let killed = cache().clone_with_state(FighterState::Killed);
        let err = status(&killed, StatusAction::Starve, None).unwrap_err();
        assert!(matches!(err, DomainError::InvalidStateTransition(_)));
        assert_eq!(killed.gang.rating, 1000);
        assert_eq!(killed.fighter.state, FighterState::Killed);
    }

    #[test]
    fn delete_marks_entry_and_keeps_rows_for_rollback() {
        let next = status(&cache(), StatusAction::Delete, None).unwrap();
        assert!(next.deleted);
        assert_eq!(next.gang.rating, 885);
        assert_eq!(next.equipment.len(), 1);
    }

    #[test]
    fn cost_adjustment_moves_rating_and_total() {
        let patch = FighterDetailsPatch {
            cost_adjustment: Some(10),
            ..Default::default()
        };
        let next = details(&cache(), &patch).unwrap();
        assert_eq!(next.gang.rating, 1010);
        assert_eq!(next.total_cost, 125);
    }

    #[test]
    fn effects_fold_into_existing_modifier() {
        let stats = BTreeMap::from([(Stat::Toughness, 2)]);
        let next = effects(&cache(), &stats, None).unwrap();
        assert_eq!(next.effects.len(), 1);
        assert_eq!(stat_total(&next.effects, Stat::Toughness), 3);
        assert!(next.pending_temp_ids().is_empty());
    }

    #[test]
    fn effects_refuse_overflowing_delta_locally() {
        let err = effects(&cache(), &BTreeMap::from([(Stat::Toughness, i32::MAX)]), None).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn effects_create_placeholder_for_new_stat() {
        let stats = BTreeMap::from([(Stat::Cool, -1)]);
        let next = effects(&cache(), &stats, None).unwrap();
        assert_eq!(next.effects.len(), 2);
        let created = &next.effects[1];
        assert!(next.is_temp(created.id.as_uuid()));
        assert_eq!(created.modifiers[0].value, -1);
    }

    #[test]
    fn buy_master_crafted_charges_marked_up_price() {
        let temp = TempId::new();
        let item = EquipmentCatalogItem::new("Plasma pistol", 65);
        let next = buy_equipment(&cache(), &item, true, None, temp).unwrap();
        let bought = next.equipment.last().unwrap();
        assert_eq!(bought.cost, 85);
        assert_eq!(bought.id.to_uuid(), temp.as_uuid());
        assert_eq!((next.gang.credits, next.gang.rating), (115, 1085));
        assert_eq!(next.total_cost, 200);
    }

    #[test]
    fn buy_beyond_credits_is_refused() {
        let item = EquipmentCatalogItem::new("Heavy stubber", 170);
        let err = buy_equipment(&cache(), &item, true, None, TempId::new()).unwrap_err();
        assert!(err.is_precondition());
    }

    #[test]
    fn sell_takes_mounted_items_along() {
        let mut start = cache();
        let gun_id = start.equipment[0].id;
        let mut sight = start.equipment[0].clone();
        sight.id = FighterEquipmentId::new();
        sight.cost = 25;
        sight.target_equipment_id = Some(gun_id);
        start.equipment.push(sight);
        start.total_cost = 140;

        let next = sell_equipment(&start, gun_id, 10).unwrap();

        assert!(next.equipment.is_empty());
        assert_eq!((next.gang.credits, next.gang.rating), (210, 960));
        assert_eq!(next.total_cost, 100);
        assert!(sell_equipment(&start, gun_id, -1).is_err());
    }

    #[test]
    fn stash_of_killed_fighter_leaves_rating() {
        let mut start = cache();
        start.fighter.state = FighterState::Killed;
        let gun_id = start.equipment[0].id;
        let next = stash_equipment(&start, gun_id).unwrap();
        assert_eq!(next.gang.rating, 1000);
        assert!(next.equipment.is_empty());
    }

    #[test]
    fn characteristic_purchase_and_undo_are_symmetric() {
        let start = cache();
        let temp = TempId::new();
        let cost = AdvancementCost::new(6, 20).unwrap();
        let bought = purchase_characteristic(&start, Stat::Strength, cost, None, temp).unwrap();
        assert_eq!(bought.fighter.xp, 4);
        assert_eq!(bought.gang.rating, 1020);
        assert_eq!(stat_total(&bought.effects, Stat::Strength), 1);

        let id = FighterEffectId::from_uuid(temp.as_uuid());
        let undone = undo_advancement(&bought, AdvancementRef::Characteristic(id)).unwrap();
        assert_eq!(undone.fighter.xp, start.fighter.xp);
        assert_eq!(undone.gang.rating, start.gang.rating);
        assert_eq!(undone.total_cost, start.total_cost);
        assert_eq!(undone.effects, start.effects);
    }

    #[test]
    fn skill_purchase_needs_xp_and_a_name() {
        let cost = AdvancementCost::new(12, 20).unwrap();
        let err = purchase_skill(&cache(), SkillId::new(), "Catfall", cost, TempId::new()).unwrap_err();
        assert!(err.is_precondition());

        let cheap = AdvancementCost::new(3, 5).unwrap();
        assert!(purchase_skill(&cache(), SkillId::new(), " ", cheap, TempId::new()).is_err());
    }

    #[test]
    fn undo_of_user_effect_is_refused() {
        let start = cache();
        let user_effect = start.effects[0].id;
        assert!(undo_advancement(&start, AdvancementRef::Characteristic(user_effect)).is_err());
    }

    impl FighterCache {
        fn clone_with_state(&self, state: FighterState) -> FighterCache {
            let mut next = self.clone();
            next.fighter.state = state;
            next
        }
    }
}
