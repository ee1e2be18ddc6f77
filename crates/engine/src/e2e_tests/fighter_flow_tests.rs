//! Status, XP, details and effects scenarios against the wired app.

use std::collections::BTreeMap;

use gangbook_domain::{
    EffectCategory, EquipmentCatalogItem, Fighter, FighterDetailsPatch, FighterEffect,
    FighterEquipment, FighterState, Gang, Stat, StatusAction,
};

use crate::infrastructure::ports::EffectRepo;
use crate::use_cases::FighterError;

use super::E2ETestContext;

#[tokio::test]
async fn kill_twice_round_trips_state_and_rating() {
    let ctx = E2ETestContext::setup().await;
    let gang_id = ctx.seed_gang(Gang::new("Van Saar").with_rating(1000)).await;
    let fighter_id = ctx
        .seed_fighter(Fighter::new(gang_id, "Prime", 150).with_cost_adjustment(10))
        .await;
    let status = &ctx.app.use_cases.fighter.edit_status;

    let killed = status
        .execute(&ctx.ctx(), fighter_id, StatusAction::Kill, None)
        .await
        .expect("kill");
    assert_eq!(killed.rating_delta, -160);
    assert_eq!(ctx.gang(gang_id).await.rating, 840);

    let revived = status
        .execute(&ctx.ctx(), fighter_id, StatusAction::Kill, None)
        .await
        .expect("unkill");
    assert_eq!(revived.rating_delta, 160);

    let fighter = ctx.fighter(fighter_id).await.expect("fighter kept");
    assert_eq!(fighter.state, FighterState::Active);
    assert_eq!(ctx.gang(gang_id).await.rating, 1000);
}

#[tokio::test]
async fn feeding_with_no_meat_changes_nothing() {
    let ctx = E2ETestContext::setup().await;
    let gang_id = ctx
        .seed_gang(Gang::new("Cawdor").with_credits(50).with_rating(400).with_meat(0))
        .await;
    let fighter_id = ctx
        .seed_fighter(Fighter::new(gang_id, "Thin", 60).with_state(FighterState::Starved))
        .await;

    let result = ctx
        .app
        .use_cases
        .fighter
        .edit_status
        .execute(&ctx.ctx(), fighter_id, StatusAction::Starve, None)
        .await;

    assert!(matches!(result, Err(FighterError::InsufficientMeat { .. })));
    let gang = ctx.gang(gang_id).await;
    assert_eq!((gang.credits, gang.rating, gang.meat), (50, 400, 0));
    assert_eq!(
        ctx.fighter(fighter_id).await.map(|f| f.state),
        Some(FighterState::Starved)
    );
}

#[tokio::test]
async fn feeding_spends_one_meat() {
    let ctx = E2ETestContext::setup().await;
    let gang_id = ctx.seed_gang(Gang::new("Cawdor").with_meat(3)).await;
    let fighter_id = ctx
        .seed_fighter(Fighter::new(gang_id, "Thin", 60).with_state(FighterState::Starved))
        .await;

    let payload = ctx
        .app
        .use_cases
        .fighter
        .edit_status
        .execute(&ctx.ctx(), fighter_id, StatusAction::Starve, None)
        .await
        .expect("feed");

    assert_eq!(payload.gang.meat, 2);
    assert_eq!(payload.fighter.map(|f| f.state), Some(FighterState::Active));
}

#[tokio::test]
async fn negative_sell_value_is_rejected_without_writes() {
    let ctx = E2ETestContext::setup().await;
    let gang_id = ctx.seed_gang(Gang::new("Goliath").with_credits(10).with_rating(300)).await;
    let fighter_id = ctx.seed_fighter(Fighter::new(gang_id, "Captive", 70)).await;

    let result = ctx
        .app
        .use_cases
        .fighter
        .edit_status
        .execute(&ctx.ctx(), fighter_id, StatusAction::Sell, Some(-1))
        .await;

    assert!(matches!(result, Err(FighterError::Validation(_))));
    assert_eq!(
        ctx.fighter(fighter_id).await.map(|f| f.state),
        Some(FighterState::Active)
    );
    assert_eq!(ctx.gang(gang_id).await.credits, 10);
    assert!(ctx.side_effects.taken().is_empty());
}

#[tokio::test]
async fn selling_credits_gang_and_drops_rating() {
    let ctx = E2ETestContext::setup().await;
    let gang_id = ctx.seed_gang(Gang::new("Goliath").with_credits(10).with_rating(300)).await;
    let fighter_id = ctx.seed_fighter(Fighter::new(gang_id, "Captive", 70)).await;

    let payload = ctx
        .app
        .use_cases
        .fighter
        .edit_status
        .execute(&ctx.ctx(), fighter_id, StatusAction::Sell, Some(45))
        .await
        .expect("sell");

    assert_eq!(payload.gang.credits, 55);
    assert_eq!(payload.gang.rating, 230);
    assert_eq!(
        payload.fighter.map(|f| f.state),
        Some(FighterState::Enslaved)
    );
}

#[tokio::test]
async fn deleting_active_fighter_removes_full_cost_and_images() {
    let ctx = E2ETestContext::setup().await;
    let gang_id = ctx.seed_gang(Gang::new("Orlock").with_rating(500)).await;
    let fighter = Fighter::new(gang_id, "Gunner", 80);
    let fighter_id = ctx.seed_fighter(fighter.clone()).await;
    let gun = EquipmentCatalogItem::new("Heavy stubber", 130);
    ctx.seed_equipment(FighterEquipment::purchased(gang_id, fighter_id, &gun, false, None))
        .await;
    ctx.seed_effect(
        FighterEffect::new(fighter_id, "Initiative advancement", EffectCategory::Advancement)
            .with_modifier(Stat::Initiative, 1)
            .with_costs(6, 20),
    )
    .await;
    let prefix = format!("fighters/{gang_id}/{fighter_id}/");
    ctx.images.put(format!("{prefix}portrait.webp")).await;
    ctx.images.put(format!("fighters/{gang_id}/other/portrait.webp")).await;

    let payload = ctx
        .app
        .use_cases
        .fighter
        .edit_status
        .execute(&ctx.ctx(), fighter_id, StatusAction::Delete, None)
        .await
        .expect("delete");

    // 80 base + 130 equipment + 20 advancement
    assert_eq!(payload.rating_delta, -230);
    assert_eq!(ctx.gang(gang_id).await.rating, 270);
    assert!(ctx.fighter(fighter_id).await.is_none());
    assert_eq!(
        ctx.images.keys().await,
        vec![format!("fighters/{gang_id}/other/portrait.webp")]
    );
    assert_eq!(ctx.side_effects.audit_actions(), vec!["fighter_deleted"]);
}

#[tokio::test]
async fn deleting_inactive_fighter_leaves_rating() {
    for state in [FighterState::Killed, FighterState::Retired, FighterState::Enslaved] {
        let ctx = E2ETestContext::setup().await;
        let gang_id = ctx.seed_gang(Gang::new("Orlock").with_rating(500)).await;
        let fighter_id = ctx
            .seed_fighter(Fighter::new(gang_id, "Former", 80).with_state(state))
            .await;

        let payload = ctx
            .app
            .use_cases
            .fighter
            .edit_status
            .execute(&ctx.ctx(), fighter_id, StatusAction::Delete, None)
            .await
            .expect("delete");

        assert_eq!(payload.rating_delta, 0, "state {state}");
        assert_eq!(ctx.gang(gang_id).await.rating, 500, "state {state}");
    }
}

#[tokio::test]
async fn xp_with_ooa_records_two_audit_entries() {
    let ctx = E2ETestContext::setup().await;
    let gang_id = ctx.seed_gang(Gang::new("Escher")).await;
    let mut fighter = Fighter::new(gang_id, "Blade", 75).with_xp(5);
    fighter.kills = 4;
    let fighter_id = ctx.seed_fighter(fighter).await;

    let payload = ctx
        .app
        .use_cases
        .fighter
        .update_xp
        .execute_with_ooa(&ctx.ctx(), fighter_id, 3, Some(2))
        .await
        .expect("xp");

    assert_eq!((payload.xp, payload.kills), (8, 6));
    assert_eq!(
        ctx.side_effects.audit_actions(),
        vec!["xp_changed", "kills_changed"]
    );
}

#[tokio::test]
async fn negative_xp_is_kept() {
    let ctx = E2ETestContext::setup().await;
    let gang_id = ctx.seed_gang(Gang::new("Escher")).await;
    let fighter_id = ctx.seed_fighter(Fighter::new(gang_id, "Blade", 75).with_xp(1)).await;

    let payload = ctx
        .app
        .use_cases
        .fighter
        .update_xp
        .execute(&ctx.ctx(), fighter_id, -4)
        .await
        .expect("xp");

    assert_eq!(payload.xp, -3);
    assert_eq!(ctx.fighter(fighter_id).await.map(|f| f.xp), Some(-3));
}

#[tokio::test]
async fn cost_adjustment_only_moves_rating_by_difference() {
    let ctx = E2ETestContext::setup().await;
    let gang_id = ctx.seed_gang(Gang::new("Delaque").with_rating(900)).await;
    let mut fighter = Fighter::new(gang_id, "Shade", 90).with_cost_adjustment(4);
    fighter.label = Some("Lt".to_string());
    fighter.notes = Some("Keeps to the dark".to_string());
    let fighter_id = ctx.seed_fighter(fighter.clone()).await;

    let patch = FighterDetailsPatch {
        cost_adjustment: Some(10),
        ..Default::default()
    };
    let payload = ctx
        .app
        .use_cases
        .fighter
        .update_details
        .execute(&ctx.ctx(), fighter_id, &patch)
        .await
        .expect("details");

    assert_eq!(payload.gang.rating, 906);
    let stored = ctx.fighter(fighter_id).await.expect("fighter");
    assert_eq!(
        stored,
        Fighter {
            cost_adjustment: 10,
            ..fighter
        }
    );
}

#[tokio::test]
async fn opposite_modifier_fully_cancels_and_removes_effect() {
    let ctx = E2ETestContext::setup().await;
    let gang_id = ctx.seed_gang(Gang::new("Goliath")).await;
    let fighter_id = ctx.seed_fighter(Fighter::new(gang_id, "Brute", 100)).await;
    ctx.seed_effect(
        FighterEffect::new(fighter_id, "Toughness increase", EffectCategory::User)
            .with_modifier(Stat::Toughness, 1),
    )
    .await;

    let payload = ctx
        .app
        .use_cases
        .fighter
        .update_effects
        .execute(&ctx.ctx(), fighter_id, &BTreeMap::from([(Stat::Toughness, -1)]))
        .await
        .expect("effects");

    assert!(payload.effects.is_empty());
    let stored = EffectRepo::list_for_fighter(ctx.store.as_ref(), fighter_id)
        .await
        .expect("effects");
    assert!(stored.is_empty());
}

#[tokio::test]
async fn same_sign_consolidates_into_one_modifier() {
    let ctx = E2ETestContext::setup().await;
    let gang_id = ctx.seed_gang(Gang::new("Goliath")).await;
    let fighter_id = ctx.seed_fighter(Fighter::new(gang_id, "Brute", 100)).await;
    ctx.seed_effect(
        FighterEffect::new(fighter_id, "Toughness increase", EffectCategory::User)
            .with_modifier(Stat::Toughness, 1),
    )
    .await;

    let payload = ctx
        .app
        .use_cases
        .fighter
        .update_effects
        .execute(&ctx.ctx(), fighter_id, &BTreeMap::from([(Stat::Toughness, 2)]))
        .await
        .expect("effects");

    assert_eq!(payload.effects.len(), 1);
    assert_eq!(payload.effects[0].modifiers.len(), 1);
    assert_eq!(payload.effects[0].modifiers[0].value, 3);
}

#[tokio::test]
async fn same_sign_takes_priority_over_opposite() {
    let ctx = E2ETestContext::setup().await;
    let gang_id = ctx.seed_gang(Gang::new("Goliath")).await;
    let fighter_id = ctx.seed_fighter(Fighter::new(gang_id, "Brute", 100)).await;
    let plus = FighterEffect::new(fighter_id, "Toughness increase", EffectCategory::User)
        .with_modifier(Stat::Toughness, 1);
    let minus = FighterEffect::new(fighter_id, "Toughness decrease", EffectCategory::User)
        .with_modifier(Stat::Toughness, -3);
    ctx.seed_effect(plus.clone()).await;
    ctx.seed_effect(minus.clone()).await;

    let payload = ctx
        .app
        .use_cases
        .fighter
        .update_effects
        .execute(&ctx.ctx(), fighter_id, &BTreeMap::from([(Stat::Toughness, 1)]))
        .await
        .expect("effects");

    let value_of = |id| {
        payload
            .effects
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.modifiers[0].value)
    };
    assert_eq!(value_of(plus.id), Some(2));
    assert_eq!(value_of(minus.id), Some(-3));
}

#[tokio::test]
async fn beast_status_change_invalidates_owner_snapshot() {
    let ctx = E2ETestContext::setup().await;
    let gang_id = ctx.seed_gang(Gang::new("Cawdor").with_rating(300)).await;
    let owner_id = ctx.seed_fighter(Fighter::new(gang_id, "Handler", 60)).await;
    let beast_id = ctx
        .seed_fighter(Fighter::new(gang_id, "Ripperjack", 30).with_beast_owner(owner_id))
        .await;

    ctx.app
        .use_cases
        .fighter
        .edit_status
        .execute(&ctx.ctx(), beast_id, StatusAction::Kill, None)
        .await
        .expect("kill beast");

    assert_eq!(ctx.side_effects.invalidated(), vec![beast_id, owner_id]);
    assert_eq!(ctx.side_effects.audit_actions(), vec!["fighter_killed"]);
}
