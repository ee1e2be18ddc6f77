//! Edit fighter status use case.
//!
//! Kill, retire, sell, rescue, starve/feed, recover, capture or delete a
//! fighter, keeping gang credits, meat and rating in step.

use std::sync::Arc;

use gangbook_domain::{
    ensure_non_negative, Fighter, FighterId, GangDelta, RatingShift, StatusAction,
};
use gangbook_shared::FighterStatusPayload;

use crate::infrastructure::ports::{
    AuditAction, FighterCostPort, FighterRepo, GangRepo, ImageStoragePort, MutationContext,
};

use super::{adjust_gang_then, load_fighter, load_gang, FighterError, MutationNotifier};

pub struct EditFighterStatus {
    fighters: Arc<dyn FighterRepo>,
    gangs: Arc<dyn GangRepo>,
    cost: Arc<dyn FighterCostPort>,
    images: Arc<dyn ImageStoragePort>,
    notifier: MutationNotifier,
}

impl EditFighterStatus {
    pub fn new(
        fighters: Arc<dyn FighterRepo>,
        gangs: Arc<dyn GangRepo>,
        cost: Arc<dyn FighterCostPort>,
        images: Arc<dyn ImageStoragePort>,
        notifier: MutationNotifier,
    ) -> Self {
        Self {
            fighters,
            gangs,
            cost,
            images,
            notifier,
        }
    }

    /// Execute the status change.
    ///
    /// # Returns
    /// * `Ok(FighterStatusPayload)` - the fighter after the change (`None` once
    ///   deleted), the gang after its counters moved, and the rating delta
    /// * `Err(FighterError)` - nothing was written
    pub async fn execute(
        &self,
        ctx: &MutationContext,
        fighter_id: FighterId,
        action: StatusAction,
        sell_value: Option<i64>,
    ) -> Result<FighterStatusPayload, FighterError> {
        if action == StatusAction::Sell {
            let value = sell_value
                .ok_or_else(|| FighterError::validation("sell_value is required to sell"))?;
            ensure_non_negative("sell_value", value)?;
        }

        let fighter = load_fighter(self.fighters.as_ref(), fighter_id).await?;
        let gang = load_gang(self.gangs.as_ref(), fighter.gang_id).await?;
        let change = fighter.plan_status_change(action, sell_value, gang.meat)?;

        // Cost is read before any write so a deletion still knows what to subtract
        let total_cost = match change.rating_shift {
            RatingShift::Unchanged => 0,
            _ => self.cost.total_cost(fighter_id).await,
        };
        let rating_delta = change.rating_shift.delta(total_cost);

        let delta = GangDelta {
            credits: change.credits_delta,
            rating: rating_delta,
            meat: change.meat_delta,
        };

        let updated = (!change.deletes_fighter).then(|| {
            let mut updated = fighter.clone();
            updated.apply_status_change(&change);
            updated
        });
        let write = async {
            match &updated {
                Some(updated) => self.fighters.save(updated).await,
                None => self.fighters.delete(fighter_id).await,
            }
        };
        let gang = adjust_gang_then(self.gangs.as_ref(), gang, delta, write).await?;
        if change.deletes_fighter {
            self.remove_images(&fighter).await;
        }

        tracing::info!(
            correlation_id = %ctx.correlation_id.short(),
            fighter_id = %fighter_id,
            action = action.as_str(),
            state = change.state.as_str(),
            rating_delta,
            "Fighter status changed"
        );

        let entry = if change.deletes_fighter {
            self.notifier
                .entry(ctx, &fighter, AuditAction::FighterDeleted)
                .with_change(fighter.state, "deleted")
        } else {
            self.notifier
                .entry(ctx, &fighter, AuditAction::StatusChanged(action))
                .with_change(describe(&fighter), describe_change(&change))
        };
        self.notifier.audit(entry);
        self.notifier.fighter_changed(&fighter);

        Ok(FighterStatusPayload {
            fighter: updated,
            gang,
            rating_delta,
        })
    }

    /// Best effort: a storage failure is logged and the deletion stands.
    async fn remove_images(&self, fighter: &Fighter) {
        let prefix = format!("fighters/{}/{}/", fighter.gang_id, fighter.id);
        let keys = match self.images.list(&prefix).await {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!(error = %e, fighter_id = %fighter.id, "Failed to list fighter images");
                return;
            }
        };
        if keys.is_empty() {
            return;
        }
        if let Err(e) = self.images.delete(&keys).await {
            tracing::warn!(error = %e, fighter_id = %fighter.id, "Failed to delete fighter images");
        }
    }
}

fn describe(fighter: &Fighter) -> String {
    flags(fighter.state.as_str(), fighter.captured, fighter.recovery)
}

fn describe_change(change: &gangbook_domain::StatusChange) -> String {
    flags(change.state.as_str(), change.captured, change.recovery)
}

fn flags(state: &str, captured: bool, recovery: bool) -> String {
    let mut out = state.to_string();
    if captured {
        out.push_str("+captured");
    }
    if recovery {
        out.push_str("+recovery");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{
        MockFighterCostPort, MockFighterRepo, MockGangRepo, MockImageStoragePort, RepoError,
        StorageError,
    };
    use crate::use_cases::fighter::test_support::{ctx, notifier};
    use gangbook_domain::{FighterState, Gang};
    use mockall::Sequence;

    struct Fixture {
        fighters: MockFighterRepo,
        gangs: MockGangRepo,
        cost: MockFighterCostPort,
        images: MockImageStoragePort,
    }

    impl Fixture {
        fn new(fighter: &Fighter, gang: &Gang) -> Self {
            let mut fighters = MockFighterRepo::new();
            let f = fighter.clone();
            let fighter_id = fighter.id;
            fighters
                .expect_get()
                .withf(move |id| *id == fighter_id)
                .returning(move |_| Ok(Some(f.clone())));

            let mut gangs = MockGangRepo::new();
            let g = gang.clone();
            gangs.expect_get().returning(move |_| Ok(Some(g.clone())));

            Self {
                fighters,
                gangs,
                cost: MockFighterCostPort::new(),
                images: MockImageStoragePort::new(),
            }
        }

        fn build(self) -> (EditFighterStatus, Arc<crate::infrastructure::side_effects::RecordingSideEffects>) {
            let (notifier, sink) = notifier();
            (
                EditFighterStatus::new(
                    Arc::new(self.fighters),
                    Arc::new(self.gangs),
                    Arc::new(self.cost),
                    Arc::new(self.images),
                    notifier,
                ),
                sink,
            )
        }
    }

    fn van_saar() -> Gang {
        Gang::new("Van Saar").with_credits(100).with_rating(1000).with_meat(0)
    }

    #[tokio::test]
    async fn negative_sell_value_rejected_before_any_io() {
        // No expectations: any repository call would panic
        let (notifier, sink) = notifier();
        let use_case = EditFighterStatus::new(
            Arc::new(MockFighterRepo::new()),
            Arc::new(MockGangRepo::new()),
            Arc::new(MockFighterCostPort::new()),
            Arc::new(MockImageStoragePort::new()),
            notifier,
        );

        let result = use_case
            .execute(&ctx(), FighterId::new(), StatusAction::Sell, Some(-5))
            .await;

        assert!(matches!(result, Err(FighterError::Validation(_))));
        assert!(sink.taken().is_empty());
    }

    #[tokio::test]
    async fn when_fighter_not_found_returns_error() {
        let mut fighters = MockFighterRepo::new();
        fighters.expect_get().returning(|_| Ok(None));
        let (notifier, _) = notifier();
        let use_case = EditFighterStatus::new(
            Arc::new(fighters),
            Arc::new(MockGangRepo::new()),
            Arc::new(MockFighterCostPort::new()),
            Arc::new(MockImageStoragePort::new()),
            notifier,
        );

        let result = use_case
            .execute(&ctx(), FighterId::new(), StatusAction::Kill, None)
            .await;

        assert!(matches!(result, Err(FighterError::FighterNotFound(_))));
    }

    #[tokio::test]
    async fn kill_removes_total_cost_from_rating() {
        let gang = van_saar();
        let fighter = Fighter::new(gang.id, "Arc", 120);
        let mut fx = Fixture::new(&fighter, &gang);
        fx.cost.expect_total_cost().returning(|_| 150);
        fx.fighters
            .expect_save()
            .withf(|f| f.state == FighterState::Killed)
            .times(1)
            .returning(|_| Ok(()));
        fx.gangs
            .expect_adjust()
            .withf(|_, delta| *delta == GangDelta::rating(-150))
            .times(1)
            .returning(|_, _| Ok(van_saar().with_rating(850)));
        let (use_case, sink) = fx.build();

        let payload = use_case
            .execute(&ctx(), fighter.id, StatusAction::Kill, None)
            .await
            .unwrap();

        assert_eq!(payload.rating_delta, -150);
        assert_eq!(payload.fighter.map(|f| f.state), Some(FighterState::Killed));
        assert_eq!(sink.audit_actions(), vec!["fighter_killed"]);
    }

    #[tokio::test]
    async fn failed_gang_adjustment_writes_nothing() {
        let gang = van_saar();
        let fighter = Fighter::new(gang.id, "Arc", 120);
        let mut fx = Fixture::new(&fighter, &gang);
        fx.cost.expect_total_cost().returning(|_| 150);
        fx.gangs
            .expect_adjust()
            .times(1)
            .returning(|_, _| Err(RepoError::database("adjust_gang", "database is locked")));
        // No save expectation: writing the fighter would panic
        let (use_case, sink) = fx.build();

        let result = use_case
            .execute(&ctx(), fighter.id, StatusAction::Kill, None)
            .await;

        assert!(matches!(result, Err(FighterError::Repo(_))));
        assert!(sink.taken().is_empty());
    }

    #[tokio::test]
    async fn failed_fighter_write_reverts_gang_counters() {
        let gang = van_saar();
        let fighter = Fighter::new(gang.id, "Arc", 120);
        let mut fx = Fixture::new(&fighter, &gang);
        fx.cost.expect_total_cost().returning(|_| 150);
        fx.fighters
            .expect_save()
            .times(1)
            .returning(|_| Err(RepoError::database("save_fighter", "disk I/O error")));
        let mut seq = Sequence::new();
        fx.gangs
            .expect_adjust()
            .withf(|_, delta| *delta == GangDelta::rating(-150))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(van_saar().with_rating(850)));
        fx.gangs
            .expect_adjust()
            .withf(|_, delta| *delta == GangDelta::rating(150))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(van_saar()));
        let (use_case, sink) = fx.build();

        let result = use_case
            .execute(&ctx(), fighter.id, StatusAction::Kill, None)
            .await;

        assert!(matches!(result, Err(FighterError::Repo(_))));
        assert!(sink.taken().is_empty());
    }

    #[tokio::test]
    async fn feeding_without_meat_mutates_nothing() {
        let gang = van_saar();
        let fighter = Fighter::new(gang.id, "Hungry", 60).with_state(FighterState::Starved);
        // No save or adjust expectations
        let (use_case, sink) = Fixture::new(&fighter, &gang).build();

        let result = use_case
            .execute(&ctx(), fighter.id, StatusAction::Starve, None)
            .await;

        assert!(matches!(
            result,
            Err(FighterError::InsufficientMeat {
                required: 1,
                available: 0
            })
        ));
        assert!(sink.taken().is_empty());
    }

    #[tokio::test]
    async fn capture_toggle_leaves_rating_alone() {
        let gang = van_saar();
        let fighter = Fighter::new(gang.id, "Scout", 50);
        let mut fx = Fixture::new(&fighter, &gang);
        fx.fighters
            .expect_save()
            .withf(|f| f.captured)
            .returning(|_| Ok(()));
        // No cost lookup and no gang adjustment
        let (use_case, _) = fx.build();

        let payload = use_case
            .execute(&ctx(), fighter.id, StatusAction::Capture, None)
            .await
            .unwrap();

        assert_eq!(payload.rating_delta, 0);
        assert_eq!(payload.gang, gang);
    }

    #[tokio::test]
    async fn delete_survives_image_storage_failure() {
        let gang = van_saar();
        let fighter = Fighter::new(gang.id, "Gone", 90);
        let mut fx = Fixture::new(&fighter, &gang);
        fx.cost.expect_total_cost().returning(|_| 90);
        fx.fighters.expect_delete().times(1).returning(|_| Ok(()));
        fx.images
            .expect_list()
            .returning(|_| Err(StorageError::io("fighters/", "bucket offline")));
        fx.gangs
            .expect_adjust()
            .withf(|_, delta| delta.rating == -90)
            .returning(|_, _| Ok(van_saar().with_rating(910)));
        let (use_case, sink) = fx.build();

        let payload = use_case
            .execute(&ctx(), fighter.id, StatusAction::Delete, None)
            .await
            .unwrap();

        assert!(payload.fighter.is_none());
        assert_eq!(payload.gang.rating, 910);
        assert_eq!(sink.audit_actions(), vec!["fighter_deleted"]);
    }

    #[tokio::test]
    async fn beast_change_invalidates_owner() {
        let gang = van_saar();
        let owner = FighterId::new();
        let beast = Fighter::new(gang.id, "Cyber-mastiff", 50).with_beast_owner(owner);
        let mut fx = Fixture::new(&beast, &gang);
        fx.fighters.expect_save().returning(|_| Ok(()));
        let (use_case, sink) = fx.build();

        use_case
            .execute(&ctx(), beast.id, StatusAction::Recover, None)
            .await
            .unwrap();

        assert_eq!(sink.invalidated(), vec![beast.id, owner]);
    }
}
