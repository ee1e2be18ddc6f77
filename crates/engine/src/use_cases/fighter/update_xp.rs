//! XP and out-of-action tally use cases.

use std::sync::Arc;

use gangbook_domain::FighterId;
use gangbook_shared::FighterXpPayload;

use crate::infrastructure::ports::{AuditAction, FighterRepo, MutationContext};

use super::{load_fighter, FighterError, MutationNotifier};

/// Adds XP (any sign; the total is not clamped) and optionally kills.
pub struct UpdateFighterXp {
    fighters: Arc<dyn FighterRepo>,
    notifier: MutationNotifier,
}

impl UpdateFighterXp {
    pub fn new(fighters: Arc<dyn FighterRepo>, notifier: MutationNotifier) -> Self {
        Self { fighters, notifier }
    }

    pub async fn execute(
        &self,
        ctx: &MutationContext,
        fighter_id: FighterId,
        xp_to_add: i64,
    ) -> Result<FighterXpPayload, FighterError> {
        self.execute_with_ooa(ctx, fighter_id, xp_to_add, None).await
    }

    /// XP plus the number of enemies this fighter put out of action.
    pub async fn execute_with_ooa(
        &self,
        ctx: &MutationContext,
        fighter_id: FighterId,
        xp_to_add: i64,
        ooa_count: Option<i64>,
    ) -> Result<FighterXpPayload, FighterError> {
        let ooa = match ooa_count {
            Some(n) if n < 0 => {
                return Err(FighterError::validation(format!(
                    "ooa_count cannot be negative (got {n})"
                )))
            }
            Some(n) => u32::try_from(n)
                .map_err(|_| FighterError::validation(format!("ooa_count too large: {n}")))?,
            None => 0,
        };

        let fighter = load_fighter(self.fighters.as_ref(), fighter_id).await?;
        let mut updated = fighter.clone();
        updated.xp = fighter
            .xp
            .checked_add(xp_to_add)
            .ok_or_else(|| FighterError::validation("xp overflow"))?;
        updated.kills = fighter
            .kills
            .checked_add(ooa)
            .ok_or_else(|| FighterError::validation("kills overflow"))?;
        self.fighters.save(&updated).await?;

        tracing::info!(
            correlation_id = %ctx.correlation_id.short(),
            fighter_id = %fighter_id,
            xp = updated.xp,
            kills = updated.kills,
            "Fighter XP updated"
        );

        self.notifier.audit(
            self.notifier
                .entry(ctx, &fighter, AuditAction::XpChanged)
                .with_change(fighter.xp, updated.xp),
        );
        if ooa > 0 {
            self.notifier.audit(
                self.notifier
                    .entry(ctx, &fighter, AuditAction::KillsChanged)
                    .with_change(fighter.kills, updated.kills),
            );
        }
        self.notifier.fighter_changed(&fighter);

        Ok(FighterXpPayload {
            fighter_id,
            xp: updated.xp,
            kills: updated.kills,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::MockFighterRepo;
    use crate::use_cases::fighter::test_support::{ctx, notifier};
    use gangbook_domain::{Fighter, GangId};

    fn repo_with(fighter: Fighter) -> MockFighterRepo {
        let mut fighters = MockFighterRepo::new();
        fighters
            .expect_get()
            .returning(move |_| Ok(Some(fighter.clone())));
        fighters
    }

    #[tokio::test]
    async fn xp_goes_negative_without_clamping() {
        let fighter = Fighter::new(GangId::new(), "Novice", 40).with_xp(2);
        let mut fighters = repo_with(fighter.clone());
        fighters
            .expect_save()
            .withf(|f| f.xp == -3)
            .times(1)
            .returning(|_| Ok(()));
        let (notifier, sink) = notifier();
        let use_case = UpdateFighterXp::new(Arc::new(fighters), notifier);

        let payload = use_case.execute(&ctx(), fighter.id, -5).await.unwrap();

        assert_eq!(payload.xp, -3);
        assert_eq!(sink.audit_actions(), vec!["xp_changed"]);
    }

    #[tokio::test]
    async fn ooa_adds_kills_and_second_audit_entry() {
        let fighter = Fighter::new(GangId::new(), "Champion", 110).with_xp(5);
        let mut fighters = repo_with(fighter.clone());
        fighters
            .expect_save()
            .withf(|f| f.xp == 8 && f.kills == 2)
            .returning(|_| Ok(()));
        let (notifier, sink) = notifier();
        let use_case = UpdateFighterXp::new(Arc::new(fighters), notifier);

        let payload = use_case
            .execute_with_ooa(&ctx(), fighter.id, 3, Some(2))
            .await
            .unwrap();

        assert_eq!((payload.xp, payload.kills), (8, 2));
        assert_eq!(sink.audit_actions(), vec!["xp_changed", "kills_changed"]);
    }

    #[tokio::test]
    async fn negative_ooa_rejected_before_io() {
        let (notifier, _) = notifier();
        let use_case = UpdateFighterXp::new(Arc::new(MockFighterRepo::new()), notifier);

        let result = use_case
            .execute_with_ooa(&ctx(), FighterId::new(), 1, Some(-1))
            .await;

        assert!(matches!(result, Err(FighterError::Validation(_))));
    }
}
