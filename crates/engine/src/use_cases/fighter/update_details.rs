//! Sparse fighter details update.

use std::sync::Arc;

use gangbook_domain::{FighterDetailsPatch, FighterId, GangDelta};
use gangbook_shared::FighterDetailsPayload;

use crate::infrastructure::ports::{AuditAction, FighterRepo, GangRepo, MutationContext};

use super::{adjust_gang_then, load_fighter, load_gang, FighterError, MutationNotifier};

/// Writes only the fields present in the patch. A cost-adjustment change
/// moves the gang rating when the fighter counts toward it.
pub struct UpdateFighterDetails {
    fighters: Arc<dyn FighterRepo>,
    gangs: Arc<dyn GangRepo>,
    notifier: MutationNotifier,
}

impl UpdateFighterDetails {
    pub fn new(
        fighters: Arc<dyn FighterRepo>,
        gangs: Arc<dyn GangRepo>,
        notifier: MutationNotifier,
    ) -> Self {
        Self {
            fighters,
            gangs,
            notifier,
        }
    }

    pub async fn execute(
        &self,
        ctx: &MutationContext,
        fighter_id: FighterId,
        patch: &FighterDetailsPatch,
    ) -> Result<FighterDetailsPayload, FighterError> {
        let fighter = load_fighter(self.fighters.as_ref(), fighter_id).await?;
        let gang = load_gang(self.gangs.as_ref(), fighter.gang_id).await?;

        let mut updated = fighter.clone();
        let change = updated.apply_details(patch)?;
        if change.changed_fields.is_empty() {
            return Ok(FighterDetailsPayload {
                fighter: updated,
                gang,
            });
        }

        let gang = adjust_gang_then(
            self.gangs.as_ref(),
            gang,
            GangDelta::rating(change.rating_delta),
            self.fighters.save(&updated),
        )
        .await?;

        tracing::info!(
            correlation_id = %ctx.correlation_id.short(),
            fighter_id = %fighter_id,
            fields = ?change.changed_fields,
            rating_delta = change.rating_delta,
            "Fighter details updated"
        );

        if change.cost_adjustment_delta != 0 {
            self.notifier.audit(
                self.notifier
                    .entry(ctx, &fighter, AuditAction::CostAdjustmentChanged)
                    .with_change(fighter.cost_adjustment, updated.cost_adjustment),
            );
        }
        self.notifier.fighter_changed(&updated);

        Ok(FighterDetailsPayload {
            fighter: updated,
            gang,
        })
    }
}
