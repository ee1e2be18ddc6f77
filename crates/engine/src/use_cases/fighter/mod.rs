//! Fighter use cases: the remote mutation gateway.
//!
//! Each operation loads what it needs, applies the domain rule, writes the
//! changed rows, adjusts gang counters with a single delta, and hands audit
//! and cache work to the side-effect sink.

mod advancement;
mod edit_status;
mod equipment;
mod error;
mod queries;
mod update_details;
mod update_effects;
mod update_xp;

use std::future::Future;
use std::sync::Arc;

pub use advancement::{PurchaseAdvancement, UndoAdvancement};
pub use edit_status::EditFighterStatus;
pub use equipment::{BuyEquipment, SellEquipment, StashEquipment};
pub use error::FighterError;
pub use queries::FighterQueries;
pub use update_details::UpdateFighterDetails;
pub use update_effects::UpdateFighterEffects;
pub use update_xp::UpdateFighterXp;

use gangbook_domain::{Fighter, FighterId, Gang, GangDelta, GangId};

use crate::infrastructure::ports::{
    AuditAction, AuditEntry, ClockPort, FighterRepo, GangRepo, MutationContext, RepoError,
    SideEffect, SideEffectSink,
};

/// Container for fighter use cases.
pub struct FighterUseCases {
    pub edit_status: Arc<EditFighterStatus>,
    pub update_xp: Arc<UpdateFighterXp>,
    pub update_details: Arc<UpdateFighterDetails>,
    pub update_effects: Arc<UpdateFighterEffects>,
    pub buy_equipment: Arc<BuyEquipment>,
    pub sell_equipment: Arc<SellEquipment>,
    pub stash_equipment: Arc<StashEquipment>,
    pub purchase_advancement: Arc<PurchaseAdvancement>,
    pub undo_advancement: Arc<UndoAdvancement>,
    pub queries: Arc<FighterQueries>,
}

/// Builds audit entries and fires them, plus cache invalidations, at the sink.
#[derive(Clone)]
pub struct MutationNotifier {
    sink: Arc<dyn SideEffectSink>,
    clock: Arc<dyn ClockPort>,
}

impl MutationNotifier {
    pub fn new(sink: Arc<dyn SideEffectSink>, clock: Arc<dyn ClockPort>) -> Self {
        Self { sink, clock }
    }

    pub fn entry(&self, ctx: &MutationContext, fighter: &Fighter, action: AuditAction) -> AuditEntry {
        AuditEntry::new(fighter, action, self.clock.now()).by(ctx.user_id)
    }

    pub fn audit(&self, entry: AuditEntry) {
        self.sink.dispatch(SideEffect::Audit(entry));
    }

    /// Evict cached views of the fighter and, for an exotic beast, its owner.
    pub fn fighter_changed(&self, fighter: &Fighter) {
        self.sink.dispatch(SideEffect::InvalidateFighter {
            fighter_id: fighter.id,
        });
        if let Some(owner_id) = fighter.beast_owner_id {
            self.sink.dispatch(SideEffect::InvalidateFighter {
                fighter_id: owner_id,
            });
        }
    }
}

async fn load_fighter(
    fighters: &dyn FighterRepo,
    fighter_id: FighterId,
) -> Result<Fighter, FighterError> {
    fighters
        .get(fighter_id)
        .await?
        .ok_or(FighterError::FighterNotFound(fighter_id))
}

async fn load_gang(gangs: &dyn GangRepo, gang_id: GangId) -> Result<Gang, FighterError> {
    gangs
        .get(gang_id)
        .await?
        .ok_or(FighterError::GangNotFound(gang_id))
}

/// Apply a non-empty delta; otherwise hand back the gang as loaded.
async fn adjust_gang(gangs: &dyn GangRepo, gang: Gang, delta: GangDelta) -> Result<Gang, FighterError> {
    if delta.is_empty() {
        return Ok(gang);
    }
    Ok(gangs.adjust(gang.id, delta).await?)
}

/// Move the gang's counters, then run the row writes in `write`.
///
/// A failed adjustment leaves nothing written. A failed write is followed by
/// the inverse adjustment, which restores the counters exactly even when
/// other deltas landed in between.
async fn adjust_gang_then<W>(
    gangs: &dyn GangRepo,
    gang: Gang,
    delta: GangDelta,
    write: W,
) -> Result<Gang, FighterError>
where
    W: Future<Output = Result<(), RepoError>>,
{
    let gang_id = gang.id;
    let adjusted = adjust_gang(gangs, gang, delta).await?;

    if let Err(e) = write.await {
        if !delta.is_empty() {
            if let Err(undo) = gangs.adjust(gang_id, -delta).await {
                tracing::error!(
                    gang_id = %gang_id,
                    error = %undo,
                    write_error = %e,
                    "Failed to revert gang counters after a failed write"
                );
            }
        }
        return Err(e.into());
    }
    Ok(adjusted)
}
