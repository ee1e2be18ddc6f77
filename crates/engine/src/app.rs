//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::{
    cache::SnapshotCache,
    cost::RepoFighterCost,
    memory::InMemoryStore,
    ports::{
        ClockPort, EffectRepo, EquipmentRepo, FighterCostPort, FighterRepo, GangRepo,
        ImageStoragePort, SideEffectSink, SkillRepo,
    },
    sqlite::SqliteStore,
};
use crate::use_cases::fighter::{
    BuyEquipment, EditFighterStatus, FighterQueries, FighterUseCases, MutationNotifier,
    PurchaseAdvancement, SellEquipment, StashEquipment, UndoAdvancement, UpdateFighterDetails,
    UpdateFighterEffects, UpdateFighterXp,
};

/// Main application state.
///
/// Passed to HTTP handlers via Axum state.
pub struct App {
    pub repositories: Repositories,
    pub use_cases: UseCases,
    pub snapshots: Arc<SnapshotCache>,
}

/// Port traits injected directly, one per aggregate.
#[derive(Clone)]
pub struct Repositories {
    pub fighters: Arc<dyn FighterRepo>,
    pub gangs: Arc<dyn GangRepo>,
    pub effects: Arc<dyn EffectRepo>,
    pub equipment: Arc<dyn EquipmentRepo>,
    pub skills: Arc<dyn SkillRepo>,
}

impl Repositories {
    pub fn sqlite(store: &SqliteStore) -> Self {
        Self {
            fighters: Arc::new(store.fighters()),
            gangs: Arc::new(store.gangs()),
            effects: Arc::new(store.effects()),
            equipment: Arc::new(store.equipment()),
            skills: Arc::new(store.skills()),
        }
    }

    pub fn memory(store: Arc<InMemoryStore>) -> Self {
        Self {
            fighters: store.clone(),
            gangs: store.clone(),
            effects: store.clone(),
            equipment: store.clone(),
            skills: store,
        }
    }
}

/// Container for all use cases.
pub struct UseCases {
    pub fighter: FighterUseCases,
}

/// Adapters the use cases reach beyond the repositories.
pub struct Collaborators {
    pub images: Arc<dyn ImageStoragePort>,
    pub clock: Arc<dyn ClockPort>,
    pub side_effects: Arc<dyn SideEffectSink>,
}

impl App {
    pub fn new(
        repositories: Repositories,
        collaborators: Collaborators,
        snapshots: Arc<SnapshotCache>,
    ) -> Self {
        let repos = &repositories;
        let notifier = MutationNotifier::new(collaborators.side_effects, collaborators.clock);
        let cost: Arc<dyn FighterCostPort> = Arc::new(RepoFighterCost::new(
            repos.fighters.clone(),
            repos.equipment.clone(),
            repos.effects.clone(),
            repos.skills.clone(),
        ));

        let fighter = FighterUseCases {
            edit_status: Arc::new(EditFighterStatus::new(
                repos.fighters.clone(),
                repos.gangs.clone(),
                cost.clone(),
                collaborators.images,
                notifier.clone(),
            )),
            update_xp: Arc::new(UpdateFighterXp::new(
                repos.fighters.clone(),
                notifier.clone(),
            )),
            update_details: Arc::new(UpdateFighterDetails::new(
                repos.fighters.clone(),
                repos.gangs.clone(),
                notifier.clone(),
            )),
            update_effects: Arc::new(UpdateFighterEffects::new(
                repos.fighters.clone(),
                repos.effects.clone(),
                notifier.clone(),
            )),
            buy_equipment: Arc::new(BuyEquipment::new(
                repos.fighters.clone(),
                repos.gangs.clone(),
                repos.equipment.clone(),
                notifier.clone(),
            )),
            sell_equipment: Arc::new(SellEquipment::new(
                repos.fighters.clone(),
                repos.gangs.clone(),
                repos.equipment.clone(),
                repos.effects.clone(),
                notifier.clone(),
            )),
            stash_equipment: Arc::new(StashEquipment::new(
                repos.fighters.clone(),
                repos.gangs.clone(),
                repos.equipment.clone(),
                repos.effects.clone(),
                notifier.clone(),
            )),
            purchase_advancement: Arc::new(PurchaseAdvancement::new(
                repos.fighters.clone(),
                repos.gangs.clone(),
                repos.effects.clone(),
                repos.skills.clone(),
                notifier.clone(),
            )),
            undo_advancement: Arc::new(UndoAdvancement::new(
                repos.fighters.clone(),
                repos.gangs.clone(),
                repos.effects.clone(),
                repos.skills.clone(),
                notifier,
            )),
            queries: Arc::new(FighterQueries::new(
                repos.fighters.clone(),
                repos.gangs.clone(),
                repos.equipment.clone(),
                repos.effects.clone(),
                repos.skills.clone(),
                cost,
                snapshots.clone(),
            )),
        };

        Self {
            repositories,
            use_cases: UseCases { fighter },
            snapshots,
        }
    }
}
