//! E2E test helpers for constructing the full application stack.
//!
//! Provides a fully wired App over the in-memory store, plus seeding helpers
//! for gangs, fighters, effects and equipment.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use gangbook_domain::{
    EquipmentCatalogItem, Fighter, FighterEffect, FighterEquipment, FighterId, Gang, GangId,
    UserId,
};

use crate::app::{App, Collaborators, Repositories};
use crate::infrastructure::cache::SnapshotCache;
use crate::infrastructure::clock::FixedClock;
use crate::infrastructure::memory::{InMemoryImageStorage, InMemoryStore};
use crate::infrastructure::ports::{FighterRepo, GangRepo, MutationContext};
use crate::infrastructure::side_effects::RecordingSideEffects;

/// Everything a scenario needs: the app and handles on its adapters.
pub struct E2ETestContext {
    pub app: Arc<App>,
    pub store: Arc<InMemoryStore>,
    pub images: Arc<InMemoryImageStorage>,
    pub side_effects: Arc<RecordingSideEffects>,
    pub user_id: UserId,
}

impl E2ETestContext {
    pub async fn setup() -> Self {
        let store = Arc::new(InMemoryStore::with_default_catalogue().await);
        let images = Arc::new(InMemoryImageStorage::new());
        let side_effects = Arc::new(RecordingSideEffects::default());
        let clock = FixedClock(Utc.with_ymd_and_hms(2024, 6, 1, 18, 0, 0).unwrap());

        let app = Arc::new(App::new(
            Repositories::memory(store.clone()),
            Collaborators {
                images: images.clone(),
                clock: Arc::new(clock),
                side_effects: side_effects.clone(),
            },
            Arc::new(SnapshotCache::new(Duration::from_secs(60))),
        ));

        Self {
            app,
            store,
            images,
            side_effects,
            user_id: UserId::new(),
        }
    }

    pub fn ctx(&self) -> MutationContext {
        MutationContext::new(self.user_id)
    }

    pub async fn seed_gang(&self, gang: Gang) -> GangId {
        let id = gang.id;
        self.store.insert_gang(gang).await;
        id
    }

    pub async fn seed_fighter(&self, fighter: Fighter) -> FighterId {
        let id = fighter.id;
        self.store.insert_fighter(fighter).await;
        id
    }

    pub async fn seed_effect(&self, effect: FighterEffect) {
        self.store.insert_effect(effect).await;
    }

    pub async fn seed_equipment(&self, equipment: FighterEquipment) {
        self.store.insert_equipment(equipment).await;
    }

    pub async fn seed_catalog_item(&self, item: EquipmentCatalogItem) {
        self.store.insert_catalog_item(item).await;
    }

    pub async fn fighter(&self, id: FighterId) -> Option<Fighter> {
        FighterRepo::get(self.store.as_ref(), id)
            .await
            .expect("fighter lookup")
    }

    pub async fn gang(&self, id: GangId) -> Gang {
        GangRepo::get(self.store.as_ref(), id)
            .await
            .expect("gang lookup")
            .expect("gang seeded")
    }
}
