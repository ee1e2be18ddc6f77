//! Read-side cache of fighter snapshots.
//!
//! `GET /api/fighters/{id}` is served from here when fresh. Mutations
//! evict entries through [`CacheInvalidationPort`], which the side-effect
//! worker calls for the mutated fighter and any beast owner.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use gangbook_domain::FighterId;
use gangbook_shared::FighterSnapshot;
use tokio::sync::RwLock;

use crate::infrastructure::ports::CacheInvalidationPort;

/// Snapshots keyed by fighter, expiring after a fixed TTL.
pub struct SnapshotCache {
    entries: RwLock<HashMap<FighterId, Entry>>,
    ttl: Duration,
}

struct Entry {
    snapshot: FighterSnapshot,
    inserted_at: Instant,
}

impl Entry {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.inserted_at.elapsed() < ttl
    }
}

impl SnapshotCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub async fn insert(&self, snapshot: FighterSnapshot) {
        let entry = Entry {
            snapshot,
            inserted_at: Instant::now(),
        };
        self.entries.write().await.insert(entry.snapshot.fighter.id, entry);
    }

    #[cfg(test)]
    async fn insert_at(&self, snapshot: FighterSnapshot, inserted_at: Instant) {
        let entry = Entry {
            snapshot,
            inserted_at,
        };
        self.entries.write().await.insert(entry.snapshot.fighter.id, entry);
    }

    /// The cached snapshot, if present and not expired.
    pub async fn get(&self, fighter_id: FighterId) -> Option<FighterSnapshot> {
        let guard = self.entries.read().await;
        guard
            .get(&fighter_id)
            .filter(|entry| entry.is_fresh(self.ttl))
            .map(|entry| entry.snapshot.clone())
    }

    pub async fn remove(&self, fighter_id: FighterId) -> bool {
        self.entries.write().await.remove(&fighter_id).is_some()
    }

    /// Drop expired entries, returning how many went.
    pub async fn cleanup_expired(&self) -> usize {
        let mut guard = self.entries.write().await;
        let before = guard.len();
        guard.retain(|_, entry| entry.is_fresh(self.ttl));
        before - guard.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl CacheInvalidationPort for SnapshotCache {
    async fn invalidate_fighter(&self, fighter_id: FighterId) {
        if self.remove(fighter_id).await {
            tracing::debug!(fighter_id = %fighter_id, "Evicted fighter snapshot");
        }
    }
}
