//! External service port traits (audit log, image storage, caches, cost).

use async_trait::async_trait;
use gangbook_domain::{CostBreakdown, FighterId};

use super::error::{RepoError, StorageError};
use super::types::{AuditEntry, SideEffect};

// =============================================================================
// Audit log
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditLogPort: Send + Sync {
    async fn record(&self, entry: &AuditEntry) -> Result<(), RepoError>;
}

// =============================================================================
// Image storage
// =============================================================================

/// Object store holding fighter portraits under `fighters/{gang_id}/{fighter_id}`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStoragePort: Send + Sync {
    /// Keys of every object whose key starts with `prefix`.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError>;
    async fn delete(&self, keys: &[String]) -> Result<(), StorageError>;
}

// =============================================================================
// Read-side cache
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheInvalidationPort: Send + Sync {
    async fn invalidate_fighter(&self, fighter_id: FighterId);
}

// =============================================================================
// Rating
// =============================================================================

/// Effective total cost of a fighter.
///
/// Implementations fail closed: a store error yields `0` (and is logged)
/// rather than an error, so rating arithmetic never aborts a mutation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FighterCostPort: Send + Sync {
    async fn total_cost(&self, fighter_id: FighterId) -> i64;
    async fn breakdown(&self, fighter_id: FighterId) -> Result<CostBreakdown, RepoError>;
}

// =============================================================================
// Side-effect dispatch
// =============================================================================

/// Fire-and-forget hand-off. Never blocks and never fails the caller.
#[cfg_attr(test, mockall::automock)]
pub trait SideEffectSink: Send + Sync {
    fn dispatch(&self, effect: SideEffect);
}
