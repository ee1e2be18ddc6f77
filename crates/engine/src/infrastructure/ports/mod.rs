//! Port traits for infrastructure boundaries.
//!
//! These are the only abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - Database access (SQLite or the in-memory store)
//! - The audit log and image storage
//! - Read-side cache invalidation and fire-and-forget side effects
//! - Clock (for testing)

mod error;
mod external;
mod repos;
mod testing;
pub mod types;

// =============================================================================
// Repository Ports
// =============================================================================
pub use repos::*;

// =============================================================================
// Types
// =============================================================================
pub use types::{AuditAction, AuditEntry, MutationContext, SideEffect};

// =============================================================================
// External Service Ports
// =============================================================================
pub use external::{
    AuditLogPort, CacheInvalidationPort, FighterCostPort, ImageStoragePort, SideEffectSink,
};

// =============================================================================
// Test-Only Mocks (only available during test builds)
// =============================================================================
#[cfg(test)]
pub use external::{
    MockAuditLogPort, MockCacheInvalidationPort, MockFighterCostPort, MockImageStoragePort,
    MockSideEffectSink,
};

#[cfg(test)]
pub use testing::MockClockPort;

// =============================================================================
// Testing Ports
// =============================================================================
pub use testing::ClockPort;

// =============================================================================
// Error Types
// =============================================================================
pub use error::{RepoError, StorageError};
