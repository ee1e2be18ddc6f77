//! Helper types for port operations.

use chrono::{DateTime, Utc};
use gangbook_domain::*;

use crate::infrastructure::correlation::CorrelationId;

// =============================================================================
// Request context
// =============================================================================

/// Who is mutating, and the id that ties their request's log lines together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationContext {
    pub user_id: UserId,
    pub correlation_id: CorrelationId,
}

impl MutationContext {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            correlation_id: CorrelationId::new(),
        }
    }

    pub fn with_correlation(mut self, correlation_id: CorrelationId) -> Self {
        self.correlation_id = correlation_id;
        self
    }
}

// =============================================================================
// Audit log
// =============================================================================

/// What an audit entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    StatusChanged(StatusAction),
    FighterDeleted,
    XpChanged,
    KillsChanged,
    CostAdjustmentChanged,
    EquipmentPurchased,
    EquipmentSold,
    EquipmentStashed,
    AdvancementPurchased,
    AdvancementUndone,
}

impl AuditAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StatusChanged(action) => match action {
                StatusAction::Kill => "fighter_killed",
                StatusAction::Retire => "fighter_retired",
                StatusAction::Sell => "fighter_sold",
                StatusAction::Rescue => "fighter_rescued",
                StatusAction::Starve => "fighter_starved",
                StatusAction::Recover => "fighter_recovery_toggled",
                StatusAction::Capture => "fighter_capture_toggled",
                StatusAction::Delete => "fighter_deleted",
            },
            Self::FighterDeleted => "fighter_deleted",
            Self::XpChanged => "xp_changed",
            Self::KillsChanged => "kills_changed",
            Self::CostAdjustmentChanged => "cost_adjustment_changed",
            Self::EquipmentPurchased => "equipment_purchased",
            Self::EquipmentSold => "equipment_sold",
            Self::EquipmentStashed => "equipment_stashed",
            Self::AdvancementPurchased => "advancement_purchased",
            Self::AdvancementUndone => "advancement_undone",
        }
    }
}

/// One row for the gang's activity log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub gang_id: GangId,
    pub fighter_id: FighterId,
    pub fighter_name: String,
    pub action: AuditAction,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub user_id: Option<UserId>,
    pub recorded_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(fighter: &Fighter, action: AuditAction, recorded_at: DateTime<Utc>) -> Self {
        Self {
            gang_id: fighter.gang_id,
            fighter_id: fighter.id,
            fighter_name: fighter.name.clone(),
            action,
            old_value: None,
            new_value: None,
            user_id: None,
            recorded_at,
        }
    }

    pub fn with_change(mut self, old: impl ToString, new: impl ToString) -> Self {
        self.old_value = Some(old.to_string());
        self.new_value = Some(new.to_string());
        self
    }

    pub fn with_new_value(mut self, new: impl ToString) -> Self {
        self.new_value = Some(new.to_string());
        self
    }

    pub fn by(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }
}

// =============================================================================
// Side effects
// =============================================================================

/// Work a mutation hands off without waiting for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideEffect {
    Audit(AuditEntry),
    InvalidateFighter { fighter_id: FighterId },
}
