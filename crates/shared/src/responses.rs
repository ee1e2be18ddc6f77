//! Response envelope and payloads for the mutation endpoints.
//!
//! Every mutation answers with a [`MutationResult`]:
//! `{"success": true, "data": ...}` or `{"success": false, "error": "..."}`.
//! Domain failures travel inside the envelope with HTTP 200, so a client
//! can tell "the server said no" apart from "the request never arrived".

use serde::{Deserialize, Serialize};

use gangbook_domain::{
    Fighter, FighterEffect, FighterEquipment, FighterEquipmentId, FighterId, FighterSkill, Gang,
};

// =============================================================================
// Envelope
// =============================================================================

/// Failure classification, so callers can decide what to show (or retry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Fighter, gang or equipment missing
    NotFound,
    /// Malformed or out-of-range input
    Validation,
    /// A domain rule blocked the action (not enough meat, credits, xp)
    PreconditionFailed,
    /// Any other failure from the persistence layer
    Store,
}

/// Discriminated result of one mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationResult<T> {
    pub success: bool,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl<T> MutationResult<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            error_kind: None,
        }
    }

    pub fn failure(kind: ErrorKind, error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            error_kind: Some(kind),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Unwrap the envelope into a plain `Result`.
    pub fn into_result(self) -> Result<T, MutationFailure> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            (true, None) => Err(MutationFailure {
                kind: ErrorKind::Store,
                message: "success response without data".to_string(),
            }),
            (false, _) => Err(MutationFailure {
                kind: self.error_kind.unwrap_or(ErrorKind::Store),
                message: self.error.unwrap_or_else(|| "unknown error".to_string()),
            }),
        }
    }
}

/// The `{success: false}` side of a [`MutationResult`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct MutationFailure {
    pub kind: ErrorKind,
    pub message: String,
}

// =============================================================================
// Payloads
// =============================================================================

/// Result of a status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FighterStatusPayload {
    /// The fighter after the change; `None` once deleted
    pub fighter: Option<Fighter>,
    pub gang: Gang,
    /// Rating delta the server applied
    pub rating_delta: i64,
}

/// Result of an XP change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FighterXpPayload {
    pub fighter_id: FighterId,
    pub xp: i64,
    pub kills: u32,
}

/// Result of a details update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FighterDetailsPayload {
    pub fighter: Fighter,
    pub gang: Gang,
}

/// The fighter's effects after a stat edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FighterEffectsPayload {
    pub fighter_id: FighterId,
    pub effects: Vec<FighterEffect>,
}

/// Result of buying equipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentPurchasePayload {
    pub equipment: FighterEquipment,
    pub gang: Gang,
}

/// Result of selling or stashing equipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentRemovalPayload {
    /// Rows taken off the fighter (the item plus anything mounted on it)
    pub removed: Vec<FighterEquipmentId>,
    pub gang: Gang,
}

/// Record created by an advancement purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "record", rename_all = "snake_case")]
pub enum AdvancementRecord {
    Characteristic(FighterEffect),
    Skill(FighterSkill),
}

/// Result of purchasing or undoing an advancement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvancementPayload {
    pub fighter_id: FighterId,
    pub xp: i64,
    /// The created record; `None` for an undo
    pub record: Option<AdvancementRecord>,
    pub gang: Gang,
}

/// Everything the client caches for one fighter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FighterSnapshot {
    pub fighter: Fighter,
    pub gang: Gang,
    pub equipment: Vec<FighterEquipment>,
    pub effects: Vec<FighterEffect>,
    pub skills: Vec<FighterSkill>,
    pub total_cost: i64,
}

/// Answer of `GET /api/fighters/{id}/total-cost`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FighterTotalCostPayload {
    pub fighter_id: FighterId,
    pub total_cost: i64,
}
