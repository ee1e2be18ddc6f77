use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gangbook_domain::{AdvancementRef, Stat};

/// Body of `POST /api/fighters/{id}/advancements/characteristic`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseCharacteristicRequest {
    pub stat: Stat,
    pub xp_cost: i64,
    pub credits_increase: i64,
}

/// Body of `POST /api/fighters/{id}/advancements/skill`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseSkillRequest {
    pub skill_id: Uuid,
    pub name: String,
    pub xp_cost: i64,
    pub credits_increase: i64,
}

/// Body of `POST /api/fighters/{id}/advancements/undo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoAdvancementRequest {
    pub advancement: AdvancementRef,
}
