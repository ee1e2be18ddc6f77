use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use gangbook_domain::{FighterDetailsPatch, Stat, StatusAction};

/// Body of `POST /api/fighters/{id}/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditFighterStatusRequest {
    pub action: StatusAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sell_value: Option<i64>,
}

/// Body of `POST /api/fighters/{id}/xp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateFighterXpRequest {
    pub xp_to_add: i64,
}

/// Body of `POST /api/fighters/{id}/xp-ooa`.
///
/// `ooa_count` is the number of enemies taken Out Of Action; it is added to
/// the fighter's kills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateFighterXpWithOoaRequest {
    pub xp_to_add: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ooa_count: Option<i64>,
}

/// Body of `POST /api/fighters/{id}/details`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateFighterDetailsRequest {
    #[serde(flatten)]
    pub patch: FighterDetailsPatch,
}

/// Body of `POST /api/fighters/{id}/effects`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateFighterEffectsRequest {
    pub stats: BTreeMap<Stat, i32>,
}
