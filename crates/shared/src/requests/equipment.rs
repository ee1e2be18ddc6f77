use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of `POST /api/fighters/{id}/equipment`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyEquipmentRequest {
    pub equipment_id: Uuid,
    #[serde(default)]
    pub master_crafted: bool,
    /// Replaces the catalogue base cost before any master-crafted markup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_override: Option<i64>,
}

/// Body of `POST /api/equipment/{id}/sell`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellEquipmentRequest {
    pub sell_value: i64,
}
