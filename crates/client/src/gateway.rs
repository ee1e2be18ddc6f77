//! Typed fighter operations over a [`GatewayPort`].

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use gangbook_domain::{
    AdvancementCost, AdvancementRef, EquipmentId, FighterDetailsPatch, FighterEquipmentId,
    FighterId, SkillId, Stat, StatusAction,
};
use gangbook_shared::{
    AdvancementPayload, BuyEquipmentRequest, EditFighterStatusRequest, EquipmentPurchasePayload,
    EquipmentRemovalPayload, FighterDetailsPayload, FighterEffectsPayload, FighterSnapshot,
    FighterStatusPayload, FighterTotalCostPayload, FighterXpPayload, MutationResult,
    PurchaseCharacteristicRequest, PurchaseSkillRequest, SellEquipmentRequest,
    UndoAdvancementRequest, UpdateFighterDetailsRequest, UpdateFighterEffectsRequest,
    UpdateFighterXpRequest, UpdateFighterXpWithOoaRequest,
};

use crate::error::ClientError;
use crate::transport::{ApiRequest, GatewayPort};

/// Remote mutation gateway for fighters.
///
/// Every call decodes the `MutationResult` envelope; `{success: false}`
/// comes back as [`ClientError::Rejected`] with the server's error kind.
#[derive(Clone)]
pub struct FighterGateway {
    port: Arc<dyn GatewayPort>,
}

impl FighterGateway {
    pub fn new(port: Arc<dyn GatewayPort>) -> Self {
        Self { port }
    }

    async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ClientError> {
        let envelope = self.port.execute(&request).await?;
        let result: MutationResult<T> = serde_json::from_value(envelope)
            .map_err(|e| ClientError::Decode(e.to_string()))?;
        result.into_result().map_err(|failure| {
            tracing::debug!(
                path = %request.path,
                correlation_id = %request.correlation_id,
                kind = ?failure.kind,
                error = %failure.message,
                "Mutation rejected"
            );
            ClientError::Rejected(failure)
        })
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: String,
        body: &B,
    ) -> Result<T, ClientError> {
        let body = serde_json::to_value(body).map_err(|e| ClientError::Decode(e.to_string()))?;
        self.send(ApiRequest::post(path, body)).await
    }

    pub async fn snapshot(&self, fighter_id: FighterId) -> Result<FighterSnapshot, ClientError> {
        self.send(ApiRequest::get(format!("/api/fighters/{fighter_id}")))
            .await
    }

    /// Fails closed: any error reads as a cost of 0.
    pub async fn total_cost(&self, fighter_id: FighterId) -> i64 {
        let request = ApiRequest::get(format!("/api/fighters/{fighter_id}/total-cost"));
        match self.send::<FighterTotalCostPayload>(request).await {
            Ok(payload) => payload.total_cost,
            Err(e) => {
                tracing::warn!(error = %e, fighter_id = %fighter_id, "Total cost lookup failed, using 0");
                0
            }
        }
    }

    pub async fn edit_status(
        &self,
        fighter_id: FighterId,
        action: StatusAction,
        sell_value: Option<i64>,
    ) -> Result<FighterStatusPayload, ClientError> {
        self.post(
            format!("/api/fighters/{fighter_id}/status"),
            &EditFighterStatusRequest { action, sell_value },
        )
        .await
    }

    pub async fn update_xp(
        &self,
        fighter_id: FighterId,
        xp_to_add: i64,
    ) -> Result<FighterXpPayload, ClientError> {
        self.post(
            format!("/api/fighters/{fighter_id}/xp"),
            &UpdateFighterXpRequest { xp_to_add },
        )
        .await
    }

    pub async fn update_xp_with_ooa(
        &self,
        fighter_id: FighterId,
        xp_to_add: i64,
        ooa_count: Option<i64>,
    ) -> Result<FighterXpPayload, ClientError> {
        self.post(
            format!("/api/fighters/{fighter_id}/xp-ooa"),
            &UpdateFighterXpWithOoaRequest {
                xp_to_add,
                ooa_count,
            },
        )
        .await
    }

    pub async fn update_details(
        &self,
        fighter_id: FighterId,
        patch: FighterDetailsPatch,
    ) -> Result<FighterDetailsPayload, ClientError> {
        self.post(
            format!("/api/fighters/{fighter_id}/details"),
            &UpdateFighterDetailsRequest { patch },
        )
        .await
    }

    pub async fn update_effects(
        &self,
        fighter_id: FighterId,
        stats: BTreeMap<Stat, i32>,
    ) -> Result<FighterEffectsPayload, ClientError> {
        self.post(
            format!("/api/fighters/{fighter_id}/effects"),
            &UpdateFighterEffectsRequest { stats },
        )
        .await
    }

    pub async fn buy_equipment(
        &self,
        fighter_id: FighterId,
        equipment_id: EquipmentId,
        master_crafted: bool,
        cost_override: Option<i64>,
    ) -> Result<EquipmentPurchasePayload, ClientError> {
        self.post(
            format!("/api/fighters/{fighter_id}/equipment"),
            &BuyEquipmentRequest {
                equipment_id: equipment_id.to_uuid(),
                master_crafted,
                cost_override,
            },
        )
        .await
    }

    pub async fn sell_equipment(
        &self,
        id: FighterEquipmentId,
        sell_value: i64,
    ) -> Result<EquipmentRemovalPayload, ClientError> {
        self.post(
            format!("/api/equipment/{id}/sell"),
            &SellEquipmentRequest { sell_value },
        )
        .await
    }

    pub async fn stash_equipment(
        &self,
        id: FighterEquipmentId,
    ) -> Result<EquipmentRemovalPayload, ClientError> {
        self.send(ApiRequest::post(
            format!("/api/equipment/{id}/stash"),
            serde_json::json!({}),
        ))
        .await
    }

    pub async fn purchase_characteristic(
        &self,
        fighter_id: FighterId,
        stat: Stat,
        cost: AdvancementCost,
    ) -> Result<AdvancementPayload, ClientError> {
        self.post(
            format!("/api/fighters/{fighter_id}/advancements/characteristic"),
            &PurchaseCharacteristicRequest {
                stat,
                xp_cost: cost.xp_cost,
                credits_increase: cost.credits_increase,
            },
        )
        .await
    }

    pub async fn purchase_skill(
        &self,
        fighter_id: FighterId,
        skill_id: SkillId,
        name: &str,
        cost: AdvancementCost,
    ) -> Result<AdvancementPayload, ClientError> {
        self.post(
            format!("/api/fighters/{fighter_id}/advancements/skill"),
            &PurchaseSkillRequest {
                skill_id: skill_id.to_uuid(),
                name: name.to_string(),
                xp_cost: cost.xp_cost,
                credits_increase: cost.credits_increase,
            },
        )
        .await
    }

    pub async fn undo_advancement(
        &self,
        fighter_id: FighterId,
        advancement: AdvancementRef,
    ) -> Result<AdvancementPayload, ClientError> {
        self.post(
            format!("/api/fighters/{fighter_id}/advancements/undo"),
            &UndoAdvancementRequest { advancement },
        )
        .await
    }
}
