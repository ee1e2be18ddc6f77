//! HTTP routes.
//!
//! Every mutation answers HTTP 200 with a [`MutationResult`] envelope; only
//! a missing or malformed acting user is rejected before reaching a use
//! case.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, FromRequestParts, Path, State},
    http::{request::Parts, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

use gangbook_domain::{
    AdvancementCost, EquipmentId, FighterEquipmentId, FighterId, SkillId, UserId,
};
use gangbook_shared::{
    BuyEquipmentRequest, EditFighterStatusRequest, MutationResult, PurchaseCharacteristicRequest,
    PurchaseSkillRequest, SellEquipmentRequest, UndoAdvancementRequest,
    UpdateFighterDetailsRequest, UpdateFighterEffectsRequest, UpdateFighterXpRequest,
    UpdateFighterXpWithOoaRequest, USER_ID_HEADER,
};

use crate::app::App;
use crate::infrastructure::correlation::{CorrelationId, CORRELATION_ID_HEADER};
use crate::infrastructure::ports::{MutationContext, RepoError};
use crate::use_cases::FighterError;

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
        .route("/api/fighters/{id}", get(get_fighter))
        .route("/api/fighters/{id}/total-cost", get(get_total_cost))
        .route("/api/fighters/{id}/status", post(edit_status))
        .route("/api/fighters/{id}/xp", post(update_xp))
        .route("/api/fighters/{id}/xp-ooa", post(update_xp_with_ooa))
        .route("/api/fighters/{id}/details", post(update_details))
        .route("/api/fighters/{id}/effects", post(update_effects))
        .route("/api/fighters/{id}/equipment", post(buy_equipment))
        .route(
            "/api/fighters/{id}/advancements/characteristic",
            post(purchase_characteristic),
        )
        .route("/api/fighters/{id}/advancements/skill", post(purchase_skill))
        .route("/api/fighters/{id}/advancements/undo", post(undo_advancement))
        .route("/api/equipment/{id}/sell", post(sell_equipment))
        .route("/api/equipment/{id}/stash", post(stash_equipment))
}

async fn health() -> &'static str {
    "OK"
}

// =============================================================================
// Extraction and envelope
// =============================================================================

/// Acting user plus correlation id, from the request headers.
pub struct Actor(pub MutationContext);

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| ApiError::Unauthorized(format!("missing {USER_ID_HEADER} header")))?
            .to_str()
            .map_err(|_| ApiError::BadRequest(format!("{USER_ID_HEADER} is not valid text")))?;
        let user_id: UserId = raw
            .parse()
            .map_err(|_| ApiError::BadRequest(format!("{USER_ID_HEADER} is not a uuid")))?;

        Ok(Actor(
            MutationContext::new(user_id).with_correlation(correlation_of(parts)),
        ))
    }
}

fn correlation_of(parts: &Parts) -> CorrelationId {
    CorrelationId::from_header(
        parts
            .headers
            .get(CORRELATION_ID_HEADER)
            .and_then(|v| v.to_str().ok()),
    )
}

/// Correlation id for read endpoints, which do not need an acting user.
pub struct Correlation(pub CorrelationId);

impl<S> FromRequestParts<S> for Correlation
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Correlation(correlation_of(parts)))
    }
}

fn rejected(rejection: JsonRejection) -> FighterError {
    FighterError::validation(rejection.body_text())
}

/// Wrap a use-case outcome in the envelope and echo the correlation id.
fn respond<T: Serialize>(correlation_id: CorrelationId, result: Result<T, FighterError>) -> Response {
    let body = match result {
        Ok(data) => MutationResult::success(data),
        Err(e) => {
            match &e {
                FighterError::Repo(RepoError::Database { .. } | RepoError::Serialization(_)) => {
                    tracing::error!(correlation_id = %correlation_id.short(), error = %e, "Mutation failed")
                }
                _ => {
                    tracing::debug!(correlation_id = %correlation_id.short(), error = %e, "Mutation rejected")
                }
            }
            MutationResult::failure(e.kind(), e.to_string())
        }
    };

    let mut response = Json(body).into_response();
    if let Ok(value) = HeaderValue::from_str(&correlation_id.to_string()) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(CORRELATION_ID_HEADER), value);
    }
    response
}

// =============================================================================
// Reads
// =============================================================================

async fn get_fighter(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
    Correlation(correlation_id): Correlation,
) -> Response {
    let result = app
        .use_cases
        .fighter
        .queries
        .snapshot(FighterId::from_uuid(id))
        .await;
    respond(correlation_id, result)
}

async fn get_total_cost(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
    Correlation(correlation_id): Correlation,
) -> Response {
    let payload = app
        .use_cases
        .fighter
        .queries
        .total_cost(FighterId::from_uuid(id))
        .await;
    respond(correlation_id, Ok(payload))
}

// =============================================================================
// Fighter mutations
// =============================================================================

async fn edit_status(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
    Actor(ctx): Actor,
    body: Result<Json<EditFighterStatusRequest>, JsonRejection>,
) -> Response {
    let result = async {
        let Json(req) = body.map_err(rejected)?;
        app.use_cases
            .fighter
            .edit_status
            .execute(&ctx, FighterId::from_uuid(id), req.action, req.sell_value)
            .await
    }
    .await;
    respond(ctx.correlation_id, result)
}

async fn update_xp(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
    Actor(ctx): Actor,
    body: Result<Json<UpdateFighterXpRequest>, JsonRejection>,
) -> Response {
    let result = async {
        let Json(req) = body.map_err(rejected)?;
        app.use_cases
            .fighter
            .update_xp
            .execute(&ctx, FighterId::from_uuid(id), req.xp_to_add)
            .await
    }
    .await;
    respond(ctx.correlation_id, result)
}

async fn update_xp_with_ooa(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
    Actor(ctx): Actor,
    body: Result<Json<UpdateFighterXpWithOoaRequest>, JsonRejection>,
) -> Response {
    let result = async {
        let Json(req) = body.map_err(rejected)?;
        app.use_cases
            .fighter
            .update_xp
            .execute_with_ooa(&ctx, FighterId::from_uuid(id), req.xp_to_add, req.ooa_count)
            .await
    }
    .await;
    respond(ctx.correlation_id, result)
}

async fn update_details(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
    Actor(ctx): Actor,
    body: Result<Json<UpdateFighterDetailsRequest>, JsonRejection>,
) -> Response {
    let result = async {
        let Json(req) = body.map_err(rejected)?;
        app.use_cases
            .fighter
            .update_details
            .execute(&ctx, FighterId::from_uuid(id), &req.patch)
            .await
    }
    .await;
    respond(ctx.correlation_id, result)
}

async fn update_effects(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
    Actor(ctx): Actor,
    body: Result<Json<UpdateFighterEffectsRequest>, JsonRejection>,
) -> Response {
    let result = async {
        let Json(req) = body.map_err(rejected)?;
        app.use_cases
            .fighter
            .update_effects
            .execute(&ctx, FighterId::from_uuid(id), &req.stats)
            .await
    }
    .await;
    respond(ctx.correlation_id, result)
}

// =============================================================================
// Equipment
// =============================================================================

async fn buy_equipment(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
    Actor(ctx): Actor,
    body: Result<Json<BuyEquipmentRequest>, JsonRejection>,
) -> Response {
    let result = async {
        let Json(req) = body.map_err(rejected)?;
        app.use_cases
            .fighter
            .buy_equipment
            .execute(
                &ctx,
                FighterId::from_uuid(id),
                EquipmentId::from_uuid(req.equipment_id),
                req.master_crafted,
                req.cost_override,
            )
            .await
    }
    .await;
    respond(ctx.correlation_id, result)
}

async fn sell_equipment(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
    Actor(ctx): Actor,
    body: Result<Json<SellEquipmentRequest>, JsonRejection>,
) -> Response {
    let result = async {
        let Json(req) = body.map_err(rejected)?;
        app.use_cases
            .fighter
            .sell_equipment
            .execute(&ctx, FighterEquipmentId::from_uuid(id), req.sell_value)
            .await
    }
    .await;
    respond(ctx.correlation_id, result)
}

async fn stash_equipment(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
    Actor(ctx): Actor,
) -> Response {
    let result = app
        .use_cases
        .fighter
        .stash_equipment
        .execute(&ctx, FighterEquipmentId::from_uuid(id))
        .await;
    respond(ctx.correlation_id, result)
}

// =============================================================================
// Advancements
// =============================================================================

async fn purchase_characteristic(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
    Actor(ctx): Actor,
    body: Result<Json<PurchaseCharacteristicRequest>, JsonRejection>,
) -> Response {
    let result = async {
        let Json(req) = body.map_err(rejected)?;
        let cost = AdvancementCost::new(req.xp_cost, req.credits_increase)?;
        app.use_cases
            .fighter
            .purchase_advancement
            .characteristic(&ctx, FighterId::from_uuid(id), req.stat, cost)
            .await
    }
    .await;
    respond(ctx.correlation_id, result)
}

async fn purchase_skill(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
    Actor(ctx): Actor,
    body: Result<Json<PurchaseSkillRequest>, JsonRejection>,
) -> Response {
    let result = async {
        let Json(req) = body.map_err(rejected)?;
        let cost = AdvancementCost::new(req.xp_cost, req.credits_increase)?;
        app.use_cases
            .fighter
            .purchase_advancement
            .skill(
                &ctx,
                FighterId::from_uuid(id),
                SkillId::from_uuid(req.skill_id),
                &req.name,
                cost,
            )
            .await
    }
    .await;
    respond(ctx.correlation_id, result)
}

async fn undo_advancement(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
    Actor(ctx): Actor,
    body: Result<Json<UndoAdvancementRequest>, JsonRejection>,
) -> Response {
    let result = async {
        let Json(req) = body.map_err(rejected)?;
        app.use_cases
            .fighter
            .undo_advancement
            .execute(&ctx, FighterId::from_uuid(id), req.advancement)
            .await
    }
    .await;
    respond(ctx.correlation_id, result)
}

// =============================================================================
// Errors
// =============================================================================

/// Requests rejected before they reach a use case.
#[derive(Debug)]
pub enum ApiError {
    Unauthorized(String),
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg).into_response(),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
        }
    }
}
