//! HTTP scenarios: envelope shape, headers and body rejection.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use gangbook_domain::{Fighter, Gang};
use gangbook_shared::USER_ID_HEADER;

use crate::api::http::routes;
use crate::infrastructure::correlation::CORRELATION_ID_HEADER;

use super::E2ETestContext;

async fn send(ctx: &E2ETestContext, request: Request<Body>) -> (StatusCode, Option<String>, Value) {
    let router = routes().with_state(ctx.app.clone());
    let response = router.oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let correlation = response
        .headers()
        .get(CORRELATION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, correlation, body)
}

fn post(ctx: &E2ETestContext, uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header(USER_ID_HEADER, ctx.user_id.to_string())
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

#[tokio::test]
async fn xp_update_answers_with_success_envelope() {
    let ctx = E2ETestContext::setup().await;
    let gang_id = ctx.seed_gang(Gang::new("Escher")).await;
    let fighter_id = ctx.seed_fighter(Fighter::new(gang_id, "Blade", 75).with_xp(5)).await;

    let (status, _, body) = send(
        &ctx,
        post(
            &ctx,
            &format!("/api/fighters/{fighter_id}/xp-ooa"),
            r#"{"xp_to_add": 3, "ooa_count": 2}"#,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["xp"], json!(8));
    assert_eq!(body["data"]["kills"], json!(2));
}

#[tokio::test]
async fn domain_failure_is_http_200_with_error_kind() {
    let ctx = E2ETestContext::setup().await;
    let gang_id = ctx.seed_gang(Gang::new("Goliath")).await;
    let fighter_id = ctx.seed_fighter(Fighter::new(gang_id, "Captive", 70)).await;

    let (status, _, body) = send(
        &ctx,
        post(
            &ctx,
            &format!("/api/fighters/{fighter_id}/status"),
            r#"{"action": "sell", "sell_value": -1}"#,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error_kind"], json!("validation"));
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn unknown_action_is_validation_failure() {
    let ctx = E2ETestContext::setup().await;
    let gang_id = ctx.seed_gang(Gang::new("Goliath")).await;
    let fighter_id = ctx.seed_fighter(Fighter::new(gang_id, "Brute", 70)).await;

    let (status, _, body) = send(
        &ctx,
        post(
            &ctx,
            &format!("/api/fighters/{fighter_id}/status"),
            r#"{"action": "promote"}"#,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error_kind"], json!("validation"));
}

#[tokio::test]
async fn missing_fighter_is_not_found_kind() {
    let ctx = E2ETestContext::setup().await;

    let (_, _, body) = send(
        &ctx,
        post(
            &ctx,
            &format!("/api/fighters/{}/xp", uuid::Uuid::new_v4()),
            r#"{"xp_to_add": 1}"#,
        ),
    )
    .await;

    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error_kind"], json!("not_found"));
}

#[tokio::test]
async fn mutation_without_user_is_unauthorized() {
    let ctx = E2ETestContext::setup().await;
    let request = Request::post(format!("/api/fighters/{}/xp", uuid::Uuid::new_v4()))
        .header("content-type", "application/json")
        .body(Body::from(r#"{"xp_to_add": 1}"#))
        .expect("request");

    let (status, _, _) = send(&ctx, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn correlation_id_is_echoed() {
    let ctx = E2ETestContext::setup().await;
    let gang_id = ctx.seed_gang(Gang::new("Escher")).await;
    let fighter_id = ctx.seed_fighter(Fighter::new(gang_id, "Blade", 75)).await;
    let correlation = uuid::Uuid::new_v4().to_string();
    let request = Request::get(format!("/api/fighters/{fighter_id}/total-cost"))
        .header(CORRELATION_ID_HEADER, &correlation)
        .body(Body::empty())
        .expect("request");

    let (status, echoed, body) = send(&ctx, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(echoed, Some(correlation));
    assert_eq!(body["data"]["total_cost"], json!(75));
}

#[tokio::test]
async fn total_cost_of_unknown_fighter_is_zero() {
    let ctx = E2ETestContext::setup().await;
    let request = Request::get(format!("/api/fighters/{}/total-cost", uuid::Uuid::new_v4()))
        .body(Body::empty())
        .expect("request");

    let (_, _, body) = send(&ctx, request).await;

    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["total_cost"], json!(0));
}

#[tokio::test]
async fn snapshot_reflects_effects_update() {
    let ctx = E2ETestContext::setup().await;
    let gang_id = ctx.seed_gang(Gang::new("Goliath")).await;
    let fighter_id = ctx.seed_fighter(Fighter::new(gang_id, "Brute", 100)).await;

    let (_, _, body) = send(
        &ctx,
        post(
            &ctx,
            &format!("/api/fighters/{fighter_id}/effects"),
            r#"{"stats": {"toughness": 2}}"#,
        ),
    )
    .await;
    assert_eq!(body["success"], json!(true));

    let request = Request::get(format!("/api/fighters/{fighter_id}"))
        .body(Body::empty())
        .expect("request");
    let (_, _, snapshot) = send(&ctx, request).await;

    assert_eq!(snapshot["data"]["fighter"]["name"], json!("Brute"));
    assert_eq!(
        snapshot["data"]["effects"][0]["modifiers"][0]["value"],
        json!(2)
    );
}
