use super::common::*;
use axum::extract::State;
use axum::http::StatusCode;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::workflows::underwriting::router::{self, SubmitDealRequest};
use crate::workflows::underwriting::UnderwritingService;

fn submit_body(deal_id: &str) -> Value {
    json!({
        "deal_id": deal_id,
        "metrics": {
            "avg_monthly_revenue": 85_000.0,
            "avg_daily_balance_3m": 15_000.0,
            "total_nsf_3m": 2,
            "total_days_negative_3m": 3,
        },
    })
}

async fn post_json(router: axum::Router, uri: &str, body: Value) -> axum::response::Response {
    router
        .oneshot(
            axum::http::Request::post(uri)
                .header(axum::http::header::CONTENT_TYPE, "application/json")
                .body(axum::body::Body::from(
                    serde_json::to_vec(&body).expect("serialize body"),
                ))
                .expect("build request"),
        )
        .await
        .expect("route executes")
}

#[tokio::test]
async fn submit_route_creates_deal() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let response = post_json(
        router,
        "/api/v1/underwriting/deals",
        submit_body("deal-100"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("status"), Some(&json!("open")));
    assert!(payload
        .get("decision_rationale")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .contains("pending"));
}

#[tokio::test]
async fn submit_handler_returns_conflict_on_duplicate() {
    let service = Arc::new(UnderwritingService::new(
        Arc::new(ConflictRepository),
        Arc::new(MemoryEvents::default()),
        "CA",
    ));

    let response = router::submit_handler::<ConflictRepository, MemoryEvents>(
        State(service),
        axum::Json(SubmitDealRequest {
            deal_id: "deal-101".to_string(),
            metrics: Some(healthy_metrics()),
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn submit_handler_returns_internal_error_when_repository_down() {
    let service = Arc::new(UnderwritingService::new(
        Arc::new(UnavailableRepository),
        Arc::new(MemoryEvents::default()),
        "CA",
    ));

    let response = router::submit_handler::<UnavailableRepository, MemoryEvents>(
        State(service),
        axum::Json(SubmitDealRequest {
            deal_id: "deal-102".to_string(),
            metrics: None,
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn status_route_returns_not_found_for_unknown_deal() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(
            axum::http::Request::get("/api/v1/underwriting/deals/ghost")
                .body(axum::body::Body::empty())
                .expect("build request"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn validate_route_reports_decision_and_counts() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let body = json!({
        "avg_monthly_revenue": 85_000.0,
        "avg_daily_balance_3m": 15_000.0,
        "total_nsf_3m": 2,
        "total_days_negative_3m": 3,
        "state": "CA",
    });
    let response = post_json(router, "/api/v1/underwriting/validate", body).await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("decision"), Some(&json!("approved")));
    assert_eq!(payload.get("approved"), Some(&json!(true)));
    assert_eq!(payload.get("critical_violations"), Some(&json!(0)));
    assert_eq!(payload.get("ca_compliant"), Some(&json!(true)));
}

#[tokio::test]
async fn validate_terms_route_flags_ca_apr() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let body = json!({
        "deal_amount": 50_000.0,
        "fee_rate": 1.5,
        "term_days": 90,
        "monthly_revenue": 40_000.0,
        "state": "CA",
    });
    let response = post_json(router, "/api/v1/underwriting/validate-terms", body).await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("valid"), Some(&json!(false)));
    let issues = payload
        .get("issues")
        .and_then(Value::as_array)
        .expect("issues array");
    assert!(issues
        .iter()
        .filter_map(Value::as_str)
        .any(|issue| issue.contains("CA APR limits")));
}

#[tokio::test]
async fn check_route_requires_metrics() {
    let (service, _, _) = build_service();
    let service = Arc::new(service);
    let router = crate::workflows::underwriting::underwriting_router(service.clone());

    service
        .submit(deal("deal-103"), None)
        .expect("submission succeeds");

    let response = post_json(
        router,
        "/api/v1/underwriting/deals/deal-103/check",
        json!({}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn check_route_evaluates_stored_metrics() {
    let (service, _, _) = build_service();
    let service = Arc::new(service);
    let router = crate::workflows::underwriting::underwriting_router(service.clone());

    service
        .submit(deal("deal-104"), Some(healthy_metrics()))
        .expect("submission succeeds");

    let response = post_json(
        router,
        "/api/v1/underwriting/deals/deal-104/check",
        json!({}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("decision"), Some(&json!("approved")));
    assert_eq!(payload.get("deal_status"), Some(&json!("approved")));
}

#[tokio::test]
async fn offers_route_prices_tiers_and_updates_status() {
    let (service, _, _) = build_service();
    let service = Arc::new(service);
    let router = crate::workflows::underwriting::underwriting_router(service.clone());

    service
        .submit(deal("deal-105"), Some(healthy_metrics()))
        .expect("submission succeeds");

    let response = post_json(
        router.clone(),
        "/api/v1/underwriting/deals/deal-105/offers",
        json!({}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let offers = payload
        .get("offers")
        .and_then(Value::as_array)
        .expect("offers array");
    assert_eq!(offers.len(), 3);
    assert!(payload.get("underwriting_summary").is_some());

    let accept = post_json(
        router,
        "/api/v1/underwriting/deals/deal-105/accept",
        json!({}),
    )
    .await;
    assert_eq!(accept.status(), StatusCode::OK);
    let payload = read_json_body(accept).await;
    assert_eq!(payload.get("status"), Some(&json!("accepted")));
}

#[tokio::test]
async fn offers_route_carries_decline_payload() {
    let (service, _, _) = build_service();
    let service = Arc::new(service);
    let router = crate::workflows::underwriting::underwriting_router(service.clone());

    service
        .submit(
            deal("deal-106"),
            Some(metrics(10_000.0, 15_000.0, 2, 3)),
        )
        .expect("submission succeeds");

    let response = post_json(
        router,
        "/api/v1/underwriting/deals/deal-106/offers",
        json!({}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(
        payload.get("underwriting_decision"),
        Some(&json!("declined"))
    );
    assert_eq!(
        payload.get("offers").and_then(Value::as_array).map(Vec::len),
        Some(0)
    );
    assert!(payload.get("decline_reasons").is_some());
}

#[tokio::test]
async fn offers_route_honors_tier_overrides() {
    let (service, _, _) = build_service();
    let service = Arc::new(service);
    let router = crate::workflows::underwriting::underwriting_router(service.clone());

    service
        .submit(deal("deal-107"), Some(healthy_metrics()))
        .expect("submission succeeds");

    let body = json!({
        "overrides": {
            "tiers": [
                { "factor": 0.5, "fee_rate": 1.1, "term_days": 60 },
            ],
        },
    });
    let response = post_json(
        router,
        "/api/v1/underwriting/deals/deal-107/offers",
        body,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let offers = payload
        .get("offers")
        .and_then(Value::as_array)
        .expect("offers array");
    assert_eq!(offers.len(), 1);
    assert_eq!(offers[0].get("factor"), Some(&json!(0.5)));
}
