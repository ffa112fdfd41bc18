use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{DealId, Decision, FinancialMetrics, OfferOverrides};
use super::repository::{DealRepository, EventPublisher, RepositoryError};
use super::service::{UnderwritingService, UnderwritingServiceError};
use super::terms;

/// Router builder exposing HTTP endpoints for underwriting and offer
/// generation. Decision outcomes map to 200 responses carrying the decision
/// payload; only contract violations surface as error statuses.
pub fn underwriting_router<R, E>(service: Arc<UnderwritingService<R, E>>) -> Router
where
    R: DealRepository + 'static,
    E: EventPublisher + 'static,
{
    Router::new()
        .route(
            "/api/v1/underwriting/validate",
            post(validate_metrics_handler::<R, E>),
        )
        .route(
            "/api/v1/underwriting/validate-terms",
            post(validate_terms_handler::<R, E>),
        )
        .route("/api/v1/underwriting/deals", post(submit_handler::<R, E>))
        .route(
            "/api/v1/underwriting/deals/:deal_id",
            get(status_handler::<R, E>),
        )
        .route(
            "/api/v1/underwriting/deals/:deal_id/check",
            post(check_handler::<R, E>),
        )
        .route(
            "/api/v1/underwriting/deals/:deal_id/offers",
            post(offers_handler::<R, E>),
        )
        .route(
            "/api/v1/underwriting/deals/:deal_id/accept",
            post(accept_handler::<R, E>),
        )
        .route(
            "/api/v1/underwriting/deals/:deal_id/decline",
            post(decline_handler::<R, E>),
        )
        .with_state(service)
}

fn default_state() -> String {
    "CA".to_string()
}

#[derive(Debug, Deserialize)]
pub struct SubmitDealRequest {
    pub deal_id: String,
    #[serde(default)]
    pub metrics: Option<FinancialMetrics>,
}

#[derive(Debug, Deserialize)]
pub struct ValidateMetricsRequest {
    #[serde(flatten)]
    pub metrics: FinancialMetrics,
    #[serde(default = "default_state")]
    pub state: String,
    #[serde(default)]
    pub deal_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ValidateTermsRequest {
    pub deal_amount: f64,
    pub fee_rate: f64,
    pub term_days: u32,
    pub monthly_revenue: f64,
    #[serde(default = "default_state")]
    pub state: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct GenerateOffersRequest {
    #[serde(default)]
    pub overrides: Option<OfferOverrides>,
}

pub(crate) async fn submit_handler<R, E>(
    State(service): State<Arc<UnderwritingService<R, E>>>,
    axum::Json(request): axum::Json<SubmitDealRequest>,
) -> Response
where
    R: DealRepository + 'static,
    E: EventPublisher + 'static,
{
    match service.submit(DealId(request.deal_id), request.metrics) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn status_handler<R, E>(
    State(service): State<Arc<UnderwritingService<R, E>>>,
    Path(deal_id): Path<String>,
) -> Response
where
    R: DealRepository + 'static,
    E: EventPublisher + 'static,
{
    match service.get(&DealId(deal_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn validate_metrics_handler<R, E>(
    State(service): State<Arc<UnderwritingService<R, E>>>,
    axum::Json(request): axum::Json<ValidateMetricsRequest>,
) -> Response
where
    R: DealRepository + 'static,
    E: EventPublisher + 'static,
{
    let deal_id = request.deal_id.clone().map(DealId);
    match service.validate(&request.metrics, &request.state, deal_id.as_ref()) {
        Ok(evaluation) => {
            let payload = json!({
                "decision": evaluation.decision.label(),
                "approved": evaluation.decision == Decision::Approved,
                "risk_score": evaluation.risk_score,
                "max_offer_amount": evaluation.max_offer_amount,
                "ca_compliant": evaluation.ca_compliant,
                "violations": evaluation.violations,
                "reasons": evaluation.reasons,
                "critical_violations": evaluation.critical_count(),
                "warning_violations": evaluation.warning_count(),
                "state": request.state,
                "deal_id": request.deal_id,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn validate_terms_handler<R, E>(
    State(_service): State<Arc<UnderwritingService<R, E>>>,
    axum::Json(request): axum::Json<ValidateTermsRequest>,
) -> Response
where
    R: DealRepository + 'static,
    E: EventPublisher + 'static,
{
    let validation = terms::validate_terms(
        request.deal_amount,
        request.fee_rate,
        request.term_days,
        request.monthly_revenue,
        &request.state,
    );

    let payload = json!({
        "valid": validation.valid,
        "issues": validation.issues,
        "metrics": {
            "deal_amount": request.deal_amount,
            "fee_rate": request.fee_rate,
            "term_days": request.term_days,
            "total_payback": validation.breakdown.total_payback,
            "daily_payment": validation.breakdown.daily_payment,
            "payment_ratio": validation.breakdown.payment_ratio,
            "exposure_ratio": validation.breakdown.exposure_ratio,
            "approximate_apr": validation.breakdown.approximate_apr,
        },
        "state": request.state,
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

pub(crate) async fn check_handler<R, E>(
    State(service): State<Arc<UnderwritingService<R, E>>>,
    Path(deal_id): Path<String>,
) -> Response
where
    R: DealRepository + 'static,
    E: EventPublisher + 'static,
{
    let deal_id = DealId(deal_id);
    match service.evaluate(&deal_id) {
        Ok(evaluation) => {
            let payload = json!({
                "deal_id": deal_id.0,
                "decision": evaluation.decision.label(),
                "approved": evaluation.decision == Decision::Approved,
                "risk_score": evaluation.risk_score,
                "max_offer_amount": evaluation.max_offer_amount,
                "ca_compliant": evaluation.ca_compliant,
                "violations": evaluation.violations,
                "reasons": evaluation.reasons,
                "deal_status": evaluation.decision.label(),
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn offers_handler<R, E>(
    State(service): State<Arc<UnderwritingService<R, E>>>,
    Path(deal_id): Path<String>,
    axum::Json(request): axum::Json<GenerateOffersRequest>,
) -> Response
where
    R: DealRepository + 'static,
    E: EventPublisher + 'static,
{
    let deal_id = DealId(deal_id);
    match service.generate_offers(&deal_id, request.overrides.as_ref()) {
        Ok(bundle) => {
            let evaluation = &bundle.evaluation;
            let payload = match evaluation.decision {
                Decision::Declined => json!({
                    "offers": [],
                    "underwriting_decision": evaluation.decision.label(),
                    "decline_reasons": evaluation.reasons,
                    "violations": evaluation.violations,
                    "risk_score": evaluation.risk_score,
                    "ca_compliant": evaluation.ca_compliant,
                }),
                Decision::ManualReview => json!({
                    "offers": [],
                    "underwriting_decision": evaluation.decision.label(),
                    "reasons": evaluation.reasons,
                    "violations": evaluation.violations,
                    "risk_score": evaluation.risk_score,
                    "message": bundle.message,
                }),
                Decision::Approved | Decision::Conditional => json!({
                    "offers": bundle.offers,
                    "underwriting_decision": evaluation.decision.label(),
                    "underwriting_summary": {
                        "approved": evaluation.decision == Decision::Approved,
                        "risk_score": evaluation.risk_score,
                        "ca_compliant": evaluation.ca_compliant,
                        "max_offer_amount": evaluation.max_offer_amount,
                        "violation_count": evaluation.violations.len(),
                        "reasons": evaluation.reasons,
                    },
                }),
            };
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn accept_handler<R, E>(
    State(service): State<Arc<UnderwritingService<R, E>>>,
    Path(deal_id): Path<String>,
) -> Response
where
    R: DealRepository + 'static,
    E: EventPublisher + 'static,
{
    let deal_id = DealId(deal_id);
    match service.accept(&deal_id) {
        Ok(record) => {
            let payload = json!({
                "deal_id": record.deal_id.0,
                "status": record.status.label(),
                "message": "Offer accepted successfully",
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn decline_handler<R, E>(
    State(service): State<Arc<UnderwritingService<R, E>>>,
    Path(deal_id): Path<String>,
) -> Response
where
    R: DealRepository + 'static,
    E: EventPublisher + 'static,
{
    let deal_id = DealId(deal_id);
    match service.decline(&deal_id) {
        Ok(record) => {
            let payload = json!({
                "deal_id": record.deal_id.0,
                "status": record.status.label(),
                "message": "Offer declined successfully",
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

fn error_response(error: UnderwritingServiceError) -> Response {
    let status = match &error {
        UnderwritingServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        UnderwritingServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        UnderwritingServiceError::MissingMetrics { .. } => StatusCode::BAD_REQUEST,
        UnderwritingServiceError::RevenueRequired => StatusCode::UNPROCESSABLE_ENTITY,
        UnderwritingServiceError::Repository(RepositoryError::Unavailable(_))
        | UnderwritingServiceError::Event(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
