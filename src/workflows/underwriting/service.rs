use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;

use super::domain::{DealId, DealStatus, EvaluationResult, FinancialMetrics, OfferOverrides};
use super::evaluation::GuardrailEngine;
use super::offers::{OfferBundle, OfferEngine};
use super::repository::{
    DealEvent, DealRecord, DealRepository, EventError, EventPublisher, RepositoryError,
};

/// Service composing the guardrail engine, tier pricer, and persistence seams.
/// Explicitly constructed and handed to callers; holds no mutable state.
pub struct UnderwritingService<R, E> {
    repository: Arc<R>,
    events: Arc<E>,
    guardrails: GuardrailEngine,
    offers: OfferEngine,
    jurisdiction: String,
}

impl<R, E> UnderwritingService<R, E>
where
    R: DealRepository + 'static,
    E: EventPublisher + 'static,
{
    pub fn new(repository: Arc<R>, events: Arc<E>, jurisdiction: impl Into<String>) -> Self {
        let guardrails = GuardrailEngine::new();
        Self {
            repository,
            events,
            guardrails,
            offers: OfferEngine::new(guardrails),
            jurisdiction: jurisdiction.into(),
        }
    }

    pub fn jurisdiction(&self) -> &str {
        &self.jurisdiction
    }

    /// Register a deal, optionally with an initial metrics snapshot.
    pub fn submit(
        &self,
        deal_id: DealId,
        metrics: Option<FinancialMetrics>,
    ) -> Result<DealRecord, UnderwritingServiceError> {
        let record = DealRecord::open(deal_id, metrics);
        let stored = self.repository.insert(record)?;
        Ok(stored)
    }

    /// Evaluate a snapshot against the guardrails without touching any deal,
    /// or attach the outcome to an existing deal when an id is supplied.
    pub fn validate(
        &self,
        metrics: &FinancialMetrics,
        jurisdiction: &str,
        deal_id: Option<&DealId>,
    ) -> Result<EvaluationResult, UnderwritingServiceError> {
        let evaluation = self.guardrails.evaluate(metrics, jurisdiction);

        if let Some(deal_id) = deal_id {
            // Mirror the stateless result onto the deal when it exists; an
            // unknown id is not an error for this probe endpoint.
            if let Some(mut record) = self.repository.fetch(deal_id)? {
                record.status = DealStatus::from_decision(evaluation.decision);
                record.metrics = Some(metrics.clone());
                record.evaluation = Some(evaluation.clone());
                self.repository.update(record)?;
            }
        }

        Ok(evaluation)
    }

    /// Run the guardrails on a deal's stored snapshot and persist the outcome.
    pub fn evaluate(
        &self,
        deal_id: &DealId,
    ) -> Result<EvaluationResult, UnderwritingServiceError> {
        let mut record = self
            .repository
            .fetch(deal_id)?
            .ok_or(RepositoryError::NotFound)?;

        let metrics = record
            .metrics
            .clone()
            .ok_or_else(|| UnderwritingServiceError::MissingMetrics {
                deal_id: deal_id.clone(),
            })?;

        let evaluation = self.guardrails.evaluate(&metrics, &self.jurisdiction);

        record.status = DealStatus::from_decision(evaluation.decision);
        record.evaluation = Some(evaluation.clone());
        self.repository.update(record)?;

        Ok(evaluation)
    }

    /// Price offers from a deal's stored snapshot, persist them, and publish
    /// an `offer.generated` event when tiers were actually produced.
    pub fn generate_offers(
        &self,
        deal_id: &DealId,
        overrides: Option<&OfferOverrides>,
    ) -> Result<OfferBundle, UnderwritingServiceError> {
        let mut record = self
            .repository
            .fetch(deal_id)?
            .ok_or(RepositoryError::NotFound)?;

        let metrics = record
            .metrics
            .clone()
            .ok_or_else(|| UnderwritingServiceError::MissingMetrics {
                deal_id: deal_id.clone(),
            })?;

        if metrics.avg_monthly_revenue <= 0.0 {
            return Err(UnderwritingServiceError::RevenueRequired);
        }

        let bundle = self
            .offers
            .generate(&metrics, overrides, &self.jurisdiction);

        record.status = DealStatus::from_decision(bundle.evaluation.decision);
        record.evaluation = Some(bundle.evaluation.clone());
        record.offers = bundle.offers.clone();
        self.repository.update(record)?;

        if !bundle.offers.is_empty() {
            let mut details = BTreeMap::new();
            details.insert("count".to_string(), bundle.offers.len().to_string());
            details.insert(
                "underwriting_decision".to_string(),
                bundle.evaluation.decision.label().to_string(),
            );
            self.events.publish(DealEvent {
                event_type: "offer.generated".to_string(),
                deal_id: deal_id.clone(),
                occurred_at: Utc::now(),
                details,
            })?;
        }

        Ok(bundle)
    }

    /// Accept the outstanding offer on a deal.
    pub fn accept(&self, deal_id: &DealId) -> Result<DealRecord, UnderwritingServiceError> {
        self.transition(deal_id, DealStatus::Accepted, "offer.accepted")
    }

    /// Decline the outstanding offer on a deal.
    pub fn decline(&self, deal_id: &DealId) -> Result<DealRecord, UnderwritingServiceError> {
        self.transition(deal_id, DealStatus::Declined, "offer.declined")
    }

    /// Fetch a deal record for API status views.
    pub fn get(&self, deal_id: &DealId) -> Result<DealRecord, UnderwritingServiceError> {
        let record = self
            .repository
            .fetch(deal_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    fn transition(
        &self,
        deal_id: &DealId,
        status: DealStatus,
        event_type: &str,
    ) -> Result<DealRecord, UnderwritingServiceError> {
        let mut record = self
            .repository
            .fetch(deal_id)?
            .ok_or(RepositoryError::NotFound)?;

        record.status = status;
        self.repository.update(record.clone())?;

        let mut details = BTreeMap::new();
        details.insert("status".to_string(), status.label().to_string());
        self.events.publish(DealEvent {
            event_type: event_type.to_string(),
            deal_id: deal_id.clone(),
            occurred_at: Utc::now(),
            details,
        })?;

        Ok(record)
    }
}

/// Error raised by the underwriting service. Risky metrics are never an error;
/// they come back as data on the evaluation.
#[derive(Debug, thiserror::Error)]
pub enum UnderwritingServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Event(#[from] EventError),
    #[error("no metrics snapshot recorded for deal {}", deal_id.0)]
    MissingMetrics { deal_id: DealId },
    #[error("positive monthly revenue required for offer generation")]
    RevenueRequired,
}
