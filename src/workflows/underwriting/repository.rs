use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::domain::{DealId, DealStatus, EvaluationResult, FinancialMetrics, Offer};

/// Repository record tying a deal to its latest snapshot, evaluation, and
/// generated offers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealRecord {
    pub deal_id: DealId,
    pub status: DealStatus,
    pub metrics: Option<FinancialMetrics>,
    pub evaluation: Option<EvaluationResult>,
    pub offers: Vec<Offer>,
}

impl DealRecord {
    pub fn open(deal_id: DealId, metrics: Option<FinancialMetrics>) -> Self {
        Self {
            deal_id,
            status: DealStatus::Open,
            metrics,
            evaluation: None,
            offers: Vec::new(),
        }
    }

    pub fn decision_rationale(&self) -> String {
        match &self.evaluation {
            Some(evaluation) => evaluation.summary(),
            None => "pending underwriting".to_string(),
        }
    }

    pub fn status_view(&self) -> DealStatusView {
        DealStatusView {
            deal_id: self.deal_id.clone(),
            status: self.status.label(),
            decision_rationale: self.decision_rationale(),
            risk_score: self.evaluation.as_ref().map(|e| e.risk_score),
            max_offer_amount: self.evaluation.as_ref().and_then(|e| e.max_offer_amount),
            offer_count: self.offers.len(),
        }
    }
}

/// Sanitized representation of a deal's exposed status.
#[derive(Debug, Clone, Serialize)]
pub struct DealStatusView {
    pub deal_id: DealId,
    pub status: &'static str,
    pub decision_rationale: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_offer_amount: Option<f64>,
    pub offer_count: usize,
}

/// Storage abstraction so the service module can be exercised in isolation.
pub trait DealRepository: Send + Sync {
    fn insert(&self, record: DealRecord) -> Result<DealRecord, RepositoryError>;
    fn update(&self, record: DealRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &DealId) -> Result<Option<DealRecord>, RepositoryError>;
    fn pending_review(&self, limit: usize) -> Result<Vec<DealRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("deal already exists")]
    Conflict,
    #[error("deal not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Activity-feed entry emitted on offer lifecycle transitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealEvent {
    pub event_type: String,
    pub deal_id: DealId,
    pub occurred_at: DateTime<Utc>,
    pub details: BTreeMap<String, String>,
}

/// Trait describing outbound event hooks (activity feed, CRM sync, webhooks).
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: DealEvent) -> Result<(), EventError>;
}

/// Event dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("event transport unavailable: {0}")]
    Transport(String),
}

/// Process-local store backing the demo server; production deployments swap in
/// a database-backed implementation of the same trait.
#[derive(Default, Clone)]
pub struct InMemoryDealRepository {
    records: Arc<Mutex<HashMap<DealId, DealRecord>>>,
}

impl DealRepository for InMemoryDealRepository {
    fn insert(&self, record: DealRecord) -> Result<DealRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.deal_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.deal_id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: DealRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.deal_id) {
            guard.insert(record.deal_id.clone(), record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &DealId) -> Result<Option<DealRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn pending_review(&self, limit: usize) -> Result<Vec<DealRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| record.status == DealStatus::ManualReview)
            .take(limit)
            .cloned()
            .collect())
    }
}

/// Publisher that records events through tracing for environments without an
/// event bus.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventPublisher;

impl EventPublisher for TracingEventPublisher {
    fn publish(&self, event: DealEvent) -> Result<(), EventError> {
        info!(
            event_type = %event.event_type,
            deal_id = %event.deal_id.0,
            "deal event recorded"
        );
        Ok(())
    }
}
