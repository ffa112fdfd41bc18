use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::workflows::underwriting::domain::FinancialMetrics;
use crate::workflows::underwriting::repository::{
    DealEvent, DealRecord, DealRepository, EventError, EventPublisher, InMemoryDealRepository,
    RepositoryError,
};
use crate::workflows::underwriting::{underwriting_router, DealId, UnderwritingService};

pub(super) fn metrics(
    revenue: f64,
    balance: f64,
    nsf: u32,
    negative_days: u32,
) -> FinancialMetrics {
    FinancialMetrics {
        avg_monthly_revenue: revenue,
        avg_daily_balance_3m: balance,
        total_nsf_3m: nsf,
        total_days_negative_3m: negative_days,
        highest_balance: None,
        lowest_balance: None,
    }
}

/// Clean snapshot that passes every base rule and the CA overlay.
pub(super) fn healthy_metrics() -> FinancialMetrics {
    metrics(85_000.0, 15_000.0, 2, 3)
}

/// Three warnings, no criticals: thin balance, thin balance ratio, and an NSF
/// rate above the soft limit.
pub(super) fn review_metrics() -> FinancialMetrics {
    metrics(20_000.0, 900.0, 4, 10)
}

/// Two warnings pushing risk into the conditional band without reaching the
/// manual-review count.
pub(super) fn conditional_metrics() -> FinancialMetrics {
    metrics(20_000.0, 900.0, 0, 0)
}

/// Critical monthly-revenue breach; annual revenue still clears the CA floor.
pub(super) fn declined_metrics() -> FinancialMetrics {
    metrics(10_000.0, 15_000.0, 2, 3)
}

pub(super) fn deal(id: &str) -> DealId {
    DealId(id.to_string())
}

pub(super) fn build_service() -> (
    UnderwritingService<InMemoryDealRepository, MemoryEvents>,
    Arc<InMemoryDealRepository>,
    Arc<MemoryEvents>,
) {
    let repository = Arc::new(InMemoryDealRepository::default());
    let events = Arc::new(MemoryEvents::default());
    let service = UnderwritingService::new(repository.clone(), events.clone(), "CA");
    (service, repository, events)
}

pub(super) fn router_with_service(
    service: UnderwritingService<InMemoryDealRepository, MemoryEvents>,
) -> axum::Router {
    underwriting_router(Arc::new(service))
}

#[derive(Default, Clone)]
pub(super) struct MemoryEvents {
    events: Arc<Mutex<Vec<DealEvent>>>,
}

impl MemoryEvents {
    pub(super) fn recorded(&self) -> Vec<DealEvent> {
        self.events.lock().expect("event mutex poisoned").clone()
    }
}

impl EventPublisher for MemoryEvents {
    fn publish(&self, event: DealEvent) -> Result<(), EventError> {
        self.events
            .lock()
            .expect("event mutex poisoned")
            .push(event);
        Ok(())
    }
}

pub(super) struct ConflictRepository;

impl DealRepository for ConflictRepository {
    fn insert(&self, _record: DealRecord) -> Result<DealRecord, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn update(&self, _record: DealRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn fetch(&self, _id: &DealId) -> Result<Option<DealRecord>, RepositoryError> {
        Ok(None)
    }

    fn pending_review(&self, _limit: usize) -> Result<Vec<DealRecord>, RepositoryError> {
        Ok(Vec::new())
    }
}

pub(super) struct UnavailableRepository;

impl DealRepository for UnavailableRepository {
    fn insert(&self, _record: DealRecord) -> Result<DealRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: DealRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &DealId) -> Result<Option<DealRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn pending_review(&self, _limit: usize) -> Result<Vec<DealRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
