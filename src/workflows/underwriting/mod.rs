//! Underwriting guardrails, offer pricing, and the deal workflow seams that
//! surround them.
//!
//! The evaluator, jurisdiction overlay, term validator, and tier pricer are
//! pure computation over in-memory values; persistence and event delivery sit
//! behind traits so routes and tests can swap adapters freely.

pub mod catalog;
pub mod domain;
pub mod evaluation;
pub mod jurisdiction;
pub mod offers;
pub mod repository;
pub mod router;
pub mod service;
pub mod terms;

#[cfg(test)]
mod tests;

pub use catalog::{RuleDefinition, RuleId, BASE_RULES};
pub use domain::{
    DealId, DealStatus, Decision, EvaluationResult, FinancialMetrics, Offer, OfferOverrides,
    OfferTier, RuleViolation, ViolationSeverity,
};
pub use evaluation::GuardrailEngine;
pub use jurisdiction::{overlay_for, JurisdictionOverlay, CALIFORNIA};
pub use offers::{OfferBundle, OfferEngine, DEFAULT_TIERS};
pub use repository::{
    DealEvent, DealRecord, DealRepository, DealStatusView, EventError, EventPublisher,
    InMemoryDealRepository, RepositoryError, TracingEventPublisher,
};
pub use router::underwriting_router;
pub use service::{UnderwritingService, UnderwritingServiceError};
pub use terms::{validate_terms, TermBreakdown, TermValidation};
