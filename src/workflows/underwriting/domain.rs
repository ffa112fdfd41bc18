use serde::{Deserialize, Serialize};

use super::catalog::{self, RuleId};

/// Identifier wrapper for funding deals.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DealId(pub String);

/// Financial health snapshot computed from the trailing three months of bank activity.
///
/// The balance extremes are optional because older snapshots predate their
/// collection; the evaluator never requires them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialMetrics {
    pub avg_monthly_revenue: f64,
    pub avg_daily_balance_3m: f64,
    pub total_nsf_3m: u32,
    pub total_days_negative_3m: u32,
    #[serde(default)]
    pub highest_balance: Option<f64>,
    #[serde(default)]
    pub lowest_balance: Option<f64>,
}

/// Severity attached to a breached underwriting rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationSeverity {
    Info,
    Warning,
    Critical,
}

impl ViolationSeverity {
    pub const fn label(self) -> &'static str {
        match self {
            ViolationSeverity::Info => "info",
            ViolationSeverity::Warning => "warning",
            ViolationSeverity::Critical => "critical",
        }
    }
}

/// A breached rule together with the value that breached it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleViolation {
    pub rule_id: RuleId,
    pub description: String,
    pub severity: ViolationSeverity,
    pub actual_value: f64,
    pub threshold_value: f64,
    pub field_name: String,
}

impl RuleViolation {
    /// Build a violation from the catalog entry for `rule_id`, carrying the
    /// compared value so it never has to be re-derived downstream.
    pub(crate) fn breach(rule_id: RuleId, actual_value: f64) -> Self {
        let definition = catalog::definition(rule_id);
        Self {
            rule_id,
            description: rule_id.description().to_string(),
            severity: definition.severity,
            actual_value,
            threshold_value: definition.threshold,
            field_name: rule_id.field_name().to_string(),
        }
    }
}

/// Underwriting outcome for a metrics snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approved,
    Conditional,
    ManualReview,
    Declined,
}

impl Decision {
    pub const fn label(self) -> &'static str {
        match self {
            Decision::Approved => "approved",
            Decision::Conditional => "conditional",
            Decision::ManualReview => "manual_review",
            Decision::Declined => "declined",
        }
    }
}

/// Full evaluation trail: decision, violations in evaluation order, and the
/// offer ceiling derived from the decision band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub decision: Decision,
    pub violations: Vec<RuleViolation>,
    pub max_offer_amount: Option<f64>,
    pub risk_score: f64,
    pub reasons: Vec<String>,
    pub ca_compliant: bool,
}

impl EvaluationResult {
    pub fn critical_count(&self) -> usize {
        self.violations
            .iter()
            .filter(|violation| violation.severity == ViolationSeverity::Critical)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.violations
            .iter()
            .filter(|violation| violation.severity == ViolationSeverity::Warning)
            .count()
    }

    pub fn summary(&self) -> String {
        if self.reasons.is_empty() {
            self.decision.label().to_string()
        } else {
            self.reasons.join("; ")
        }
    }
}

/// One row of the pricing table: factor applied to monthly revenue plus the
/// fee and term attached to that advance size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferTier {
    pub factor: f64,
    pub fee_rate: f64,
    pub term_days: u32,
    #[serde(default)]
    pub buy_rate: Option<f64>,
}

/// Caller-supplied replacements for the default pricing table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OfferOverrides {
    #[serde(default)]
    pub tiers: Vec<OfferTier>,
}

/// A priced funding offer. Term compliance is advisory metadata; non-compliant
/// tiers are surfaced, not dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub id: String,
    pub tier: u8,
    pub amount: u64,
    pub factor: f64,
    pub fee_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buy_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_margin: Option<i64>,
    pub payback_amount: u64,
    pub term_days: u32,
    pub daily_payment: u64,
    pub risk_score: f64,
    pub decision: Decision,
    pub terms_compliant: bool,
    pub compliance_issues: Vec<String>,
    pub rationale: String,
}

/// High level status tracked throughout the deal workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DealStatus {
    Open,
    Approved,
    Conditional,
    ManualReview,
    Declined,
    Accepted,
}

impl DealStatus {
    pub const fn label(self) -> &'static str {
        match self {
            DealStatus::Open => "open",
            DealStatus::Approved => "approved",
            DealStatus::Conditional => "conditional",
            DealStatus::ManualReview => "manual_review",
            DealStatus::Declined => "declined",
            DealStatus::Accepted => "accepted",
        }
    }

    pub const fn from_decision(decision: Decision) -> Self {
        match decision {
            Decision::Approved => DealStatus::Approved,
            Decision::Conditional => DealStatus::Conditional,
            Decision::ManualReview => DealStatus::ManualReview,
            Decision::Declined => DealStatus::Declined,
        }
    }
}
