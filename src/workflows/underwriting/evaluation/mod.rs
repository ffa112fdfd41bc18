mod policy;
mod rules;

use super::domain::{EvaluationResult, FinancialMetrics};
use super::jurisdiction;

/// Stateless evaluator applying the base rule catalog plus any jurisdictional
/// overlay to a metrics snapshot. Pure arithmetic over its inputs; safe to
/// share across any number of callers.
#[derive(Debug, Default, Clone, Copy)]
pub struct GuardrailEngine;

impl GuardrailEngine {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate a snapshot. Deterministic for a given `(metrics, jurisdiction)`
    /// pair: violations appear in rule-evaluation order and the risk score is
    /// accumulated from the catalog's increment table.
    pub fn evaluate(&self, metrics: &FinancialMetrics, jurisdiction: &str) -> EvaluationResult {
        let derived = rules::derive(metrics);
        let (mut violations, mut risk_score) = rules::sweep_base_rules(metrics, &derived);
        let mut reasons = Vec::new();

        let ca_compliant = match jurisdiction::overlay_for(jurisdiction) {
            Some(overlay) => {
                overlay.check_metrics(derived.annual_revenue, derived.nsf_ratio, &mut violations)
            }
            None => true,
        };

        // Reason-only signal: a heavy NSF history raises risk even when every
        // formal NSF rule passed.
        if metrics.total_nsf_3m >= rules::HIGH_RISK_NSF_THRESHOLD {
            reasons.push("High NSF count triggers high-risk classification".to_string());
            risk_score += rules::HIGH_RISK_NSF_INCREMENT;
        }

        let risk_score = risk_score.min(1.0);

        let (decision, max_offer_amount) = policy::resolve_decision(
            metrics.avg_monthly_revenue,
            risk_score,
            ca_compliant,
            &violations,
            &mut reasons,
        );

        EvaluationResult {
            decision,
            violations,
            max_offer_amount,
            risk_score,
            reasons,
            ca_compliant,
        }
    }
}
