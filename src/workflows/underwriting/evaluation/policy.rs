use super::super::domain::{Decision, RuleViolation, ViolationSeverity};

const MANUAL_REVIEW_WARNING_COUNT: usize = 3;
const MANUAL_REVIEW_RISK: f64 = 0.8;
const CONDITIONAL_RISK: f64 = 0.6;

// Offer ceiling per decision band, as a multiple of monthly revenue.
const MANUAL_REVIEW_CAP_FACTOR: f64 = 0.5;
const CONDITIONAL_CAP_FACTOR: f64 = 0.8;
const APPROVED_CAP_FACTOR: f64 = 1.2;

/// Resolve the final decision. Priority order, first match wins; each branch
/// contributes exactly one summary reason.
pub(crate) fn resolve_decision(
    monthly_revenue: f64,
    risk_score: f64,
    ca_compliant: bool,
    violations: &[RuleViolation],
    reasons: &mut Vec<String>,
) -> (Decision, Option<f64>) {
    let critical_count = violations
        .iter()
        .filter(|violation| violation.severity == ViolationSeverity::Critical)
        .count();
    let warning_count = violations
        .iter()
        .filter(|violation| violation.severity == ViolationSeverity::Warning)
        .count();

    if critical_count > 0 || !ca_compliant {
        reasons.push("Critical underwriting violations or compliance issues".to_string());
        (Decision::Declined, None)
    } else if warning_count >= MANUAL_REVIEW_WARNING_COUNT || risk_score > MANUAL_REVIEW_RISK {
        reasons.push("Multiple warnings or high risk score requires manual review".to_string());
        (
            Decision::ManualReview,
            Some(monthly_revenue * MANUAL_REVIEW_CAP_FACTOR),
        )
    } else if risk_score > CONDITIONAL_RISK {
        reasons.push("Moderate risk - conditional approval with limits".to_string());
        (
            Decision::Conditional,
            Some(monthly_revenue * CONDITIONAL_CAP_FACTOR),
        )
    } else {
        reasons.push("Meets all underwriting requirements".to_string());
        (
            Decision::Approved,
            Some(monthly_revenue * APPROVED_CAP_FACTOR),
        )
    }
}
