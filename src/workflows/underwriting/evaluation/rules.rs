use super::super::catalog::{threshold, RuleId};
use super::super::domain::{FinancialMetrics, RuleViolation};

/// Every evaluation starts here: a short-term, high-frequency-repayment
/// product is never zero-risk.
pub(crate) const BASE_RISK_SCORE: f64 = 0.3;

/// NSF count at which a snapshot is flagged high-risk even when no formal
/// rule breached.
pub(crate) const HIGH_RISK_NSF_THRESHOLD: u32 = 8;
pub(crate) const HIGH_RISK_NSF_INCREMENT: f64 = 0.2;

pub(crate) struct DerivedMetrics {
    pub annual_revenue: f64,
    pub nsf_ratio: f64,
    pub balance_to_revenue_ratio: f64,
}

pub(crate) fn derive(metrics: &FinancialMetrics) -> DerivedMetrics {
    let annual_revenue = metrics.avg_monthly_revenue * 12.0;
    // NSF count as a rate over the trailing quarter rather than an absolute.
    let nsf_ratio = f64::from(metrics.total_nsf_3m) / 90.0;
    let balance_to_revenue_ratio = if metrics.avg_monthly_revenue > 0.0 {
        metrics.avg_daily_balance_3m / metrics.avg_monthly_revenue
    } else {
        0.0
    };

    DerivedMetrics {
        annual_revenue,
        nsf_ratio,
        balance_to_revenue_ratio,
    }
}

/// Sweep the base catalog in fixed order, accumulating violations and their
/// risk increments. Checks are independent; multiple breaches stack.
pub(crate) fn sweep_base_rules(
    metrics: &FinancialMetrics,
    derived: &DerivedMetrics,
) -> (Vec<RuleViolation>, f64) {
    let mut violations = Vec::new();
    let mut risk_score = BASE_RISK_SCORE;

    if metrics.avg_monthly_revenue < threshold(RuleId::MinMonthlyRevenue) {
        record_breach(
            RuleId::MinMonthlyRevenue,
            metrics.avg_monthly_revenue,
            &mut violations,
            &mut risk_score,
        );
    }

    if derived.annual_revenue < threshold(RuleId::MinAnnualRevenue) {
        record_breach(
            RuleId::MinAnnualRevenue,
            derived.annual_revenue,
            &mut violations,
            &mut risk_score,
        );
    }

    if f64::from(metrics.total_nsf_3m) > threshold(RuleId::MaxNsf3m) {
        record_breach(
            RuleId::MaxNsf3m,
            f64::from(metrics.total_nsf_3m),
            &mut violations,
            &mut risk_score,
        );
    }

    if derived.nsf_ratio > threshold(RuleId::MaxNsfRatio) {
        record_breach(
            RuleId::MaxNsfRatio,
            derived.nsf_ratio,
            &mut violations,
            &mut risk_score,
        );
    }

    if metrics.avg_daily_balance_3m < threshold(RuleId::MinAvgBalance) {
        record_breach(
            RuleId::MinAvgBalance,
            metrics.avg_daily_balance_3m,
            &mut violations,
            &mut risk_score,
        );
    }

    if derived.balance_to_revenue_ratio < threshold(RuleId::BalanceToRevenueRatio) {
        record_breach(
            RuleId::BalanceToRevenueRatio,
            derived.balance_to_revenue_ratio,
            &mut violations,
            &mut risk_score,
        );
    }

    if f64::from(metrics.total_days_negative_3m) > threshold(RuleId::MaxNegativeDays3m) {
        record_breach(
            RuleId::MaxNegativeDays3m,
            f64::from(metrics.total_days_negative_3m),
            &mut violations,
            &mut risk_score,
        );
    }

    (violations, risk_score)
}

fn record_breach(
    rule_id: RuleId,
    actual_value: f64,
    violations: &mut Vec<RuleViolation>,
    risk_score: &mut f64,
) {
    violations.push(RuleViolation::breach(rule_id, actual_value));
    *risk_score += rule_id.risk_increment();
}
