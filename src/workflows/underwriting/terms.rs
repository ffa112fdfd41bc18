use serde::Serialize;

use super::catalog::{threshold, RuleId};
use super::jurisdiction;

/// Ratios computed while validating a candidate deal, echoed back to callers
/// so partner UIs can show the math behind a rejection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermBreakdown {
    pub total_payback: f64,
    pub daily_payment: f64,
    pub payment_ratio: f64,
    pub exposure_ratio: f64,
    pub approximate_apr: f64,
}

/// Verdict on a candidate `(amount, fee_rate, term)` combination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermValidation {
    pub valid: bool,
    pub issues: Vec<String>,
    pub breakdown: TermBreakdown,
}

/// Check candidate deal terms against the concentration limits and any
/// jurisdictional fee cap. Independent of the guardrail evaluation; callers
/// may probe hypothetical terms. Zero revenue and zero-day terms are legal
/// inputs and resolve to zero ratios rather than errors.
pub fn validate_terms(
    amount: f64,
    fee_rate: f64,
    term_days: u32,
    monthly_revenue: f64,
    jurisdiction: &str,
) -> TermValidation {
    let total_payback = amount * fee_rate;
    let daily_payment = if term_days > 0 {
        total_payback / f64::from(term_days)
    } else {
        0.0
    };
    let daily_revenue = monthly_revenue / 30.0;
    let payment_ratio = if daily_revenue > 0.0 {
        daily_payment / daily_revenue
    } else {
        0.0
    };
    let exposure_ratio = if monthly_revenue > 0.0 {
        amount / monthly_revenue
    } else {
        0.0
    };
    // Approximation only: no compounding, fee spread linearly over the term.
    let approximate_apr = if term_days > 0 {
        ((fee_rate - 1.0) * 365.0) / f64::from(term_days)
    } else {
        0.0
    };

    let mut issues = Vec::new();

    let payment_cap = threshold(RuleId::MaxDailyPaymentRatio);
    if payment_ratio > payment_cap {
        issues.push(format!(
            "Daily payment ratio ({:.2}%) exceeds limit ({:.2}%)",
            payment_ratio * 100.0,
            payment_cap * 100.0
        ));
    }

    let exposure_cap = threshold(RuleId::MaxTotalExposure);
    if exposure_ratio > exposure_cap {
        issues.push(format!(
            "Total exposure ratio ({exposure_ratio:.1}x) exceeds limit ({exposure_cap:.1}x)"
        ));
    }

    if let Some(overlay) = jurisdiction::overlay_for(jurisdiction) {
        if approximate_apr > overlay.max_approx_apr {
            issues.push(format!(
                "Fee rate may exceed {} APR limits (approx {:.2}% APR)",
                overlay.code,
                approximate_apr * 100.0
            ));
        }
    }

    TermValidation {
        valid: issues.is_empty(),
        issues,
        breakdown: TermBreakdown {
            total_payback,
            daily_payment,
            payment_ratio,
            exposure_ratio,
            approximate_apr,
        },
    }
}
