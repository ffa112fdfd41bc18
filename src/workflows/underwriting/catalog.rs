use serde::{Deserialize, Serialize};

use super::domain::ViolationSeverity;
use super::jurisdiction::{CA_MAX_NSF_RATIO, CA_MIN_ANNUAL_REVENUE};

/// Stable identifiers for every underwriting rule. Wire labels never change
/// across releases; partner integrations key decline handling off them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleId {
    #[serde(rename = "min_monthly_revenue")]
    MinMonthlyRevenue,
    #[serde(rename = "min_annual_revenue")]
    MinAnnualRevenue,
    #[serde(rename = "max_nsf_3m")]
    MaxNsf3m,
    #[serde(rename = "max_nsf_ratio")]
    MaxNsfRatio,
    #[serde(rename = "min_avg_balance")]
    MinAvgBalance,
    #[serde(rename = "balance_to_revenue_ratio")]
    BalanceToRevenueRatio,
    #[serde(rename = "max_negative_days_3m")]
    MaxNegativeDays3m,
    #[serde(rename = "ca_min_revenue")]
    CaMinRevenue,
    #[serde(rename = "ca_max_nsf_ratio")]
    CaMaxNsfRatio,
    #[serde(rename = "max_daily_payment_ratio")]
    MaxDailyPaymentRatio,
    #[serde(rename = "max_total_exposure")]
    MaxTotalExposure,
}

impl RuleId {
    pub const fn as_str(self) -> &'static str {
        match self {
            RuleId::MinMonthlyRevenue => "min_monthly_revenue",
            RuleId::MinAnnualRevenue => "min_annual_revenue",
            RuleId::MaxNsf3m => "max_nsf_3m",
            RuleId::MaxNsfRatio => "max_nsf_ratio",
            RuleId::MinAvgBalance => "min_avg_balance",
            RuleId::BalanceToRevenueRatio => "balance_to_revenue_ratio",
            RuleId::MaxNegativeDays3m => "max_negative_days_3m",
            RuleId::CaMinRevenue => "ca_min_revenue",
            RuleId::CaMaxNsfRatio => "ca_max_nsf_ratio",
            RuleId::MaxDailyPaymentRatio => "max_daily_payment_ratio",
            RuleId::MaxTotalExposure => "max_total_exposure",
        }
    }

    pub(crate) const fn description(self) -> &'static str {
        match self {
            RuleId::MinMonthlyRevenue => "Monthly revenue below minimum threshold",
            RuleId::MinAnnualRevenue => "Annual revenue below minimum threshold",
            RuleId::MaxNsf3m => "NSF count exceeds maximum threshold",
            RuleId::MaxNsfRatio => "NSF ratio too high",
            RuleId::MinAvgBalance => "Average daily balance too low",
            RuleId::BalanceToRevenueRatio => "Balance to revenue ratio too low",
            RuleId::MaxNegativeDays3m => "Too many negative balance days",
            RuleId::CaMinRevenue => "Does not meet CA minimum revenue requirement",
            RuleId::CaMaxNsfRatio => "NSF ratio exceeds CA compliance limit",
            RuleId::MaxDailyPaymentRatio => "Daily payment exceeds sustainable share of revenue",
            RuleId::MaxTotalExposure => "Total exposure exceeds revenue multiple cap",
        }
    }

    /// Snapshot field (or derived ratio) the rule compares against.
    pub(crate) const fn field_name(self) -> &'static str {
        match self {
            RuleId::MinMonthlyRevenue => "avg_monthly_revenue",
            RuleId::MinAnnualRevenue | RuleId::CaMinRevenue => "annual_revenue",
            RuleId::MaxNsf3m => "total_nsf_3m",
            RuleId::MaxNsfRatio | RuleId::CaMaxNsfRatio => "nsf_ratio",
            RuleId::MinAvgBalance => "avg_daily_balance_3m",
            RuleId::BalanceToRevenueRatio => "balance_to_revenue_ratio",
            RuleId::MaxNegativeDays3m => "total_days_negative_3m",
            RuleId::MaxDailyPaymentRatio => "payment_ratio",
            RuleId::MaxTotalExposure => "exposure_ratio",
        }
    }

    /// Risk-score contribution when the rule breaches. Kept as a table parallel
    /// to the thresholds so pricing weight can move without touching limits.
    pub(crate) const fn risk_increment(self) -> f64 {
        match self {
            RuleId::MinMonthlyRevenue | RuleId::MaxNegativeDays3m => 0.30,
            RuleId::MaxNsf3m => 0.25,
            RuleId::MinAvgBalance => 0.20,
            RuleId::MaxNsfRatio | RuleId::BalanceToRevenueRatio => 0.15,
            RuleId::MinAnnualRevenue
            | RuleId::CaMinRevenue
            | RuleId::CaMaxNsfRatio
            | RuleId::MaxDailyPaymentRatio
            | RuleId::MaxTotalExposure => 0.0,
        }
    }
}

/// One catalog entry: the limit a metric is held to and how bad a breach is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleDefinition {
    pub id: RuleId,
    pub threshold: f64,
    pub severity: ViolationSeverity,
}

/// The full rule table. Initialized once, read-only at runtime; evaluation
/// order follows table order for the metric rules.
pub const BASE_RULES: [RuleDefinition; 11] = [
    RuleDefinition {
        id: RuleId::MinMonthlyRevenue,
        threshold: 15_000.0,
        severity: ViolationSeverity::Critical,
    },
    RuleDefinition {
        id: RuleId::MinAnnualRevenue,
        threshold: 180_000.0,
        severity: ViolationSeverity::Critical,
    },
    RuleDefinition {
        id: RuleId::MaxNsf3m,
        threshold: 5.0,
        severity: ViolationSeverity::Critical,
    },
    RuleDefinition {
        id: RuleId::MaxNsfRatio,
        threshold: 0.03,
        severity: ViolationSeverity::Warning,
    },
    RuleDefinition {
        id: RuleId::MinAvgBalance,
        threshold: 5_000.0,
        severity: ViolationSeverity::Warning,
    },
    RuleDefinition {
        id: RuleId::BalanceToRevenueRatio,
        threshold: 0.05,
        severity: ViolationSeverity::Warning,
    },
    RuleDefinition {
        id: RuleId::MaxNegativeDays3m,
        threshold: 15.0,
        severity: ViolationSeverity::Critical,
    },
    RuleDefinition {
        id: RuleId::CaMinRevenue,
        threshold: CA_MIN_ANNUAL_REVENUE,
        severity: ViolationSeverity::Critical,
    },
    RuleDefinition {
        id: RuleId::CaMaxNsfRatio,
        threshold: CA_MAX_NSF_RATIO,
        severity: ViolationSeverity::Critical,
    },
    RuleDefinition {
        id: RuleId::MaxDailyPaymentRatio,
        threshold: 0.15,
        severity: ViolationSeverity::Warning,
    },
    RuleDefinition {
        id: RuleId::MaxTotalExposure,
        threshold: 2.0,
        severity: ViolationSeverity::Warning,
    },
];

pub(crate) fn definition(id: RuleId) -> &'static RuleDefinition {
    BASE_RULES
        .iter()
        .find(|rule| rule.id == id)
        .expect("catalog covers every rule id")
}

pub(crate) fn threshold(id: RuleId) -> f64 {
    definition(id).threshold
}
