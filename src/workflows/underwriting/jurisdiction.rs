use super::catalog::RuleId;
use super::domain::RuleViolation;

/// CA Commercial Financing Disclosure thresholds. The catalog's `ca_*` entries
/// reference the same constants so the two tables cannot drift.
pub(crate) const CA_MIN_ANNUAL_REVENUE: f64 = 50_000.0;
pub(crate) const CA_MAX_NSF_RATIO: f64 = 0.05;
pub(crate) const CA_MAX_APPROX_APR: f64 = 0.36;

/// Hard limits a state layers on top of the base catalog. Breaches are always
/// critical and strip compliance regardless of the base risk score.
#[derive(Debug, Clone, PartialEq)]
pub struct JurisdictionOverlay {
    pub code: &'static str,
    pub min_annual_revenue: f64,
    pub max_nsf_ratio: f64,
    pub max_approx_apr: f64,
}

pub const CALIFORNIA: JurisdictionOverlay = JurisdictionOverlay {
    code: "CA",
    min_annual_revenue: CA_MIN_ANNUAL_REVENUE,
    max_nsf_ratio: CA_MAX_NSF_RATIO,
    max_approx_apr: CA_MAX_APPROX_APR,
};

static REGISTRY: [JurisdictionOverlay; 1] = [CALIFORNIA];

/// Look up the overlay for a jurisdiction code. Unknown codes get no overlay,
/// which leaves evaluations trivially compliant.
pub fn overlay_for(code: &str) -> Option<&'static JurisdictionOverlay> {
    REGISTRY.iter().find(|overlay| overlay.code == code)
}

impl JurisdictionOverlay {
    /// Apply the overlay's metric limits, appending critical violations for
    /// each breach. Returns whether the snapshot stayed compliant.
    pub(crate) fn check_metrics(
        &self,
        annual_revenue: f64,
        nsf_ratio: f64,
        violations: &mut Vec<RuleViolation>,
    ) -> bool {
        let mut compliant = true;

        if annual_revenue < self.min_annual_revenue {
            violations.push(RuleViolation::breach(RuleId::CaMinRevenue, annual_revenue));
            compliant = false;
        }

        if nsf_ratio > self.max_nsf_ratio {
            violations.push(RuleViolation::breach(RuleId::CaMaxNsfRatio, nsf_ratio));
            compliant = false;
        }

        compliant
    }
}
