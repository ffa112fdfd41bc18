use serde::Serialize;
use uuid::Uuid;

use super::domain::{
    Decision, EvaluationResult, FinancialMetrics, Offer, OfferOverrides, OfferTier,
};
use super::evaluation::GuardrailEngine;
use super::terms;

/// Standard three-tier pricing ladder: larger advances carry longer terms and
/// higher fees.
pub const DEFAULT_TIERS: [OfferTier; 3] = [
    OfferTier {
        factor: 0.8,
        fee_rate: 1.15,
        term_days: 90,
        buy_rate: Some(1.12),
    },
    OfferTier {
        factor: 1.0,
        fee_rate: 1.20,
        term_days: 120,
        buy_rate: Some(1.16),
    },
    OfferTier {
        factor: 1.2,
        fee_rate: 1.25,
        term_days: 150,
        buy_rate: Some(1.20),
    },
];

const MAX_OFFERS: usize = 3;
// Risk never shaves more than 30% off an amount.
const RISK_DAMPING: f64 = 0.3;

/// Priced tiers together with the evaluation that produced (or withheld) them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OfferBundle {
    pub offers: Vec<Offer>,
    pub evaluation: EvaluationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Tier pricer sitting on top of the guardrail engine. Offers are only priced
/// for approved and conditional evaluations; declines and manual reviews come
/// back empty with the evaluation trail attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfferEngine {
    guardrails: GuardrailEngine,
}

impl OfferEngine {
    pub fn new(guardrails: GuardrailEngine) -> Self {
        Self { guardrails }
    }

    /// Generate up to three priced offers for a snapshot. Callers must ensure
    /// `avg_monthly_revenue` is positive before invoking; the low-revenue rule
    /// already declines zero-revenue snapshots upstream.
    pub fn generate(
        &self,
        metrics: &FinancialMetrics,
        overrides: Option<&OfferOverrides>,
        jurisdiction: &str,
    ) -> OfferBundle {
        let evaluation = self.guardrails.evaluate(metrics, jurisdiction);

        match evaluation.decision {
            Decision::Declined => {
                return OfferBundle {
                    offers: Vec::new(),
                    evaluation,
                    message: None,
                };
            }
            Decision::ManualReview => {
                return OfferBundle {
                    offers: Vec::new(),
                    evaluation,
                    message: Some(
                        "This application requires manual underwriting review before offers \
                         can be generated"
                            .to_string(),
                    ),
                };
            }
            Decision::Approved | Decision::Conditional => {}
        }

        let tiers: &[OfferTier] = match overrides {
            Some(overrides) if !overrides.tiers.is_empty() => &overrides.tiers,
            _ => &DEFAULT_TIERS,
        };

        let offers = tiers
            .iter()
            .take(MAX_OFFERS)
            .enumerate()
            .map(|(index, tier)| {
                price_tier(
                    index,
                    tier,
                    metrics.avg_monthly_revenue,
                    &evaluation,
                    jurisdiction,
                )
            })
            .collect();

        OfferBundle {
            offers,
            evaluation,
            message: None,
        }
    }
}

fn price_tier(
    index: usize,
    tier: &OfferTier,
    revenue: f64,
    evaluation: &EvaluationResult,
    jurisdiction: &str,
) -> Offer {
    let mut base_amount = revenue * tier.factor;
    if let Some(cap) = evaluation.max_offer_amount {
        base_amount = base_amount.min(cap);
    }

    let adjusted = base_amount * (1.0 - evaluation.risk_score * RISK_DAMPING);
    // Round down to the nearest $100; never offer more than computed.
    let amount = ((adjusted / 100.0).floor() * 100.0) as u64;

    let payback_amount = amount as f64 * tier.fee_rate;
    let daily_payment = if tier.term_days > 0 {
        payback_amount / f64::from(tier.term_days)
    } else {
        0.0
    };
    let expected_margin = tier
        .buy_rate
        .map(|buy_rate| ((tier.fee_rate - buy_rate) * amount as f64) as i64);

    let validation = terms::validate_terms(
        amount as f64,
        tier.fee_rate,
        tier.term_days,
        revenue,
        jurisdiction,
    );

    Offer {
        id: Uuid::new_v4().to_string(),
        tier: (index + 1) as u8,
        amount,
        factor: tier.factor,
        fee_rate: tier.fee_rate,
        buy_rate: tier.buy_rate,
        expected_margin,
        payback_amount: payback_amount as u64,
        term_days: tier.term_days,
        daily_payment: daily_payment as u64,
        risk_score: (evaluation.risk_score * 100.0).round() / 100.0,
        decision: evaluation.decision,
        terms_compliant: validation.valid,
        compliance_issues: validation.issues,
        rationale: format!(
            "Based on ${}/month revenue, {}-day term",
            group_thousands(revenue as u64),
            tier.term_days
        ),
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (offset, digit) in digits.chars().enumerate() {
        if offset > 0 && (digits.len() - offset) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}
