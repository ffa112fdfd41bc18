use crate::workflows::underwriting::terms::validate_terms;

#[test]
fn flags_ca_apr_and_payment_concentration() {
    let validation = validate_terms(50_000.0, 1.5, 90, 40_000.0, "CA");

    assert!(!validation.valid);
    assert!(validation
        .issues
        .iter()
        .any(|issue| issue.contains("CA APR limits")));
    assert!(validation
        .issues
        .iter()
        .any(|issue| issue.contains("Daily payment ratio")));
    // (1.5 - 1.0) * 365 / 90 is roughly 203% APR-equivalent.
    assert!((validation.breakdown.approximate_apr - 2.0278).abs() < 1e-3);
}

#[test]
fn passes_sustainable_terms() {
    let validation = validate_terms(30_000.0, 1.2, 365, 40_000.0, "CA");

    assert!(validation.valid, "issues: {:?}", validation.issues);
    assert!((validation.breakdown.approximate_apr - 0.2).abs() < 1e-9);
    assert!(validation.breakdown.payment_ratio < 0.15);
}

#[test]
fn flags_exposure_above_revenue_multiple() {
    let validation = validate_terms(90_000.0, 1.1, 365, 40_000.0, "CA");

    assert!(!validation.valid);
    assert!(validation
        .issues
        .iter()
        .any(|issue| issue.contains("Total exposure ratio")));
    assert!((validation.breakdown.exposure_ratio - 2.25).abs() < 1e-9);
}

#[test]
fn zero_revenue_resolves_ratios_to_zero() {
    let validation = validate_terms(10_000.0, 1.3, 120, 0.0, "CA");

    assert!((validation.breakdown.payment_ratio - 0.0).abs() < f64::EPSILON);
    assert!((validation.breakdown.exposure_ratio - 0.0).abs() < f64::EPSILON);
    // The APR cap still applies; it needs no revenue.
    assert!(!validation.valid);
    assert_eq!(validation.issues.len(), 1);
}

#[test]
fn zero_term_days_skips_per_day_math() {
    let validation = validate_terms(10_000.0, 1.3, 0, 30_000.0, "CA");

    assert!((validation.breakdown.daily_payment - 0.0).abs() < f64::EPSILON);
    assert!((validation.breakdown.approximate_apr - 0.0).abs() < f64::EPSILON);
    assert!(validation.valid, "issues: {:?}", validation.issues);
}

#[test]
fn apr_cap_only_applies_in_registered_jurisdictions() {
    let elsewhere = validate_terms(50_000.0, 1.5, 90, 400_000.0, "TX");
    assert!(
        elsewhere.valid,
        "no APR cap outside the registry: {:?}",
        elsewhere.issues
    );

    let california = validate_terms(50_000.0, 1.5, 90, 400_000.0, "CA");
    assert!(!california.valid);
}
