use crate::{
    config::VerifierConfig,
    verifier::{
        reconcile::{GroupPair, display_key},
        report::{GapOutlier, VerificationReport, ZeroBaselineViolation},
    },
};
use tracing::{error, info, warn};

/// Relative gap `|candidate - baseline| / baseline`; `baseline` must be > 0.
#[must_use]
#[expect(clippy::cast_precision_loss)]
pub(crate) fn relative_gap(candidate: i64, baseline: i64) -> f64 {
    candidate.abs_diff(baseline) as f64 / baseline as f64
}

/// Judge aligned pairs against tolerance `error`.
///
/// Every group is evaluated so the report lists all offenders, but a single
/// zero-baseline violation already fixes the verdict to a failure.
pub(crate) fn judge(
    pairs: &[GroupPair],
    error: f64,
    config: &VerifierConfig,
) -> VerificationReport {
    let num_groups = pairs.len();
    let gap_threshold = config.gap_threshold(error);
    let mut outliers = Vec::new();
    let mut zero_baseline_violations = Vec::new();

    for (group, pair) in pairs.iter().enumerate() {
        if pair.candidate == pair.baseline {
            continue;
        }

        if pair.baseline > 0 {
            let gap = relative_gap(pair.candidate, pair.baseline);
            if gap > gap_threshold {
                warn!(
                    error,
                    gap,
                    candidate = pair.candidate,
                    baseline = pair.baseline,
                    key = %display_key(&pair.key),
                    "approx_distinct(x, {error}) is more than {} stddev away from count(distinct x). \
                     Difference: {gap}, approx_distinct: {}, count(distinct): {}. \
                     This is unusual, but doesn't necessarily indicate a bug.",
                    config.gap_stddevs,
                    pair.candidate,
                    pair.baseline,
                );
                outliers.push(GapOutlier {
                    group,
                    key: pair.key.clone(),
                    candidate: pair.candidate,
                    baseline: pair.baseline,
                    gap,
                });
            }
        } else {
            error!(
                error,
                candidate = pair.candidate,
                baseline = pair.baseline,
                key = %display_key(&pair.key),
                "count(distinct x) returned {}, but approx_distinct(x, {error}) is {}",
                pair.baseline,
                pair.candidate,
            );
            zero_baseline_violations.push(ZeroBaselineViolation {
                group,
                key: pair.key.clone(),
                candidate: pair.candidate,
            });
        }
    }

    let report = VerificationReport {
        num_groups,
        error,
        gap_threshold,
        outlier_budget: config.outlier_budget(num_groups),
        outliers,
        zero_baseline_violations,
    };

    if !report.passed() {
        info!(
            num_groups,
            outliers = report.outliers.len(),
            outlier_budget = report.outlier_budget,
            zero_baseline_violations = report.zero_baseline_violations.len(),
            "approx_distinct result failed verification"
        );
    }

    report
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::{judge, relative_gap};
    use crate::{
        config::VerifierConfig,
        value::Value,
        verifier::reconcile::GroupPair,
    };
    use proptest::prelude::*;

    const EPS: f64 = 0.023;

    fn pair(group: i64, candidate: i64, baseline: i64) -> GroupPair {
        GroupPair {
            key: vec![Value::Int(group)],
            candidate,
            baseline,
        }
    }

    // `n` exact groups of count 100, with the first `outliers` bumped to 110.
    fn pairs_with_outliers(n: usize, outliers: usize) -> Vec<GroupPair> {
        (0..n)
            .map(|i| {
                let group = i64::try_from(i).expect("group index");
                let candidate = if i < outliers { 110 } else { 100 };
                pair(group, candidate, 100)
            })
            .collect()
    }

    #[test]
    fn relative_gap_is_symmetric_in_direction() {
        assert!((relative_gap(110, 100) - 0.10).abs() < 1e-12);
        assert!((relative_gap(90, 100) - 0.10).abs() < 1e-12);
    }

    #[test]
    fn small_sample_single_outlier_fails() {
        let report = judge(&pairs_with_outliers(10, 1), EPS, &VerifierConfig::default());

        assert_eq!(report.outliers.len(), 1);
        assert_eq!(report.outlier_budget, 0);
        assert!(!report.passed());
    }

    #[test]
    fn large_sample_allows_three_outliers_not_four() {
        let config = VerifierConfig::default();

        assert!(judge(&pairs_with_outliers(60, 3), EPS, &config).passed());
        assert!(!judge(&pairs_with_outliers(60, 4), EPS, &config).passed());
    }

    #[test]
    fn threshold_boundary_is_exclusive() {
        // gap 0.04 < 0.046: within tolerance even for one group.
        let report = judge(&[pair(0, 104, 100)], EPS, &VerifierConfig::default());
        assert!(report.outliers.is_empty());
        assert!(report.passed());

        // gap 0.05 > 0.046.
        let report = judge(&[pair(0, 95, 100)], EPS, &VerifierConfig::default());
        assert_eq!(report.outliers.len(), 1);
    }

    #[test]
    fn zero_baseline_with_nonzero_candidate_fails_immediately() {
        let report = judge(&[pair(0, 5, 0)], EPS, &VerifierConfig::default());

        assert_eq!(report.zero_baseline_violations.len(), 1);
        assert_eq!(report.zero_baseline_violations[0].candidate, 5);
        assert!(!report.passed());
    }

    #[test]
    fn outliers_record_group_position_and_key() {
        let report = judge(
            &[pair(7, 100, 100), pair(8, 150, 100)],
            EPS,
            &VerifierConfig::default(),
        );

        assert_eq!(report.outliers.len(), 1);
        let outlier = &report.outliers[0];
        assert_eq!(outlier.group, 1);
        assert_eq!(outlier.key, vec![Value::Int(8)]);
        assert!((outlier.gap - 0.5).abs() < 1e-12);
    }

    #[test]
    fn empty_pairs_pass() {
        let report = judge(&[], EPS, &VerifierConfig::default());

        assert_eq!(report.num_groups, 0);
        assert!(report.passed());
    }

    #[test]
    fn report_serializes_for_failure_bundles() {
        let report = judge(&pairs_with_outliers(2, 1), EPS, &VerifierConfig::default());
        let json = serde_json::to_value(&report).expect("serialize report");

        assert_eq!(json["num_groups"], 2);
        assert_eq!(json["outliers"][0]["candidate"], 110);
    }

    proptest! {
        #[test]
        fn exact_counts_always_pass(
            counts in prop::collection::vec(0_i64..1_000_000, 0..200),
            error in 0.001_f64..0.5,
        ) {
            let pairs = counts
                .iter()
                .enumerate()
                .map(|(i, &c)| pair(i64::try_from(i).expect("index"), c, c))
                .collect::<Vec<_>>();

            prop_assert!(judge(&pairs, error, &VerifierConfig::default()).passed());
        }

        #[test]
        fn zero_baseline_violation_fails_for_any_size_and_error(
            n in 1_usize..200,
            bad in 0_usize..200,
            candidate in 1_i64..1_000,
            error in 0.001_f64..0.5,
        ) {
            let bad = bad % n;
            let mut pairs = pairs_with_outliers(n, 0);
            pairs[bad] = pair(0, candidate, 0);

            prop_assert!(!judge(&pairs, error, &VerifierConfig::default()).passed());
        }

        #[test]
        fn small_samples_tolerate_no_outlier(n in 1_usize..50, outliers in 1_usize..50) {
            let outliers = outliers.min(n);
            let report = judge(&pairs_with_outliers(n, outliers), EPS, &VerifierConfig::default());

            prop_assert!(!report.passed());
        }

        #[test]
        fn large_samples_use_a_fixed_budget(n in 50_usize..500, outliers in 0_usize..10) {
            let report = judge(&pairs_with_outliers(n, outliers), EPS, &VerifierConfig::default());

            prop_assert_eq!(report.passed(), outliers <= 3);
        }
    }
}
