use crate::value::Value;
use serde::Serialize;

///
/// GapOutlier
///
/// One group whose relative gap exceeded the threshold. Unusual but not by
/// itself a bug.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GapOutlier {
    pub group: usize,
    pub key: Vec<Value>,
    pub candidate: i64,
    pub baseline: i64,
    pub gap: f64,
}

///
/// ZeroBaselineViolation
///
/// A group with no distinct values for which the estimator still reported a
/// non-zero count. Always fails verification.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ZeroBaselineViolation {
    pub group: usize,
    pub key: Vec<Value>,
    pub candidate: i64,
}

///
/// VerificationReport
///
/// Full outcome of one `verify` call; `passed` is the boolean verdict handed
/// back to the fuzz harness.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VerificationReport {
    pub num_groups: usize,
    pub error: f64,
    pub gap_threshold: f64,
    pub outlier_budget: usize,
    pub outliers: Vec<GapOutlier>,
    pub zero_baseline_violations: Vec<ZeroBaselineViolation>,
}

impl VerificationReport {
    /// Pass iff no zero-baseline violation and outliers within budget.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.zero_baseline_violations.is_empty() && self.outliers.len() <= self.outlier_budget
    }
}
