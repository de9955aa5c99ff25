//! Module: verifier
//! Responsibility: fuzz-harness result verifiers and their shared contract.
//! Does not own: plan execution (see `engine`).
//! Boundary: harness calls `initialize` → `verify`* → `reset` per iteration.

mod approx_distinct;
mod baseline;
mod error_extract;
mod judge;
mod reconcile;
mod report;

#[cfg(test)]
mod tests;

use crate::{error::VerifierError, expr::AggregateSpec, table::Table};

// re-exports
pub use approx_distinct::{ApproxDistinctVerifier, VerifierPhase, VerifierState};
pub use reconcile::GroupPair;
pub use report::{GapOutlier, VerificationReport, ZeroBaselineViolation};

///
/// VerifierCapabilities
///
/// Declared operation support. Callers branch on these before invoking
/// `compare` or `verify`; unsupported operations fail explicitly.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct VerifierCapabilities {
    pub compare: bool,
    pub verify: bool,
}

///
/// ResultVerifier
///
/// Custom result check for aggregates whose output cannot be compared for
/// exact equality. One instance serves one fuzz iteration at a time and is
/// not meant to be shared across threads while in use.
///

pub trait ResultVerifier {
    /// Whether `compare` of two arbitrary results is supported.
    fn supports_compare(&self) -> bool;

    /// Whether single-run `verify` against a computed baseline is supported.
    fn supports_verify(&self) -> bool;

    fn capabilities(&self) -> VerifierCapabilities {
        VerifierCapabilities {
            compare: self.supports_compare(),
            verify: self.supports_verify(),
        }
    }

    /// Prepare for verifying results of `aggregate` over `input`, grouped by
    /// `grouping_keys`; `aggregate_name` is the aggregate's output column.
    fn initialize(
        &mut self,
        input: &[Table],
        grouping_keys: &[String],
        aggregate: &AggregateSpec,
        aggregate_name: &str,
    ) -> Result<(), VerifierError>;

    /// Compare two results of the same query.
    fn compare(&self, result: &Table, alt_result: &Table) -> Result<bool, VerifierError>;

    /// Check one result against the state prepared by `initialize`.
    fn verify(&self, result: &Table) -> Result<bool, VerifierError>;

    /// Drop everything `initialize` prepared.
    fn reset(&mut self);
}
