use crate::{
    config::VerifierConfig,
    engine::Engine,
    error::VerifierError,
    expr::AggregateSpec,
    table::Table,
    verifier::{
        ResultVerifier, baseline::compute_baseline, error_extract::extract_error, judge::judge,
        reconcile::reconcile, report::VerificationReport,
    },
};
use tracing::debug;

///
/// VerifierState
///
/// Everything `initialize` resolves for one aggregate invocation. Immutable
/// until the next `reset` or `initialize`.
///

#[derive(Clone, Debug)]
pub struct VerifierState {
    baseline: Table,
    grouping_keys: Vec<String>,
    aggregate_name: String,
    error: f64,
}

impl VerifierState {
    /// Exact baseline: grouping keys plus one count column named after the aggregate.
    #[must_use]
    pub const fn baseline(&self) -> &Table {
        &self.baseline
    }

    #[must_use]
    pub fn grouping_keys(&self) -> &[String] {
        &self.grouping_keys
    }

    #[must_use]
    pub fn aggregate_name(&self) -> &str {
        &self.aggregate_name
    }

    /// Resolved tolerance ε.
    #[must_use]
    pub const fn error(&self) -> f64 {
        self.error
    }
}

///
/// VerifierPhase
///

#[derive(Clone, Debug, Default)]
pub enum VerifierPhase {
    #[default]
    Uninitialized,
    Ready(VerifierState),
}

///
/// ApproxDistinctVerifier
///
/// Verifies `approx_distinct(x[, e])` results against `count(distinct x)`.
///
/// Per group, a relative gap above `2e` is a large-gap outlier. With at least
/// 50 groups up to 3 outliers are tolerated; smaller results tolerate none.
/// A non-zero estimate for a group whose exact count is zero always fails.
///

#[derive(Debug)]
pub struct ApproxDistinctVerifier<G: Engine> {
    engine: G,
    config: VerifierConfig,
    phase: VerifierPhase,
}

impl<G: Engine> ApproxDistinctVerifier<G> {
    #[must_use]
    pub fn new(engine: G) -> Self {
        Self::with_config(engine, VerifierConfig::default())
    }

    #[must_use]
    pub const fn with_config(engine: G, config: VerifierConfig) -> Self {
        Self {
            engine,
            config,
            phase: VerifierPhase::Uninitialized,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &VerifierConfig {
        &self.config
    }

    #[must_use]
    pub const fn phase(&self) -> &VerifierPhase {
        &self.phase
    }

    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self.phase, VerifierPhase::Ready(_))
    }

    #[must_use]
    pub const fn state(&self) -> Option<&VerifierState> {
        match &self.phase {
            VerifierPhase::Ready(state) => Some(state),
            VerifierPhase::Uninitialized => None,
        }
    }

    /// Reconcile `result` with the baseline and judge it, returning the full report.
    pub fn verify_report(&self, result: &Table) -> Result<VerificationReport, VerifierError> {
        let Some(state) = self.state() else {
            return Err(VerifierError::not_initialized(
                "verify called before initialize",
            ));
        };

        let pairs = reconcile(
            &self.engine,
            &state.baseline,
            result,
            &state.grouping_keys,
            &state.aggregate_name,
        )?;

        Ok(judge(&pairs, state.error, &self.config))
    }
}

impl<G: Engine> ResultVerifier for ApproxDistinctVerifier<G> {
    fn supports_compare(&self) -> bool {
        false
    }

    fn supports_verify(&self) -> bool {
        true
    }

    fn initialize(
        &mut self,
        input: &[Table],
        grouping_keys: &[String],
        aggregate: &AggregateSpec,
        aggregate_name: &str,
    ) -> Result<(), VerifierError> {
        let baseline = compute_baseline(
            &self.engine,
            input,
            grouping_keys,
            aggregate,
            aggregate_name,
        )?;
        let error = extract_error(aggregate, input, &self.config)?;

        if self.is_ready() {
            debug!(aggregate = %aggregate, "re-initializing verifier; previous baseline dropped");
        }
        debug!(
            aggregate = %aggregate,
            error,
            groups = baseline.len(),
            "approx_distinct verifier ready"
        );

        self.phase = VerifierPhase::Ready(VerifierState {
            baseline,
            grouping_keys: grouping_keys.to_vec(),
            aggregate_name: aggregate_name.to_string(),
            error,
        });

        Ok(())
    }

    fn compare(&self, _result: &Table, _alt_result: &Table) -> Result<bool, VerifierError> {
        Err(VerifierError::unsupported(
            "approx_distinct verifier does not support compare",
        ))
    }

    fn verify(&self, result: &Table) -> Result<bool, VerifierError> {
        self.verify_report(result).map(|report| report.passed())
    }

    fn reset(&mut self) {
        if self.is_ready() {
            debug!("approx_distinct verifier reset");
        }
        self.phase = VerifierPhase::Uninitialized;
    }
}
