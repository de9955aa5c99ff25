use crate::{
    engine::{AggregateCall, AggregateFunction, Engine, PlanBuilder, PlanNode},
    error::{ErrorOrigin, VerifierError},
    expr::{AggregateSpec, Expr},
    table::Table,
};
use tracing::debug;

/// Translate `approx_distinct(x[, e]) [filter (where m)]` into the exact
/// `count(distinct x) [filter (where m)]`, aliased to `output_name`.
///
/// The mask is copied verbatim so both aggregates see the same rows.
pub(crate) fn count_distinct_call(
    aggregate: &AggregateSpec,
    output_name: &str,
) -> Result<AggregateCall, VerifierError> {
    let Some(first) = aggregate.args().first() else {
        return Err(VerifierError::malformed_aggregate(
            ErrorOrigin::Baseline,
            format!("{aggregate} has no arguments"),
        ));
    };
    let Some(column) = first.as_column() else {
        return Err(VerifierError::malformed_aggregate(
            ErrorOrigin::Baseline,
            format!("first argument of {aggregate} must be a column reference, found {first}"),
        ));
    };

    Ok(AggregateCall::new(
        AggregateFunction::CountDistinct(Expr::column(column)),
        output_name,
    )
    .with_mask(aggregate.mask().cloned()))
}

/// Build the exact baseline plan over the original input batches.
pub(crate) fn baseline_plan(
    input: &[Table],
    grouping_keys: &[String],
    aggregate: &AggregateSpec,
    output_name: &str,
) -> Result<PlanNode, VerifierError> {
    let call = count_distinct_call(aggregate, output_name)?;

    Ok(PlanBuilder::values(input.to_vec())
        .aggregate(grouping_keys, vec![call])
        .build())
}

/// Compute the exact baseline: grouping keys followed by one count column
/// named `output_name`.
pub(crate) fn compute_baseline<G: Engine>(
    engine: &G,
    input: &[Table],
    grouping_keys: &[String],
    aggregate: &AggregateSpec,
    output_name: &str,
) -> Result<Table, VerifierError> {
    let plan = baseline_plan(input, grouping_keys, aggregate, output_name)?;
    let baseline = engine
        .execute(&plan)
        .map_err(|err| VerifierError::engine(ErrorOrigin::Baseline, err))?;

    debug!(
        aggregate = %aggregate,
        groups = baseline.len(),
        "computed count(distinct) baseline"
    );

    Ok(baseline)
}

///
/// TESTS
///
