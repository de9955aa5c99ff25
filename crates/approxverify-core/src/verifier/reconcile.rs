//! Pairs baseline and candidate counts per group without an equality join.
//!
//! Equality joins drop rows whose key columns contain nulls, so both sides
//! are tagged with a label, unioned, grouped on the keys (nulls group
//! together), folded into a label→count map per group, and pivoted back into
//! two parallel columns.

use crate::{
    engine::{AggregateCall, AggregateFunction, Engine, PlanBuilder, PlanNode},
    error::{ErrorOrigin, VerifierError},
    expr::Expr,
    table::Table,
    value::Value,
};
use serde::Serialize;

pub(crate) const BASELINE_LABEL: &str = "baseline";
pub(crate) const CANDIDATE_LABEL: &str = "candidate";

// Internal column names; prefixed to stay clear of user grouping keys.
const LABEL_COLUMN: &str = "__approxverify_label";
const PAIRS_COLUMN: &str = "__approxverify_pairs";
const CANDIDATE_COLUMN: &str = "__approxverify_candidate";
const BASELINE_COLUMN: &str = "__approxverify_baseline";

///
/// GroupPair
///
/// Aligned counts for one distinct group.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GroupPair {
    pub key: Vec<Value>,
    pub candidate: i64,
    pub baseline: i64,
}

// Narrow one side to `keys + count` in a fixed order, then tag it.
fn labeled_source(
    table: &Table,
    grouping_keys: &[String],
    count_column: &str,
    label: &str,
) -> PlanNode {
    let columns = grouping_keys
        .iter()
        .map(String::as_str)
        .chain(std::iter::once(count_column))
        .map(|name| (name.to_string(), Expr::column(name)))
        .collect::<Vec<_>>();

    PlanBuilder::values(vec![table.clone()])
        .project(columns)
        .append_columns(vec![(LABEL_COLUMN, Expr::literal(label))])
        .build()
}

/// Build the union → group → pivot plan.
///
/// Output columns: the grouping keys, then candidate and baseline counts.
pub(crate) fn reconcile_plan(
    baseline: &Table,
    candidate: &Table,
    grouping_keys: &[String],
    count_column: &str,
) -> PlanNode {
    let sources = vec![
        labeled_source(baseline, grouping_keys, count_column, BASELINE_LABEL),
        labeled_source(candidate, grouping_keys, count_column, CANDIDATE_LABEL),
    ];

    let pairs = AggregateCall::new(
        AggregateFunction::MapAgg {
            key: Expr::column(LABEL_COLUMN),
            value: Expr::column(count_column),
        },
        PAIRS_COLUMN,
    );

    let mut projection = grouping_keys
        .iter()
        .map(|key| (key.clone(), Expr::column(key.as_str())))
        .collect::<Vec<_>>();
    projection.push((
        CANDIDATE_COLUMN.to_string(),
        Expr::subscript(Expr::column(PAIRS_COLUMN), CANDIDATE_LABEL),
    ));
    projection.push((
        BASELINE_COLUMN.to_string(),
        Expr::subscript(Expr::column(PAIRS_COLUMN), BASELINE_LABEL),
    ));

    PlanBuilder::union(sources)
        .aggregate(grouping_keys, vec![pairs])
        .project(projection)
        .build()
}

/// Align baseline and candidate counts, one pair per distinct group.
///
/// Fails with a group-cardinality error when the two sides disagree on the
/// grouping domain: a group missing on either side, or more reconciled groups
/// than candidate rows (duplicate or extra groups).
pub(crate) fn reconcile<G: Engine>(
    engine: &G,
    baseline: &Table,
    candidate: &Table,
    grouping_keys: &[String],
    count_column: &str,
) -> Result<Vec<GroupPair>, VerifierError> {
    let plan = reconcile_plan(baseline, candidate, grouping_keys, count_column);
    let combined = engine
        .execute(&plan)
        .map_err(|err| VerifierError::engine(ErrorOrigin::Reconciler, err))?;

    let num_groups = candidate.len();
    if combined.len() != num_groups {
        return Err(VerifierError::group_cardinality(format!(
            "reconciled {} groups but the candidate has {num_groups} rows",
            combined.len()
        )));
    }

    let key_width = grouping_keys.len();
    combined
        .rows()
        .iter()
        .map(|row| {
            let key = row[..key_width].to_vec();
            let candidate = count_at(&row[key_width], CANDIDATE_LABEL, &key)?;
            let baseline = count_at(&row[key_width + 1], BASELINE_LABEL, &key)?;

            Ok(GroupPair {
                key,
                candidate,
                baseline,
            })
        })
        .collect()
}

fn count_at(value: &Value, label: &str, key: &[Value]) -> Result<i64, VerifierError> {
    match value {
        Value::Int(count) if *count >= 0 => Ok(*count),
        Value::Int(count) => Err(VerifierError::invalid_result(
            ErrorOrigin::Reconciler,
            format!(
                "{label} count for group {} is negative: {count}",
                display_key(key)
            ),
        )),
        Value::Null => Err(VerifierError::group_cardinality(format!(
            "{label} count for group {} is null or the group is missing from the {label} side",
            display_key(key)
        ))),
        other => Err(VerifierError::invalid_result(
            ErrorOrigin::Reconciler,
            format!(
                "{label} count for group {} must be an integer, found {other}",
                display_key(key)
            ),
        )),
    }
}

pub(crate) fn display_key(key: &[Value]) -> String {
    let parts = key.iter().map(ToString::to_string).collect::<Vec<_>>();
    format!("({})", parts.join(", "))
}

///
/// TESTS
///
