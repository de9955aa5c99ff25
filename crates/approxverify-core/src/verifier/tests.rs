use crate::{
    config::VerifierConfig,
    engine::{Engine, MemoryEngine, PlanNode},
    error::{EngineError, ErrorClass},
    expr::{AggregateSpec, Expr},
    table::Table,
    value::Value,
    verifier::{ApproxDistinctVerifier, ResultVerifier, VerifierCapabilities, VerifierPhase},
};
use proptest::prelude::*;
use std::{cell::RefCell, collections::VecDeque};

///
/// StubEngine
///
/// Returns canned tables in order and records every plan it was handed.
///

#[derive(Debug, Default)]
struct StubEngine {
    responses: RefCell<VecDeque<Table>>,
    plans: RefCell<Vec<PlanNode>>,
}

impl StubEngine {
    fn with_responses(responses: Vec<Table>) -> Self {
        Self {
            responses: RefCell::new(responses.into()),
            plans: RefCell::new(Vec::new()),
        }
    }

    fn executed(&self) -> usize {
        self.plans.borrow().len()
    }
}

impl Engine for StubEngine {
    fn execute(&self, plan: &PlanNode) -> Result<Table, EngineError> {
        self.plans.borrow_mut().push(plan.clone());
        self.responses
            .borrow_mut()
            .pop_front()
            .ok_or(EngineError::EmptyInput)
    }
}

fn keys() -> Vec<String> {
    vec!["k".to_string()]
}

fn approx_distinct() -> AggregateSpec {
    AggregateSpec::new("approx_distinct", vec![Expr::column("c0")])
}

// Input where group `g` holds exactly `distinct[g]` distinct `c0` values;
// a zero entry becomes one row with a null `c0`.
fn input_for(distinct: &[i64]) -> Vec<Table> {
    let mut table = Table::new(["k", "c0", "e"]);
    for (group, &count) in distinct.iter().enumerate() {
        let key = Value::Int(i64::try_from(group).expect("group index"));
        if count == 0 {
            table
                .push_row(vec![key, Value::Null, Value::Float(0.1)])
                .expect("row");
            continue;
        }
        for value in 0..count {
            table
                .push_row(vec![key.clone(), Value::Int(value), Value::Float(0.1)])
                .expect("row");
        }
    }

    vec![table]
}

fn candidate_for(counts: &[i64]) -> Table {
    let rows = counts
        .iter()
        .enumerate()
        .map(|(group, &count)| {
            vec![
                Value::Int(i64::try_from(group).expect("group index")),
                Value::Int(count),
            ]
        })
        .collect();

    Table::from_rows(["k", "a0"], rows).expect("candidate")
}

fn ready_verifier(distinct: &[i64]) -> ApproxDistinctVerifier<MemoryEngine> {
    let mut verifier = ApproxDistinctVerifier::new(MemoryEngine);
    verifier
        .initialize(&input_for(distinct), &keys(), &approx_distinct(), "a0")
        .expect("initialize");

    verifier
}

#[test]
fn capabilities_declare_verify_only() {
    let verifier = ApproxDistinctVerifier::new(MemoryEngine);

    assert!(verifier.supports_verify());
    assert!(!verifier.supports_compare());
    assert_eq!(
        verifier.capabilities(),
        VerifierCapabilities {
            compare: false,
            verify: true,
        }
    );
}

#[test]
fn compare_always_fails_as_unsupported() {
    let verifier = ready_verifier(&[3]);
    let result = candidate_for(&[3]);

    let err = verifier
        .compare(&result, &result)
        .expect_err("compare is unsupported");
    assert!(err.is_unsupported());
}

#[test]
fn verify_before_initialize_is_a_contract_violation() {
    let verifier = ApproxDistinctVerifier::new(MemoryEngine);

    let err = verifier
        .verify(&candidate_for(&[1]))
        .expect_err("uninitialized verify");
    assert_eq!(err.class, ErrorClass::NotInitialized);
}

#[test]
fn exact_candidate_passes() {
    let distinct = [1, 5, 100, 0, 42];
    let verifier = ready_verifier(&distinct);

    assert!(verifier.verify(&candidate_for(&distinct)).expect("verify"));
}

#[test]
fn ten_groups_with_one_ten_percent_gap_fail() {
    let distinct = [100; 10];
    let mut candidate = distinct;
    candidate[4] = 110;

    let verifier = ready_verifier(&distinct);
    let report = verifier
        .verify_report(&candidate_for(&candidate))
        .expect("verify");

    assert_eq!(report.outliers.len(), 1);
    assert!(!report.passed());
    assert!(!verifier.verify(&candidate_for(&candidate)).expect("verify"));
}

#[test]
fn sixty_groups_tolerate_three_outliers_but_not_four() {
    let distinct = [100; 60];
    let verifier = ready_verifier(&distinct);

    let mut three = distinct;
    for slot in three.iter_mut().take(3) {
        *slot = 110;
    }
    assert!(verifier.verify(&candidate_for(&three)).expect("verify"));

    let mut four = three;
    four[59] = 90;
    assert!(!verifier.verify(&candidate_for(&four)).expect("verify"));
}

#[test]
fn single_zero_baseline_group_with_nonzero_estimate_fails() {
    let verifier = ready_verifier(&[0]);

    let report = verifier
        .verify_report(&candidate_for(&[5]))
        .expect("verify");
    assert_eq!(report.zero_baseline_violations.len(), 1);
    assert!(!report.passed());
}

#[test]
fn explicit_error_argument_widens_tolerance() {
    let spec = AggregateSpec::new("approx_distinct", vec![Expr::column("c0"), Expr::column("e")]);
    let mut verifier = ApproxDistinctVerifier::new(MemoryEngine);
    verifier
        .initialize(&input_for(&[100; 5]), &keys(), &spec, "a0")
        .expect("initialize");

    let state = verifier.state().expect("ready");
    assert!((state.error() - 0.1).abs() < f64::EPSILON);

    // gap 0.15 < 2 * 0.1
    assert!(
        verifier
            .verify(&candidate_for(&[115, 100, 100, 100, 100]))
            .expect("verify")
    );
}

#[test]
fn mask_is_applied_to_the_baseline() {
    let input = Table::from_rows(
        ["k", "c0", "m"],
        vec![
            vec![Value::Int(0), Value::Int(1), Value::Bool(true)],
            vec![Value::Int(0), Value::Int(2), Value::Bool(false)],
            vec![Value::Int(0), Value::Int(3), Value::Bool(true)],
        ],
    )
    .expect("input");
    let spec = approx_distinct().with_mask(Expr::column("m"));
    let mut verifier = ApproxDistinctVerifier::new(MemoryEngine);
    verifier
        .initialize(&[input], &keys(), &spec, "a0")
        .expect("initialize");

    assert_eq!(
        verifier
            .state()
            .expect("ready")
            .baseline()
            .value(0, "a0"),
        Some(&Value::Int(2))
    );
    assert!(verifier.verify(&candidate_for(&[2])).expect("verify"));
}

#[test]
fn null_grouping_key_reconciles_end_to_end() {
    let input = Table::from_rows(
        ["k", "c0"],
        vec![
            vec![Value::Null, Value::Int(1)],
            vec![Value::Null, Value::Int(2)],
            vec![Value::Int(1), Value::Int(1)],
        ],
    )
    .expect("input");
    let mut verifier = ApproxDistinctVerifier::new(MemoryEngine);
    verifier
        .initialize(&[input], &keys(), &approx_distinct(), "a0")
        .expect("initialize");

    let candidate = Table::from_rows(
        ["k", "a0"],
        vec![
            vec![Value::Int(1), Value::Int(1)],
            vec![Value::Null, Value::Int(2)],
        ],
    )
    .expect("candidate");
    let report = verifier.verify_report(&candidate).expect("verify");

    assert_eq!(report.num_groups, 2);
    assert!(report.passed());
}

#[test]
fn verify_is_repeatable_and_leaves_state_untouched() {
    let distinct = [10, 20, 30];
    let verifier = ready_verifier(&distinct);
    let before = verifier.state().expect("ready").baseline().clone();

    for _ in 0..3 {
        assert!(verifier.verify(&candidate_for(&distinct)).expect("verify"));
    }
    assert_eq!(verifier.state().expect("ready").baseline(), &before);
}

#[test]
fn reset_returns_to_uninitialized() {
    let mut verifier = ready_verifier(&[1]);
    assert!(verifier.is_ready());

    verifier.reset();

    assert!(matches!(verifier.phase(), VerifierPhase::Uninitialized));
    assert!(verifier.verify(&candidate_for(&[1])).is_err());
}

#[test]
fn failed_initialize_keeps_previous_state() {
    let mut verifier = ready_verifier(&[7]);
    let malformed = AggregateSpec::new("approx_distinct", vec![Expr::literal(1_i64)]);

    let err = verifier
        .initialize(&input_for(&[1]), &keys(), &malformed, "a0")
        .expect_err("literal argument");
    assert!(err.is_malformed_aggregate());

    let state = verifier.state().expect("still ready");
    assert_eq!(state.baseline().value(0, "a0"), Some(&Value::Int(7)));
}

#[test]
fn malformed_error_argument_fails_initialize() {
    let spec = AggregateSpec::new("approx_distinct", vec![Expr::column("c0"), Expr::column("nope")]);
    let mut verifier = ApproxDistinctVerifier::new(MemoryEngine);

    let err = verifier
        .initialize(&input_for(&[3]), &keys(), &spec, "a0")
        .expect_err("absent error column");
    assert!(err.is_malformed_aggregate());
    assert!(!verifier.is_ready());
}

#[test]
fn reconciliation_mismatch_is_fatal_not_a_verdict() {
    let verifier = ready_verifier(&[3, 4]);

    let err = verifier
        .verify(&candidate_for(&[3]))
        .expect_err("group 1 missing from candidate");
    assert!(err.is_group_cardinality());
}

#[test]
fn custom_budget_from_config_is_honoured() {
    let config = VerifierConfig {
        large_sample_groups: 5,
        large_sample_outlier_budget: 1,
        ..VerifierConfig::default()
    };
    let mut verifier = ApproxDistinctVerifier::with_config(MemoryEngine, config);
    verifier
        .initialize(&input_for(&[100; 5]), &keys(), &approx_distinct(), "a0")
        .expect("initialize");

    assert!(
        verifier
            .verify(&candidate_for(&[110, 100, 100, 100, 100]))
            .expect("verify")
    );
}

#[test]
fn stub_engine_sees_one_baseline_plan_and_one_plan_per_verify() {
    let baseline = Table::from_rows(
        ["k", "a0"],
        vec![
            vec![Value::Null, Value::Int(10)],
            vec![Value::Int(1), Value::Int(20)],
        ],
    )
    .expect("baseline");
    let combined = || {
        Table::from_rows(
            ["k", "candidate", "baseline"],
            vec![
                vec![Value::Null, Value::Int(10), Value::Int(10)],
                vec![Value::Int(1), Value::Int(20), Value::Int(20)],
            ],
        )
        .expect("combined")
    };
    let engine = StubEngine::with_responses(vec![baseline, combined(), combined()]);
    let candidate = Table::from_rows(
        ["k", "a0"],
        vec![
            vec![Value::Null, Value::Int(10)],
            vec![Value::Int(1), Value::Int(20)],
        ],
    )
    .expect("candidate");

    let mut verifier = ApproxDistinctVerifier::new(&engine);
    verifier
        .initialize(&[Table::new(["k", "c0"])], &keys(), &approx_distinct(), "a0")
        .expect("initialize");
    assert_eq!(engine.executed(), 1);
    assert!(matches!(
        engine.plans.borrow()[0],
        PlanNode::Aggregate { .. }
    ));

    assert!(verifier.verify(&candidate).expect("first verify"));
    assert!(verifier.verify(&candidate).expect("second verify"));
    assert_eq!(engine.executed(), 3, "baseline must not be recomputed per verify");
}

#[test]
fn stub_engine_null_entry_is_a_cardinality_error() {
    let baseline = Table::from_rows(["k", "a0"], vec![vec![Value::Int(1), Value::Int(3)]])
        .expect("baseline");
    let combined = Table::from_rows(
        ["k", "candidate", "baseline"],
        vec![vec![Value::Int(1), Value::Int(3), Value::Null]],
    )
    .expect("combined");
    let engine = StubEngine::with_responses(vec![baseline, combined]);

    let mut verifier = ApproxDistinctVerifier::new(&engine);
    verifier
        .initialize(&[Table::new(["k", "c0"])], &keys(), &approx_distinct(), "a0")
        .expect("initialize");

    let err = verifier
        .verify(&candidate_for(&[3]))
        .expect_err("null baseline entry");
    assert!(err.is_group_cardinality());
}

fn arb_key() -> impl Strategy<Value = Value> {
    prop_oneof![Just(Value::Null), (0_i64..4).prop_map(Value::Int)]
}

proptest! {
    #[test]
    fn null_keyed_groups_always_pair_up(
        rows in prop::collection::vec((arb_key(), arb_key(), 0_i64..20), 1..80),
    ) {
        let input = Table::from_rows(
            ["k1", "k2", "c0"],
            rows.into_iter().map(|(k1, k2, c)| vec![k1, k2, Value::Int(c)]).collect(),
        ).expect("input");
        let grouping = vec!["k1".to_string(), "k2".to_string()];

        let mut verifier = ApproxDistinctVerifier::new(MemoryEngine);
        verifier.initialize(&[input], &grouping, &approx_distinct(), "a0").expect("initialize");

        // Feeding the exact baseline back as the candidate, in reverse order,
        // must reconcile every group, including ones keyed by nulls.
        let baseline = verifier.state().expect("ready").baseline().clone();
        let mut reversed = Table::new(baseline.columns().iter().cloned());
        for row in baseline.rows().iter().rev() {
            reversed.push_row(row.clone()).expect("row");
        }

        let report = verifier.verify_report(&reversed).expect("verify");
        prop_assert_eq!(report.num_groups, baseline.len());
        prop_assert!(report.passed());
    }
}
