use crate::{
    engine::{
        Engine,
        group_key::{DistinctValues, GroupKey, GroupKeyMap},
        plan::{AggregateCall, AggregateFunction, PlanNode},
    },
    error::EngineError,
    expr::Expr,
    table::{Row, Table},
    value::Value,
};
use std::collections::BTreeSet;

///
/// MemoryEngine
///
/// Single-threaded, fully materializing reference engine. Every plan node is
/// evaluated eagerly into a `Table`; there is no spilling or parallelism.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct MemoryEngine;

impl MemoryEngine {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Engine for MemoryEngine {
    fn execute(&self, plan: &PlanNode) -> Result<Table, EngineError> {
        match plan {
            PlanNode::Values(tables) => Table::concat(tables),
            PlanNode::Union(sources) => {
                let tables = sources
                    .iter()
                    .map(|source| self.execute(source))
                    .collect::<Result<Vec<_>, _>>()?;
                Table::concat(&tables)
            }
            PlanNode::AppendColumns { input, columns } => {
                let input = self.execute(input)?;
                append_columns(input, columns)
            }
            PlanNode::Project { input, columns } => {
                let input = self.execute(input)?;
                project(&input, columns)
            }
            PlanNode::Aggregate {
                input,
                keys,
                aggregates,
            } => {
                let input = self.execute(input)?;
                aggregate(&input, keys, aggregates)
            }
        }
    }
}

// Evaluate one expression against one row of `table`.
fn eval(table: &Table, row: &Row, expr: &Expr) -> Result<Value, EngineError> {
    match expr {
        Expr::Column(name) => {
            let index = table.require_column(name)?;
            Ok(row[index].clone())
        }
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Subscript { base, key } => match eval(table, row, base)? {
            Value::Null => Ok(Value::Null),
            map @ Value::Map(_) => Ok(map.map_get(key).cloned().unwrap_or(Value::Null)),
            other => Err(EngineError::TypeMismatch {
                context: format!("subscript {expr}"),
                expected: "map",
                found: other.kind_label(),
            }),
        },
        Expr::Call { .. } => Err(EngineError::Unsupported(expr.to_string())),
    }
}

fn check_unique_columns(columns: &[String]) -> Result<(), EngineError> {
    let mut seen = BTreeSet::new();
    for column in columns {
        if !seen.insert(column.as_str()) {
            return Err(EngineError::DuplicateColumn {
                name: column.clone(),
            });
        }
    }

    Ok(())
}

fn append_columns(input: Table, columns: &[(String, Expr)]) -> Result<Table, EngineError> {
    let mut out_columns = input.columns().to_vec();
    out_columns.extend(columns.iter().map(|(name, _)| name.clone()));
    check_unique_columns(&out_columns)?;

    let mut out = Table::new(out_columns);
    let evaluated = input
        .rows()
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|(_, expr)| eval(&input, row, expr))
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;

    for (row, extra) in input.into_rows().into_iter().zip(evaluated) {
        let mut values = row.into_values();
        values.extend(extra);
        out.push_row(values)?;
    }

    Ok(out)
}

fn project(input: &Table, columns: &[(String, Expr)]) -> Result<Table, EngineError> {
    let names = columns
        .iter()
        .map(|(name, _)| name.clone())
        .collect::<Vec<_>>();
    check_unique_columns(&names)?;

    let mut out = Table::new(names);
    for row in input.rows() {
        let values = columns
            .iter()
            .map(|(_, expr)| eval(input, row, expr))
            .collect::<Result<Vec<_>, _>>()?;
        out.push_row(values)?;
    }

    Ok(out)
}

///
/// Accumulator
///
/// Per-group running state of one aggregate call.
///

#[derive(Debug)]
enum Accumulator {
    CountDistinct(DistinctValues),
    MapAgg(Vec<(Value, Value)>),
}

impl Accumulator {
    fn new(function: &AggregateFunction) -> Self {
        match function {
            AggregateFunction::CountDistinct(_) => Self::CountDistinct(DistinctValues::default()),
            AggregateFunction::MapAgg { .. } => Self::MapAgg(Vec::new()),
        }
    }

    fn update(
        &mut self,
        table: &Table,
        row: &Row,
        function: &AggregateFunction,
    ) -> Result<(), EngineError> {
        match (self, function) {
            (Self::CountDistinct(distinct), AggregateFunction::CountDistinct(expr)) => {
                let value = eval(table, row, expr)?;
                if !value.is_null() {
                    distinct.insert(&value);
                }
            }
            (Self::MapAgg(entries), AggregateFunction::MapAgg { key, value }) => {
                let key = eval(table, row, key)?;
                if key.is_null() || entries.iter().any(|(k, _)| k.canonical_eq(&key)) {
                    return Ok(());
                }
                let value = eval(table, row, value)?;
                entries.push((key, value));
            }
            _ => {
                return Err(EngineError::Unsupported(format!(
                    "accumulator does not match aggregate {function}"
                )));
            }
        }

        Ok(())
    }

    fn finish(self) -> Value {
        match self {
            Self::CountDistinct(distinct) => {
                Value::Int(i64::try_from(distinct.len()).unwrap_or(i64::MAX))
            }
            Self::MapAgg(entries) => Value::Map(entries),
        }
    }
}

// Rows pass an aggregate mask only when it evaluates to `true`.
fn mask_accepts(table: &Table, row: &Row, mask: Option<&Expr>) -> Result<bool, EngineError> {
    let Some(mask) = mask else {
        return Ok(true);
    };

    match eval(table, row, mask)? {
        Value::Bool(accept) => Ok(accept),
        Value::Null => Ok(false),
        other => Err(EngineError::TypeMismatch {
            context: format!("aggregate mask {mask}"),
            expected: "bool",
            found: other.kind_label(),
        }),
    }
}

fn aggregate(
    input: &Table,
    keys: &[String],
    aggregates: &[AggregateCall],
) -> Result<Table, EngineError> {
    let key_indexes = keys
        .iter()
        .map(|key| input.require_column(key))
        .collect::<Result<Vec<_>, _>>()?;

    let mut out_columns = keys.to_vec();
    out_columns.extend(aggregates.iter().map(|call| call.alias.clone()));
    check_unique_columns(&out_columns)?;

    let new_state = || {
        aggregates
            .iter()
            .map(|call| Accumulator::new(&call.function))
            .collect::<Vec<_>>()
    };

    let mut groups = GroupKeyMap::default();

    // A global aggregation always yields exactly one row, even over no input.
    if keys.is_empty() {
        groups.entry_or_insert_with(GroupKey::new(Vec::new()), new_state);
    }

    for row in input.rows() {
        let key = GroupKey::new(key_indexes.iter().map(|&i| row[i].clone()).collect());
        let state = groups.entry_or_insert_with(key, new_state);

        for (accumulator, call) in state.iter_mut().zip(aggregates) {
            if mask_accepts(input, row, call.mask.as_ref())? {
                accumulator.update(input, row, &call.function)?;
            }
        }
    }

    let mut out = Table::new(out_columns);
    for (key, state) in groups.into_entries() {
        let mut values = key.into_values();
        values.extend(state.into_iter().map(Accumulator::finish));
        out.push_row(values)?;
    }

    Ok(out)
}
