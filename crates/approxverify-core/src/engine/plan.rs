use crate::{expr::Expr, table::Table};
use serde::{Deserialize, Serialize};
use std::fmt;

///
/// AggregateFunction
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum AggregateFunction {
    /// Exact `count(distinct expr)`; nulls are not counted.
    CountDistinct(Expr),
    /// `map_agg(key, value)`; rows with a null key are skipped and the first
    /// value observed for a key wins.
    MapAgg { key: Expr, value: Expr },
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CountDistinct(expr) => write!(f, "count(distinct {expr})"),
            Self::MapAgg { key, value } => write!(f, "map_agg({key}, {value})"),
        }
    }
}

///
/// AggregateCall
///
/// One output column of a grouped aggregation.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct AggregateCall {
    pub function: AggregateFunction,
    pub mask: Option<Expr>,
    pub alias: String,
}

impl AggregateCall {
    #[must_use]
    pub fn new(function: AggregateFunction, alias: impl Into<String>) -> Self {
        Self {
            function,
            mask: None,
            alias: alias.into(),
        }
    }

    #[must_use]
    pub fn with_mask(mut self, mask: Option<Expr>) -> Self {
        self.mask = mask;
        self
    }
}

impl fmt::Display for AggregateCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.function)?;
        if let Some(mask) = &self.mask {
            write!(f, " filter (where {mask})")?;
        }
        write!(f, " as {}", self.alias)
    }
}

///
/// PlanNode
///
/// Logical plan tree understood by the engine collaborator.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum PlanNode {
    /// Inline row batches, concatenated in order.
    Values(Vec<Table>),
    /// Keep every input column and append computed ones.
    AppendColumns {
        input: Box<Self>,
        columns: Vec<(String, Expr)>,
    },
    /// Replace the input columns with computed ones.
    Project {
        input: Box<Self>,
        columns: Vec<(String, Expr)>,
    },
    /// Group by `keys` and compute `aggregates`; key columns come first.
    Aggregate {
        input: Box<Self>,
        keys: Vec<String>,
        aggregates: Vec<AggregateCall>,
    },
    /// Concatenate schema-equal sources in order.
    Union(Vec<Self>),
}

///
/// PlanBuilder
///
/// Fluent construction of one plan tree, bottom-up.
///

#[derive(Clone, Debug)]
pub struct PlanBuilder {
    node: PlanNode,
}

impl PlanBuilder {
    #[must_use]
    pub const fn values(tables: Vec<Table>) -> Self {
        Self {
            node: PlanNode::Values(tables),
        }
    }

    /// Start from the union of several sub-plans.
    #[must_use]
    pub fn union(sources: Vec<PlanNode>) -> Self {
        Self {
            node: PlanNode::Union(sources),
        }
    }

    #[must_use]
    pub fn append_columns<S: Into<String>>(self, columns: Vec<(S, Expr)>) -> Self {
        Self {
            node: PlanNode::AppendColumns {
                input: Box::new(self.node),
                columns: named(columns),
            },
        }
    }

    #[must_use]
    pub fn project<S: Into<String>>(self, columns: Vec<(S, Expr)>) -> Self {
        Self {
            node: PlanNode::Project {
                input: Box::new(self.node),
                columns: named(columns),
            },
        }
    }

    #[must_use]
    pub fn aggregate(self, keys: &[String], aggregates: Vec<AggregateCall>) -> Self {
        Self {
            node: PlanNode::Aggregate {
                input: Box::new(self.node),
                keys: keys.to_vec(),
                aggregates,
            },
        }
    }

    #[must_use]
    pub fn build(self) -> PlanNode {
        self.node
    }
}

fn named<S: Into<String>>(columns: Vec<(S, Expr)>) -> Vec<(String, Expr)> {
    columns
        .into_iter()
        .map(|(name, expr)| (name.into(), expr))
        .collect()
}
