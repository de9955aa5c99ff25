//! Scalar expressions and the aggregate invocation handed to verifiers.

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

///
/// Expr
///
/// Minimal typed expression tree. Verifiers only ever inspect it; the engine
/// evaluates the `Column`/`Literal`/`Subscript` subset.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum Expr {
    Column(String),
    Literal(Value),
    /// `base[key]` map element access; yields null for a missing key.
    Subscript { base: Box<Self>, key: Value },
    Call { name: String, args: Vec<Self> },
}

impl Expr {
    #[must_use]
    pub fn column(name: impl Into<String>) -> Self {
        Self::Column(name.into())
    }

    #[must_use]
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    #[must_use]
    pub fn subscript(base: Self, key: impl Into<Value>) -> Self {
        Self::Subscript {
            base: Box::new(base),
            key: key.into(),
        }
    }

    #[must_use]
    pub fn call(name: impl Into<String>, args: Vec<Self>) -> Self {
        Self::Call {
            name: name.into(),
            args,
        }
    }

    /// Resolve a plain column reference (field access) to its name.
    #[must_use]
    pub fn as_column(&self) -> Option<&str> {
        match self {
            Self::Column(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Column(name) => write!(f, "{name}"),
            Self::Literal(value) => write!(f, "{value}"),
            Self::Subscript { base, key } => write!(f, "{base}[{key}]"),
            Self::Call { name, args } => {
                write!(f, "{name}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
        }
    }
}

///
/// AggregateSpec
///
/// One aggregate invocation from a fuzzed plan: the externally visible
/// function name, its ordered argument expressions, and an optional boolean
/// row mask (`FILTER (WHERE mask)`).
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct AggregateSpec {
    name: String,
    args: Vec<Expr>,
    mask: Option<Expr>,
}

impl AggregateSpec {
    #[must_use]
    pub fn new(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Self {
            name: name.into(),
            args,
            mask: None,
        }
    }

    #[must_use]
    pub fn with_mask(mut self, mask: Expr) -> Self {
        self.mask = Some(mask);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn args(&self) -> &[Expr] {
        &self.args
    }

    #[must_use]
    pub const fn mask(&self) -> Option<&Expr> {
        self.mask.as_ref()
    }

    /// The call expression as it would appear in a plan.
    #[must_use]
    pub fn call(&self) -> Expr {
        Expr::call(self.name.clone(), self.args.clone())
    }
}

impl fmt::Display for AggregateSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.call())?;
        if let Some(mask) = &self.mask {
            write!(f, " filter (where {mask})")?;
        }

        Ok(())
    }
}

///
/// TESTS
///
