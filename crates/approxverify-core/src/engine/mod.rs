//! Module: engine
//! Responsibility: the narrow plan-construction/execution boundary verifiers
//! depend on, plus an in-memory reference implementation.
//! Does not own: verification policy.

mod group_key;
mod memory;
mod plan;


use crate::{error::EngineError, table::Table};
use std::{rc::Rc, sync::Arc};

// re-exports
pub use group_key::{DistinctValues, GroupKey, GroupKeyMap};
pub use memory::MemoryEngine;
pub use plan::{AggregateCall, AggregateFunction, PlanBuilder, PlanNode};

///
/// Engine
///
/// Executes one logical plan synchronously and returns a fully materialized
/// table. Implementations own their own threading; callers block until the
/// result is ready.
///

pub trait Engine {
    fn execute(&self, plan: &PlanNode) -> Result<Table, EngineError>;
}

impl<E: Engine + ?Sized> Engine for &E {
    fn execute(&self, plan: &PlanNode) -> Result<Table, EngineError> {
        (**self).execute(plan)
    }
}

impl<E: Engine + ?Sized> Engine for Arc<E> {
    fn execute(&self, plan: &PlanNode) -> Result<Table, EngineError> {
        (**self).execute(plan)
    }
}

impl<E: Engine + ?Sized> Engine for Rc<E> {
    fn execute(&self, plan: &PlanNode) -> Result<Table, EngineError> {
        (**self).execute(plan)
    }
}

impl<E: Engine + ?Sized> Engine for Box<E> {
    fn execute(&self, plan: &PlanNode) -> Result<Table, EngineError> {
        (**self).execute(plan)
    }
}
