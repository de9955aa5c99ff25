//! Core runtime for approxverify: values, tables, the engine boundary, and the
//! statistical result verifiers used by query fuzzing.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod config;
pub mod engine;
pub mod error;
pub mod expr;
pub mod table;
pub mod value;
pub mod verifier;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No engine internals or config loaders are re-exported here.
///

pub mod prelude {
    pub use crate::{
        engine::Engine,
        expr::{AggregateSpec, Expr},
        table::{Row, Table},
        value::Value,
        verifier::ResultVerifier,
    };
}
