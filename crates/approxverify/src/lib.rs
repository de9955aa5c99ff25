//! ## Crate layout
//! - `core`: values, tables, the engine boundary, configuration, errors, and
//!   the result verifiers themselves.
//! - `registry`: aggregate-name → verifier factory table for fuzz harnesses.
//!
//! The `prelude` module mirrors the surface a fuzz harness needs per iteration.

pub use approxverify_core as core;

pub mod registry;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Harness Prelude
/// using _ brings traits into scope and avoids name conflicts
///

pub mod prelude {
    pub use crate::{
        core::{
            config::VerifierConfig,
            engine::{Engine as _, MemoryEngine},
            error::VerifierError,
            expr::{AggregateSpec, Expr},
            table::Table,
            value::Value,
            verifier::{ResultVerifier as _, VerificationReport},
        },
        registry::VerifierRegistry,
    };
}
