use crate::{
    config::VerifierConfig,
    error::{ErrorOrigin, VerifierError},
    expr::AggregateSpec,
    table::Table,
    value::Value,
};

/// Resolve the tolerance ε for one aggregate invocation.
///
/// `approx_distinct(x)` uses the configured default error.
/// `approx_distinct(x, e)` reads column `e` from the first row of the first
/// non-empty batch; the
/// error argument is constant for every row fed to one invocation.
pub(crate) fn extract_error(
    aggregate: &AggregateSpec,
    input: &[Table],
    config: &VerifierConfig,
) -> Result<f64, VerifierError> {
    let args = aggregate.args();

    match args.len() {
        0 => Err(malformed(format!("{aggregate} has no arguments"))),
        1 => Ok(config.default_error),
        _ => {
            let Some(column) = args[1].as_column() else {
                return Err(malformed(format!(
                    "error argument of {aggregate} must be a column reference, found {}",
                    args[1]
                )));
            };

            let Some(first) = input.first() else {
                return Err(malformed(format!(
                    "no input batch to read error column '{column}' from"
                )));
            };
            if first.column_index(column).is_none() {
                return Err(malformed(format!(
                    "error column '{column}' is absent from the input"
                )));
            }

            let Some(batch) = input.iter().find(|batch| !batch.is_empty()) else {
                return Err(malformed(format!(
                    "no input row to read error column '{column}' from"
                )));
            };

            match batch.value(0, column) {
                Some(Value::Float(error)) if *error > 0.0 && *error < 1.0 => Ok(*error),
                Some(other) => Err(malformed(format!(
                    "error column '{column}' must hold a float in (0, 1), found {other}"
                ))),
                None => Err(malformed(format!(
                    "error column '{column}' is absent from the input"
                ))),
            }
        }
    }
}

fn malformed(message: String) -> VerifierError {
    VerifierError::malformed_aggregate(ErrorOrigin::ErrorExtractor, message)
}

///
/// TESTS
///
