use std::fmt;
use thiserror::Error as ThisError;

///
/// VerifierError
///
/// Structured verifier failure with a stable classification.
/// Every variant is fatal for the current fuzz iteration; statistical
/// failures are reported as a `false` verdict instead.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct VerifierError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,

    /// Underlying engine failure, when the error came from plan execution.
    #[source]
    pub engine: Option<EngineError>,
}

impl VerifierError {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
            engine: None,
        }
    }

    /// Construct a malformed-aggregate error (unresolvable argument, missing column).
    pub(crate) fn malformed_aggregate(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(ErrorClass::MalformedAggregate, origin, message)
    }

    /// Construct a reconciliation failure: the two executions disagree on groups.
    pub(crate) fn group_cardinality(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::GroupCardinality,
            ErrorOrigin::Reconciler,
            message,
        )
    }

    /// Construct an unsupported-operation error for a capability the verifier lacks.
    pub(crate) fn unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Unsupported, ErrorOrigin::Verifier, message)
    }

    /// Construct a lifecycle violation (`verify` before `initialize`).
    pub(crate) fn not_initialized(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::NotInitialized, ErrorOrigin::Verifier, message)
    }

    /// Construct an invalid-result error (count column with a non-integer value).
    pub(crate) fn invalid_result(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(ErrorClass::InvalidResult, origin, message)
    }

    /// Wrap an engine failure raised while `origin` was executing a plan.
    pub(crate) fn engine(origin: ErrorOrigin, err: EngineError) -> Self {
        Self {
            class: ErrorClass::Engine,
            origin,
            message: format!("engine execution failed: {err}"),
            engine: Some(err),
        }
    }

    #[must_use]
    pub const fn is_malformed_aggregate(&self) -> bool {
        matches!(self.class, ErrorClass::MalformedAggregate)
    }

    #[must_use]
    pub const fn is_group_cardinality(&self) -> bool {
        matches!(self.class, ErrorClass::GroupCardinality)
    }

    #[must_use]
    pub const fn is_unsupported(&self) -> bool {
        matches!(self.class, ErrorClass::Unsupported)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

///
/// ErrorClass
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    MalformedAggregate,
    GroupCardinality,
    Unsupported,
    NotInitialized,
    InvalidResult,
    Engine,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::MalformedAggregate => "malformed_aggregate",
            Self::GroupCardinality => "group_cardinality",
            Self::Unsupported => "unsupported",
            Self::NotInitialized => "not_initialized",
            Self::InvalidResult => "invalid_result",
            Self::Engine => "engine",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    ErrorExtractor,
    Baseline,
    Reconciler,
    Verifier,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::ErrorExtractor => "error_extractor",
            Self::Baseline => "baseline",
            Self::Reconciler => "reconciler",
            Self::Verifier => "verifier",
        };
        write!(f, "{label}")
    }
}

///
/// EngineError
///
/// Failures raised by the plan-execution collaborator.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum EngineError {
    #[error("unknown column: '{name}'")]
    UnknownColumn { name: String },

    #[error("schema mismatch: expected columns {expected:?}, found {found:?}")]
    SchemaMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("row arity mismatch: expected {expected} values, found {found}")]
    RowArity { expected: usize, found: usize },

    #[error("type mismatch in {context}: expected {expected}, found {found}")]
    TypeMismatch {
        context: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("duplicate output column: '{name}'")]
    DuplicateColumn { name: String },

    #[error("plan has no input tables")]
    EmptyInput,

    #[error("unsupported expression: {0}")]
    Unsupported(String),
}

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

///
/// TESTS
///
