mod compare;
mod hash;
mod tag;


use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt};

// re-exports
pub use compare::canonical_cmp;
pub use hash::{StableHash, stable_hash_value, stable_hash_values};
pub(crate) use tag::ValueTag;

///
/// Value
///
/// One typed cell of a materialized table.
///
/// Null        → SQL NULL; canonically equal to itself so grouping can treat
///               it as a proper key component.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum Value {
    Bool(bool),
    Float(f64),
    Int(i64),
    /// Ordered list of values.
    List(Vec<Self>),
    /// Key/value entries in first-inserted order.
    /// Map lookups use canonical key equality.
    Map(Vec<(Self, Self)>),
    Null,
    Text(String),
}

impl Value {
    /// Build a text value from anything string-like.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Total canonical comparator; see [`canonical_cmp`].
    #[must_use]
    pub fn canonical_cmp(left: &Self, right: &Self) -> Ordering {
        canonical_cmp(left, right)
    }

    /// Canonical equality used by grouping, distinct counting, and map lookup.
    ///
    /// Unlike `PartialEq`, `Null == Null` and NaN floats are equal to each other.
    #[must_use]
    pub fn canonical_eq(&self, other: &Self) -> bool {
        canonical_cmp(self, other) == Ordering::Equal
    }

    /// Look up one map entry by canonical key equality.
    ///
    /// Returns `None` for non-map values and missing keys.
    #[must_use]
    pub fn map_get(&self, key: &Self) -> Option<&Self> {
        let Self::Map(entries) = self else {
            return None;
        };

        entries
            .iter()
            .find(|(entry_key, _)| entry_key.canonical_eq(key))
            .map(|(_, value)| value)
    }

    #[must_use]
    pub(crate) const fn canonical_tag(&self) -> ValueTag {
        ValueTag::of(self)
    }

    /// Short variant label used in type-mismatch diagnostics.
    #[must_use]
    pub const fn kind_label(&self) -> &'static str {
        self.canonical_tag().label()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Self::Map(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
            Self::Null => write!(f, "null"),
            Self::Text(v) => write!(f, "'{v}'"),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
