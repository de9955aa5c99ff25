use crate::value::Value;

///
/// ValueTag
///
/// Stable per-variant tag. Drives both canonical rank ordering and the
/// leading byte of the stable hash encoding, so the numbering is frozen.
///

#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
#[repr(u8)]
pub(crate) enum ValueTag {
    Null = 0,
    Bool = 1,
    Int = 2,
    Float = 3,
    Text = 4,
    List = 5,
    Map = 6,
}

impl ValueTag {
    #[must_use]
    pub(crate) const fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Bool,
            Value::Int(_) => Self::Int,
            Value::Float(_) => Self::Float,
            Value::Text(_) => Self::Text,
            Value::List(_) => Self::List,
            Value::Map(_) => Self::Map,
        }
    }

    #[must_use]
    pub(crate) const fn to_u8(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub(crate) const fn label(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Text => "text",
            Self::List => "list",
            Self::Map => "map",
        }
    }
}
