//! Dynamically typed answer values produced by prompts.

use std::fmt;
use std::time::Duration;

/// A selectable choice identified by its position in the original option list
/// and its display text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct OptionAnswer {
    pub index: usize,
    pub value: String,
}

impl OptionAnswer {
    pub fn new(index: usize, value: impl Into<String>) -> Self {
        Self {
            index,
            value: value.into(),
        }
    }
}

/// Wrap plain option labels, numbering them in order.
pub fn option_answer_list<S: AsRef<str>>(options: &[S]) -> Vec<OptionAnswer> {
    options
        .iter()
        .enumerate()
        .map(|(index, value)| OptionAnswer::new(index, value.as_ref()))
        .collect()
}

/// The value a prompt resolves to, before it is written into a destination.
#[derive(Clone, Debug, PartialEq)]
pub enum Answer {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Duration(Duration),
    String(String),
    Option(OptionAnswer),
    List(Vec<Answer>),
}

impl Answer {
    /// Short kind name used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "integer",
            Self::Uint(_) => "unsigned integer",
            Self::Float(_) => "float",
            Self::Duration(_) => "duration",
            Self::String(_) => "string",
            Self::Option(_) => "option",
            Self::List(_) => "list",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_option(&self) -> Option<&OptionAnswer> {
        match self {
            Self::Option(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Answer]> {
        match self {
            Self::List(values) => Some(values),
            _ => None,
        }
    }

    /// Whether this is the zero value of its kind.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Bool(value) => !value,
            Self::Int(value) => *value == 0,
            Self::Uint(value) => *value == 0,
            Self::Float(value) => *value == 0.0,
            Self::Duration(value) => value.is_zero(),
            Self::String(value) => value.is_empty(),
            Self::Option(value) => value.value.is_empty(),
            Self::List(values) => values.is_empty(),
        }
    }
}

/// The empty string, so maps of raw answers can hold fresh slots.
impl Default for Answer {
    fn default() -> Self {
        Self::String(String::new())
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Uint(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Duration(value) => write!(f, "{value:?}"),
            Self::String(value) => f.write_str(value),
            Self::Option(value) => f.write_str(&value.value),
            Self::List(values) => {
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<bool> for Answer {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Answer {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u64> for Answer {
    fn from(value: u64) -> Self {
        Self::Uint(value)
    }
}

impl From<f64> for Answer {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<Duration> for Answer {
    fn from(value: Duration) -> Self {
        Self::Duration(value)
    }
}

impl From<String> for Answer {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for Answer {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<OptionAnswer> for Answer {
    fn from(value: OptionAnswer) -> Self {
        Self::Option(value)
    }
}

impl<T: Into<Answer>> From<Vec<T>> for Answer {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}
