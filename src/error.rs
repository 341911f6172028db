//! Error types for answer writing and survey execution.

use std::num::{ParseFloatError, ParseIntError};
use std::process::ExitStatus;

use thiserror::Error;

use crate::core::duration::ParseDurationError;

/// Failure to deposit an answer into a destination.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("destination must be a mutable, addressable value")]
    NeedsPointer,

    #[error("answer maps must be keyed by strings")]
    MapType,

    #[error("could not find a field matching {name:?}")]
    FieldNotMatch { name: String },

    #[error("cannot write a {value} answer into a {target} destination")]
    UnsupportedType {
        target: &'static str,
        value: &'static str,
    },

    #[error("fixed-length destination holds {expected} values but the answer has {found}")]
    LengthMismatch { expected: usize, found: usize },

    #[error("could not convert {input:?} into {target}: {source}")]
    Conversion {
        target: &'static str,
        input: String,
        #[source]
        source: ConversionError,
    },

    /// Raised by [`Settable`](crate::core::write::Settable) implementations.
    #[error("{0}")]
    Custom(String),
}

impl WriteError {
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }
}

/// Underlying parser failure wrapped by [`WriteError::Conversion`].
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error(transparent)]
    Bool(#[from] ParseBoolError),

    #[error(transparent)]
    Int(#[from] ParseIntError),

    #[error(transparent)]
    Float(#[from] ParseFloatError),

    #[error(transparent)]
    Duration(#[from] ParseDurationError),

    #[error("value out of range")]
    OutOfRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid boolean literal {literal:?}")]
pub struct ParseBoolError {
    pub literal: String,
}

/// Rejection returned by a question validator. Shown inline, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Error)]
pub enum SurveyError {
    /// Malformed input for the current prompt; the prompt asks again.
    #[error("{0}")]
    Input(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("no destination to record answers into")]
    NoDestination,

    #[error("invalid option: {0}")]
    InvalidOption(String),

    #[error("invalid prompt: {0}")]
    InvalidPrompt(String),

    #[error("failed to write answer {name:?}: {source}")]
    Write {
        name: String,
        #[source]
        source: WriteError,
    },

    #[error("interrupted")]
    Interrupted,

    #[error("editor {command:?} exited with {status}")]
    ChildProcess { command: String, status: ExitStatus },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SurveyError {
    /// Whether the prompt should re-enter input instead of aborting.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Input(_) | Self::Validation(_))
    }

    pub(crate) fn input_closed() -> Self {
        Self::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "input closed before the prompt was answered",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::{SurveyError, ValidationError, WriteError};

    #[test]
    fn field_not_match_names_the_query() {
        let err = WriteError::FieldNotMatch {
            name: "nosuchfield".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "could not find a field matching \"nosuchfield\""
        );
    }

    #[test]
    fn only_input_and_validation_are_recoverable() {
        assert!(SurveyError::Input("bad".into()).is_recoverable());
        assert!(SurveyError::from(ValidationError::new("nope")).is_recoverable());
        assert!(!SurveyError::Interrupted.is_recoverable());
        assert!(!SurveyError::NoDestination.is_recoverable());
        assert!(!SurveyError::input_closed().is_recoverable());
    }
}
