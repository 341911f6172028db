//! Interactive terminal surveys.
//!
//! Invariant: single output gate. Only `core::output::OutputGate::flush(..)` writes to the
//! terminal.
//!
//! # Public API Overview
//! - Describe questions with [`Question`] and the prompt kinds in [`prompts`].
//! - Run them with [`ask`], [`ask_one`] or [`run_prompt`], configured through [`AskOptions`].
//! - Receive answers in any [`Destination`]: scalars, `Vec`, arrays, string-keyed maps, structs
//!   declared with [`record!`], or custom [`Settable`] types.
//! - Validate and transform with the helpers re-exported below.
//!
//! # Example
//! ```no_run
//! use std::collections::HashMap;
//! use tape_survey::{ask, AskOptions, Answer, Question};
//! use tape_survey::prompts::{Confirm, Input};
//!
//! let questions = [
//!     Question::new("name", Input::new("What is your name?")).validate(tape_survey::required()),
//!     Question::new("pizza", Confirm::new("Is pizza your favorite food?")),
//! ];
//! let mut answers: HashMap<String, Answer> = HashMap::new();
//! ask(&questions, &mut answers, AskOptions::new())?;
//! # Ok::<(), tape_survey::SurveyError>(())
//! ```

#![allow(clippy::type_complexity)]

pub mod config;
pub mod error;
pub mod logging;

pub mod core;
pub mod platform;
pub mod prompts;
pub mod render;
pub mod runtime;
pub mod survey;

/// Survey entry points, question type and built-in validators/transformers.
pub use crate::survey::{
    ask, ask_one, compose_transformers, compose_validators, max_items, max_length, min_items,
    min_length, required, run_prompt, title, to_lower, Question, Transformer, Validator,
};

/// Configuration and option builder.
pub use crate::config::{AskOptions, EnvConfig, Icon, Icons, PromptConfig};
#[cfg(unix)]
pub use crate::config::Stdio;

/// Error types.
pub use crate::error::{ConversionError, SurveyError, ValidationError, WriteError};

/// Answers and the destinations they are written into.
pub use crate::core::answer::{option_answer_list, Answer, OptionAnswer};
pub use crate::core::write::{
    write_answer, Destination, FieldInfo, MapKey, MappingSlot, Record, ScalarSlot, SequenceSlot,
    Settable, Shape,
};

/// Prompt contract.
pub use crate::prompts::{Attempt, Prompt};

/// Cancellation handle for a running survey.
pub use crate::runtime::InterruptHandle;

/// Terminal interfaces and process-backed implementation.
pub use crate::core::terminal::Terminal;
pub use crate::platform::process_terminal::ProcessTerminal;
/// Input buffering for chunked terminal streams.
pub use crate::platform::stdin_buffer::{StdinBuffer, StdinEvent};

/// Visible width helper that ignores ANSI control sequences.
pub use crate::core::text::width::visible_width;
