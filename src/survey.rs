//! Survey orchestration: ask questions in order and record the answers.

use std::fmt;

use unicode_segmentation::UnicodeSegmentation;

use crate::config::{AskOptions, PromptConfig};
use crate::core::answer::Answer;
use crate::core::terminal::Terminal;
use crate::core::write::{write_answer, Destination};
use crate::error::{SurveyError, ValidationError};
use crate::platform::ProcessTerminal;
use crate::prompts::{Attempt, Prompt};
use crate::runtime::{InterruptHandle, Session};

/// Accepts or rejects an answer; rejections are shown inline and re-asked.
pub type Validator = Box<dyn Fn(&Answer) -> Result<(), ValidationError> + Send + Sync>;

/// Rewrites an accepted answer before it is recorded.
pub type Transformer = Box<dyn Fn(Answer) -> Answer + Send + Sync>;

pub struct Question {
    /// Destination key: map key, record field or tag.
    pub name: String,
    pub prompt: Box<dyn Prompt>,
    pub validate: Option<Validator>,
    pub transform: Option<Transformer>,
}

impl fmt::Debug for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Question")
            .field("name", &self.name)
            .field("validate", &self.validate.is_some())
            .field("transform", &self.transform.is_some())
            .finish_non_exhaustive()
    }
}

impl Question {
    pub fn new(name: impl Into<String>, prompt: impl Prompt + 'static) -> Self {
        Self {
            name: name.into(),
            prompt: Box::new(prompt),
            validate: None,
            transform: None,
        }
    }

    pub fn validate(
        mut self,
        validator: impl Fn(&Answer) -> Result<(), ValidationError> + Send + Sync + 'static,
    ) -> Self {
        self.validate = Some(Box::new(validator));
        self
    }

    pub fn transform(mut self, transformer: impl Fn(Answer) -> Answer + Send + Sync + 'static) -> Self {
        self.transform = Some(Box::new(transformer));
        self
    }
}

/// Ask every question in order, writing each answer into `destination`.
///
/// Validation rejections re-ask the same question. Interrupts, I/O failures
/// and write errors stop the survey; answers already written stay written.
pub fn ask(
    questions: &[Question],
    destination: &mut dyn Destination,
    options: AskOptions,
) -> Result<(), SurveyError> {
    if !destination.is_addressable() {
        return Err(SurveyError::NoDestination);
    }
    let AskOptions {
        config,
        #[cfg(unix)]
        stdio,
        terminal,
        validators,
        interrupt,
    } = options;
    check_config(&config)?;
    for question in questions {
        question.prompt.check(&config)?;
    }

    let interrupt = interrupt.unwrap_or_default();
    #[cfg(unix)]
    let mut session = open_session(terminal, stdio, &config, &interrupt)?;
    #[cfg(not(unix))]
    let mut session = open_session(terminal, &config, &interrupt)?;

    for question in questions {
        tracing::debug!(name = %question.name, "asking question");
        let answer = run_question(
            &mut session,
            question.prompt.as_ref(),
            question.validate.as_ref(),
            &validators,
            question.transform.as_ref(),
        )?;
        write_answer(destination, &question.name, answer).map_err(|source| SurveyError::Write {
            name: question.name.clone(),
            source,
        })?;
    }
    Ok(())
}

/// Ask a single prompt and write the answer straight into `destination`.
pub fn ask_one(
    prompt: impl Prompt + 'static,
    destination: &mut dyn Destination,
    options: AskOptions,
) -> Result<(), SurveyError> {
    ask(&[Question::new("", prompt)], destination, options)
}

/// Run one prompt and return its answer without recording it anywhere.
pub fn run_prompt(prompt: &dyn Prompt, options: AskOptions) -> Result<Answer, SurveyError> {
    let AskOptions {
        config,
        #[cfg(unix)]
        stdio,
        terminal,
        validators,
        interrupt,
    } = options;
    check_config(&config)?;
    prompt.check(&config)?;

    let interrupt = interrupt.unwrap_or_default();
    #[cfg(unix)]
    let mut session = open_session(terminal, stdio, &config, &interrupt)?;
    #[cfg(not(unix))]
    let mut session = open_session(terminal, &config, &interrupt)?;
    run_question(&mut session, prompt, None, &validators, None)
}

fn check_config(config: &PromptConfig) -> Result<(), SurveyError> {
    if config.page_size == 0 {
        return Err(SurveyError::InvalidOption(
            "page size must be at least 1".to_string(),
        ));
    }
    Ok(())
}

#[cfg(unix)]
fn open_session<'a>(
    terminal: Option<Box<dyn Terminal + Send>>,
    stdio: Option<crate::config::Stdio>,
    config: &'a PromptConfig,
    interrupt: &InterruptHandle,
) -> Result<Session<'a>, SurveyError> {
    match terminal {
        Some(terminal) => Session::open(terminal, config, interrupt),
        None => {
            let terminal = ProcessTerminal::with_stdio(stdio.unwrap_or_default());
            let session = Session::open(Box::new(terminal), config, interrupt)?;
            let handle = interrupt.clone();
            let guard = crate::platform::install_signal_handlers(move || handle.interrupt())?;
            Ok(session.with_signal_guard(guard))
        }
    }
}

#[cfg(not(unix))]
fn open_session<'a>(
    terminal: Option<Box<dyn Terminal + Send>>,
    config: &'a PromptConfig,
    interrupt: &InterruptHandle,
) -> Result<Session<'a>, SurveyError> {
    let terminal = terminal.unwrap_or_else(|| Box::new(ProcessTerminal::new()) as Box<dyn Terminal + Send>);
    Session::open(terminal, config, interrupt)
}

/// Prompt until the answer passes every validator, then transform and
/// finalize it.
///
/// Recoverable errors, whether raised by the prompt itself or by a validator,
/// are shown inline and the question is asked again.
fn run_question(
    session: &mut Session<'_>,
    prompt: &dyn Prompt,
    validate: Option<&Validator>,
    shared: &[Validator],
    transform: Option<&Transformer>,
) -> Result<Answer, SurveyError> {
    let mut attempt = Attempt::default();
    loop {
        let answer = match prompt.prompt(session, &attempt) {
            Ok(answer) => answer,
            Err(err) if err.is_recoverable() => {
                tracing::debug!(error = %err, "input rejected");
                attempt = Attempt {
                    error: Some(err.to_string()),
                    rejected: None,
                };
                continue;
            }
            Err(err) => return Err(err),
        };
        let verdict = validate
            .into_iter()
            .chain(shared)
            .try_for_each(|validator| validator(&answer))
            .map_err(SurveyError::from);
        match verdict {
            Ok(()) => {
                let answer = match transform {
                    Some(transform) => transform(answer),
                    None => answer,
                };
                prompt.finalize(session, &answer);
                return Ok(answer);
            }
            Err(err) => {
                tracing::debug!(error = %err, "answer rejected");
                attempt = Attempt::rejected(answer, err.to_string());
            }
        }
    }
}

fn answer_len(answer: &Answer) -> Option<usize> {
    match answer {
        Answer::String(value) => Some(value.graphemes(true).count()),
        Answer::Option(option) => Some(option.value.graphemes(true).count()),
        _ => None,
    }
}

/// Rejects zero values: empty text, no selection, `false`, `0`.
pub fn required() -> Validator {
    Box::new(|answer: &Answer| {
        if answer.is_empty() {
            return Err(ValidationError::new("Value is required"));
        }
        Ok(())
    })
}

/// Text answers must be at most `max` characters long.
pub fn max_length(max: usize) -> Validator {
    Box::new(move |answer: &Answer| match answer_len(answer) {
        Some(len) if len > max => Err(ValidationError::new(format!(
            "value is too long. Max length is {max}"
        ))),
        Some(_) => Ok(()),
        None => Err(ValidationError::new(format!(
            "cannot enforce length on response of type {}",
            answer.kind()
        ))),
    })
}

/// Text answers must be at least `min` characters long.
pub fn min_length(min: usize) -> Validator {
    Box::new(move |answer: &Answer| match answer_len(answer) {
        Some(len) if len < min => Err(ValidationError::new(format!(
            "value is too short. Min length is {min}"
        ))),
        Some(_) => Ok(()),
        None => Err(ValidationError::new(format!(
            "cannot enforce length on response of type {}",
            answer.kind()
        ))),
    })
}

/// List answers must hold at most `max` items.
pub fn max_items(max: usize) -> Validator {
    Box::new(move |answer: &Answer| match answer.as_list() {
        Some(items) if items.len() > max => Err(ValidationError::new(format!(
            "value has too many selections. Max items is {max}"
        ))),
        Some(_) => Ok(()),
        None => Err(ValidationError::new(format!(
            "cannot find selection count of type {}",
            answer.kind()
        ))),
    })
}

/// List answers must hold at least `min` items.
pub fn min_items(min: usize) -> Validator {
    Box::new(move |answer: &Answer| match answer.as_list() {
        Some(items) if items.len() < min => Err(ValidationError::new(format!(
            "value has too few selections. Min items is {min}"
        ))),
        Some(_) => Ok(()),
        None => Err(ValidationError::new(format!(
            "cannot find selection count of type {}",
            answer.kind()
        ))),
    })
}

/// Run validators in order; the first rejection wins.
pub fn compose_validators(validators: Vec<Validator>) -> Validator {
    Box::new(move |answer: &Answer| {
        validators
            .iter()
            .try_for_each(|validator| validator(answer))
    })
}

/// Apply `f` to the text of string, option and list answers.
fn map_text(answer: Answer, f: &dyn Fn(&str) -> String) -> Answer {
    match answer {
        Answer::String(value) => Answer::String(f(&value)),
        Answer::Option(mut option) => {
            option.value = f(&option.value);
            Answer::Option(option)
        }
        Answer::List(values) => Answer::List(values.into_iter().map(|value| map_text(value, f)).collect()),
        other => other,
    }
}

/// Lowercase text answers.
pub fn to_lower() -> Transformer {
    Box::new(|answer: Answer| map_text(answer, &|text: &str| text.to_lowercase()))
}

/// Capitalize the first letter of every word in text answers.
pub fn title() -> Transformer {
    Box::new(|answer: Answer| map_text(answer, &title_case))
}

fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for ch in text.chars() {
        if at_word_start && ch.is_alphabetic() {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        at_word_start = ch.is_whitespace() || ch == '-' || ch == '_';
    }
    out
}

/// Apply transformers in order, each to the previous one's output.
pub fn compose_transformers(transformers: Vec<Transformer>) -> Transformer {
    Box::new(move |answer: Answer| {
        transformers
            .iter()
            .fold(answer, |answer, transform| transform(answer))
    })
}

#[cfg(test)]
mod tests {
    use super::{
        compose_transformers, compose_validators, max_items, max_length, min_items, min_length,
        required, title, to_lower,
    };
    use crate::core::answer::{Answer, OptionAnswer};

    fn days(count: usize) -> Answer {
        Answer::List(
            (0..count)
                .map(|index| Answer::Option(OptionAnswer::new(index, format!("day {index}"))))
                .collect(),
        )
    }

    #[test]
    fn required_rejects_zero_values() {
        let validate = required();
        assert_eq!(
            validate(&Answer::from("")).unwrap_err().message(),
            "Value is required"
        );
        assert!(validate(&Answer::List(Vec::new())).is_err());
        assert!(validate(&Answer::Bool(false)).is_err());
        assert!(validate(&Answer::from("x")).is_ok());
        assert!(validate(&days(1)).is_ok());
    }

    #[test]
    fn length_limits_count_characters() {
        assert!(max_length(3)(&Answer::from("héé")).is_ok());
        assert!(max_length(3)(&Answer::from("abcd")).is_err());
        assert!(min_length(2)(&Answer::from("a")).is_err());
        assert!(min_length(2)(&Answer::Option(OptionAnswer::new(0, "ab"))).is_ok());
        assert!(min_length(2)(&Answer::Bool(true)).is_err());
    }

    #[test]
    fn item_limits_apply_to_lists_only() {
        assert!(max_items(2)(&days(2)).is_ok());
        assert!(max_items(2)(&days(3)).is_err());
        assert!(min_items(2)(&days(1)).is_err());
        assert!(min_items(1)(&Answer::from("x")).is_err());
    }

    #[test]
    fn composed_validators_stop_at_the_first_rejection() {
        let validate = compose_validators(vec![required(), max_length(3)]);
        assert_eq!(
            validate(&Answer::from("")).unwrap_err().message(),
            "Value is required"
        );
        assert!(validate(&Answer::from("abcd")).unwrap_err().message().contains("too long"));
        assert!(validate(&Answer::from("abc")).is_ok());
    }

    #[test]
    fn text_transformers_reach_options_and_lists() {
        assert_eq!(to_lower()(Answer::from("Johnny Appleseed")), Answer::from("johnny appleseed"));
        assert_eq!(title()(Answer::from("johnny appleseed")), Answer::from("Johnny Appleseed"));
        assert_eq!(
            to_lower()(Answer::Option(OptionAnswer::new(2, "YELLOW"))),
            Answer::Option(OptionAnswer::new(2, "yellow"))
        );
        assert_eq!(to_lower()(Answer::Bool(true)), Answer::Bool(true));

        let both = compose_transformers(vec![to_lower(), title()]);
        assert_eq!(both(Answer::from("JOHNNY APPLESEED")), Answer::from("Johnny Appleseed"));
    }
}
