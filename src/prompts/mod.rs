//! Prompt kinds and the input loops they share.
//!
//! A prompt draws itself through the session, reads keys until the user
//! submits, and returns an [`Answer`]. The survey validates that answer and
//! either asks the same prompt again with the rejection shown inline or calls
//! [`Prompt::finalize`] to leave the answered form on screen.

pub mod confirm;
pub mod editor;
pub mod input;
pub mod multi_select;
pub mod multiline;
pub mod password;
pub mod select;

pub use confirm::Confirm;
pub use editor::Editor;
pub use input::Input;
pub use multi_select::MultiSelect;
pub use multiline::Multiline;
pub use password::Password;
pub use select::Select;

use crate::config::PromptConfig;
use crate::core::answer::Answer;
use crate::core::keys::Key;
use crate::core::line_editor::LineEditor;
use crate::error::SurveyError;
use crate::render::{TemplateData, View};
use crate::runtime::Session;

/// What the previous attempt at this prompt left behind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attempt {
    /// Rejection shown inline above the question.
    pub error: Option<String>,
    /// The answer that was rejected.
    pub rejected: Option<Answer>,
}

impl Attempt {
    pub fn rejected(answer: Answer, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            rejected: Some(answer),
        }
    }
}

pub trait Prompt: Send + Sync {
    /// Reject misconfiguration before anything is drawn.
    fn check(&self, _config: &PromptConfig) -> Result<(), SurveyError> {
        Ok(())
    }

    /// Draw the prompt and read keys until the user submits an answer.
    fn prompt(&self, session: &mut Session<'_>, attempt: &Attempt) -> Result<Answer, SurveyError>;

    /// Replace the live prompt with its answered form.
    fn finalize(&self, session: &mut Session<'_>, answer: &Answer);
}

impl<P: Prompt + ?Sized> Prompt for Box<P> {
    fn check(&self, config: &PromptConfig) -> Result<(), SurveyError> {
        (**self).check(config)
    }

    fn prompt(&self, session: &mut Session<'_>, attempt: &Attempt) -> Result<Answer, SurveyError> {
        (**self).prompt(session, attempt)
    }

    fn finalize(&self, session: &mut Session<'_>, answer: &Answer) {
        (**self).finalize(session, answer)
    }
}

/// Template snapshot for a live (unanswered) pass.
pub(crate) fn live<'t>(
    config: &'t PromptConfig,
    message: &'t str,
    help: &'t str,
    show_help: bool,
    error: Option<&'t str>,
) -> TemplateData<'t> {
    TemplateData {
        show_help,
        error,
        ..TemplateData::new(message, help, config)
    }
}

/// Template snapshot for the finalizing pass.
pub(crate) fn answered<'t>(
    config: &'t PromptConfig,
    message: &'t str,
    answer: &'t str,
) -> TemplateData<'t> {
    TemplateData {
        answer: Some(answer),
        ..TemplateData::new(message, "", config)
    }
}

/// Whether `key` is the help key and the prompt has help to show.
pub(crate) fn is_help_key(key: &Key, help: &str, config: &PromptConfig) -> bool {
    !help.is_empty() && *key == Key::Char(config.help_input)
}

/// Line-input loop shared by Input, Password and Confirm.
///
/// Submitting exactly the help key expands help and keeps reading. Ctrl-D on
/// an empty line ends input.
pub(crate) fn read_line(
    session: &mut Session<'_>,
    help: &str,
    show_help: &mut bool,
    mut draw: impl FnMut(&LineEditor, bool) -> View,
) -> Result<String, SurveyError> {
    let help_line = session.config().help_input.to_string();
    let mut editor = LineEditor::new();
    loop {
        session.render(&draw(&editor, *show_help));
        let key = session.next_key()?;
        match key {
            Key::Enter => {
                if !help.is_empty() && editor.value() == help_line {
                    *show_help = true;
                    editor.clear();
                    continue;
                }
                return Ok(editor.take());
            }
            Key::EndOfFile if editor.is_empty() => return Err(SurveyError::input_closed()),
            key => {
                editor.handle_key(&key);
            }
        }
    }
}
