//! Free-text line prompt.

use crate::core::answer::Answer;
use crate::error::SurveyError;
use crate::prompts::{answered, live, read_line, Attempt, Prompt};
use crate::render::{templates, View};
use crate::runtime::Session;

#[derive(Debug, Clone, Default)]
pub struct Input {
    pub message: String,
    pub default: String,
    pub help: String,
}

impl Input {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn default_value(mut self, default: impl Into<String>) -> Self {
        self.default = default.into();
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }
}

impl Prompt for Input {
    fn prompt(&self, session: &mut Session<'_>, attempt: &Attempt) -> Result<Answer, SurveyError> {
        let config = session.config();
        let mut show_help = false;
        let line = read_line(session, &self.help, &mut show_help, |editor, show_help| {
            let data = live(
                config,
                &self.message,
                &self.help,
                show_help,
                attempt.error.as_deref(),
            );
            View::new(templates::input(&data, &self.default, editor.value()))
                .cursor_back(editor.cells_after_cursor(None))
        })?;

        if line.is_empty() {
            return Ok(Answer::String(self.default.clone()));
        }
        Ok(Answer::String(line))
    }

    fn finalize(&self, session: &mut Session<'_>, answer: &Answer) {
        let text = answer.to_string();
        let data = answered(session.config(), &self.message, &text);
        session.finalize(&View::new(templates::input(&data, &self.default, "")));
    }
}
