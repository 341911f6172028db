//! Masked line prompt.

use unicode_segmentation::UnicodeSegmentation;

use crate::core::answer::Answer;
use crate::error::SurveyError;
use crate::prompts::{answered, live, read_line, Attempt, Prompt};
use crate::render::{templates, View};
use crate::runtime::Session;

#[derive(Debug, Clone, Default)]
pub struct Password {
    pub message: String,
    pub help: String,
}

impl Password {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }
}

impl Prompt for Password {
    fn prompt(&self, session: &mut Session<'_>, attempt: &Attempt) -> Result<Answer, SurveyError> {
        let config = session.config();
        let mask = Some(config.hide_character);
        let mut show_help = false;
        let line = read_line(session, &self.help, &mut show_help, |editor, show_help| {
            let data = live(
                config,
                &self.message,
                &self.help,
                show_help,
                attempt.error.as_deref(),
            );
            View::new(templates::password(&data, &editor.display(mask)))
                .cursor_back(editor.cells_after_cursor(mask))
        })?;
        Ok(Answer::String(line))
    }

    fn finalize(&self, session: &mut Session<'_>, answer: &Answer) {
        let config = session.config();
        let masked: String = std::iter::repeat(config.hide_character)
            .take(answer.to_string().graphemes(true).count())
            .collect();
        let data = answered(config, &self.message, &masked);
        session.finalize(&View::new(templates::password(&data, "")));
    }
}
