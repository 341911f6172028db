//! Multi-line text prompt finished by two consecutive empty lines.

use crate::core::answer::Answer;
use crate::core::keys::Key;
use crate::core::line_editor::LineEditor;
use crate::error::SurveyError;
use crate::prompts::{answered, live, Attempt, Prompt};
use crate::render::{templates, View};
use crate::runtime::Session;

#[derive(Debug, Clone, Default)]
pub struct Multiline {
    pub message: String,
    pub default: String,
    pub help: String,
}

impl Multiline {
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

/// Join submitted lines, dropping surrounding blank space.
fn join_lines(lines: &[String]) -> String {
    lines.join("\n").trim().to_string()
}

impl Prompt for Multiline {
    fn prompt(&self, session: &mut Session<'_>, attempt: &Attempt) -> Result<Answer, SurveyError> {
        let config = session.config();
        let mut lines: Vec<String> = Vec::new();
        let mut editor = LineEditor::new();
        loop {
            let data = live(
                config,
                &self.message,
                &self.help,
                false,
                attempt.error.as_deref(),
            );
            let text = templates::multiline(&data, &self.default, &lines, editor.value());
            session.render(&View::new(text).cursor_back(editor.cells_after_cursor(None)));

            match session.next_key()? {
                Key::Enter => {
                    let line = editor.take();
                    if line.is_empty() && lines.last().is_some_and(String::is_empty) {
                        break;
                    }
                    lines.push(line);
                }
                Key::EndOfFile if editor.is_empty() => return Err(SurveyError::input_closed()),
                key => {
                    editor.handle_key(&key);
                }
            }
        }

        let value = join_lines(&lines);
        if value.is_empty() {
            return Ok(Answer::String(self.default.clone()));
        }
        Ok(Answer::String(value))
    }

    fn finalize(&self, session: &mut Session<'_>, answer: &Answer) {
        let text = answer.to_string();
        let data = answered(session.config(), &self.message, &text);
        session.finalize(&View::new(templates::multiline(&data, &self.default, &[], "")));
    }
}
