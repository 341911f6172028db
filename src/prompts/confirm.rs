//! Yes/no prompt.

use crate::core::answer::Answer;
use crate::error::SurveyError;
use crate::prompts::{answered, live, read_line, Attempt, Prompt};
use crate::render::{templates, View};
use crate::runtime::Session;

#[derive(Debug, Clone, Default)]
pub struct Confirm {
    pub message: String,
    pub default: bool,
    pub help: String,
}

impl Confirm {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn default_value(mut self, default: bool) -> Self {
        self.default = default;
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }
}

/// Interpret a typed reply; `None` for anything but yes/no.
pub fn parse_reply(reply: &str, default: bool) -> Option<bool> {
    match reply.trim().to_ascii_lowercase().as_str() {
        "" => Some(default),
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

impl Prompt for Confirm {
    fn prompt(&self, session: &mut Session<'_>, attempt: &Attempt) -> Result<Answer, SurveyError> {
        let config = session.config();
        let mut show_help = false;
        let error = attempt.error.as_deref();
        let reply = read_line(session, &self.help, &mut show_help, |editor, show_help| {
            let data = live(config, &self.message, &self.help, show_help, error);
            let mut text = templates::confirm(&data, self.default);
            text.push_str(editor.value());
            View::new(text).cursor_back(editor.cells_after_cursor(None))
        })?;

        match parse_reply(&reply, self.default) {
            Some(value) => Ok(Answer::Bool(value)),
            None => Err(SurveyError::Input(format!(
                "{reply:?} is not a valid answer, please try again."
            ))),
        }
    }

    fn finalize(&self, session: &mut Session<'_>, answer: &Answer) {
        let text = if answer.as_bool().unwrap_or(self.default) {
            "Yes"
        } else {
            "No"
        };
        let data = answered(session.config(), &self.message, text);
        session.finalize(&View::new(templates::confirm(&data, self.default)));
    }
}

#[cfg(test)]
mod tests {
    use super::parse_reply;

    #[test]
    fn replies_are_case_insensitive_and_empty_takes_the_default() {
        assert_eq!(parse_reply("", true), Some(true));
        assert_eq!(parse_reply("", false), Some(false));
        assert_eq!(parse_reply("Y", false), Some(true));
        assert_eq!(parse_reply("yes", false), Some(true));
        assert_eq!(parse_reply("NO", true), Some(false));
        assert_eq!(parse_reply("x", true), None);
        assert_eq!(parse_reply("yep", true), None);
    }
}
