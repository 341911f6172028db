//! Prompt templates.
//!
//! Every template is a pure function of a [`TemplateData`] snapshot plus the
//! prompt's own view state. Output uses `\n` line breaks; the renderer converts
//! them for raw mode.

use crate::config::PromptConfig;
use crate::core::text::ansi::{paint, Style};

/// Snapshot shared by every prompt template.
#[derive(Debug, Clone, Copy)]
pub struct TemplateData<'a> {
    pub message: &'a str,
    pub help: &'a str,
    pub show_help: bool,
    /// Inline validation or input error from the previous attempt.
    pub error: Option<&'a str>,
    /// Final answer text; present only when finalizing.
    pub answer: Option<&'a str>,
    pub config: &'a PromptConfig,
}

impl<'a> TemplateData<'a> {
    pub fn new(message: &'a str, help: &'a str, config: &'a PromptConfig) -> Self {
        Self {
            message,
            help,
            show_help: false,
            error: None,
            answer: None,
            config,
        }
    }

    fn color(&self) -> bool {
        self.config.color
    }

    fn paint(&self, text: &str, style: Style) -> String {
        paint(text, style, self.color())
    }

    /// Error line, expanded help line, then the question icon.
    fn preamble(&self) -> String {
        let mut out = String::new();
        if let Some(error) = self.error {
            let icon = &self.config.icons.error;
            out.push_str(&paint(
                &format!("{} Sorry, your reply was invalid: {error}", icon.text),
                icon.style,
                self.color(),
            ));
            out.push('\n');
        }
        if self.show_help && !self.help.is_empty() {
            let icon = &self.config.icons.help;
            out.push_str(&paint(
                &format!("{} {}", icon.text, self.help),
                icon.style,
                self.color(),
            ));
            out.push('\n');
        }
        out.push_str(&self.config.icons.question.render(self.color()));
        out.push(' ');
        out
    }

    /// Question line for line-input prompts: icon, message, trailing space.
    fn question(&self) -> String {
        let mut out = self.preamble();
        out.push_str(&self.paint(&format!("{} ", self.message), Style::Bold));
        out
    }

    fn help_hint(&self, text: &str) -> String {
        if self.help.is_empty() || self.show_help {
            return String::new();
        }
        self.paint(text, Style::Cyan)
    }

    fn answer_line(&self, answer: &str) -> String {
        format!("{}\n", self.paint(answer, Style::Cyan))
    }
}

pub fn confirm(data: &TemplateData<'_>, default: bool) -> String {
    let mut out = data.question();
    if let Some(answer) = data.answer {
        out.push_str(&data.answer_line(answer));
        return out;
    }
    let hint = data.help_hint(&format!("[{} for help]", data.config.help_input));
    if !hint.is_empty() {
        out.push_str(&hint);
        out.push(' ');
    }
    out.push_str(if default { "(Y/n) " } else { "(y/N) " });
    out
}

pub fn input(data: &TemplateData<'_>, default: &str, typed: &str) -> String {
    let mut out = data.question();
    if let Some(answer) = data.answer {
        out.push_str(&data.answer_line(answer));
        return out;
    }
    let hint = data.help_hint(&format!("[{} for help]", data.config.help_input));
    if !hint.is_empty() {
        out.push_str(&hint);
        out.push(' ');
    }
    if !default.is_empty() {
        out.push_str(&format!("({default}) "));
    }
    out.push_str(typed);
    out
}

pub fn password(data: &TemplateData<'_>, masked: &str) -> String {
    let mut out = data.question();
    if let Some(answer) = data.answer {
        out.push_str(&data.answer_line(answer));
        return out;
    }
    let hint = data.help_hint(&format!("[{} for help]", data.config.help_input));
    if !hint.is_empty() {
        out.push_str(&hint);
        out.push(' ');
    }
    out.push_str(masked);
    out
}

/// `default` is `None` when there is no default or it is hidden.
pub fn editor(data: &TemplateData<'_>, default: Option<&str>) -> String {
    let mut out = data.question();
    if let Some(answer) = data.answer {
        out.push_str(&data.answer_line(answer));
        return out;
    }
    let hint = data.help_hint(&format!("[{} for help]", data.config.help_input));
    if !hint.is_empty() {
        out.push_str(&hint);
        out.push(' ');
    }
    if let Some(default) = default.filter(|value| !value.is_empty()) {
        out.push_str(&format!("({default}) "));
    }
    out.push_str(&data.paint("[Enter to launch editor]", Style::Cyan));
    out.push(' ');
    out
}

/// `lines` are the completed lines; `current` is the line being typed.
pub fn multiline(data: &TemplateData<'_>, default: &str, lines: &[String], current: &str) -> String {
    let mut out = data.question();
    if let Some(answer) = data.answer {
        out.push('\n');
        out.push_str(&data.paint(answer, Style::Cyan));
        if !answer.is_empty() {
            out.push('\n');
        }
        return out;
    }
    if !default.is_empty() {
        out.push_str(&format!("({default}) "));
    }
    out.push_str(&data.paint("[Enter 2 empty lines to finish]", Style::Cyan));
    for line in lines {
        out.push('\n');
        out.push_str(line);
    }
    out.push('\n');
    out.push_str(current);
    out
}

/// One visible option row.
#[derive(Debug, Clone, Copy)]
pub struct OptionRow<'a> {
    pub value: &'a str,
    pub description: Option<&'a str>,
    pub focused: bool,
    /// `Some` for multi-select rows.
    pub checked: Option<bool>,
}

fn list_question(data: &TemplateData<'_>, filter: &str) -> String {
    let mut out = data.preamble();
    let mut message = data.message.to_string();
    if !filter.is_empty() {
        message.push(' ');
        message.push_str(filter);
    }
    out.push_str(&data.paint(&message, Style::Bold));
    out
}

fn option_row(data: &TemplateData<'_>, row: &OptionRow<'_>) -> String {
    let icons = &data.config.icons;
    let color = data.color();
    let mut out = String::new();
    match row.checked {
        None => {
            if row.focused {
                out.push_str(&icons.select_focus.render(color));
                out.push(' ');
            } else {
                out.push_str("  ");
            }
        }
        Some(checked) => {
            if row.focused {
                out.push_str(&icons.select_focus.render(color));
            } else {
                out.push(' ');
            }
            let icon = if checked {
                &icons.marked_option
            } else {
                &icons.unmarked_option
            };
            out.push_str(&paint(&format!(" {} ", icon.text), icon.style, color));
            out.push(' ');
        }
    }
    out.push_str(row.value);
    if let Some(description) = row.description.filter(|text| !text.is_empty()) {
        out.push_str(" - ");
        out.push_str(&data.paint(description, Style::Cyan));
    }
    out.push('\n');
    out
}

fn list_body(data: &TemplateData<'_>, hint: &str, rows: &[OptionRow<'_>]) -> String {
    let mut out = String::from("  ");
    let mut hint = hint.to_string();
    if !data.help.is_empty() && !data.show_help {
        hint.push_str(&format!(", {} for more help", data.config.help_input));
    }
    out.push_str(&data.paint(&format!("[{hint}]"), Style::Cyan));
    out.push('\n');
    for row in rows {
        out.push_str(&option_row(data, row));
    }
    out
}

pub fn select(data: &TemplateData<'_>, filter: &str, rows: &[OptionRow<'_>]) -> String {
    let mut out = list_question(data, filter);
    if let Some(answer) = data.answer {
        out.push(' ');
        out.push_str(&data.answer_line(answer));
        return out;
    }
    out.push_str(&list_body(data, "Use arrows to move, type to filter", rows));
    out
}

pub fn multi_select(data: &TemplateData<'_>, filter: &str, rows: &[OptionRow<'_>]) -> String {
    let mut out = list_question(data, filter);
    if let Some(answer) = data.answer {
        out.push(' ');
        out.push_str(&data.answer_line(answer));
        return out;
    }
    let mut hint = String::from("Use arrows to move, space to select,");
    if !data.config.remove_select_all {
        hint.push_str(" <right> to all,");
    }
    if !data.config.remove_select_none {
        hint.push_str(" <left> to none,");
    }
    hint.push_str(" type to filter");
    out.push_str(&list_body(data, &hint, rows));
    out
}

#[cfg(test)]
mod tests {
    use super::{OptionRow, TemplateData};
    use crate::config::PromptConfig;
    use pretty_assertions::assert_eq;

    fn plain() -> PromptConfig {
        PromptConfig {
            color: false,
            ..PromptConfig::default()
        }
    }

    #[test]
    fn confirm_variants() {
        let config = plain();
        let msg = "Is pizza your favorite food?";

        let data = TemplateData::new(msg, "", &config);
        assert_eq!(super::confirm(&data, true), "? Is pizza your favorite food? (Y/n) ");
        assert_eq!(super::confirm(&data, false), "? Is pizza your favorite food? (y/N) ");

        let answered = TemplateData {
            answer: Some("Yes"),
            ..data
        };
        assert_eq!(
            super::confirm(&answered, false),
            "? Is pizza your favorite food? Yes\n"
        );

        let with_help = TemplateData::new(msg, "This is helpful", &config);
        assert_eq!(
            super::confirm(&with_help, false),
            "? Is pizza your favorite food? [? for help] (y/N) "
        );

        let help_shown = TemplateData {
            show_help: true,
            ..with_help
        };
        assert_eq!(
            super::confirm(&help_shown, false),
            "? This is helpful\n? Is pizza your favorite food? (y/N) "
        );
    }

    #[test]
    fn editor_variants() {
        let config = plain();
        let msg = "What is your favorite month:";
        let data = TemplateData::new(msg, "", &config);
        assert_eq!(
            super::editor(&data, None),
            "? What is your favorite month: [Enter to launch editor] "
        );
        assert_eq!(
            super::editor(&data, Some("April")),
            "? What is your favorite month: (April) [Enter to launch editor] "
        );

        let with_help = TemplateData::new(msg, "This is helpful", &config);
        assert_eq!(
            super::editor(&with_help, Some("April")),
            "? What is your favorite month: [? for help] (April) [Enter to launch editor] "
        );
        let shown = TemplateData {
            show_help: true,
            ..with_help
        };
        assert_eq!(
            super::editor(&shown, None),
            "? This is helpful\n? What is your favorite month: [Enter to launch editor] "
        );

        let answered = TemplateData {
            answer: Some("October"),
            ..data
        };
        assert_eq!(
            super::editor(&answered, Some("April")),
            "? What is your favorite month: October\n"
        );
    }

    #[test]
    fn multiline_variants() {
        let config = plain();
        let msg = "What is your favorite month:";
        let data = TemplateData::new(msg, "", &config);
        assert!(super::multiline(&data, "", &[], "")
            .starts_with("? What is your favorite month: [Enter 2 empty lines to finish]"));
        assert!(super::multiline(&data, "April", &[], "").starts_with(
            "? What is your favorite month: (April) [Enter 2 empty lines to finish]"
        ));

        let answered = TemplateData {
            answer: Some("October"),
            ..data
        };
        assert_eq!(
            super::multiline(&answered, "", &[], ""),
            "? What is your favorite month: \nOctober\n"
        );
    }

    #[test]
    fn password_and_input_hints() {
        let config = plain();
        let data = TemplateData::new("Tell me your secret:", "This is helpful", &config);
        assert_eq!(
            super::password(&data, "***"),
            "? Tell me your secret: [? for help] ***"
        );

        let input = TemplateData::new("What is your name?", "", &config);
        assert_eq!(
            super::input(&input, "Johnny", "La"),
            "? What is your name? (Johnny) La"
        );
    }

    #[test]
    fn error_line_comes_first() {
        let config = plain();
        let data = TemplateData {
            error: Some("Value is required"),
            ..TemplateData::new("What is your name?", "", &config)
        };
        assert_eq!(
            super::input(&data, "", ""),
            "X Sorry, your reply was invalid: Value is required\n? What is your name? "
        );
    }

    #[test]
    fn list_prompts_render_hint_and_rows() {
        let config = plain();
        let data = TemplateData::new("Choose a color:", "", &config);
        let rows = [
            OptionRow { value: "red", description: None, focused: true, checked: None },
            OptionRow { value: "blue", description: Some("calm"), focused: false, checked: None },
        ];
        assert_eq!(
            super::select(&data, "", &rows),
            "? Choose a color:  [Use arrows to move, type to filter]\n> red\n  blue - calm\n"
        );

        let answered = TemplateData {
            answer: Some("yellow"),
            ..data
        };
        assert_eq!(super::select(&answered, "", &rows), "? Choose a color: yellow\n");

        let days = TemplateData::new("What days do you prefer:", "help", &config);
        let rows = [
            OptionRow { value: "Sunday", description: None, focused: false, checked: Some(false) },
            OptionRow { value: "Monday", description: None, focused: true, checked: Some(true) },
        ];
        assert_eq!(
            super::multi_select(&days, "", &rows),
            "? What days do you prefer:  [Use arrows to move, space to select, <right> to all, \
             <left> to none, type to filter, ? for more help]\n  [ ]  Sunday\n> [x]  Monday\n"
        );
    }

    #[test]
    fn multi_select_hint_drops_disabled_shortcuts() {
        let config = PromptConfig {
            remove_select_all: true,
            remove_select_none: true,
            ..plain()
        };
        let data = TemplateData::new("What days do you prefer:", "", &config);
        assert_eq!(
            super::multi_select(&data, "", &[]),
            "? What days do you prefer:  [Use arrows to move, space to select, type to filter]\n"
        );
    }

    #[test]
    fn color_wraps_icons_when_enabled() {
        let config = PromptConfig::default();
        let data = TemplateData::new("Name", "", &config);
        let out = super::input(&data, "", "");
        assert!(out.starts_with("\x1b[32m?\x1b[0m "));
    }
}
