//! Single-choice list prompt with type-to-filter.

use std::fmt;

use unicode_segmentation::UnicodeSegmentation;

use crate::config::PromptConfig;
use crate::core::answer::{Answer, OptionAnswer};
use crate::core::keys::Key;
use crate::error::SurveyError;
use crate::prompts::{answered, is_help_key, live, Attempt, Prompt};
use crate::render::{templates, OptionRow, View};
use crate::runtime::{paginate, Session};

/// Per-option description: `(value, index) -> text`.
pub type DescriptionFn = dyn Fn(&str, usize) -> String + Send + Sync;

/// Custom filter: `(filter, value, index) -> keep`.
pub type FilterFn = dyn Fn(&str, &str, usize) -> bool + Send + Sync;

/// Case-insensitive substring match.
pub fn default_filter(filter: &str, value: &str, _index: usize) -> bool {
    value.to_lowercase().contains(&filter.to_lowercase())
}

/// Filtered, selectable view over an option list.
pub(crate) struct OptionList<'o> {
    options: &'o [String],
    matcher: Option<&'o FilterFn>,
    filter: String,
    /// Original indices of the options passing the filter.
    visible: Vec<usize>,
    /// Position inside `visible`.
    selected: usize,
}

impl<'o> OptionList<'o> {
    pub(crate) fn new(options: &'o [String], matcher: Option<&'o FilterFn>) -> Self {
        Self {
            options,
            matcher,
            filter: String::new(),
            visible: (0..options.len()).collect(),
            selected: 0,
        }
    }

    pub(crate) fn filter(&self) -> &str {
        &self.filter
    }

    fn keep(&self, index: usize) -> bool {
        let value = &self.options[index];
        match self.matcher {
            Some(matcher) => matcher(&self.filter, value, index),
            None => default_filter(&self.filter, value, index),
        }
    }

    fn refilter(&mut self) {
        self.visible = if self.filter.is_empty() {
            (0..self.options.len()).collect()
        } else {
            (0..self.options.len()).filter(|&index| self.keep(index)).collect()
        };
        self.selected = 0;
    }

    pub(crate) fn push_filter(&mut self, text: &str) {
        self.filter.push_str(text);
        self.refilter();
    }

    pub(crate) fn pop_filter(&mut self) {
        if let Some((offset, _)) = self.filter.grapheme_indices(true).next_back() {
            self.filter.truncate(offset);
            self.refilter();
        }
    }

    /// Clear the filter, keeping the cursor on the current option.
    pub(crate) fn clear_filter(&mut self) {
        if self.filter.is_empty() {
            return;
        }
        let current = self.current();
        self.filter.clear();
        self.refilter();
        if let Some(index) = current {
            self.focus(index);
        }
    }

    pub(crate) fn up(&mut self) {
        if self.visible.is_empty() {
            return;
        }
        self.selected = if self.selected == 0 {
            self.visible.len() - 1
        } else {
            self.selected - 1
        };
    }

    pub(crate) fn down(&mut self) {
        if self.visible.is_empty() {
            return;
        }
        self.selected = (self.selected + 1) % self.visible.len();
    }

    /// Move the cursor onto the option with this original index, if visible.
    pub(crate) fn focus(&mut self, index: usize) {
        if let Some(position) = self.visible.iter().position(|&visible| visible == index) {
            self.selected = position;
        }
    }

    /// Original index of the option under the cursor.
    pub(crate) fn current(&self) -> Option<usize> {
        self.visible.get(self.selected).copied()
    }

    pub(crate) fn visible(&self) -> &[usize] {
        &self.visible
    }

    pub(crate) fn value(&self, index: usize) -> &'o str {
        &self.options[index]
    }

    /// The visible page: `(original index, focused)` pairs.
    pub(crate) fn page(&self, page_size: usize) -> Vec<(usize, bool)> {
        let (window, focused) = paginate(page_size, &self.visible, self.selected);
        window
            .iter()
            .enumerate()
            .map(|(position, &index)| (index, position == focused))
            .collect()
    }
}

/// Handle a filter-editing key. Returns `false` for keys it does not own.
pub(crate) fn edit_filter(list: &mut OptionList<'_>, key: &Key) -> bool {
    match key {
        Key::Char(ch) => {
            list.push_filter(ch.encode_utf8(&mut [0u8; 4]));
            true
        }
        Key::Paste(text) => {
            list.push_filter(&text.replace(['\r', '\n'], ""));
            true
        }
        Key::Backspace => {
            list.pop_filter();
            true
        }
        Key::Up | Key::ShiftTab => {
            list.up();
            true
        }
        Key::Down | Key::Tab => {
            list.down();
            true
        }
        _ => false,
    }
}

pub(crate) fn describe(
    description: Option<&DescriptionFn>,
    value: &str,
    index: usize,
) -> Option<String> {
    description.map(|describe| describe(value, index))
}

pub(crate) fn page_size(own: Option<usize>, config: &PromptConfig) -> usize {
    own.unwrap_or(config.page_size).max(1)
}

#[derive(Default)]
pub struct Select {
    pub message: String,
    pub options: Vec<String>,
    /// Preselected option value.
    pub default: Option<String>,
    pub help: String,
    /// Overrides the survey-wide page size.
    pub page_size: Option<usize>,
    pub description: Option<Box<DescriptionFn>>,
    pub filter: Option<Box<FilterFn>>,
}

impl fmt::Debug for Select {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Select")
            .field("message", &self.message)
            .field("options", &self.options)
            .field("default", &self.default)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

impl Select {
    pub fn new<S: Into<String>>(message: impl Into<String>, options: impl IntoIterator<Item = S>) -> Self {
        Self {
            message: message.into(),
            options: options.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn default_value(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn description(mut self, describe: impl Fn(&str, usize) -> String + Send + Sync + 'static) -> Self {
        self.description = Some(Box::new(describe));
        self
    }

    pub fn filter(mut self, keep: impl Fn(&str, &str, usize) -> bool + Send + Sync + 'static) -> Self {
        self.filter = Some(Box::new(keep));
        self
    }

    fn default_index(&self) -> Option<usize> {
        let default = self.default.as_deref()?;
        self.options.iter().position(|option| option == default)
    }

    fn view(&self, config: &PromptConfig, list: &OptionList<'_>, show_help: bool, error: Option<&str>) -> View {
        let descriptions: Vec<(usize, bool, Option<String>)> = list
            .page(page_size(self.page_size, config))
            .into_iter()
            .map(|(index, focused)| {
                (
                    index,
                    focused,
                    describe(self.description.as_deref(), list.value(index), index),
                )
            })
            .collect();
        let rows: Vec<OptionRow<'_>> = descriptions
            .iter()
            .map(|(index, focused, description)| OptionRow {
                value: list.value(*index),
                description: description.as_deref(),
                focused: *focused,
                checked: None,
            })
            .collect();
        let data = live(config, &self.message, &self.help, show_help, error);
        View::new(templates::select(&data, list.filter(), &rows)).hide_cursor(true)
    }
}

impl Prompt for Select {
    fn check(&self, _config: &PromptConfig) -> Result<(), SurveyError> {
        if self.options.is_empty() {
            return Err(SurveyError::InvalidPrompt(
                "please provide options to select from".to_string(),
            ));
        }
        if let Some(default) = self.default.as_deref() {
            if self.default_index().is_none() {
                return Err(SurveyError::InvalidPrompt(format!(
                    "default value {default:?} not found in options"
                )));
            }
        }
        Ok(())
    }

    fn prompt(&self, session: &mut Session<'_>, attempt: &Attempt) -> Result<Answer, SurveyError> {
        self.check(session.config())?;
        let config = session.config();
        let mut list = OptionList::new(&self.options, self.filter.as_deref());
        let start = attempt
            .rejected
            .as_ref()
            .and_then(Answer::as_option)
            .map(|option| option.index)
            .or_else(|| self.default_index());
        if let Some(index) = start {
            list.focus(index);
        }

        let mut show_help = false;
        loop {
            session.render(&self.view(config, &list, show_help, attempt.error.as_deref()));
            let key = session.next_key()?;
            if is_help_key(&key, &self.help, config) {
                show_help = true;
                continue;
            }
            match key {
                Key::Enter => {
                    if let Some(index) = list.current() {
                        return Ok(Answer::Option(OptionAnswer::new(index, list.value(index))));
                    }
                }
                Key::Space => list.push_filter(" "),
                key => {
                    edit_filter(&mut list, &key);
                }
            }
        }
    }

    fn finalize(&self, session: &mut Session<'_>, answer: &Answer) {
        let text = answer.to_string();
        let data = answered(session.config(), &self.message, &text);
        session.finalize(&View::new(templates::select(&data, "", &[])));
    }
}

#[cfg(test)]
mod tests {
    use super::{default_filter, edit_filter, OptionList, Select};
    use crate::config::PromptConfig;
    use crate::core::keys::Key;
    use crate::error::SurveyError;
    use crate::prompts::Prompt;
    use assert_matches::assert_matches;

    fn colors() -> Vec<String> {
        ["red", "blue", "green", "yellow"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn filtering_keeps_original_indices() {
        let options = colors();
        let mut list = OptionList::new(&options, None);
        for ch in "ye".chars() {
            edit_filter(&mut list, &Key::Char(ch));
        }
        assert_eq!(list.visible(), &[3]);
        assert_eq!(list.current(), Some(3));

        edit_filter(&mut list, &Key::Backspace);
        edit_filter(&mut list, &Key::Backspace);
        assert_eq!(list.visible(), &[0, 1, 2, 3]);
    }

    #[test]
    fn filter_is_case_insensitive_substring() {
        assert!(default_filter("EL", "yellow", 0));
        assert!(default_filter("", "anything", 0));
        assert!(!default_filter("x", "yellow", 0));
    }

    #[test]
    fn navigation_wraps_both_ways() {
        let options = colors();
        let mut list = OptionList::new(&options, None);
        list.up();
        assert_eq!(list.current(), Some(3));
        list.down();
        assert_eq!(list.current(), Some(0));
        edit_filter(&mut list, &Key::Tab);
        assert_eq!(list.current(), Some(1));
    }

    #[test]
    fn page_follows_the_selection() {
        let options = colors();
        let mut list = OptionList::new(&options, None);
        list.focus(3);
        assert_eq!(list.page(2), vec![(2, false), (3, true)]);
    }

    #[test]
    fn custom_filter_replaces_the_default() {
        let options = colors();
        let starts_with = |filter: &str, value: &str, _: usize| value.starts_with(filter);
        let mut list = OptionList::new(&options, Some(&starts_with));
        list.push_filter("e");
        assert!(list.visible().is_empty());
        assert_eq!(list.current(), None);
    }

    #[test]
    fn empty_options_and_unknown_defaults_are_rejected() {
        let config = PromptConfig::default();
        let empty = Select::new("Pick", Vec::<String>::new());
        assert_matches!(empty.check(&config), Err(SurveyError::InvalidPrompt(_)));

        let unknown = Select::new("Pick", colors()).default_value("purple");
        assert_matches!(unknown.check(&config), Err(SurveyError::InvalidPrompt(_)));

        let known = Select::new("Pick", colors()).default_value("green");
        assert!(known.check(&config).is_ok());
    }
}
