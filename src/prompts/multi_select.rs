//! Multiple-choice list prompt.

use std::collections::BTreeSet;
use std::fmt;

use crate::config::PromptConfig;
use crate::core::answer::{Answer, OptionAnswer};
use crate::core::keys::Key;
use crate::error::SurveyError;
use crate::prompts::select::{describe, edit_filter, page_size, DescriptionFn, FilterFn, OptionList};
use crate::prompts::{answered, is_help_key, live, Attempt, Prompt};
use crate::render::{templates, OptionRow, View};
use crate::runtime::Session;

#[derive(Default)]
pub struct MultiSelect {
    pub message: String,
    pub options: Vec<String>,
    /// Values checked when the prompt opens.
    pub default: Vec<String>,
    pub help: String,
    pub page_size: Option<usize>,
    pub description: Option<Box<DescriptionFn>>,
    pub filter: Option<Box<FilterFn>>,
}

impl fmt::Debug for MultiSelect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiSelect")
            .field("message", &self.message)
            .field("options", &self.options)
            .field("default", &self.default)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

impl MultiSelect {
    pub fn new<S: Into<String>>(message: impl Into<String>, options: impl IntoIterator<Item = S>) -> Self {
        Self {
            message: message.into(),
            options: options.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn default_values<S: Into<String>>(mut self, values: impl IntoIterator<Item = S>) -> Self {
        self.default = values.into_iter().map(Into::into).collect();
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

    fn default_checked(&self) -> Result<BTreeSet<usize>, SurveyError> {
        self.default
            .iter()
            .map(|value| {
                self.options
                    .iter()
                    .position(|option| option == value)
                    .ok_or_else(|| {
                        SurveyError::InvalidPrompt(format!(
                            "default value {value:?} not found in options"
                        ))
                    })
            })
            .collect()
    }

    fn view(
        &self,
        config: &PromptConfig,
        list: &OptionList<'_>,
        checked: &BTreeSet<usize>,
        show_help: bool,
        error: Option<&str>,
    ) -> View {
        let page: Vec<(usize, bool, Option<String>)> = list
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
        let rows: Vec<OptionRow<'_>> = page
            .iter()
            .map(|(index, focused, description)| OptionRow {
                value: list.value(*index),
                description: description.as_deref(),
                focused: *focused,
                checked: Some(checked.contains(index)),
            })
            .collect();
        let data = live(config, &self.message, &self.help, show_help, error);
        View::new(templates::multi_select(&data, list.filter(), &rows)).hide_cursor(true)
    }
}

impl Prompt for MultiSelect {
    fn check(&self, _config: &PromptConfig) -> Result<(), SurveyError> {
        if self.options.is_empty() {
            return Err(SurveyError::InvalidPrompt(
                "please provide options to select from".to_string(),
            ));
        }
        self.default_checked().map(|_| ())
    }

    fn prompt(&self, session: &mut Session<'_>, attempt: &Attempt) -> Result<Answer, SurveyError> {
        let config = session.config();
        let mut checked: BTreeSet<usize> = match attempt.rejected.as_ref().and_then(Answer::as_list) {
            Some(previous) => previous
                .iter()
                .filter_map(Answer::as_option)
                .map(|option| option.index)
                .filter(|&index| index < self.options.len())
                .collect(),
            None => self.default_checked()?,
        };
        let mut list = OptionList::new(&self.options, self.filter.as_deref());

        let mut show_help = false;
        loop {
            session.render(&self.view(
                config,
                &list,
                &checked,
                show_help,
                attempt.error.as_deref(),
            ));
            let key = session.next_key()?;
            if is_help_key(&key, &self.help, config) {
                show_help = true;
                continue;
            }
            match key {
                Key::Enter => {
                    let values: Vec<Answer> = checked
                        .iter()
                        .map(|&index| Answer::Option(OptionAnswer::new(index, list.value(index))))
                        .collect();
                    return Ok(Answer::List(values));
                }
                Key::Space => {
                    if let Some(index) = list.current() {
                        if !checked.remove(&index) {
                            checked.insert(index);
                        }
                        if !config.keep_filter {
                            list.clear_filter();
                        }
                    }
                }
                Key::Right if !config.remove_select_all => {
                    checked.extend(list.visible().iter().copied());
                    if !config.keep_filter {
                        list.clear_filter();
                    }
                }
                Key::Left if !config.remove_select_none => {
                    for index in list.visible() {
                        checked.remove(index);
                    }
                    if !config.keep_filter {
                        list.clear_filter();
                    }
                }
                key => {
                    edit_filter(&mut list, &key);
                }
            }
        }
    }

    fn finalize(&self, session: &mut Session<'_>, answer: &Answer) {
        let text = answer.to_string();
        let data = answered(session.config(), &self.message, &text);
        session.finalize(&View::new(templates::multi_select(&data, "", &[])));
    }
}

#[cfg(test)]
mod tests {
    use super::MultiSelect;
    use crate::config::PromptConfig;
    use crate::error::SurveyError;
    use crate::prompts::Prompt;
    use assert_matches::assert_matches;

    const DAYS: [&str; 7] = [
        "Sunday",
        "Monday",
        "Tuesday",
        "Wednesday",
        "Thursday",
        "Friday",
        "Saturday",
    ];

    #[test]
    fn defaults_resolve_to_original_indices() {
        let prompt = MultiSelect::new("Days", DAYS).default_values(["Wednesday", "Monday"]);
        let checked = prompt.default_checked().unwrap();
        assert_eq!(checked.into_iter().collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn unknown_defaults_are_rejected() {
        let prompt = MultiSelect::new("Days", DAYS).default_values(["Someday"]);
        assert_matches!(
            prompt.check(&PromptConfig::default()),
            Err(SurveyError::InvalidPrompt(message)) if message.contains("Someday")
        );
    }
}
