//! Environment configuration, prompt configuration, and the `ask` option builder.

use std::env;
use std::fmt;

use crate::core::terminal::Terminal;
use crate::core::text::ansi::{paint, Style};
use crate::runtime::input_slot::InterruptHandle;
use crate::survey::Validator;

#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    pub visual: Option<String>,
    pub editor: Option<String>,
    pub write_log: Option<String>,
    pub debug_redraw: bool,
    pub no_color: bool,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            visual: env_string_opt("VISUAL"),
            editor: env_string_opt("EDITOR"),
            write_log: env_string_opt("TAPE_SURVEY_WRITE_LOG"),
            debug_redraw: env_flag("TAPE_SURVEY_DEBUG_REDRAW"),
            no_color: env::var_os("NO_COLOR").is_some_and(|value| !value.is_empty()),
        }
    }

    /// Editor command from the environment, `$VISUAL` first.
    pub fn editor_command(&self) -> Option<&str> {
        self.visual.as_deref().or(self.editor.as_deref())
    }
}

fn env_flag(key: &str) -> bool {
    env::var(key).map(|value| value == "1").unwrap_or(false)
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icon {
    pub text: String,
    pub style: Style,
}

impl Icon {
    pub fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    pub fn render(&self, color: bool) -> String {
        paint(&self.text, self.style, color)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icons {
    pub question: Icon,
    pub help: Icon,
    pub error: Icon,
    pub select_focus: Icon,
    pub marked_option: Icon,
    pub unmarked_option: Icon,
}

impl Default for Icons {
    fn default() -> Self {
        Self {
            question: Icon::new("?", Style::Green),
            help: Icon::new("?", Style::Cyan),
            error: Icon::new("X", Style::Red),
            select_focus: Icon::new(">", Style::Cyan),
            marked_option: Icon::new("[x]", Style::Green),
            unmarked_option: Icon::new("[ ]", Style::Bold),
        }
    }
}

/// Settings shared by every prompt in one `ask` call. Never mutated once built.
#[derive(Debug, Clone)]
pub struct PromptConfig {
    pub help_input: char,
    pub page_size: usize,
    pub icons: Icons,
    pub color: bool,
    pub hide_character: char,
    pub keep_filter: bool,
    pub remove_select_all: bool,
    pub remove_select_none: bool,
    pub editor: Option<String>,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            help_input: '?',
            page_size: 7,
            icons: Icons::default(),
            color: true,
            hide_character: '*',
            keep_filter: false,
            remove_select_all: false,
            remove_select_none: false,
            editor: None,
        }
    }
}

/// Raw descriptors for the process terminal.
#[cfg(unix)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stdio {
    pub input: std::os::unix::io::RawFd,
    pub output: std::os::unix::io::RawFd,
    pub error: std::os::unix::io::RawFd,
}

#[cfg(unix)]
impl Default for Stdio {
    fn default() -> Self {
        Self {
            input: libc::STDIN_FILENO,
            output: libc::STDOUT_FILENO,
            error: libc::STDERR_FILENO,
        }
    }
}

/// Builder for one `ask` call.
pub struct AskOptions {
    pub(crate) config: PromptConfig,
    #[cfg(unix)]
    pub(crate) stdio: Option<Stdio>,
    pub(crate) terminal: Option<Box<dyn Terminal + Send>>,
    pub(crate) validators: Vec<Validator>,
    pub(crate) interrupt: Option<InterruptHandle>,
}

impl Default for AskOptions {
    fn default() -> Self {
        let env = EnvConfig::from_env();
        Self {
            config: PromptConfig {
                color: !env.no_color,
                ..PromptConfig::default()
            },
            #[cfg(unix)]
            stdio: None,
            terminal: None,
            validators: Vec::new(),
            interrupt: None,
        }
    }
}

impl fmt::Debug for AskOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AskOptions")
            .field("config", &self.config)
            .field("custom_terminal", &self.terminal.is_some())
            .field("validators", &self.validators.len())
            .finish_non_exhaustive()
    }
}

impl AskOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and write through these descriptors instead of the process stdio.
    #[cfg(unix)]
    pub fn stdio(mut self, stdio: Stdio) -> Self {
        self.stdio = Some(stdio);
        self
    }

    /// Drive prompts through a caller-supplied terminal.
    pub fn terminal(mut self, terminal: impl Terminal + Send + 'static) -> Self {
        self.terminal = Some(Box::new(terminal));
        self
    }

    pub fn help_input(mut self, key: char) -> Self {
        self.config.help_input = key;
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.config.page_size = page_size;
        self
    }

    /// Adjust the icon set in place.
    pub fn icons(mut self, update: impl FnOnce(&mut Icons)) -> Self {
        update(&mut self.config.icons);
        self
    }

    pub fn color(mut self, enabled: bool) -> Self {
        self.config.color = enabled;
        self
    }

    /// Validator applied to every question, after the question's own.
    pub fn validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn hide_character(mut self, mask: char) -> Self {
        self.config.hide_character = mask;
        self
    }

    /// Keep the select filter after a selection is toggled.
    pub fn keep_filter(mut self, keep: bool) -> Self {
        self.config.keep_filter = keep;
        self
    }

    pub fn remove_select_all(mut self) -> Self {
        self.config.remove_select_all = true;
        self
    }

    pub fn remove_select_none(mut self) -> Self {
        self.config.remove_select_none = true;
        self
    }

    /// Editor command used when a prompt does not name one.
    pub fn editor(mut self, command: impl Into<String>) -> Self {
        self.config.editor = Some(command.into());
        self
    }

    pub fn interrupt(mut self, handle: InterruptHandle) -> Self {
        self.interrupt = Some(handle);
        self
    }

    pub fn prompt_config(&self) -> &PromptConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::{AskOptions, EnvConfig, Icons, PromptConfig};
    use std::env;
    use std::sync::{Mutex, OnceLock};

    struct EnvGuard {
        key: &'static str,
        previous: Option<String>,
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            if let Some(value) = &self.previous {
                env::set_var(self.key, value);
            } else {
                env::remove_var(self.key);
            }
        }
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
            .lock()
            .expect("env lock poisoned")
    }

    fn set_env_guard(key: &'static str, value: Option<&str>) -> EnvGuard {
        let previous = env::var(key).ok();
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
        EnvGuard { key, previous }
    }

    #[test]
    fn env_defaults_are_empty() {
        let _lock = env_lock();
        let _g1 = set_env_guard("VISUAL", None);
        let _g2 = set_env_guard("EDITOR", None);
        let _g3 = set_env_guard("TAPE_SURVEY_WRITE_LOG", None);
        let _g4 = set_env_guard("TAPE_SURVEY_DEBUG_REDRAW", None);
        let _g5 = set_env_guard("NO_COLOR", None);

        let config = EnvConfig::from_env();
        assert!(config.editor_command().is_none());
        assert!(config.write_log.is_none());
        assert!(!config.debug_redraw);
        assert!(!config.no_color);
    }

    #[test]
    fn visual_wins_over_editor() {
        let _lock = env_lock();
        let _g1 = set_env_guard("VISUAL", Some("code --wait"));
        let _g2 = set_env_guard("EDITOR", Some("nano"));
        assert_eq!(EnvConfig::from_env().editor_command(), Some("code --wait"));

        let _g3 = set_env_guard("VISUAL", Some("  "));
        assert_eq!(EnvConfig::from_env().editor_command(), Some("nano"));
    }

    #[test]
    fn env_flags_set_to_one_enable() {
        let _lock = env_lock();
        let _g1 = set_env_guard("TAPE_SURVEY_WRITE_LOG", Some("/tmp/survey.log"));
        let _g2 = set_env_guard("TAPE_SURVEY_DEBUG_REDRAW", Some("1"));
        let _g3 = set_env_guard("NO_COLOR", Some("1"));

        let config = EnvConfig::from_env();
        assert_eq!(config.write_log.as_deref(), Some("/tmp/survey.log"));
        assert!(config.debug_redraw);
        assert!(config.no_color);
        assert!(!AskOptions::default().prompt_config().color);
    }

    #[test]
    fn builder_overrides_prompt_defaults() {
        let defaults = PromptConfig::default();
        assert_eq!(defaults.help_input, '?');
        assert_eq!(defaults.page_size, 7);
        assert_eq!(defaults.hide_character, '*');

        let options = AskOptions::new()
            .page_size(3)
            .help_input('h')
            .hide_character('#')
            .remove_select_all()
            .editor("nano")
            .icons(|icons| icons.question.text = "Q".to_string());
        let config = options.prompt_config();
        assert_eq!(config.page_size, 3);
        assert_eq!(config.help_input, 'h');
        assert_eq!(config.hide_character, '#');
        assert!(config.remove_select_all);
        assert!(!config.remove_select_none);
        assert_eq!(config.editor.as_deref(), Some("nano"));
        assert_eq!(config.icons.question.text, "Q");
        assert_eq!(config.icons.help, Icons::default().help);
    }
}
