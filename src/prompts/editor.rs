//! Prompt that collects text from an external editor.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};

use crate::config::{EnvConfig, PromptConfig};
use crate::core::answer::Answer;
use crate::core::keys::Key;
use crate::error::SurveyError;
use crate::prompts::{answered, is_help_key, live, Attempt, Prompt};
use crate::render::{templates, View};
use crate::runtime::Session;

const BOM: char = '\u{feff}';
const RECEIVED: &str = "<Received>";

#[cfg(windows)]
const FALLBACK_EDITOR: &str = "notepad";
#[cfg(not(windows))]
const FALLBACK_EDITOR: &str = "vim";

#[derive(Debug, Clone)]
pub struct Editor {
    pub message: String,
    pub default: String,
    pub help: String,
    /// Editor command for this prompt only.
    pub editor: Option<String>,
    pub hide_default: bool,
    /// Pre-seed the editor buffer with the default.
    pub append_default: bool,
    /// Temp file name pattern; the part after the last `*` is kept as suffix.
    pub file_name: String,
}

impl Default for Editor {
    fn default() -> Self {
        Self {
            message: String::new(),
            default: String::new(),
            help: String::new(),
            editor: None,
            hide_default: false,
            append_default: false,
            file_name: "survey*.txt".to_string(),
        }
    }
}

impl Editor {
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

    pub fn editor(mut self, command: impl Into<String>) -> Self {
        self.editor = Some(command.into());
        self
    }

    pub fn hide_default(mut self, hide: bool) -> Self {
        self.hide_default = hide;
        self
    }

    pub fn append_default(mut self, append: bool) -> Self {
        self.append_default = append;
        self
    }

    pub fn file_name(mut self, pattern: impl Into<String>) -> Self {
        self.file_name = pattern.into();
        self
    }

    fn command(&self, config: &PromptConfig) -> String {
        resolve_editor(
            self.editor.as_deref(),
            config.editor.as_deref(),
            &EnvConfig::from_env(),
        )
    }

    /// Text the editor opens with.
    fn seed(&self, attempt: &Attempt) -> String {
        if let Some(rejected) = attempt.rejected.as_ref().and_then(Answer::as_str) {
            return rejected.to_string();
        }
        if self.append_default {
            return self.default.clone();
        }
        String::new()
    }

    /// Turn the saved file contents into an answer.
    fn answer_from(&self, raw: &str) -> String {
        let text = raw
            .strip_prefix(BOM)
            .unwrap_or(raw)
            .trim_end_matches(['\r', '\n']);
        if text.is_empty() {
            if self.append_default {
                return String::new();
            }
            return self.default.clone();
        }
        format!("{text}\n")
    }
}

/// Pick the editor: the prompt's own, the survey's, `$VISUAL`, `$EDITOR`,
/// then the platform fallback.
pub fn resolve_editor(prompt: Option<&str>, survey: Option<&str>, env: &EnvConfig) -> String {
    prompt
        .or(survey)
        .or(env.editor_command())
        .unwrap_or(FALLBACK_EDITOR)
        .to_string()
}

/// Split a command line into words with POSIX-shell-like quoting.
pub fn split_command(command: &str) -> Result<Vec<String>, SurveyError> {
    let mut words = Vec::new();
    let mut word = String::new();
    let mut in_word = false;
    let mut chars = command.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(ch) => word.push(ch),
                        None => return Err(unterminated(command)),
                    }
                }
            }
            '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(escaped @ ('"' | '\\' | '$' | '`')) => word.push(escaped),
                            Some(other) => {
                                word.push('\\');
                                word.push(other);
                            }
                            None => return Err(unterminated(command)),
                        },
                        Some(ch) => word.push(ch),
                        None => return Err(unterminated(command)),
                    }
                }
            }
            '\\' => {
                in_word = true;
                if let Some(escaped) = chars.next() {
                    word.push(escaped);
                }
            }
            ch if ch.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut word));
                    in_word = false;
                }
            }
            ch => {
                in_word = true;
                word.push(ch);
            }
        }
    }
    if in_word {
        words.push(word);
    }
    if words.is_empty() {
        return Err(SurveyError::InvalidPrompt("editor command is empty".to_string()));
    }
    Ok(words)
}

fn unterminated(command: &str) -> SurveyError {
    SurveyError::InvalidPrompt(format!("unterminated quote in editor command {command:?}"))
}

/// Split a file name pattern into temp file prefix and suffix.
fn temp_affixes(pattern: &str) -> (&str, &str) {
    match pattern.rfind('*') {
        Some(star) => (&pattern[..star], &pattern[star + 1..]),
        None => (pattern, ""),
    }
}

/// Owns a spawned editor; kills and reaps it unless it was waited on.
struct ChildGuard {
    child: Option<Child>,
}

impl ChildGuard {
    fn wait(mut self) -> std::io::Result<ExitStatus> {
        match self.child.take() {
            Some(mut child) => child.wait(),
            None => Err(std::io::Error::other("editor already reaped")),
        }
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

fn run_editor(command: &str, path: &Path) -> Result<(), SurveyError> {
    let words = split_command(command)?;
    let (program, args) = words
        .split_first()
        .ok_or_else(|| SurveyError::InvalidPrompt("editor command is empty".to_string()))?;

    tracing::debug!(command, path = %path.display(), "launching editor");
    let child = Command::new(program)
        .args(args)
        .arg(path)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()?;
    let status = ChildGuard { child: Some(child) }.wait()?;
    tracing::debug!(command, %status, "editor exited");

    if !status.success() {
        return Err(SurveyError::ChildProcess {
            command: command.to_string(),
            status,
        });
    }
    Ok(())
}

impl Prompt for Editor {
    fn prompt(&self, session: &mut Session<'_>, attempt: &Attempt) -> Result<Answer, SurveyError> {
        let config = session.config();
        let default = (!self.hide_default).then_some(self.default.as_str());
        let mut show_help = false;
        loop {
            let data = live(
                config,
                &self.message,
                &self.help,
                show_help,
                attempt.error.as_deref(),
            );
            session.render(&View::new(templates::editor(&data, default)));

            let key = session.next_key()?;
            if is_help_key(&key, &self.help, config) {
                show_help = true;
                continue;
            }
            match key {
                Key::Enter => break,
                Key::EndOfFile => return Err(SurveyError::input_closed()),
                _ => {}
            }
        }

        let (prefix, suffix) = temp_affixes(&self.file_name);
        let mut file = tempfile::Builder::new()
            .prefix(prefix)
            .suffix(suffix)
            .tempfile()?;
        file.write_all(self.seed(attempt).as_bytes())?;
        file.flush()?;

        let command = self.command(config);
        session.suspend(|| run_editor(&command, file.path()))?;

        let raw = fs::read(file.path())?;
        Ok(Answer::String(self.answer_from(&String::from_utf8_lossy(&raw))))
    }

    fn finalize(&self, session: &mut Session<'_>, _answer: &Answer) {
        let data = answered(session.config(), &self.message, RECEIVED);
        session.finalize(&View::new(templates::editor(&data, None)));
    }
}
