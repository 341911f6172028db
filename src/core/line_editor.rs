//! Single-line text editing shared by the text prompts.

use unicode_segmentation::UnicodeSegmentation;

use crate::core::keys::Key;
use crate::core::text::width::{grapheme_width, visible_width};

/// Outcome of feeding one key to a [`LineEditor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    Changed,
    Moved,
    Ignored,
}

#[derive(Debug, Default, Clone)]
pub struct LineEditor {
    value: String,
    cursor: usize,
}

impl LineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.value.len();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    /// Take the current line, leaving the editor empty.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.value)
    }

    pub fn insert_str(&mut self, text: &str) {
        let cleaned = text.replace(['\r', '\n'], "");
        if cleaned.is_empty() {
            return;
        }
        self.value.insert_str(self.cursor, &cleaned);
        self.cursor += cleaned.len();
    }

    fn previous_grapheme_len(&self) -> usize {
        self.value[..self.cursor]
            .graphemes(true)
            .next_back()
            .map_or(0, str::len)
    }

    fn next_grapheme_len(&self) -> usize {
        self.value[self.cursor..]
            .graphemes(true)
            .next()
            .map_or(0, str::len)
    }

    fn delete_word_backwards(&mut self) {
        let before = &self.value[..self.cursor];
        let trimmed = before.trim_end();
        let start = trimmed
            .char_indices()
            .rev()
            .find(|(_, ch)| ch.is_whitespace())
            .map_or(0, |(idx, ch)| idx + ch.len_utf8());
        self.value.replace_range(start..self.cursor, "");
        self.cursor = start;
    }

    /// Apply an editing key. Keys with prompt-level meaning are ignored.
    pub fn handle_key(&mut self, key: &Key) -> Edit {
        match key {
            Key::Char(ch) => {
                let mut buf = [0u8; 4];
                self.insert_str(ch.encode_utf8(&mut buf));
                Edit::Changed
            }
            Key::Space => {
                self.insert_str(" ");
                Edit::Changed
            }
            Key::Paste(content) => {
                self.insert_str(content);
                Edit::Changed
            }
            Key::Backspace => {
                let len = self.previous_grapheme_len();
                if len == 0 {
                    return Edit::Ignored;
                }
                let start = self.cursor - len;
                self.value.replace_range(start..self.cursor, "");
                self.cursor = start;
                Edit::Changed
            }
            Key::Delete => {
                let len = self.next_grapheme_len();
                if len == 0 {
                    return Edit::Ignored;
                }
                self.value.replace_range(self.cursor..self.cursor + len, "");
                Edit::Changed
            }
            Key::Ctrl('w') if self.cursor > 0 => {
                self.delete_word_backwards();
                Edit::Changed
            }
            Key::Ctrl('u') if self.cursor > 0 => {
                self.value.replace_range(..self.cursor, "");
                self.cursor = 0;
                Edit::Changed
            }
            Key::Ctrl('k') if self.cursor < self.value.len() => {
                self.value.truncate(self.cursor);
                Edit::Changed
            }
            Key::Left if self.cursor > 0 => {
                self.cursor -= self.previous_grapheme_len();
                Edit::Moved
            }
            Key::Right if self.cursor < self.value.len() => {
                self.cursor += self.next_grapheme_len();
                Edit::Moved
            }
            Key::Home => {
                self.cursor = 0;
                Edit::Moved
            }
            Key::End => {
                self.cursor = self.value.len();
                Edit::Moved
            }
            _ => Edit::Ignored,
        }
    }

    /// Text to display, with every grapheme replaced by `mask` when set.
    pub fn display(&self, mask: Option<char>) -> String {
        match mask {
            Some(mask) => std::iter::repeat(mask)
                .take(self.value.graphemes(true).count())
                .collect(),
            None => self.value.clone(),
        }
    }

    /// Display cells between the cursor and the end of the line.
    pub fn cells_after_cursor(&self, mask: Option<char>) -> usize {
        let after = &self.value[self.cursor..];
        match mask {
            Some(mask) => {
                let mut buf = [0u8; 4];
                grapheme_width(mask.encode_utf8(&mut buf)) * after.graphemes(true).count()
            }
            None => visible_width(after),
        }
    }
}
