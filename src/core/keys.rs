//! Key parsing for prompt input.
//!
//! Each input event handed to a prompt is a single key, escape sequence, or
//! bracketed paste, as split by the stdin buffer.

const PASTE_START: &str = "\x1b[200~";
const PASTE_END: &str = "\x1b[201~";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Enter,
    Backspace,
    Delete,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    Tab,
    ShiftTab,
    Escape,
    Space,
    /// Ctrl-C.
    Interrupt,
    /// Ctrl-D.
    EndOfFile,
    /// Other control chords, lowercase letter.
    Ctrl(char),
    Char(char),
    Paste(String),
    Unknown(String),
}

impl Key {
    /// Text this key inserts into a line, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Key::Paste(content) => Some(content),
            _ => None,
        }
    }
}

pub fn parse_key(data: &str) -> Key {
    if let Some(content) = data
        .strip_prefix(PASTE_START)
        .and_then(|rest| rest.strip_suffix(PASTE_END))
    {
        return Key::Paste(content.to_string());
    }

    if let Some(key) = legacy_sequence_key(data) {
        return key;
    }

    let mut chars = data.chars();
    let (Some(ch), None) = (chars.next(), chars.next()) else {
        return Key::Unknown(data.to_string());
    };

    match ch {
        '\r' | '\n' => Key::Enter,
        '\t' => Key::Tab,
        '\x1b' => Key::Escape,
        ' ' => Key::Space,
        '\x7f' | '\x08' => Key::Backspace,
        '\x03' => Key::Interrupt,
        '\x04' => Key::EndOfFile,
        '\x01' => Key::Home,
        '\x05' => Key::End,
        '\x02' => Key::Left,
        '\x06' => Key::Right,
        '\x10' => Key::Up,
        '\x0e' => Key::Down,
        '\x01'..='\x1a' => Key::Ctrl((ch as u8 + 96) as char),
        ch if ch.is_control() => Key::Unknown(data.to_string()),
        ch => Key::Char(ch),
    }
}

fn legacy_sequence_key(data: &str) -> Option<Key> {
    let key = match data {
        "\x1b[A" | "\x1bOA" => Key::Up,
        "\x1b[B" | "\x1bOB" => Key::Down,
        "\x1b[C" | "\x1bOC" => Key::Right,
        "\x1b[D" | "\x1bOD" => Key::Left,
        "\x1b[H" | "\x1bOH" | "\x1b[1~" | "\x1b[7~" => Key::Home,
        "\x1b[F" | "\x1bOF" | "\x1b[4~" | "\x1b[8~" => Key::End,
        "\x1b[3~" => Key::Delete,
        "\x1b[Z" => Key::ShiftTab,
        "\x1bOM" => Key::Enter,
        _ => return None,
    };
    Some(key)
}

#[cfg(test)]
mod tests {
    use super::{parse_key, Key};

    #[test]
    fn arrows_accept_csi_and_ss3_forms() {
        assert_eq!(parse_key("\x1b[A"), Key::Up);
        assert_eq!(parse_key("\x1bOB"), Key::Down);
        assert_eq!(parse_key("\x1b[C"), Key::Right);
        assert_eq!(parse_key("\x1bOD"), Key::Left);
    }

    #[test]
    fn control_bytes_map_to_editing_keys() {
        assert_eq!(parse_key("\r"), Key::Enter);
        assert_eq!(parse_key("\x7f"), Key::Backspace);
        assert_eq!(parse_key("\x03"), Key::Interrupt);
        assert_eq!(parse_key("\x04"), Key::EndOfFile);
        assert_eq!(parse_key("\x01"), Key::Home);
        assert_eq!(parse_key("\x05"), Key::End);
        assert_eq!(parse_key("\x10"), Key::Up);
        assert_eq!(parse_key("\x0e"), Key::Down);
        assert_eq!(parse_key("\x17"), Key::Ctrl('w'));
    }

    #[test]
    fn printable_and_pasted_text() {
        assert_eq!(parse_key("y"), Key::Char('y'));
        assert_eq!(parse_key("é"), Key::Char('é'));
        assert_eq!(parse_key(" "), Key::Space);
        assert_eq!(
            parse_key("\x1b[200~a b\x1b[201~"),
            Key::Paste("a b".to_string())
        );
        assert_eq!(parse_key("\x1b[15~"), Key::Unknown("\x1b[15~".to_string()));
    }
}
