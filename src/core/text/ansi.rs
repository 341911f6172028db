//! ANSI escape parsing and the small set of SGR styles prompts paint with.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnsiCodeKind {
    Csi,
    Osc,
    Ss3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnsiCode {
    pub length: usize,
    pub kind: AnsiCodeKind,
}

/// Recognize an escape sequence starting at byte `pos`.
pub fn extract_ansi_code(input: &str, pos: usize) -> Option<AnsiCode> {
    let bytes = input.as_bytes();
    if pos + 1 >= bytes.len() || bytes[pos] != 0x1b {
        return None;
    }

    match bytes[pos + 1] {
        b'[' => bytes[pos + 2..]
            .iter()
            .position(|b| (0x40..=0x7e).contains(b))
            .map(|offset| AnsiCode {
                length: offset + 3,
                kind: AnsiCodeKind::Csi,
            }),
        b']' => extract_osc(bytes, pos),
        b'O' if pos + 2 < bytes.len() => Some(AnsiCode {
            length: 3,
            kind: AnsiCodeKind::Ss3,
        }),
        _ => None,
    }
}

fn extract_osc(bytes: &[u8], pos: usize) -> Option<AnsiCode> {
    let mut idx = pos + 2;
    while idx < bytes.len() {
        if bytes[idx] == 0x07 {
            return Some(AnsiCode {
                length: idx + 1 - pos,
                kind: AnsiCodeKind::Osc,
            });
        }
        if bytes[idx] == 0x1b && bytes.get(idx + 1) == Some(&b'\\') {
            return Some(AnsiCode {
                length: idx + 2 - pos,
                kind: AnsiCodeKind::Osc,
            });
        }
        idx += 1;
    }
    None
}

/// Remove every recognized escape sequence from `input`.
pub fn strip_ansi(input: &str) -> String {
    let mut clean = String::with_capacity(input.len());
    let mut idx = 0;
    while let Some(ch) = input[idx..].chars().next() {
        if let Some(code) = extract_ansi_code(input, idx) {
            idx += code.length;
            continue;
        }
        clean.push(ch);
        idx += ch.len_utf8();
    }
    clean
}

/// Foreground styles used by prompt templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Green,
    Cyan,
    Red,
    Gray,
    Bold,
    BoldCyan,
}

impl Style {
    fn sgr(self) -> &'static str {
        match self {
            Style::Green => "\x1b[32m",
            Style::Cyan => "\x1b[36m",
            Style::Red => "\x1b[31m",
            Style::Gray => "\x1b[90m",
            Style::Bold => "\x1b[1m",
            Style::BoldCyan => "\x1b[1;36m",
        }
    }
}

const RESET: &str = "\x1b[0m";

/// Wrap `text` in `style` when `color` is on; pass it through otherwise.
pub fn paint(text: &str, style: Style, color: bool) -> String {
    if !color || text.is_empty() {
        return text.to_string();
    }
    format!("{}{text}{RESET}", style.sgr())
}
