//! Stdin escape-sequence buffering.
//!
//! Raw reads are split into one event per key: a single character, a complete
//! escape sequence, or a bracketed paste. Incomplete escape tails stay buffered
//! until the flush deadline so a lone `ESC` is still delivered as a key.

use std::time::{Duration, Instant};

const ESC: u8 = 0x1b;
const BRACKETED_PASTE_START: &str = "\x1b[200~";
const BRACKETED_PASTE_END: &str = "\x1b[201~";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StdinEvent {
    Data(String),
    Paste(String),
}

impl StdinEvent {
    /// Wire form handed to input callbacks; pastes keep their brackets.
    pub fn into_wire(self) -> String {
        match self {
            StdinEvent::Data(data) => data,
            StdinEvent::Paste(content) => {
                format!("{BRACKETED_PASTE_START}{content}{BRACKETED_PASTE_END}")
            }
        }
    }
}

fn is_utf8_lead(byte: u8) -> bool {
    (0xc2..=0xf4).contains(&byte)
}

fn meta_key(byte: u8) -> String {
    let mut converted = String::from("\x1b");
    converted.push((byte - 128) as char);
    converted
}

#[derive(Debug)]
enum SequenceStatus {
    Complete,
    Incomplete,
}

/// Buffers stdin input and emits complete sequences.
pub struct StdinBuffer {
    buffer: String,
    utf8_tail: Vec<u8>,
    timeout_ms: u64,
    paste: Option<String>,
    flush_deadline: Option<Instant>,
}

impl StdinBuffer {
    pub fn new(timeout_ms: u64) -> Self {
        Self {
            buffer: String::new(),
            utf8_tail: Vec::new(),
            timeout_ms,
            paste: None,
            flush_deadline: None,
        }
    }

    pub fn process(&mut self, data: &[u8]) -> Vec<StdinEvent> {
        self.flush_deadline = None;

        let decoded = match data {
            // Meta-prefixed byte from terminals that set the high bit for Alt.
            [byte] if *byte > 127 && !is_utf8_lead(*byte) && self.utf8_tail.is_empty() => {
                meta_key(*byte)
            }
            _ => self.decode_utf8(data),
        };

        let events = self.process_str(&decoded);
        if !self.utf8_tail.is_empty() && self.flush_deadline.is_none() {
            self.flush_deadline = Some(Instant::now() + Duration::from_millis(self.timeout_ms));
        }
        events
    }

    /// Decode `data`, holding back a trailing partial UTF-8 character.
    fn decode_utf8(&mut self, data: &[u8]) -> String {
        let mut bytes = std::mem::take(&mut self.utf8_tail);
        bytes.extend_from_slice(data);
        match std::str::from_utf8(&bytes) {
            Ok(text) => text.to_string(),
            Err(err) if err.error_len().is_none() => {
                let valid = err.valid_up_to();
                self.utf8_tail = bytes[valid..].to_vec();
                String::from_utf8_lossy(&bytes[..valid]).into_owned()
            }
            Err(_) => String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    pub fn flush_due(&mut self, now: Instant) -> Vec<StdinEvent> {
        match self.flush_deadline {
            Some(deadline) if now >= deadline => self.flush(),
            _ => Vec::new(),
        }
    }

    pub fn next_timeout_ms(&self, now: Instant, default_ms: i32) -> i32 {
        if let Some(deadline) = self.flush_deadline {
            let remaining = deadline.saturating_duration_since(now);
            let ms = remaining.as_millis().min(i32::MAX as u128) as i32;
            return ms.min(default_ms).max(0);
        }
        default_ms
    }

    /// Emit whatever is buffered verbatim.
    ///
    /// A lone lead byte that never got its continuation is taken as an Alt key.
    pub fn flush(&mut self) -> Vec<StdinEvent> {
        self.flush_deadline = None;
        match std::mem::take(&mut self.utf8_tail).as_slice() {
            [] => {}
            [byte] => self.buffer.push_str(&meta_key(*byte)),
            tail => self.buffer.push_str(&String::from_utf8_lossy(tail)),
        }
        if self.buffer.is_empty() {
            return Vec::new();
        }
        vec![StdinEvent::Data(std::mem::take(&mut self.buffer))]
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    fn process_str(&mut self, data: &str) -> Vec<StdinEvent> {
        let mut events = Vec::new();
        self.buffer.push_str(data);

        if let Some(mut pasted) = self.paste.take() {
            pasted.push_str(&std::mem::take(&mut self.buffer));
            return self.finish_paste(pasted, events);
        }

        if let Some(start_index) = self.buffer.find(BRACKETED_PASTE_START) {
            let (sequences, _) = extract_complete_sequences(&self.buffer[..start_index]);
            events.extend(sequences.into_iter().map(StdinEvent::Data));

            let pasted = self.buffer[start_index + BRACKETED_PASTE_START.len()..].to_string();
            self.buffer.clear();
            return self.finish_paste(pasted, events);
        }

        let (sequences, remainder) = extract_complete_sequences(&self.buffer);
        events.extend(sequences.into_iter().map(StdinEvent::Data));
        self.buffer = remainder;

        if !self.buffer.is_empty() {
            self.flush_deadline = Some(Instant::now() + Duration::from_millis(self.timeout_ms));
        }

        events
    }

    fn finish_paste(&mut self, pasted: String, mut events: Vec<StdinEvent>) -> Vec<StdinEvent> {
        match pasted.find(BRACKETED_PASTE_END) {
            Some(end_index) => {
                events.push(StdinEvent::Paste(pasted[..end_index].to_string()));
                let remaining = &pasted[end_index + BRACKETED_PASTE_END.len()..];
                if !remaining.is_empty() {
                    events.extend(self.process_str(remaining));
                }
            }
            None => self.paste = Some(pasted),
        }
        events
    }
}

/// Split `buffer` into complete sequences and an incomplete escape remainder.
fn extract_complete_sequences(buffer: &str) -> (Vec<String>, String) {
    let mut sequences = Vec::new();
    let mut pos = 0;

    while let Some(ch) = buffer[pos..].chars().next() {
        if ch as u32 != u32::from(ESC) {
            sequences.push(ch.to_string());
            pos += ch.len_utf8();
            continue;
        }

        let mut seq_end = pos + 1;
        loop {
            if seq_end > buffer.len() {
                return (sequences, buffer[pos..].to_string());
            }
            if !buffer.is_char_boundary(seq_end) {
                seq_end += 1;
                continue;
            }
            match is_complete_sequence(&buffer[pos..seq_end]) {
                SequenceStatus::Complete => {
                    sequences.push(buffer[pos..seq_end].to_string());
                    pos = seq_end;
                    break;
                }
                SequenceStatus::Incomplete => seq_end += 1,
            }
        }
    }

    (sequences, String::new())
}

fn is_complete_sequence(data: &str) -> SequenceStatus {
    let bytes = data.as_bytes();
    match bytes.get(1) {
        None => SequenceStatus::Incomplete,
        Some(b'[') => {
            if data.len() < 3 {
                return SequenceStatus::Incomplete;
            }
            let last = bytes[bytes.len() - 1];
            if (0x40..=0x7e).contains(&last) {
                SequenceStatus::Complete
            } else {
                SequenceStatus::Incomplete
            }
        }
        Some(b'O') => {
            if data.len() >= 3 {
                SequenceStatus::Complete
            } else {
                SequenceStatus::Incomplete
            }
        }
        Some(_) => SequenceStatus::Complete,
    }
}
