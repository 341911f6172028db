#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::thread;

use tape_survey::core::terminal::Terminal;
use tape_survey::core::text::ansi::strip_ansi;
use tape_survey::{AskOptions, StdinBuffer};

pub const ENTER: &str = "\r";
pub const UP: &str = "\x1b[A";
pub const DOWN: &str = "\x1b[B";
pub const RIGHT: &str = "\x1b[C";
pub const LEFT: &str = "\x1b[D";
pub const BACKSPACE: &str = "\x7f";
pub const CTRL_C: &str = "\x03";
pub const CTRL_D: &str = "\x04";
pub const SPACE: &str = " ";

#[derive(Default)]
struct TerminalState {
    writes: String,
    columns: u16,
    /// Raw input per `start` call; exhausted phases read as end of input.
    phases: VecDeque<Vec<String>>,
    starts: usize,
    stops: usize,
}

/// Terminal double that types scripted input from a feeder thread.
///
/// Raw chunks are split into keys by the same `StdinBuffer` the process
/// terminal uses. When a phase runs out, the input callback is dropped, which
/// the survey sees as end of input.
#[derive(Clone)]
pub struct HarnessTerminal {
    state: Arc<Mutex<TerminalState>>,
}

impl HarnessTerminal {
    pub fn new(columns: u16) -> Self {
        Self {
            state: Arc::new(Mutex::new(TerminalState {
                columns,
                ..TerminalState::default()
            })),
        }
    }

    /// A terminal that types `input` once started.
    pub fn scripted(input: &[&str]) -> Self {
        Self::new(80).then(input)
    }

    /// Queue input for the next `start`, e.g. after an editor hands back the terminal.
    pub fn then(self, input: &[&str]) -> Self {
        self.state
            .lock()
            .expect("lock terminal state for script")
            .phases
            .push_back(input.iter().map(|chunk| chunk.to_string()).collect());
        self
    }

    pub fn writes(&self) -> String {
        self.state
            .lock()
            .expect("lock terminal state for writes")
            .writes
            .clone()
    }

    /// Output with escape sequences and carriage returns removed.
    pub fn transcript(&self) -> String {
        strip_ansi(&self.writes()).replace('\r', "")
    }

    pub fn starts(&self) -> usize {
        self.state.lock().expect("lock terminal state").starts
    }

    pub fn stops(&self) -> usize {
        self.state.lock().expect("lock terminal state").stops
    }

    /// Options driving the survey through this terminal, without color.
    pub fn options(&self) -> AskOptions {
        AskOptions::new().terminal(self.clone()).color(false)
    }
}

impl Terminal for HarnessTerminal {
    fn start(&mut self, mut on_input: Box<dyn FnMut(String) + Send>) -> std::io::Result<()> {
        let phase = {
            let mut state = self.state.lock().expect("lock terminal state for start");
            state.starts += 1;
            state.phases.pop_front().unwrap_or_default()
        };
        thread::spawn(move || {
            let mut buffer = StdinBuffer::new(10);
            for chunk in phase {
                for event in buffer.process(chunk.as_bytes()) {
                    on_input(event.into_wire());
                }
            }
            for event in buffer.flush() {
                on_input(event.into_wire());
            }
        });
        Ok(())
    }

    fn stop(&mut self) -> std::io::Result<()> {
        self.state.lock().expect("lock terminal state for stop").stops += 1;
        Ok(())
    }

    fn write(&mut self, data: &str) {
        self.state
            .lock()
            .expect("lock terminal state for write")
            .writes
            .push_str(data);
    }

    fn columns(&self) -> u16 {
        self.state.lock().expect("lock terminal state for columns").columns
    }
}
