//! Typed terminal output commands and a single output gate.
//!
//! Invariant: all terminal writes must flow through `OutputGate::flush(..)`.

use crate::core::terminal::Terminal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalCmd {
    /// Raw bytes/control sequences (UTF-8 string) to be written to the terminal.
    Bytes(String),

    /// Cursor visibility.
    HideCursor,
    ShowCursor,

    /// Return to column zero and clear the current row.
    ClearLine,
    /// Move the cursor up one row and clear it.
    ClearPreviousLine,
}

impl TerminalCmd {
    pub fn bytes(data: impl Into<String>) -> Self {
        Self::Bytes(data.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            TerminalCmd::Bytes(data) => data,
            TerminalCmd::HideCursor => "\x1b[?25l",
            TerminalCmd::ShowCursor => "\x1b[?25h",
            TerminalCmd::ClearLine => "\r\x1b[2K",
            TerminalCmd::ClearPreviousLine => "\x1b[1A\x1b[2K",
        }
    }
}

#[derive(Debug, Default)]
pub struct OutputGate {
    cmds: Vec<TerminalCmd>,
}

impl OutputGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cmd: TerminalCmd) {
        self.cmds.push(cmd);
    }

    pub fn extend<I>(&mut self, cmds: I)
    where
        I: IntoIterator<Item = TerminalCmd>,
    {
        self.cmds.extend(cmds);
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    /// Flush buffered commands to the terminal as a single write.
    ///
    /// This is the single write gate: `Terminal::write(..)` must not be called
    /// from anywhere else.
    pub fn flush<T: Terminal + ?Sized>(&mut self, term: &mut T) -> usize {
        let data: String = self.cmds.drain(..).map(|cmd| cmd.as_str().to_owned()).collect();
        if !data.is_empty() {
            term.write(&data);
        }
        data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::{OutputGate, TerminalCmd};
    use crate::core::terminal::Terminal;

    #[derive(Default)]
    struct Recorder {
        writes: Vec<String>,
    }

    impl Terminal for Recorder {
        fn start(&mut self, _on_input: Box<dyn FnMut(String) + Send>) -> std::io::Result<()> {
            Ok(())
        }

        fn stop(&mut self) -> std::io::Result<()> {
            Ok(())
        }

        fn write(&mut self, data: &str) {
            self.writes.push(data.to_string());
        }

        fn columns(&self) -> u16 {
            80
        }
    }

    #[test]
    fn flush_coalesces_commands_into_one_write() {
        let mut gate = OutputGate::new();
        gate.push(TerminalCmd::ClearLine);
        gate.push(TerminalCmd::ClearPreviousLine);
        gate.push(TerminalCmd::bytes("? Name "));

        let mut term = Recorder::default();
        let written = gate.flush(&mut term);

        assert!(gate.is_empty());
        assert_eq!(term.writes, vec!["\r\x1b[2K\x1b[1A\x1b[2K? Name "]);
        assert_eq!(written, term.writes[0].len());
    }

    #[test]
    fn empty_flush_writes_nothing() {
        let mut gate = OutputGate::new();
        let mut term = Recorder::default();
        assert_eq!(gate.flush(&mut term), 0);
        assert!(term.writes.is_empty());
    }
}
