//! Inline redraw of a prompt in place.
//!
//! Each pass erases the rows drawn by the previous pass and writes the new
//! text below whatever the terminal already showed before the prompt began.

use crate::core::output::TerminalCmd;
use crate::core::text::width::wrapped_rows;
use crate::logging::{log_debug_redraw, RedrawInfo};

/// What the last pass left on screen.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenderFrame {
    /// Screen rows occupied, counting soft wraps.
    pub last_rendered_line_count: usize,
    pub last_rendered_byte_count: usize,
}

/// One prompt view to draw.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct View {
    pub text: String,
    /// Cells between the end of `text` and the editing cursor.
    pub cursor_back: usize,
    pub hide_cursor: bool,
}

impl View {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            cursor_back: 0,
            hide_cursor: false,
        }
    }

    pub fn cursor_back(mut self, cells: usize) -> Self {
        self.cursor_back = cells;
        self
    }

    pub fn hide_cursor(mut self, hide: bool) -> Self {
        self.hide_cursor = hide;
        self
    }
}

#[derive(Debug, Default)]
pub struct Renderer {
    frame: RenderFrame,
    cursor_hidden: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame(&self) -> RenderFrame {
        self.frame
    }

    /// Forget the previous pass so the next one starts on a fresh row.
    pub fn reset(&mut self) {
        self.frame = RenderFrame::default();
    }

    /// Commands that replace the previous pass with `view`.
    pub fn render(&mut self, view: &View, columns: usize) -> Vec<TerminalCmd> {
        self.pass(view, columns, false)
    }

    /// Draw the answered view once, leave it on screen, and reset the frame.
    pub fn finalize(&mut self, view: &View, columns: usize) -> Vec<TerminalCmd> {
        let cmds = self.pass(view, columns, true);
        self.reset();
        cmds
    }

    /// Commands that restore the cursor if a pass hid it.
    pub fn restore_cursor(&mut self) -> Option<TerminalCmd> {
        if self.cursor_hidden {
            self.cursor_hidden = false;
            return Some(TerminalCmd::ShowCursor);
        }
        None
    }

    fn pass(&mut self, view: &View, columns: usize, finalize: bool) -> Vec<TerminalCmd> {
        let mut cmds = Vec::new();
        let hide = view.hide_cursor && !finalize;
        if hide && !self.cursor_hidden {
            cmds.push(TerminalCmd::HideCursor);
            self.cursor_hidden = true;
        }

        let erased_rows = self.frame.last_rendered_line_count;
        if erased_rows > 0 {
            cmds.push(TerminalCmd::ClearLine);
            cmds.extend((1..erased_rows).map(|_| TerminalCmd::ClearPreviousLine));
        }

        let body = view.text.replace('\n', "\r\n");
        let bytes = body.len();
        if !body.is_empty() {
            cmds.push(TerminalCmd::Bytes(body));
        }
        if view.cursor_back > 0 && !finalize {
            cmds.push(TerminalCmd::Bytes(format!("\x1b[{}D", view.cursor_back)));
        }
        if !hide {
            if let Some(show) = self.restore_cursor() {
                cmds.push(show);
            }
        }

        let lines = count_rows(&view.text, columns);
        self.frame = RenderFrame {
            last_rendered_line_count: lines,
            last_rendered_byte_count: bytes,
        };
        log_debug_redraw(&RedrawInfo {
            erased_rows,
            lines,
            bytes,
            finalize,
        });
        cmds
    }
}

/// Screen rows `text` occupies when drawn from column zero.
pub fn count_rows(text: &str, columns: usize) -> usize {
    text.split('\n')
        .map(|line| wrapped_rows(line, columns))
        .sum()
}
