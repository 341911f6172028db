//! One live terminal session shared by the prompts of an `ask` call.

use crate::config::PromptConfig;
use crate::core::keys::{parse_key, Key};
use crate::core::output::OutputGate;
use crate::core::terminal::{Terminal, TerminalGuard};
use crate::error::SurveyError;
use crate::render::{Renderer, View};
use crate::runtime::input_slot::{InputSlot, InterruptHandle};

#[cfg(unix)]
use crate::platform::SignalHookGuard;

pub type BoxedTerminal = Box<dyn Terminal + Send>;

/// Owns the terminal, the input exchange and the redraw state.
///
/// The terminal is started when the session opens and stopped when it is
/// dropped, on every exit path.
pub struct Session<'a> {
    terminal: TerminalGuard<BoxedTerminal>,
    slot: InputSlot,
    gate: OutputGate,
    renderer: Renderer,
    config: &'a PromptConfig,
    #[cfg(unix)]
    _signals: Option<SignalHookGuard>,
}

impl<'a> Session<'a> {
    pub fn open(
        terminal: BoxedTerminal,
        config: &'a PromptConfig,
        interrupt: &InterruptHandle,
    ) -> Result<Self, SurveyError> {
        let mut session = Self {
            terminal: TerminalGuard::new(terminal),
            slot: InputSlot::new(interrupt),
            gate: OutputGate::new(),
            renderer: Renderer::new(),
            config,
            #[cfg(unix)]
            _signals: None,
        };
        session.start_input()?;
        Ok(session)
    }

    /// Keep SIGINT/SIGTERM routed to the survey until the session ends.
    #[cfg(unix)]
    pub fn with_signal_guard(mut self, guard: SignalHookGuard) -> Self {
        self._signals = Some(guard);
        self
    }

    pub fn config(&self) -> &'a PromptConfig {
        self.config
    }

    fn start_input(&mut self) -> Result<(), SurveyError> {
        let writer = self.slot.writer();
        self.terminal.start(Box::new(move |data| {
            writer.send(data);
        }))?;
        Ok(())
    }

    fn columns(&self) -> usize {
        usize::from(self.terminal.terminal().columns())
    }

    /// Wait for the next key. Ctrl-C fails with [`SurveyError::Interrupted`].
    pub fn next_key(&mut self) -> Result<Key, SurveyError> {
        let data = self.slot.wait()?;
        match parse_key(&data) {
            Key::Interrupt => Err(SurveyError::Interrupted),
            key => Ok(key),
        }
    }

    pub fn render(&mut self, view: &View) {
        let columns = self.columns();
        self.gate.extend(self.renderer.render(view, columns));
        self.gate.flush(self.terminal.terminal_mut());
    }

    /// Replace the live prompt with its answered form and move below it.
    pub fn finalize(&mut self, view: &View) {
        let columns = self.columns();
        self.gate.extend(self.renderer.finalize(view, columns));
        self.gate.flush(self.terminal.terminal_mut());
    }

    /// Hand the terminal to `run` with raw mode left and input detached.
    ///
    /// Input resumes with a fresh reader afterwards, whatever `run` returns.
    pub fn suspend<R>(
        &mut self,
        run: impl FnOnce() -> Result<R, SurveyError>,
    ) -> Result<R, SurveyError> {
        if let Some(show) = self.renderer.restore_cursor() {
            self.gate.push(show);
            self.gate.flush(self.terminal.terminal_mut());
        }
        self.slot.detach();
        self.terminal.stop()?;
        let result = run();
        self.start_input()?;
        result
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        if let Some(show) = self.renderer.restore_cursor() {
            self.gate.push(show);
            self.gate.flush(self.terminal.terminal_mut());
        }
        self.slot.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::Session;
    use crate::config::PromptConfig;
    use crate::core::keys::Key;
    use crate::core::terminal::Terminal;
    use crate::error::SurveyError;
    use crate::render::View;
    use crate::runtime::input_slot::InterruptHandle;
    use assert_matches::assert_matches;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Shared {
        output: String,
        starts: usize,
        stops: usize,
    }

    /// Delivers its scripted keys synchronously from `start`.
    struct ScriptTerminal {
        keys: Vec<&'static str>,
        shared: Arc<Mutex<Shared>>,
    }

    impl Terminal for ScriptTerminal {
        fn start(&mut self, mut on_input: Box<dyn FnMut(String) + Send>) -> std::io::Result<()> {
            self.shared.lock().unwrap().starts += 1;
            let keys = std::mem::take(&mut self.keys);
            std::thread::spawn(move || {
                for key in keys {
                    on_input(key.to_string());
                }
            });
            Ok(())
        }

        fn stop(&mut self) -> std::io::Result<()> {
            self.shared.lock().unwrap().stops += 1;
            Ok(())
        }

        fn write(&mut self, data: &str) {
            self.shared.lock().unwrap().output.push_str(data);
        }

        fn columns(&self) -> u16 {
            80
        }
    }

    fn script(keys: Vec<&'static str>) -> (Box<ScriptTerminal>, Arc<Mutex<Shared>>) {
        let shared = Arc::new(Mutex::new(Shared::default()));
        (
            Box::new(ScriptTerminal {
                keys,
                shared: Arc::clone(&shared),
            }),
            shared,
        )
    }

    #[test]
    fn keys_are_parsed_in_order_and_input_end_is_eof() {
        let config = PromptConfig::default();
        let (terminal, _) = script(vec!["a", "\x1b[B", "\r"]);
        let mut session = Session::open(terminal, &config, &InterruptHandle::new()).unwrap();

        assert_eq!(session.next_key().unwrap(), Key::Char('a'));
        assert_eq!(session.next_key().unwrap(), Key::Down);
        assert_eq!(session.next_key().unwrap(), Key::Enter);
        assert_matches!(session.next_key(), Err(SurveyError::Io(_)));
    }

    #[test]
    fn ctrl_c_interrupts() {
        let config = PromptConfig::default();
        let (terminal, _) = script(vec!["\x03"]);
        let mut session = Session::open(terminal, &config, &InterruptHandle::new()).unwrap();
        assert_matches!(session.next_key(), Err(SurveyError::Interrupted));
    }

    #[test]
    fn suspend_restarts_input_and_drop_stops_the_terminal() {
        let config = PromptConfig::default();
        let (terminal, shared) = script(Vec::new());
        {
            let mut session = Session::open(terminal, &config, &InterruptHandle::new()).unwrap();
            session.render(&View::new("? Q ").hide_cursor(true));
            let value = session.suspend(|| Ok(7)).unwrap();
            assert_eq!(value, 7);
        }
        let shared = shared.lock().unwrap();
        assert_eq!(shared.starts, 2);
        assert_eq!(shared.stops, 2);
        assert_eq!(shared.output, "\x1b[?25l? Q \x1b[?25h");
    }
}
