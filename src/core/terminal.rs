//! Terminal trait and lifecycle helpers.

/// Minimal terminal interface for prompts.
pub trait Terminal {
    /// Enter raw mode and start delivering input sequences to `on_input`.
    ///
    /// The terminal drops `on_input` when its input source is exhausted, which
    /// the survey treats as end of input.
    fn start(&mut self, on_input: Box<dyn FnMut(String) + Send>) -> std::io::Result<()>;

    /// Stop delivering input and restore the original terminal state.
    fn stop(&mut self) -> std::io::Result<()>;

    /// Write output to the terminal.
    fn write(&mut self, data: &str);

    /// Terminal width in cells.
    fn columns(&self) -> u16;
}

impl<T: Terminal + ?Sized> Terminal for Box<T> {
    fn start(&mut self, on_input: Box<dyn FnMut(String) + Send>) -> std::io::Result<()> {
        (**self).start(on_input)
    }

    fn stop(&mut self) -> std::io::Result<()> {
        (**self).stop()
    }

    fn write(&mut self, data: &str) {
        (**self).write(data)
    }

    fn columns(&self) -> u16 {
        (**self).columns()
    }
}

/// RAII guard that stops the terminal on drop.
pub struct TerminalGuard<T: Terminal> {
    terminal: T,
    running: bool,
}

impl<T: Terminal> TerminalGuard<T> {
    pub fn new(terminal: T) -> Self {
        Self {
            terminal,
            running: false,
        }
    }

    pub fn start(&mut self, on_input: Box<dyn FnMut(String) + Send>) -> std::io::Result<()> {
        self.terminal.start(on_input)?;
        self.running = true;
        Ok(())
    }

    pub fn stop(&mut self) -> std::io::Result<()> {
        if !self.running {
            return Ok(());
        }
        self.running = false;
        self.terminal.stop()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Access the wrapped terminal.
    pub fn terminal_mut(&mut self) -> &mut T {
        &mut self.terminal
    }

    pub fn terminal(&self) -> &T {
        &self.terminal
    }
}

impl<T: Terminal> Drop for TerminalGuard<T> {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::{Terminal, TerminalGuard};
    use std::sync::{Arc, Mutex};

    #[derive(Default, Clone)]
    struct CountingTerminal {
        stops: Arc<Mutex<usize>>,
    }

    impl Terminal for CountingTerminal {
        fn start(&mut self, _on_input: Box<dyn FnMut(String) + Send>) -> std::io::Result<()> {
            Ok(())
        }

        fn stop(&mut self) -> std::io::Result<()> {
            *self.stops.lock().unwrap() += 1;
            Ok(())
        }

        fn write(&mut self, _data: &str) {}

        fn columns(&self) -> u16 {
            80
        }
    }

    #[test]
    fn guard_stops_a_running_terminal_once() {
        let terminal = CountingTerminal::default();
        let stops = Arc::clone(&terminal.stops);
        {
            let mut guard = TerminalGuard::new(terminal);
            guard.start(Box::new(|_| {})).unwrap();
            guard.stop().unwrap();
            assert!(!guard.is_running());
        }
        assert_eq!(*stops.lock().unwrap(), 1);
    }

    #[test]
    fn guard_never_stops_an_unstarted_terminal() {
        let terminal = CountingTerminal::default();
        let stops = Arc::clone(&terminal.stops);
        drop(TerminalGuard::new(terminal));
        assert_eq!(*stops.lock().unwrap(), 0);
    }
}
