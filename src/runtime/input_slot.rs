//! Depth-one exchange between the terminal's input reader and the prompt loop.
//!
//! The reader hands over one key at a time and blocks while the previous key
//! has not been taken. The prompt side waits for either a key, an interrupt, or
//! the end of input. Interrupting never blocks on the reader: a reader stuck on
//! a full slot is released and its key dropped.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use crate::error::SurveyError;

#[derive(Debug, Default)]
struct SlotState {
    pending: Option<String>,
    generation: u64,
    closed: bool,
    interrupted: bool,
}

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<SlotState>,
    changed: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, SlotState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Requests that the live prompt stop waiting for input.
///
/// Interrupts are sticky: once requested, every wait fails with
/// [`SurveyError::Interrupted`] until [`InterruptHandle::reset`] is called.
#[derive(Clone, Debug, Default)]
pub struct InterruptHandle {
    shared: Arc<Shared>,
}

impl InterruptHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interrupt(&self) {
        let mut state = self.shared.lock();
        state.interrupted = true;
        drop(state);
        self.shared.changed.notify_all();
    }

    pub fn is_interrupted(&self) -> bool {
        self.shared.lock().interrupted
    }

    pub fn reset(&self) {
        self.shared.lock().interrupted = false;
    }
}

/// Prompt-side end of the exchange.
#[derive(Debug)]
pub struct InputSlot {
    shared: Arc<Shared>,
}

impl InputSlot {
    pub fn new(interrupt: &InterruptHandle) -> Self {
        Self {
            shared: Arc::clone(&interrupt.shared),
        }
    }

    /// Create the writer for a newly started reader. Earlier writers are
    /// abandoned: their sends are dropped and their drop no longer closes input.
    /// A key left over from an earlier reader is discarded.
    pub fn writer(&self) -> SlotWriter {
        let mut state = self.shared.lock();
        state.generation += 1;
        state.pending = None;
        state.closed = false;
        let generation = state.generation;
        drop(state);
        self.shared.changed.notify_all();
        SlotWriter {
            shared: Arc::clone(&self.shared),
            generation,
        }
    }

    /// Abandon the current writer without closing input, dropping any key it
    /// already handed over.
    pub fn detach(&self) {
        let mut state = self.shared.lock();
        state.generation += 1;
        state.pending = None;
        drop(state);
        self.shared.changed.notify_all();
    }

    /// Block until a key arrives, the survey is interrupted, or input ends.
    pub fn wait(&self) -> Result<String, SurveyError> {
        let mut state = self.shared.lock();
        loop {
            if state.interrupted {
                return Err(SurveyError::Interrupted);
            }
            if let Some(data) = state.pending.take() {
                drop(state);
                self.shared.changed.notify_all();
                return Ok(data);
            }
            if state.closed {
                return Err(SurveyError::input_closed());
            }
            state = self
                .shared
                .changed
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

/// Reader-side end of the exchange. Dropping it signals end of input.
#[derive(Debug)]
pub struct SlotWriter {
    shared: Arc<Shared>,
    generation: u64,
}

impl SlotWriter {
    /// Hand over one key, blocking while the slot is full.
    ///
    /// Returns `false` when the key was dropped because this writer was
    /// abandoned or the survey was interrupted.
    pub fn send(&self, data: String) -> bool {
        let mut state = self.shared.lock();
        loop {
            if state.generation != self.generation || state.interrupted {
                return false;
            }
            if state.pending.is_none() {
                state.pending = Some(data);
                drop(state);
                self.shared.changed.notify_all();
                return true;
            }
            state = self
                .shared
                .changed
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

impl Drop for SlotWriter {
    fn drop(&mut self) {
        let mut state = self.shared.lock();
        if state.generation == self.generation {
            state.closed = true;
        }
        drop(state);
        self.shared.changed.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::{InputSlot, InterruptHandle};
    use crate::error::SurveyError;
    use assert_matches::assert_matches;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn keys_arrive_in_order_through_a_full_slot() {
        let interrupt = InterruptHandle::new();
        let slot = InputSlot::new(&interrupt);
        let writer = slot.writer();

        let reader = thread::spawn(move || {
            for key in ["a", "b", "c"] {
                assert!(writer.send(key.to_string()));
            }
        });

        let keys: Vec<String> = (0..3).map(|_| slot.wait().unwrap()).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        reader.join().unwrap();
        assert_matches!(slot.wait(), Err(SurveyError::Io(err)) if err.kind() == std::io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn interrupt_wakes_a_blocked_wait() {
        let interrupt = InterruptHandle::new();
        let slot = InputSlot::new(&interrupt);
        let _writer = slot.writer();

        let canceller = interrupt.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            canceller.interrupt();
        });

        assert_matches!(slot.wait(), Err(SurveyError::Interrupted));
        handle.join().unwrap();
        assert!(interrupt.is_interrupted());

        interrupt.reset();
        assert!(!interrupt.is_interrupted());
    }

    #[test]
    fn abandoned_writers_never_block_and_never_close_input() {
        let interrupt = InterruptHandle::new();
        let slot = InputSlot::new(&interrupt);
        let stale = slot.writer();
        assert!(stale.send("x".to_string()));

        slot.detach();
        assert!(!stale.send("y".to_string()));
        drop(stale);

        let fresh = slot.writer();
        assert!(fresh.send("z".to_string()));
        assert_eq!(slot.wait().unwrap(), "z");
    }

    #[test]
    fn keys_from_a_detached_reader_do_not_reach_the_next_one() {
        let interrupt = InterruptHandle::new();
        let first = InputSlot::new(&interrupt);
        let writer = first.writer();
        assert!(writer.send("z".to_string()));
        first.detach();
        drop(writer);

        let second = InputSlot::new(&interrupt);
        let writer = second.writer();
        drop(writer);
        assert_matches!(second.wait(), Err(SurveyError::Io(_)));
    }

    #[test]
    fn a_new_writer_discards_a_key_left_in_the_slot() {
        let interrupt = InterruptHandle::new();
        let slot = InputSlot::new(&interrupt);
        let stale = slot.writer();
        assert!(stale.send("left over".to_string()));

        let fresh = slot.writer();
        assert!(fresh.send("typed".to_string()));
        assert_eq!(slot.wait().unwrap(), "typed");
    }

    #[test]
    fn interrupt_releases_a_reader_stuck_on_a_full_slot() {
        let interrupt = InterruptHandle::new();
        let slot = InputSlot::new(&interrupt);
        let writer = slot.writer();
        assert!(writer.send("first".to_string()));

        let reader = thread::spawn(move || writer.send("second".to_string()));
        thread::sleep(Duration::from_millis(20));
        interrupt.interrupt();

        assert!(!reader.join().unwrap());
    }
}
