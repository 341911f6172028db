//! Platform-specific terminal integrations.

pub mod process_terminal;
pub mod stdin_buffer;

#[cfg(unix)]
pub use process_terminal::{install_signal_handlers, SignalHookGuard};
pub use process_terminal::ProcessTerminal;
