//! Process-backed terminal over raw file descriptors.

#[cfg(unix)]
use std::fs::OpenOptions;
#[cfg(unix)]
use std::io::Write;
#[cfg(unix)]
use std::path::PathBuf;
#[cfg(unix)]
use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc, Mutex, MutexGuard, PoisonError,
};
#[cfg(unix)]
use std::thread;
#[cfg(unix)]
use std::time::Instant;

use crate::core::terminal::Terminal;

#[cfg(unix)]
use crate::config::EnvConfig;
#[cfg(unix)]
use crate::platform::stdin_buffer::StdinBuffer;
#[cfg(unix)]
use crate::config::Stdio;
#[cfg(unix)]
use libc::{self, c_int};
#[cfg(unix)]
use once_cell::sync::OnceCell;
#[cfg(unix)]
use signal_hook::{iterator::Signals, low_level};

/// Poll interval for the reader thread's stop flag.
#[cfg(unix)]
const READ_POLL_MS: i32 = 50;

/// How long a lone ESC waits for the rest of its sequence.
#[cfg(unix)]
const ESCAPE_TIMEOUT_MS: u64 = 10;

#[cfg(unix)]
fn wait_writable(fd: c_int) -> std::io::Result<()> {
    let mut fds = libc::pollfd {
        fd,
        events: libc::POLLOUT,
        revents: 0,
    };
    loop {
        let result = unsafe { libc::poll(&mut fds, 1, -1) };
        if result < 0 {
            let err = std::io::Error::last_os_error();
            if err.kind() == std::io::ErrorKind::Interrupted {
                continue;
            }
            return Err(err);
        }
        if result == 0 {
            continue;
        }
        if (fds.revents & libc::POLLOUT) != 0 {
            return Ok(());
        }

        return Err(std::io::Error::other(format!(
            "poll(POLLOUT) returned revents=0x{:x}",
            fds.revents
        )));
    }
}

#[cfg(unix)]
fn write_all_fd_with<FWrite, FWait>(
    fd: c_int,
    bytes: &[u8],
    mut write_once: FWrite,
    mut wait_writable: FWait,
) -> std::io::Result<()>
where
    FWrite: FnMut(c_int, &[u8]) -> std::io::Result<usize>,
    FWait: FnMut(c_int) -> std::io::Result<()>,
{
    let mut written = 0;
    while written < bytes.len() {
        match write_once(fd, &bytes[written..]) {
            Ok(0) => {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::WriteZero,
                    "write returned 0",
                ));
            }
            Ok(count) => {
                if count > bytes.len() - written {
                    return Err(std::io::Error::other(
                        "write returned more bytes than requested",
                    ));
                }
                written += count;
            }
            Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => wait_writable(fd)?,
            Err(err) => return Err(err),
        }
    }
    Ok(())
}

#[cfg(unix)]
fn write_fd(fd: c_int, data: &str) -> std::io::Result<()> {
    if data.is_empty() {
        return Ok(());
    }
    write_all_fd_with(
        fd,
        data.as_bytes(),
        |fd, buf| {
            let result = unsafe { libc::write(fd, buf.as_ptr() as *const libc::c_void, buf.len()) };
            if result < 0 {
                Err(std::io::Error::last_os_error())
            } else {
                Ok(result as usize)
            }
        },
        wait_writable,
    )
}

#[cfg(unix)]
fn read_columns(fd: c_int) -> Option<u16> {
    let mut size = libc::winsize {
        ws_row: 0,
        ws_col: 0,
        ws_xpixel: 0,
        ws_ypixel: 0,
    };
    let result = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut size) };
    if result == 0 && size.ws_col > 0 {
        Some(size.ws_col)
    } else {
        None
    }
}

#[cfg(unix)]
fn poll_readable(fd: c_int, timeout_ms: i32) -> bool {
    let mut fds = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };
    let result = unsafe { libc::poll(&mut fds, 1, timeout_ms) };
    result > 0 && (fds.revents & (libc::POLLIN | libc::POLLHUP)) != 0
}

#[cfg(unix)]
fn get_termios(fd: c_int) -> std::io::Result<libc::termios> {
    let mut termios = unsafe { std::mem::zeroed::<libc::termios>() };
    let result = unsafe { libc::tcgetattr(fd, &mut termios) };
    if result != 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(termios)
}

#[cfg(unix)]
fn set_termios(fd: c_int, termios: &libc::termios) -> std::io::Result<()> {
    let result = unsafe { libc::tcsetattr(fd, libc::TCSANOW, termios) };
    if result != 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(())
}

/// Reader loop: split raw bytes into keys and hand them to `on_input`.
///
/// Returns, dropping `on_input`, when `stop` is set or the descriptor reaches
/// end of input.
#[cfg(unix)]
fn read_input(fd: c_int, stop: Arc<AtomicBool>, mut on_input: Box<dyn FnMut(String) + Send>) {
    let mut buffer = [0u8; 4096];
    let mut stdin_buffer = StdinBuffer::new(ESCAPE_TIMEOUT_MS);

    while !stop.load(Ordering::SeqCst) {
        let now = Instant::now();
        let timeout_ms = stdin_buffer.next_timeout_ms(now, READ_POLL_MS);
        let events = if poll_readable(fd, timeout_ms) {
            let read_len = unsafe { libc::read(fd, buffer.as_mut_ptr() as *mut _, buffer.len()) };
            if read_len == 0 {
                for event in stdin_buffer.flush() {
                    on_input(event.into_wire());
                }
                tracing::debug!(target: "tape_survey::input", "input reached end of file");
                return;
            }
            if read_len < 0 {
                let err = std::io::Error::last_os_error();
                if matches!(
                    err.kind(),
                    std::io::ErrorKind::Interrupted | std::io::ErrorKind::WouldBlock
                ) {
                    continue;
                }
                tracing::warn!(target: "tape_survey::input", error = %err, "input read failed");
                return;
            }
            stdin_buffer.process(&buffer[..read_len as usize])
        } else {
            stdin_buffer.flush_due(now)
        };

        for event in events {
            if stop.load(Ordering::SeqCst) {
                return;
            }
            on_input(event.into_wire());
        }
    }
}

#[cfg(unix)]
pub struct ProcessTerminal {
    stdin_fd: c_int,
    stdout_fd: c_int,
    original_termios: Option<libc::termios>,
    raw_mode: bool,
    stop_flag: Option<Arc<AtomicBool>>,
    write_log_path: Option<PathBuf>,
    write_log_failed: bool,
}

#[cfg(unix)]
impl ProcessTerminal {
    pub fn new() -> Self {
        Self::with_stdio(Stdio::default())
    }

    /// Terminal over caller-chosen descriptors. The error descriptor is unused.
    pub fn with_stdio(stdio: Stdio) -> Self {
        Self {
            stdin_fd: stdio.input,
            stdout_fd: stdio.output,
            original_termios: None,
            raw_mode: false,
            stop_flag: None,
            write_log_path: EnvConfig::from_env().write_log.map(PathBuf::from),
            write_log_failed: false,
        }
    }

    /// Enter raw mode. Descriptors that are not terminals are read as-is.
    fn enable_raw_mode(&mut self) -> std::io::Result<()> {
        let original = match self.original_termios {
            Some(original) => original,
            None => match get_termios(self.stdin_fd) {
                Ok(original) => {
                    self.original_termios = Some(original);
                    original
                }
                Err(err) if err.raw_os_error() == Some(libc::ENOTTY) => return Ok(()),
                Err(err) => return Err(err),
            },
        };
        let mut raw = original;
        unsafe {
            libc::cfmakeraw(&mut raw);
        }
        set_termios(self.stdin_fd, &raw)?;
        self.raw_mode = true;
        Ok(())
    }

    fn restore_raw_mode(&mut self) -> std::io::Result<()> {
        if !self.raw_mode {
            return Ok(());
        }
        self.raw_mode = false;
        match self.original_termios.as_ref() {
            Some(original) => set_termios(self.stdin_fd, original),
            None => Ok(()),
        }
    }

    fn append_write_log(&mut self, data: &str) {
        if self.write_log_failed {
            return;
        }
        if let Some(path) = self.write_log_path.as_ref() {
            let result = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .and_then(|mut file| file.write_all(data.as_bytes()));
            if let Err(err) = result {
                tracing::warn!(path = %path.display(), error = %err, "disabling write log");
                self.write_log_failed = true;
            }
        }
    }
}

#[cfg(unix)]
impl Default for ProcessTerminal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
impl Terminal for ProcessTerminal {
    fn start(&mut self, on_input: Box<dyn FnMut(String) + Send>) -> std::io::Result<()> {
        self.enable_raw_mode()?;

        let stop = Arc::new(AtomicBool::new(false));
        let fd = self.stdin_fd;
        let reader_stop = Arc::clone(&stop);
        self.stop_flag = Some(stop);
        thread::spawn(move || read_input(fd, reader_stop, on_input));
        Ok(())
    }

    /// Signal the reader and restore the terminal without waiting for the
    /// reader to notice; it exits on its next poll.
    fn stop(&mut self) -> std::io::Result<()> {
        if let Some(stop) = self.stop_flag.take() {
            stop.store(true, Ordering::SeqCst);
        }

        if self.raw_mode {
            let _ = unsafe { libc::tcflush(self.stdin_fd, libc::TCIFLUSH) };
        }
        self.restore_raw_mode()
    }

    fn write(&mut self, data: &str) {
        if let Err(err) = write_fd(self.stdout_fd, data) {
            tracing::warn!(error = %err, "terminal write failed");
        }
        self.append_write_log(data);
    }

    fn columns(&self) -> u16 {
        read_columns(self.stdout_fd).unwrap_or(80)
    }
}

#[cfg(unix)]
type SignalCallback = Box<dyn Fn() + Send>;

/// Callback of the survey currently holding SIGINT/SIGTERM, tagged with the
/// id of its guard. With no route the signal gets its default action.
#[cfg(unix)]
static SIGNAL_ROUTE: Mutex<Option<(u64, SignalCallback)>> = Mutex::new(None);

#[cfg(unix)]
static SIGNAL_LISTENER: OnceCell<()> = OnceCell::new();

#[cfg(unix)]
static NEXT_GUARD_ID: AtomicU64 = AtomicU64::new(1);

#[cfg(unix)]
fn signal_route() -> MutexGuard<'static, Option<(u64, SignalCallback)>> {
    SIGNAL_ROUTE.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Keeps SIGINT/SIGTERM routed to a callback until dropped.
#[cfg(unix)]
pub struct SignalHookGuard {
    id: u64,
}

#[cfg(unix)]
impl Drop for SignalHookGuard {
    fn drop(&mut self) {
        let mut route = signal_route();
        if matches!(route.as_ref(), Some((id, _)) if *id == self.id) {
            *route = None;
        }
    }
}

/// Route SIGINT and SIGTERM to `on_signal` instead of terminating the process.
///
/// The OS-level handlers stay registered for the life of the process; once
/// every guard is dropped a signal terminates the process as it would have
/// without them.
#[cfg(unix)]
pub fn install_signal_handlers<F>(on_signal: F) -> std::io::Result<SignalHookGuard>
where
    F: Fn() + Send + 'static,
{
    SIGNAL_LISTENER.get_or_try_init(spawn_signal_listener)?;
    let id = NEXT_GUARD_ID.fetch_add(1, Ordering::Relaxed);
    *signal_route() = Some((id, Box::new(on_signal)));
    Ok(SignalHookGuard { id })
}

#[cfg(unix)]
fn spawn_signal_listener() -> std::io::Result<()> {
    let mut signals = Signals::new([libc::SIGINT, libc::SIGTERM])?;
    thread::Builder::new()
        .name("tape-survey-signals".to_string())
        .spawn(move || {
            for signal in signals.forever() {
                let route = signal_route();
                if let Some((_, on_signal)) = route.as_ref() {
                    tracing::debug!(signal, "interrupting survey");
                    on_signal();
                    continue;
                }
                drop(route);
                tracing::debug!(signal, "no survey running, applying default action");
                if let Err(err) = low_level::emulate_default_handler(signal) {
                    tracing::warn!(signal, error = %err, "default signal action failed");
                }
            }
        })?;
    Ok(())
}

#[cfg(not(unix))]
pub struct ProcessTerminal;

#[cfg(not(unix))]
impl ProcessTerminal {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(not(unix))]
impl Default for ProcessTerminal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(unix))]
impl Terminal for ProcessTerminal {
    fn start(&mut self, _on_input: Box<dyn FnMut(String) + Send>) -> std::io::Result<()> {
        Err(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "process terminal requires a unix platform",
        ))
    }

    fn stop(&mut self) -> std::io::Result<()> {
        Ok(())
    }

    fn write(&mut self, _data: &str) {}

    fn columns(&self) -> u16 {
        80
    }
}
