//! Raw-mode terminal on the process's stdin/stdout.
//!
//! Input is read on a background thread, buffered through [`StdinBuffer`] and handed to the
//! input callback as decoded events. SIGWINCH is turned into resize callbacks. Bracketed paste
//! and any-motion SGR mouse reporting are enabled for the lifetime of the session.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use libc::c_int;
use log::{debug, error, warn};
use signal_hook::iterator::{Handle as SignalHandle, Signals};

use crate::core::input_event::InputEvent;
use crate::core::terminal::Terminal;
use crate::platform::stdin_buffer::StdinBuffer;

const ENABLE_MODES: &str = "\x1b[?2004h\x1b[?1000h\x1b[?1003h\x1b[?1006h";
const DISABLE_MODES: &str = "\x1b[?1006l\x1b[?1003l\x1b[?1000l\x1b[?2004l";
const ESCAPE_TIMEOUT_MS: u64 = 10;
const IDLE_POLL_MS: i32 = 50;
const READ_CHUNK: usize = 4096;
const FALLBACK_SIZE: (u16, u16) = (80, 24);

fn fd_write_all(fd: c_int, mut bytes: &[u8]) -> io::Result<()> {
    while !bytes.is_empty() {
        let written = unsafe { libc::write(fd, bytes.as_ptr().cast(), bytes.len()) };
        match written {
            n if n > 0 => bytes = &bytes[n as usize..],
            0 => return Err(io::Error::from(io::ErrorKind::WriteZero)),
            _ => {
                let err = io::Error::last_os_error();
                if err.kind() != io::ErrorKind::Interrupted {
                    return Err(err);
                }
            }
        }
    }
    Ok(())
}

/// `(columns, rows)` of the tty behind `fd`, when it reports a non-empty size.
fn window_size(fd: c_int) -> Option<(u16, u16)> {
    let mut size: libc::winsize = unsafe { std::mem::zeroed() };
    if unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut size) } != 0 {
        return None;
    }
    (size.ws_col > 0 && size.ws_row > 0).then_some((size.ws_col, size.ws_row))
}

enum Readiness {
    Idle,
    Readable,
    Closed,
}

fn wait_readable(fd: c_int, timeout_ms: i32) -> Readiness {
    let mut pollfd = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };
    match unsafe { libc::poll(&mut pollfd, 1, timeout_ms) } {
        0 => Readiness::Idle,
        n if n < 0 => match io::Error::last_os_error().kind() {
            io::ErrorKind::Interrupted => Readiness::Idle,
            _ => Readiness::Closed,
        },
        _ if pollfd.revents & libc::POLLIN != 0 => Readiness::Readable,
        _ if pollfd.revents & (libc::POLLHUP | libc::POLLERR | libc::POLLNVAL) != 0 => {
            Readiness::Closed
        }
        _ => Readiness::Idle,
    }
}

fn fd_read(fd: c_int, buf: &mut [u8]) -> io::Result<usize> {
    let read = unsafe { libc::read(fd, buf.as_mut_ptr().cast(), buf.len()) };
    usize::try_from(read).map_err(|_| io::Error::last_os_error())
}

/// Decode input from `fd` until `stop` is set or the descriptor reaches EOF, hangs up or fails.
fn pump(fd: c_int, stop: &AtomicBool, on_input: &mut dyn FnMut(Vec<InputEvent>)) {
    let mut chunk = [0u8; READ_CHUNK];
    let mut buffer = StdinBuffer::new(ESCAPE_TIMEOUT_MS);
    while !stop.load(Ordering::SeqCst) {
        let timeout = buffer.next_timeout_ms(Instant::now(), IDLE_POLL_MS);
        let events = match wait_readable(fd, timeout) {
            Readiness::Idle => buffer.flush_due(Instant::now()),
            Readiness::Readable => match fd_read(fd, &mut chunk) {
                Ok(0) => break,
                Ok(len) => buffer.process(&chunk[..len], Instant::now()),
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    warn!("stdin read failed: {err}");
                    break;
                }
            },
            Readiness::Closed => break,
        };
        if !events.is_empty() {
            on_input(events);
        }
    }
    let rest = buffer.flush();
    if !rest.is_empty() {
        on_input(rest);
    }
}

/// The termios state saved before entering raw mode.
struct SavedMode {
    fd: c_int,
    original: libc::termios,
}

impl SavedMode {
    fn enter_raw(fd: c_int) -> io::Result<Self> {
        let mut original: libc::termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(fd, &mut original) } != 0 {
            return Err(io::Error::last_os_error());
        }
        let mut raw = original;
        unsafe { libc::cfmakeraw(&mut raw) };
        if unsafe { libc::tcsetattr(fd, libc::TCSANOW, &raw) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(Self { fd, original })
    }

    /// Drop unread input, then put the original settings back.
    fn restore(self) -> io::Result<()> {
        unsafe { libc::tcflush(self.fd, libc::TCIFLUSH) };
        if unsafe { libc::tcsetattr(self.fd, libc::TCSANOW, &self.original) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

/// Reads stdin on its own thread and delivers decoded events. The thread ends, dropping the
/// callback, when input closes.
struct InputPump {
    stop: Arc<AtomicBool>,
    thread: JoinHandle<()>,
}

impl InputPump {
    fn spawn(fd: c_int, mut on_input: Box<dyn FnMut(Vec<InputEvent>) + Send>) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let stopped = Arc::clone(&stop);
        let thread = thread::spawn(move || {
            pump(fd, &stopped, &mut on_input);
            debug!("input closed");
        });
        Self { stop, thread }
    }

    fn shutdown(self) {
        self.stop.store(true, Ordering::SeqCst);
        if self.thread.join().is_err() {
            warn!("input thread panicked");
        }
    }
}

/// Forwards SIGWINCH to the resize callback.
struct ResizeWatcher {
    signals: SignalHandle,
    thread: JoinHandle<()>,
}

impl ResizeWatcher {
    fn spawn(mut on_resize: Box<dyn FnMut() + Send>) -> io::Result<Self> {
        let mut signals = Signals::new([libc::SIGWINCH])?;
        let handle = signals.handle();
        let thread = thread::spawn(move || {
            for _ in signals.forever() {
                on_resize();
            }
        });
        Ok(Self {
            signals: handle,
            thread,
        })
    }

    fn shutdown(self) {
        self.signals.close();
        if self.thread.join().is_err() {
            warn!("resize thread panicked");
        }
    }
}

/// Appends every terminal write to a file; gives up after the first failure.
struct WriteLog {
    path: PathBuf,
    disabled: bool,
}

impl WriteLog {
    fn append(&mut self, data: &str) {
        if self.disabled {
            return;
        }
        let written = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| file.write_all(data.as_bytes()));
        if let Err(err) = written {
            error!("disabling write log {}: {err}", self.path.display());
            self.disabled = true;
        }
    }
}

struct Session {
    mode: SavedMode,
    input: InputPump,
    resize: ResizeWatcher,
}

pub struct ProcessTerminal {
    stdin_fd: c_int,
    stdout_fd: c_int,
    session: Option<Session>,
    write_log: Option<WriteLog>,
}

impl ProcessTerminal {
    /// `write_log` receives a copy of every byte written to the terminal.
    pub fn new(write_log: Option<PathBuf>) -> Self {
        Self {
            stdin_fd: libc::STDIN_FILENO,
            stdout_fd: libc::STDOUT_FILENO,
            session: None,
            write_log: write_log.map(|path| WriteLog {
                path,
                disabled: false,
            }),
        }
    }

    pub fn is_started(&self) -> bool {
        self.session.is_some()
    }

    fn size(&self) -> (u16, u16) {
        window_size(self.stdout_fd).unwrap_or(FALLBACK_SIZE)
    }
}

impl Terminal for ProcessTerminal {
    fn start(
        &mut self,
        on_input: Box<dyn FnMut(Vec<InputEvent>) + Send>,
        on_resize: Box<dyn FnMut() + Send>,
    ) -> io::Result<()> {
        if self.session.is_some() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "terminal already started",
            ));
        }

        let mode = SavedMode::enter_raw(self.stdin_fd)?;
        let resize = match ResizeWatcher::spawn(on_resize) {
            Ok(resize) => resize,
            Err(err) => {
                mode.restore()?;
                return Err(err);
            }
        };
        if let Err(err) = fd_write_all(self.stdout_fd, ENABLE_MODES.as_bytes()) {
            resize.shutdown();
            mode.restore()?;
            return Err(err);
        }
        let input = InputPump::spawn(self.stdin_fd, on_input);

        self.session = Some(Session {
            mode,
            input,
            resize,
        });
        debug!("process terminal started");
        Ok(())
    }

    fn stop(&mut self) -> io::Result<()> {
        let Some(session) = self.session.take() else {
            return Ok(());
        };
        session.input.shutdown();
        session.resize.shutdown();
        let modes_off = fd_write_all(self.stdout_fd, DISABLE_MODES.as_bytes());
        session.mode.restore()?;
        debug!("process terminal stopped");
        modes_off
    }

    fn write(&mut self, data: &str) {
        if data.is_empty() {
            return;
        }
        if let Err(err) = fd_write_all(self.stdout_fd, data.as_bytes()) {
            error!("failed to write to terminal: {err}");
        }
        if let Some(log) = self.write_log.as_mut() {
            log.append(data);
        }
    }

    fn columns(&self) -> u16 {
        self.size().0
    }

    fn rows(&self) -> u16 {
        self.size().1
    }
}
