//! Bridges from listener commands to the dispatch loop.
//!
//! Keyboard and audio state changes are observed through long-running
//! tools (`xkb-switch -W`, `pactl subscribe`) that print one line per
//! change. The pipe carrying those lines can either join the epoll set
//! directly, or be drained by a dedicated worker thread that updates the
//! board under the status mutex.

use std::io::{self, BufRead, BufReader, Read};
use std::os::fd::{AsRawFd, RawFd};
use std::os::unix::process::CommandExt;
use std::process::{Child, ChildStdout, Command, Stdio};
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};

use super::cvt;
use crate::board::{self, SharedBoard};
use crate::collector::traits::{CommandRunner, FileSystem};
use crate::producer::Refresh;
use crate::status::Slot;

/// Which subsystem a listener reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeKind {
    /// Each line carries the new layout name or group index.
    Keyboard,
    /// Each line only signals that the audio state changed.
    Audio,
}

impl BridgeKind {
    pub fn name(self) -> &'static str {
        match self {
            BridgeKind::Keyboard => "keyboard",
            BridgeKind::Audio => "audio",
        }
    }

    /// The producer invocation a notification line asks for.
    pub fn refresh(self, line: String) -> Refresh {
        match self {
            BridgeKind::Keyboard => Refresh::KeyboardLayout(line.trim().to_string()),
            BridgeKind::Audio => Refresh::Slot(Slot::Volume),
        }
    }
}

/// Outcome of draining a non-blocking notification pipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Drained {
    /// The last complete line that arrived, without its newline.
    Line(String),
    /// No complete line yet; a partial one may be held back.
    Pending,
    /// The writer closed the pipe.
    Closed,
}

/// Line-oriented reader over a notification pipe.
///
/// Worker threads block in [`LineReader::read_line`]. The dispatch loop
/// switches the pipe to non-blocking mode and calls
/// [`LineReader::drain`] on readiness, which never waits for a newline.
pub struct LineReader<S: Read = ChildStdout> {
    inner: BufReader<S>,
    partial: Vec<u8>,
}

impl<S: Read + AsRawFd> LineReader<S> {
    pub fn new(source: S) -> Self {
        Self {
            inner: BufReader::new(source),
            partial: Vec::new(),
        }
    }

    pub fn raw_fd(&self) -> RawFd {
        self.inner.get_ref().as_raw_fd()
    }

    /// Sets `O_NONBLOCK` on the underlying descriptor.
    pub fn set_nonblocking(&self) -> io::Result<()> {
        let fd = self.raw_fd();
        // SAFETY: F_GETFL takes no pointer argument.
        let flags = cvt(unsafe { libc::fcntl(fd, libc::F_GETFL) })?;
        // SAFETY: F_SETFL takes an integer flag set.
        cvt(unsafe { libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) })?;
        Ok(())
    }

    /// Blocks for one line; `None` once the writer closed the pipe.
    pub fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.inner.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    /// Reads everything currently available and returns the latest
    /// complete line. An unterminated tail is kept for the next call.
    ///
    /// Expects a non-blocking descriptor; `WouldBlock` ends the read.
    pub fn drain(&mut self) -> io::Result<Drained> {
        let mut buf = [0u8; 1024];
        let mut closed = false;
        loop {
            match self.inner.read(&mut buf) {
                Ok(0) => {
                    closed = true;
                    break;
                }
                Ok(n) => self.partial.extend_from_slice(&buf[..n]),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        if let Some(end) = self.partial.iter().rposition(|&b| b == b'\n') {
            let start = self.partial[..end]
                .iter()
                .rposition(|&b| b == b'\n')
                .map_or(0, |i| i + 1);
            let line = String::from_utf8_lossy(&self.partial[start..end]).into_owned();
            self.partial.drain(..=end);
            // A close right after the line is reported on the next readiness.
            return Ok(Drained::Line(line));
        }
        if closed {
            return Ok(Drained::Closed);
        }
        Ok(Drained::Pending)
    }
}

/// Kills and reaps a listener process group when dropped.
pub struct ChildGuard {
    child: Child,
    command: String,
}

impl ChildGuard {
    pub fn kill(&mut self) {
        match self.child.try_wait() {
            Ok(Some(status)) => debug!("listener '{}' already exited: {}", self.command, status),
            _ => {
                // The listener leads its own group; pipelines die with it.
                let pgid = self.child.id() as libc::pid_t;
                // SAFETY: killpg only sends a signal.
                if unsafe { libc::killpg(pgid, libc::SIGKILL) } == -1 {
                    debug!("kill '{}': {}", self.command, io::Error::last_os_error());
                }
                let _ = self.child.wait();
            }
        }
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        self.kill();
    }
}

/// A running listener command and its stdout.
pub struct CommandStream {
    pub kind: BridgeKind,
    guard: ChildGuard,
    lines: LineReader,
}

impl CommandStream {
    /// Starts `cmdline` through `sh -c` with stdout piped back.
    pub fn spawn(kind: BridgeKind, cmdline: &str) -> io::Result<Self> {
        let mut child = Command::new("sh")
            .arg("-c")
            .arg(cmdline)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .process_group(0)
            .spawn()?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("listener stdout not captured"))?;

        info!("{} listener started: {}", kind.name(), cmdline);
        Ok(Self {
            kind,
            guard: ChildGuard {
                child,
                command: cmdline.to_string(),
            },
            lines: LineReader::new(stdout),
        })
    }

    pub fn raw_fd(&self) -> RawFd {
        self.lines.raw_fd()
    }

    pub fn lines(&self) -> &LineReader {
        &self.lines
    }

    pub fn lines_mut(&mut self) -> &mut LineReader {
        &mut self.lines
    }

    /// Moves the reader onto a worker thread; the process stays with the caller.
    pub fn into_worker<F, R>(self, board: SharedBoard<F, R>) -> io::Result<Worker>
    where
        F: FileSystem + 'static,
        R: CommandRunner + 'static,
    {
        let CommandStream { kind, guard, lines } = self;
        let handle = thread::Builder::new()
            .name(format!("{}-bridge", kind.name()))
            .spawn(move || run_worker(kind, lines, &board))?;
        Ok(Worker {
            guard,
            handle: Some(handle),
        })
    }
}

/// A bridge thread together with the process it reads from.
pub struct Worker {
    guard: ChildGuard,
    handle: Option<JoinHandle<()>>,
}

impl Drop for Worker {
    fn drop(&mut self) {
        // The thread sees EOF once the listener is gone.
        self.guard.kill();
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            warn!("{} bridge thread panicked", self.guard.command);
        }
    }
}

/// Applies one notification: lock, produce, render, unlock.
pub fn deliver<F: FileSystem, R: CommandRunner>(
    kind: BridgeKind,
    line: String,
    board: &SharedBoard<F, R>,
) {
    let refresh = kind.refresh(line);
    board::lock(board).refresh(&[refresh]);
}

/// Worker body: block on the listener, deliver each line, stop at EOF.
pub fn run_worker<S, F, R>(kind: BridgeKind, mut lines: LineReader<S>, board: &SharedBoard<F, R>)
where
    S: Read + AsRawFd,
    F: FileSystem,
    R: CommandRunner,
{
    loop {
        match lines.read_line() {
            Ok(Some(line)) => deliver(kind, line, board),
            Ok(None) => {
                info!("{} listener closed its output", kind.name());
                break;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!("{} listener read failed: {}", kind.name(), e);
                break;
            }
        }
    }
}
