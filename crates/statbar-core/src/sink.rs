//! Presentation sinks: where the rendered status line goes.

use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex, PoisonError};

/// A surface that displays one line of text.
///
/// `set_text` hands over the new line; `flush` makes it visible to
/// observers. Both are called once per render.
pub trait Sink: Send {
    fn set_text(&mut self, text: &str) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()>;
}

/// Writes one line per render to a writer (stdout by default).
///
/// Suits bars that read status lines from a pipe (dwl, somebar, lemonbar).
pub struct StdoutSink<W: Write + Send = io::Stdout> {
    out: W,
}

impl StdoutSink {
    pub fn new() -> Self {
        Self { out: io::stdout() }
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write + Send> StdoutSink<W> {
    pub fn with_writer(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> Sink for StdoutSink<W> {
    fn set_text(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{}", text)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// Sets the X root window name via `xsetroot -name`, which dwm displays.
pub struct XsetrootSink {
    program: String,
    pending: Option<String>,
}

impl XsetrootSink {
    pub fn new() -> Self {
        Self::with_program("xsetroot")
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            pending: None,
        }
    }
}

impl Default for XsetrootSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for XsetrootSink {
    fn set_text(&mut self, text: &str) -> io::Result<()> {
        self.pending = Some(text.to_string());
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        let Some(text) = self.pending.take() else {
            return Ok(());
        };
        let status = Command::new(&self.program)
            .arg("-name")
            .arg(&text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .status()?;
        if status.success() {
            Ok(())
        } else {
            Err(io::Error::other(format!("{} exited with {}", self.program, status)))
        }
    }
}

/// Keeps every flushed line in memory; clones share the same history.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pending: Option<String>,
    published: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines flushed so far, oldest first.
    pub fn published(&self) -> Vec<String> {
        self.published
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last(&self) -> Option<String> {
        self.published
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

impl Sink for MemorySink {
    fn set_text(&mut self, text: &str) -> io::Result<()> {
        self.pending = Some(text.to_string());
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(text) = self.pending.take() {
            self.published
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(text);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stdout_sink_writes_lines() {
        let mut sink = StdoutSink::with_writer(Vec::new());
        sink.set_text(" US │ CPU 12% ").unwrap();
        sink.flush().unwrap();
        sink.set_text(" RU │ CPU 13% ").unwrap();
        sink.flush().unwrap();

        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(out, " US │ CPU 12% \n RU │ CPU 13% \n");
    }

    #[test]
    fn test_xsetroot_sink_reports_failure() {
        let mut sink = XsetrootSink::with_program("false");
        sink.set_text("line").unwrap();
        assert!(sink.flush().is_err());
        // nothing pending: flush is a no-op
        assert!(sink.flush().is_ok());
    }

    #[test]
    fn test_xsetroot_sink_missing_program() {
        let mut sink = XsetrootSink::with_program("/nonexistent/xsetroot-12345");
        sink.set_text("line").unwrap();
        assert!(sink.flush().is_err());
    }

    #[test]
    fn test_memory_sink_shares_history() {
        let mut sink = MemorySink::new();
        let observer = sink.clone();
        sink.set_text("a").unwrap();
        assert!(observer.published().is_empty());
        sink.flush().unwrap();
        assert_eq!(observer.published(), vec!["a"]);
        assert_eq!(observer.last().as_deref(), Some("a"));
    }
}
