//! Canned command output for testing command-backed producers.

use crate::collector::traits::CommandRunner;
use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex, PoisonError};

/// Maps a command line to the stdout it should produce.
///
/// Unknown command lines fail like a missing binary would. Every
/// invocation is recorded so tests can assert which producers ran.
#[derive(Debug, Clone, Default)]
pub struct MockCommands {
    outputs: HashMap<String, String>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockCommands {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the stdout of `cmdline`.
    pub fn add_output(&mut self, cmdline: impl Into<String>, stdout: impl Into<String>) {
        self.outputs.insert(cmdline.into(), stdout.into());
    }

    /// Command lines run so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl CommandRunner for MockCommands {
    fn run(&self, cmdline: &str) -> io::Result<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(cmdline.to_string());
        self.outputs.get(cmdline).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("command not found: {}", cmdline),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_commands_output_and_calls() {
        let mut commands = MockCommands::new();
        commands.add_output("checkupdates", "linux 6.1 -> 6.2\n");

        assert_eq!(commands.run("checkupdates").unwrap(), "linux 6.1 -> 6.2\n");
        let err = commands.run("pactl list sinks").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);

        let cloned = commands.clone();
        assert_eq!(cloned.calls(), vec!["checkupdates", "pactl list sinks"]);
    }
}
