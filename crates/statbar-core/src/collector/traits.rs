//! Abstractions over the places metric values come from.
//!
//! `FileSystem` covers `/proc` and `/sys` reads, `CommandRunner` covers
//! tools whose standard output is the value (`checkupdates`, `pactl`).

use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

/// Read-only access to plain-text metric files.
pub trait FileSystem: Send {
    /// Reads the entire contents of a file as a string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Checks if a path exists.
    fn exists(&self, path: &Path) -> bool;
}

/// Runs a shell command line and captures its standard output.
///
/// The exit status is not inspected: several reporting tools signal
/// "nothing to report" with a non-zero code while printing nothing.
pub trait CommandRunner: Send {
    fn run(&self, cmdline: &str) -> io::Result<String>;
}

/// Real filesystem implementation that delegates to `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// Executes command lines through `sh -c` with stderr discarded.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealCommands;

impl RealCommands {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for RealCommands {
    fn run(&self, cmdline: &str) -> io::Result<String> {
        let output = Command::new("sh")
            .arg("-c")
            .arg(cmdline)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()?;
        String::from_utf8(output.stdout).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_real_fs_read_to_string() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "4200").unwrap();

        let fs = RealFs::new();
        assert_eq!(fs.read_to_string(file.path()).unwrap(), "4200\n");
        assert!(fs.exists(file.path()));
        assert!(!fs.exists(Path::new("/nonexistent/path/12345")));
    }

    #[test]
    fn test_real_commands_capture_stdout() {
        let runner = RealCommands::new();
        assert_eq!(runner.run("echo hello").unwrap(), "hello\n");
    }

    #[test]
    fn test_real_commands_ignore_exit_status() {
        let runner = RealCommands::new();
        assert_eq!(runner.run("printf partial; exit 2").unwrap(), "partial");
    }
}
