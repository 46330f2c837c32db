//! Errors that prevent the dispatch loop from starting.
//!
//! Steady-state failures never surface here: producers absorb theirs and
//! the loop logs wait and notification errors.

use std::io;
use std::path::PathBuf;

#[derive(Debug)]
pub enum StartupError {
    /// The epoll instance could not be created or a descriptor not added to it.
    Epoll(io::Error),
    /// The inotify instance could not be created.
    Inotify(io::Error),
    /// A monitored file could not be registered for change notification.
    Watch { path: PathBuf, source: io::Error },
    /// The wall-clock timer could not be created or armed.
    Timer(io::Error),
    /// A listener command could not be started.
    Bridge { command: String, source: io::Error },
}

impl std::fmt::Display for StartupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StartupError::Epoll(e) => write!(f, "epoll setup failed: {}", e),
            StartupError::Inotify(e) => write!(f, "inotify setup failed: {}", e),
            StartupError::Watch { path, source } => {
                write!(f, "cannot watch {}: {}", path.display(), source)
            }
            StartupError::Timer(e) => write!(f, "timer setup failed: {}", e),
            StartupError::Bridge { command, source } => {
                write!(f, "cannot start listener '{}': {}", command, source)
            }
        }
    }
}

impl std::error::Error for StartupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StartupError::Epoll(e) | StartupError::Inotify(e) | StartupError::Timer(e) => Some(e),
            StartupError::Watch { source, .. } | StartupError::Bridge { source, .. } => {
                Some(source)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_display_names_the_resource() {
        let err = StartupError::Watch {
            path: PathBuf::from("/sys/class/backlight/x/brightness"),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        assert_eq!(
            err.to_string(),
            "cannot watch /sys/class/backlight/x/brightness: no such file"
        );
        assert!(err.source().is_some());
    }
}
