//! Linux event sources multiplexed by the dispatch loop.
//!
//! Thin owners of kernel descriptors (`epoll`, `inotify`, `timerfd`) plus
//! the command bridges that turn a listener's stdout into notifications.
//! Every descriptor is an `OwnedFd`, closed on drop.

pub mod bridge;
pub mod epoll;
pub mod inotify;
pub mod timer;

pub use bridge::{BridgeKind, CommandStream, LineReader};
pub use epoll::Epoll;
pub use inotify::{Inotify, WatchId};
pub use timer::MinuteTimer;

use std::io;

/// Converts a `-1` libc return into the thread's `errno`.
fn cvt(rc: libc::c_int) -> io::Result<libc::c_int> {
    if rc == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(rc)
    }
}
