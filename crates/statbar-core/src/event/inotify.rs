//! File-change notification.

use std::ffi::CString;
use std::io;
use std::mem::size_of;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use super::cvt;

const EVENT_HEADER: usize = size_of::<libc::inotify_event>();
const READ_BUFFER: usize = 4096;

/// Opaque identifier the kernel issues for each registered path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(pub i32);

/// A non-blocking inotify instance.
pub struct Inotify {
    fd: OwnedFd,
}

impl Inotify {
    pub fn new() -> io::Result<Self> {
        // SAFETY: inotify_init1 takes no pointers.
        let fd = cvt(unsafe { libc::inotify_init1(libc::IN_CLOEXEC | libc::IN_NONBLOCK) })?;
        // SAFETY: inotify_init1 returned a fresh descriptor we now own.
        let fd = unsafe { OwnedFd::from_raw_fd(fd) };
        Ok(Self { fd })
    }

    /// Watches `path` for modification or creation.
    pub fn add_watch(&self, path: &Path) -> io::Result<WatchId> {
        let c_path = CString::new(path.as_os_str().as_bytes())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        // SAFETY: `c_path` is a valid NUL-terminated string for the duration of the call.
        let wd = cvt(unsafe {
            libc::inotify_add_watch(
                self.fd.as_raw_fd(),
                c_path.as_ptr(),
                libc::IN_MODIFY | libc::IN_CREATE,
            )
        })?;
        Ok(WatchId(wd))
    }

    pub fn raw_fd(&self) -> RawFd {
        self.fd.as_raw_fd()
    }

    /// Reads pending events and returns the watch id of each.
    ///
    /// Returns an empty list when nothing is pending.
    pub fn read_events(&self) -> io::Result<Vec<WatchId>> {
        let mut buf = [0u8; READ_BUFFER];
        // SAFETY: `buf` is valid for writes of READ_BUFFER bytes.
        let n = unsafe {
            libc::read(
                self.fd.as_raw_fd(),
                buf.as_mut_ptr().cast::<libc::c_void>(),
                buf.len(),
            )
        };
        if n < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::WouldBlock {
                return Ok(Vec::new());
            }
            return Err(err);
        }
        Ok(decode_events(&buf[..n as usize]))
    }
}

/// Decodes every event header in a buffer filled by `read(2)`.
///
/// Each record is a fixed header followed by `len` bytes of padded name.
/// A truncated trailing record is ignored.
pub fn decode_events(buf: &[u8]) -> Vec<WatchId> {
    let mut ids = Vec::new();
    let mut offset = 0;
    while offset + EVENT_HEADER <= buf.len() {
        // SAFETY: at least EVENT_HEADER bytes remain; the read is unaligned-safe.
        let event: libc::inotify_event =
            unsafe { std::ptr::read_unaligned(buf[offset..].as_ptr().cast()) };
        ids.push(WatchId(event.wd));
        offset += EVENT_HEADER + event.len as usize;
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn record(wd: i32, name_len: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&wd.to_ne_bytes());
        bytes.extend_from_slice(&libc::IN_MODIFY.to_ne_bytes());
        bytes.extend_from_slice(&0u32.to_ne_bytes());
        bytes.extend_from_slice(&name_len.to_ne_bytes());
        bytes.extend(std::iter::repeat_n(0u8, name_len as usize));
        bytes
    }

    #[test]
    fn test_decode_multiple_events() {
        let mut buf = record(3, 0);
        buf.extend(record(5, 16));
        buf.extend(record(3, 0));
        assert_eq!(decode_events(&buf), vec![WatchId(3), WatchId(5), WatchId(3)]);
    }

    #[test]
    fn test_decode_ignores_truncated_tail() {
        let mut buf = record(4, 0);
        buf.extend_from_slice(&[1, 2, 3]);
        assert_eq!(decode_events(&buf), vec![WatchId(4)]);
        assert!(decode_events(&[]).is_empty());
    }

    #[test]
    fn test_watch_reports_modification() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brightness");
        fs::write(&path, "100\n").unwrap();

        let inotify = Inotify::new().unwrap();
        let id = inotify.add_watch(&path).unwrap();
        assert!(inotify.read_events().unwrap().is_empty());

        fs::write(&path, "200\n").unwrap();
        let ids = inotify.read_events().unwrap();
        assert!(!ids.is_empty());
        assert!(ids.iter().all(|&wd| wd == id));
    }

    #[test]
    fn test_watch_missing_path_fails() {
        let inotify = Inotify::new().unwrap();
        let err = inotify
            .add_watch(Path::new("/nonexistent/statbar/brightness"))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
