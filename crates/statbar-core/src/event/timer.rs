//! Wall-clock aligned periodic timer backed by `timerfd`.

use std::io;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::cvt;

/// First deadline strictly after `now_secs` that is a multiple of `interval_secs`.
///
/// Ticks land on wall-clock marks (`hh:mm:00` for a 60 s interval) rather
/// than drifting from the process start time.
pub fn next_boundary(now_secs: i64, interval_secs: i64) -> i64 {
    now_secs + interval_secs - now_secs.rem_euclid(interval_secs)
}

/// A periodic `CLOCK_REALTIME` timer whose ticks land on interval boundaries.
pub struct MinuteTimer {
    fd: OwnedFd,
    interval: Duration,
}

impl MinuteTimer {
    pub fn new(interval: Duration) -> io::Result<Self> {
        if interval.as_secs() == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "timer interval must be at least one second",
            ));
        }

        // SAFETY: timerfd_create takes no pointers.
        let fd = cvt(unsafe {
            libc::timerfd_create(
                libc::CLOCK_REALTIME,
                libc::TFD_CLOEXEC | libc::TFD_NONBLOCK,
            )
        })?;
        // SAFETY: timerfd_create returned a fresh descriptor we now own.
        let fd = unsafe { OwnedFd::from_raw_fd(fd) };
        let timer = Self { fd, interval };
        timer.arm()?;
        Ok(timer)
    }

    fn arm(&self) -> io::Result<()> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(io::Error::other)?;
        let interval = self.interval.as_secs() as i64;

        // SAFETY: itimerspec is plain data; all-zero is a valid value.
        let mut its: libc::itimerspec = unsafe { std::mem::zeroed() };
        its.it_interval.tv_sec = interval as libc::time_t;
        its.it_value.tv_sec = next_boundary(now.as_secs() as i64, interval) as libc::time_t;

        // SAFETY: `its` is valid for the call; the old value is not requested.
        cvt(unsafe {
            libc::timerfd_settime(
                self.fd.as_raw_fd(),
                libc::TFD_TIMER_ABSTIME,
                &its,
                std::ptr::null_mut(),
            )
        })?;
        Ok(())
    }

    pub fn raw_fd(&self) -> RawFd {
        self.fd.as_raw_fd()
    }

    /// Consumes the expiration counter; 0 when the timer has not fired.
    pub fn read(&self) -> io::Result<u64> {
        let mut expirations: u64 = 0;
        // SAFETY: reading exactly 8 bytes into a u64.
        let n = unsafe {
            libc::read(
                self.fd.as_raw_fd(),
                (&mut expirations as *mut u64).cast::<libc::c_void>(),
                size_of::<u64>(),
            )
        };
        if n < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::WouldBlock {
                return Ok(0);
            }
            return Err(err);
        }
        Ok(expirations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_boundary() {
        assert_eq!(next_boundary(125, 60), 180);
        assert_eq!(next_boundary(179, 60), 180);
        // exactly on a mark schedules the following one
        assert_eq!(next_boundary(120, 60), 180);
        assert_eq!(next_boundary(1_700_000_017, 60), 1_700_000_040);
    }

    #[test]
    fn test_fresh_timer_has_not_fired() {
        let timer = MinuteTimer::new(Duration::from_secs(3600)).unwrap();
        assert_eq!(timer.read().unwrap(), 0);
    }

    #[test]
    fn test_short_interval_fires() {
        let timer = MinuteTimer::new(Duration::from_secs(1)).unwrap();
        std::thread::sleep(Duration::from_millis(1100));
        assert!(timer.read().unwrap() >= 1);
    }

    #[test]
    fn test_zero_interval_rejected() {
        assert!(MinuteTimer::new(Duration::from_millis(500)).is_err());
    }
}
