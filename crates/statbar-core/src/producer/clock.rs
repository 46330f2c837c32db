//! Wall-clock display.

use chrono::{DateTime, FixedOffset, Local, TimeZone};

pub const PLACEHOLDER: &str = "--:--";

/// Layout of the time slot, e.g. `Tue Mar 05 02:07pm`.
pub const FORMAT: &str = "%a %b %d %I:%M%P";

/// Source of the current time; a plain function so it can be swapped in tests.
pub type ClockFn = fn() -> DateTime<FixedOffset>;

/// Current local time.
pub fn local_now() -> DateTime<FixedOffset> {
    Local::now().fixed_offset()
}

pub fn format<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format(FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_afternoon() {
        let tz = FixedOffset::east_opt(3 * 3600).unwrap();
        let now = tz.with_ymd_and_hms(2024, 3, 5, 14, 7, 59).unwrap();
        assert_eq!(format(&now), "Tue Mar 05 02:07pm");
    }

    #[test]
    fn test_format_midnight() {
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let now = tz.with_ymd_and_hms(2023, 12, 31, 0, 0, 0).unwrap();
        assert_eq!(format(&now), "Sun Dec 31 12:00am");
    }
}
