//! Time display helpers for plan listings and run reports.

use std::fmt;

use jiff::{tz::TimeZone, Timestamp};

/// Formats a `Timestamp` in the system timezone as `YYYY-MM-DD HH:MM:SS TZ`.
pub struct LocalDateTime<'a>(pub &'a Timestamp);

impl fmt::Display for LocalDateTime<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let zoned = self.0.to_zoned(TimeZone::system());
        write!(f, "{}", zoned.strftime("%Y-%m-%d %H:%M:%S %Z"))
    }
}

/// Handler time in milliseconds, shown as `850ms`, `12.4s` or `3m 05s`.
pub struct Elapsed(pub u64);

impl fmt::Display for Elapsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ms = self.0;
        match ms {
            0..=999 => write!(f, "{ms}ms"),
            1_000..=59_999 => write!(f, "{}.{}s", ms / 1_000, (ms % 1_000) / 100),
            _ => write!(f, "{}m {:02}s", ms / 60_000, (ms % 60_000) / 1_000),
        }
    }
}
