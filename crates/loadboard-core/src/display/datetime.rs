//! Timestamp display in a chosen time zone.

use std::fmt;

use jiff::{tz::TimeZone, Timestamp};

/// Formats a timestamp as `YYYY-MM-DD HH:MM TZ` in the given zone, the same
/// civil form change sets accept.
pub struct LocalDateTime<'a> {
    pub timestamp: &'a Timestamp,
    pub time_zone: &'a TimeZone,
}

impl<'a> LocalDateTime<'a> {
    pub fn new(timestamp: &'a Timestamp, time_zone: &'a TimeZone) -> Self {
        Self {
            timestamp,
            time_zone,
        }
    }
}

impl fmt::Display for LocalDateTime<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.timestamp
                .to_zoned(self.time_zone.clone())
                .strftime("%Y-%m-%d %H:%M %Z")
        )
    }
}
