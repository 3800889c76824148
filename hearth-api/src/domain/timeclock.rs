use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Date, OffsetDateTime, UtcOffset};

pub const MINUTES_PER_DAY: u16 = 24 * 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeclockError {
    #[error("malformed clock time '{0}', expected HH:MM")]
    Malformed(String),
    #[error("clock time '{0}' out of range")]
    OutOfRange(String),
}

/// A wall-clock instant expressed as whole minutes since midnight,
/// guaranteed to be in `[0, 1440)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MinuteOfDay(u16);

impl MinuteOfDay {
    pub fn new(minutes: u16) -> Result<Self, TimeclockError> {
        if minutes >= MINUTES_PER_DAY {
            return Err(TimeclockError::OutOfRange(minutes.to_string()));
        }
        Ok(Self(minutes))
    }

    /// Parse a `"HH:MM"` clock string. Rejects non-numeric components and
    /// out-of-range hours/minutes rather than silently producing nonsense.
    pub fn parse(clock: &str) -> Result<Self, TimeclockError> {
        let (h, m) = clock
            .split_once(':')
            .ok_or_else(|| TimeclockError::Malformed(clock.to_string()))?;

        let hours: u16 = h
            .parse()
            .map_err(|_| TimeclockError::Malformed(clock.to_string()))?;
        let minutes: u16 = m
            .parse()
            .map_err(|_| TimeclockError::Malformed(clock.to_string()))?;

        if hours >= 24 || minutes >= 60 {
            return Err(TimeclockError::OutOfRange(clock.to_string()));
        }

        Ok(Self(hours * 60 + minutes))
    }

    pub fn get(&self) -> u16 {
        self.0
    }

    pub fn hour(&self) -> u16 {
        self.0 / 60
    }

    pub fn minute(&self) -> u16 {
        self.0 % 60
    }
}

impl From<time::Time> for MinuteOfDay {
    fn from(t: time::Time) -> Self {
        Self(t.hour() as u16 * 60 + t.minute() as u16)
    }
}

/// Renders as the `"HH:MM"` form accepted by [`MinuteOfDay::parse`].
impl fmt::Display for MinuteOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// Format a duration for display: `"1h 5m"`, `"2h"`, `"45m"`.
/// Zero or negative durations render as an empty string.
pub fn minutes_to_display(total_minutes: i32) -> String {
    if total_minutes <= 0 {
        return String::new();
    }
    let h = total_minutes / 60;
    let m = total_minutes % 60;
    match (h, m) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m}m"),
    }
}

/// Format a minute-of-day on a 12-hour clock: `"1:30 PM"`, `"12:00 AM"`.
/// No leading zero on the hour; midnight and noon map to 12.
pub fn format_time(at: MinuteOfDay) -> String {
    let h = at.hour();
    let m = at.minute();
    let period = if h >= 12 { "PM" } else { "AM" };
    let display_h = match h {
        0 => 12,
        1..=12 => h,
        _ => h - 12,
    };
    format!("{display_h}:{m:02} {period}")
}

pub fn format_time_range(start: MinuteOfDay, end: MinuteOfDay) -> String {
    format!("{} \u{2013} {}", format_time(start), format_time(end))
}

/// Source of the current instant, in the family's local time.
///
/// The engine and view services take this as a seam so tests can pin the
/// clock; production uses [`WallClock`].
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> OffsetDateTime;

    fn today(&self) -> Date {
        self.now().date()
    }

    fn minute_of_day(&self) -> MinuteOfDay {
        MinuteOfDay::from(self.now().time())
    }
}

/// The household's wall clock.
///
/// All classification is done in the family's local time; the offset comes
/// from configuration so the server's own timezone never leaks in.
#[derive(Debug, Clone, Copy)]
pub struct WallClock {
    offset: UtcOffset,
}

impl WallClock {
    pub fn from_offset_minutes(minutes: i32) -> Self {
        let offset = UtcOffset::from_whole_seconds(minutes * 60).unwrap_or(UtcOffset::UTC);
        Self { offset }
    }

    pub fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc().to_offset(self.offset)
    }

    pub fn today(&self) -> Date {
        self.now().date()
    }

    pub fn minute_of_day(&self) -> MinuteOfDay {
        MinuteOfDay::from(self.now().time())
    }
}

impl Clock for WallClock {
    fn now(&self) -> OffsetDateTime {
        WallClock::now(self)
    }
}

/// A clock pinned to a fixed instant.
#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub OffsetDateTime);

#[cfg(test)]
impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}
