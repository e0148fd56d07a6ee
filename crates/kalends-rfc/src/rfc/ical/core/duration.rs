//! iCalendar DURATION value type (RFC 5545 §3.3.6).

use std::fmt::{self, Write as _};

use chrono::{Days, NaiveDateTime, TimeDelta};

const SECONDS_PER_DAY: i64 = 86_400;

/// ## Summary
/// A signed DURATION.
///
/// Weeks and days are nominal: adding `P1D` keeps the wall-clock time even
/// across a DST change. Hours, minutes and seconds are exact. A week form
/// (`P2W`) never carries a day or time part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Duration {
    pub negative: bool,
    pub weeks: u32,
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl Duration {
    #[must_use]
    pub const fn zero() -> Self {
        Self::from_parts(0, 0, 0, 0, 0)
    }

    const fn from_parts(weeks: u32, days: u32, hours: u32, minutes: u32, seconds: u32) -> Self {
        Self {
            negative: false,
            weeks,
            days,
            hours,
            minutes,
            seconds,
        }
    }

    #[must_use]
    pub const fn weeks(weeks: u32) -> Self {
        Self::from_parts(weeks, 0, 0, 0, 0)
    }

    #[must_use]
    pub const fn days(days: u32) -> Self {
        Self::from_parts(0, days, 0, 0, 0)
    }

    #[must_use]
    pub const fn hours(hours: u32) -> Self {
        Self::from_parts(0, 0, hours, 0, 0)
    }

    #[must_use]
    pub const fn minutes(minutes: u32) -> Self {
        Self::from_parts(0, 0, 0, minutes, 0)
    }

    #[must_use]
    pub const fn negate(self) -> Self {
        Self {
            negative: !self.negative,
            ..self
        }
    }

    /// Returns whether an hour, minute or second part is present.
    #[must_use]
    pub const fn has_time(&self) -> bool {
        self.hours != 0 || self.minutes != 0 || self.seconds != 0
    }

    const fn signed(&self, magnitude: i64) -> i64 {
        if self.negative { -magnitude } else { magnitude }
    }

    /// Signed number of nominal days (weeks count seven).
    #[must_use]
    pub const fn nominal_days(&self) -> i64 {
        self.signed(self.weeks as i64 * 7 + self.days as i64)
    }

    /// Signed number of exact seconds in the time part.
    #[must_use]
    pub const fn exact_seconds(&self) -> i64 {
        self.signed(self.hours as i64 * 3600 + self.minutes as i64 * 60 + self.seconds as i64)
    }

    /// Total length in seconds, counting a nominal day as 86400 seconds.
    #[must_use]
    pub const fn as_seconds(&self) -> i64 {
        self.nominal_days() * SECONDS_PER_DAY + self.exact_seconds()
    }

    #[must_use]
    pub const fn to_time_delta(&self) -> TimeDelta {
        TimeDelta::seconds(self.as_seconds())
    }

    /// ## Summary
    /// Applies this duration to a wall-clock value.
    ///
    /// The nominal days move the calendar date and the exact part is then
    /// added to the result. Returns `None` when the result is out of range.
    #[must_use]
    pub fn after(&self, start: NaiveDateTime) -> Option<NaiveDateTime> {
        let days = Days::new(self.nominal_days().unsigned_abs());
        let shifted = if self.negative {
            start.checked_sub_days(days)?
        } else {
            start.checked_add_days(days)?
        };
        shifted.checked_add_signed(TimeDelta::try_seconds(self.exact_seconds())?)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::with_capacity(12);
        if self.negative {
            out.push('-');
        }
        out.push('P');
        if self.weeks != 0 {
            write!(out, "{}W", self.weeks)?;
            return f.write_str(&out);
        }
        if self.days != 0 || !self.has_time() {
            write!(out, "{}D", self.days)?;
        }
        if self.has_time() {
            out.push('T');
            for (amount, unit) in [(self.hours, 'H'), (self.minutes, 'M'), (self.seconds, 'S')] {
                if amount != 0 {
                    write!(out, "{amount}{unit}")?;
                }
            }
        }
        f.write_str(&out)
    }
}
