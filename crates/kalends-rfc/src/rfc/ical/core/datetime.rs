//! iCalendar DATE, DATE-TIME, TIME and UTC-OFFSET value types
//! (RFC 5545 §3.3.4, §3.3.5, §3.3.12, §3.3.14).

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike};
use chrono_tz::Tz;

/// UTC offset representation (e.g., +0530, -0800).
///
/// Stored as total seconds from UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UtcOffset {
    seconds: i32,
}

impl UtcOffset {
    /// UTC offset (zero).
    pub const UTC: Self = Self { seconds: 0 };

    /// Creates a UTC offset from total seconds.
    #[must_use]
    pub const fn from_seconds(seconds: i32) -> Self {
        Self { seconds }
    }

    /// Returns the offset as total seconds from UTC.
    #[must_use]
    pub const fn as_seconds(self) -> i32 {
        self.seconds
    }
}

impl fmt::Display for UtcOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.seconds >= 0 { '+' } else { '-' };
        let abs = self.seconds.abs();
        let hours = abs / 3600;
        let minutes = (abs % 3600) / 60;
        let seconds = abs % 60;
        write!(f, "{sign}{hours:02}{minutes:02}")?;
        if seconds != 0 {
            write!(f, "{seconds:02}")?;
        }
        Ok(())
    }
}

/// TIME value (RFC 5545 §3.3.12).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Time {
    pub time: NaiveTime,
    /// Whether this time carries the `Z` suffix.
    pub is_utc: bool,
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}{:02}{:02}",
            self.time.hour(),
            self.time.minute(),
            self.time.second()
        )?;
        if self.is_utc {
            write!(f, "Z")?;
        }
        Ok(())
    }
}

/// Form of DATE-TIME value (RFC 5545 §3.3.5).
///
/// iCalendar DATE-TIME values come in three mutually exclusive forms.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DateTimeForm {
    /// Floating time - same wall-clock time in any timezone.
    ///
    /// Example: `19980118T230000`
    Floating,

    /// UTC time - absolute instant, indicated by 'Z' suffix.
    ///
    /// Example: `19980119T070000Z`
    Utc,

    /// Zoned time - local time with TZID reference.
    ///
    /// Example: `TZID=America/New_York:19980119T020000`
    Zoned {
        /// The timezone identifier as written in the TZID parameter.
        tzid: String,
    },
}

/// DATE-TIME value (RFC 5545 §3.3.5).
///
/// The wall-clock reading is kept as written; the form says how to anchor it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DateTime {
    pub local: NaiveDateTime,
    pub form: DateTimeForm,
}

impl DateTime {
    #[must_use]
    pub const fn floating(local: NaiveDateTime) -> Self {
        Self {
            local,
            form: DateTimeForm::Floating,
        }
    }

    #[must_use]
    pub const fn utc(local: NaiveDateTime) -> Self {
        Self {
            local,
            form: DateTimeForm::Utc,
        }
    }

    #[must_use]
    pub fn zoned(local: NaiveDateTime, tzid: impl Into<String>) -> Self {
        Self {
            local,
            form: DateTimeForm::Zoned { tzid: tzid.into() },
        }
    }

    /// Returns whether this is a UTC time.
    #[must_use]
    pub fn is_utc(&self) -> bool {
        matches!(self.form, DateTimeForm::Utc)
    }

    /// Returns whether this is a floating time.
    #[must_use]
    pub fn is_floating(&self) -> bool {
        matches!(self.form, DateTimeForm::Floating)
    }

    /// Returns the timezone ID if this is a zoned time.
    #[must_use]
    pub fn tzid(&self) -> Option<&str> {
        match &self.form {
            DateTimeForm::Zoned { tzid } => Some(tzid),
            DateTimeForm::Floating | DateTimeForm::Utc => None,
        }
    }

    /// Returns a copy with a different wall-clock reading and the same form.
    #[must_use]
    pub fn with_local(&self, local: NaiveDateTime) -> Self {
        Self {
            local,
            form: self.form.clone(),
        }
    }

    /// ## Summary
    /// Returns the UTC instant for UTC and resolvable zoned values.
    ///
    /// Floating values and zones unknown to the tz database return `None`.
    #[must_use]
    pub fn to_utc(&self) -> Option<NaiveDateTime> {
        match &self.form {
            DateTimeForm::Utc => Some(self.local),
            DateTimeForm::Zoned { tzid } => local_to_utc(self.local, resolve_tz(tzid)?),
            DateTimeForm::Floating => None,
        }
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}{:02}{:02}T{:02}{:02}{:02}",
            self.local.year(),
            self.local.month(),
            self.local.day(),
            self.local.hour(),
            self.local.minute(),
            self.local.second()
        )?;
        if self.is_utc() {
            write!(f, "Z")?;
        }
        Ok(())
    }
}

/// Writes a DATE value in `YYYYMMDD` form.
pub(crate) fn format_date(date: NaiveDate) -> String {
    format!("{:04}{:02}{:02}", date.year(), date.month(), date.day())
}

/// The three temporal kinds that related properties must agree on.
///
/// UTC date-times count as zoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemporalKind {
    Date,
    Local,
    Zoned,
}

impl fmt::Display for TemporalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Date => "DATE",
            Self::Local => "DATE-TIME (floating)",
            Self::Zoned => "DATE-TIME (zoned)",
        })
    }
}

/// Either a DATE or a DATE-TIME: the values DTSTART, DTEND, DUE,
/// RECURRENCE-ID, EXDATE and RDATE carry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Temporal {
    Date(NaiveDate),
    DateTime(DateTime),
}

impl Temporal {
    #[must_use]
    pub fn kind(&self) -> TemporalKind {
        match self {
            Self::Date(_) => TemporalKind::Date,
            Self::DateTime(dt) if dt.is_floating() => TemporalKind::Local,
            Self::DateTime(_) => TemporalKind::Zoned,
        }
    }

    #[must_use]
    pub fn date(&self) -> NaiveDate {
        match self {
            Self::Date(d) => *d,
            Self::DateTime(dt) => dt.local.date(),
        }
    }

    /// Returns the wall-clock reading; dates read as midnight.
    #[must_use]
    pub fn wall_clock(&self) -> NaiveDateTime {
        match self {
            Self::Date(d) => d.and_time(NaiveTime::MIN),
            Self::DateTime(dt) => dt.local,
        }
    }

    #[must_use]
    pub fn tzid(&self) -> Option<&str> {
        match self {
            Self::Date(_) => None,
            Self::DateTime(dt) => dt.tzid(),
        }
    }

    /// ## Summary
    /// Returns a key for ordering and matching instants.
    ///
    /// UTC and resolvable zoned values map to UTC. Dates, floating values and
    /// unknown zones fall back to their wall clock.
    #[must_use]
    pub fn instant_key(&self) -> NaiveDateTime {
        match self {
            Self::Date(d) => d.and_time(NaiveTime::MIN),
            Self::DateTime(dt) => dt.to_utc().unwrap_or(dt.local),
        }
    }

    /// Builds a value of the same kind and zone from a wall-clock reading.
    #[must_use]
    pub fn with_wall_clock(&self, local: NaiveDateTime) -> Self {
        match self {
            Self::Date(_) => Self::Date(local.date()),
            Self::DateTime(dt) => Self::DateTime(dt.with_local(local)),
        }
    }

    #[must_use]
    pub fn as_datetime(&self) -> Option<&DateTime> {
        match self {
            Self::Date(_) => None,
            Self::DateTime(dt) => Some(dt),
        }
    }

    /// Compares two values as instants.
    #[must_use]
    pub fn cmp_instant(&self, other: &Self) -> Ordering {
        self.instant_key().cmp(&other.instant_key())
    }
}

impl fmt::Display for Temporal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(d) => f.write_str(&format_date(*d)),
            Self::DateTime(dt) => dt.fmt(f),
        }
    }
}

impl From<NaiveDate> for Temporal {
    fn from(date: NaiveDate) -> Self {
        Self::Date(date)
    }
}

impl From<DateTime> for Temporal {
    fn from(dt: DateTime) -> Self {
        Self::DateTime(dt)
    }
}

/// ## Summary
/// Resolves a TZID to a tz database zone.
///
/// Vendor prefixes written by common clients are stripped first.
#[must_use]
pub fn resolve_tz(tzid: &str) -> Option<Tz> {
    let stripped = tzid
        .strip_prefix("/mozilla.org/20050126_1/")
        .or_else(|| tzid.strip_prefix("/mozilla.org/"))
        .or_else(|| tzid.strip_prefix("/softwarestudio.org/Olson_20011030_5/"))
        .or_else(|| tzid.strip_prefix("/softwarestudio.org/"))
        .or_else(|| tzid.strip_prefix('/'))
        .unwrap_or(tzid);
    Tz::from_str(stripped).ok()
}

/// ## Summary
/// Converts a wall-clock reading in `tz` to UTC.
///
/// Readings inside a DST gap shift forward one hour; readings inside a fold
/// take the earlier offset.
#[must_use]
pub fn local_to_utc(local: NaiveDateTime, tz: Tz) -> Option<NaiveDateTime> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Some(dt.naive_utc()),
        LocalResult::None => {
            let shifted = local.checked_add_signed(chrono::TimeDelta::hours(1))?;
            tz.from_local_datetime(&shifted)
                .earliest()
                .map(|dt| dt.naive_utc())
        }
    }
}
