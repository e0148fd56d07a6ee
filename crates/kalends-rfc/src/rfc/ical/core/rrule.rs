//! iCalendar RECUR value type (RFC 5545 §3.3.10, §3.8.5.3).
//!
//! Rule parts are kept in declaration order so a parsed rule serializes back
//! to the text it came from.

use std::fmt;

use super::{Temporal, TemporalKind};
use crate::error::{RfcError, RfcResult};

/// Recurrence frequency (RFC 5545 §3.3.10).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Frequency {
    Secondly,
    Minutely,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Secondly => "SECONDLY",
            Self::Minutely => "MINUTELY",
            Self::Hourly => "HOURLY",
            Self::Daily => "DAILY",
            Self::Weekly => "WEEKLY",
            Self::Monthly => "MONTHLY",
            Self::Yearly => "YEARLY",
        }
    }

    /// Parses a frequency from a string (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s.to_ascii_uppercase().as_str() {
            "SECONDLY" => Self::Secondly,
            "MINUTELY" => Self::Minutely,
            "HOURLY" => Self::Hourly,
            "DAILY" => Self::Daily,
            "WEEKLY" => Self::Weekly,
            "MONTHLY" => Self::Monthly,
            "YEARLY" => Self::Yearly,
            _ => return None,
        })
    }

    /// Returns whether this frequency steps by less than a day.
    #[must_use]
    pub const fn is_sub_daily(self) -> bool {
        matches!(self, Self::Secondly | Self::Minutely | Self::Hourly)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Weekday {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    /// Returns the two-letter abbreviation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sunday => "SU",
            Self::Monday => "MO",
            Self::Tuesday => "TU",
            Self::Wednesday => "WE",
            Self::Thursday => "TH",
            Self::Friday => "FR",
            Self::Saturday => "SA",
        }
    }

    /// Parses a two-letter weekday abbreviation (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s.to_ascii_uppercase().as_str() {
            "SU" => Self::Sunday,
            "MO" => Self::Monday,
            "TU" => Self::Tuesday,
            "WE" => Self::Wednesday,
            "TH" => Self::Thursday,
            "FR" => Self::Friday,
            "SA" => Self::Saturday,
            _ => return None,
        })
    }

    #[must_use]
    pub const fn to_chrono(self) -> chrono::Weekday {
        match self {
            Self::Sunday => chrono::Weekday::Sun,
            Self::Monday => chrono::Weekday::Mon,
            Self::Tuesday => chrono::Weekday::Tue,
            Self::Wednesday => chrono::Weekday::Wed,
            Self::Thursday => chrono::Weekday::Thu,
            Self::Friday => chrono::Weekday::Fri,
            Self::Saturday => chrono::Weekday::Sat,
        }
    }

    #[must_use]
    pub const fn from_chrono(weekday: chrono::Weekday) -> Self {
        match weekday {
            chrono::Weekday::Sun => Self::Sunday,
            chrono::Weekday::Mon => Self::Monday,
            chrono::Weekday::Tue => Self::Tuesday,
            chrono::Weekday::Wed => Self::Wednesday,
            chrono::Weekday::Thu => Self::Thursday,
            chrono::Weekday::Fri => Self::Friday,
            chrono::Weekday::Sat => Self::Saturday,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A BYDAY entry: a weekday with an optional ordinal (e.g., `-1SU`, `2MO`, `FR`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeekdayNum {
    pub ordinal: Option<i8>,
    pub weekday: Weekday,
}

impl WeekdayNum {
    #[must_use]
    pub const fn every(weekday: Weekday) -> Self {
        Self {
            ordinal: None,
            weekday,
        }
    }

    #[must_use]
    pub const fn nth(ordinal: i8, weekday: Weekday) -> Self {
        Self {
            ordinal: Some(ordinal),
            weekday,
        }
    }
}

impl fmt::Display for WeekdayNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(n) = self.ordinal {
            write!(f, "{n}")?;
        }
        f.write_str(self.weekday.as_str())
    }
}

/// A BYxxx rule part with its values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ByRule {
    Month(Vec<u8>),
    WeekNo(Vec<i8>),
    YearDay(Vec<i16>),
    MonthDay(Vec<i8>),
    Day(Vec<WeekdayNum>),
    Hour(Vec<u8>),
    Minute(Vec<u8>),
    Second(Vec<u8>),
    SetPos(Vec<i16>),
}

impl ByRule {
    /// Returns the rule part name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Month(_) => "BYMONTH",
            Self::WeekNo(_) => "BYWEEKNO",
            Self::YearDay(_) => "BYYEARDAY",
            Self::MonthDay(_) => "BYMONTHDAY",
            Self::Day(_) => "BYDAY",
            Self::Hour(_) => "BYHOUR",
            Self::Minute(_) => "BYMINUTE",
            Self::Second(_) => "BYSECOND",
            Self::SetPos(_) => "BYSETPOS",
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            Self::Month(v) | Self::Hour(v) | Self::Minute(v) | Self::Second(v) => v.is_empty(),
            Self::WeekNo(v) | Self::MonthDay(v) => v.is_empty(),
            Self::YearDay(v) | Self::SetPos(v) => v.is_empty(),
            Self::Day(v) => v.is_empty(),
        }
    }

    /// Checks every value against the part's numeric domain.
    fn check_domain(&self) -> RfcResult<()> {
        fn signed(name: &str, values: impl IntoIterator<Item = i16>, max: i16) -> RfcResult<()> {
            for v in values {
                if v == 0 || !(-max..=max).contains(&v) {
                    return Err(RfcError::RuleError(format!(
                        "{name} value {v} is outside ±1..{max}"
                    )));
                }
            }
            Ok(())
        }
        fn unsigned(
            name: &str,
            values: &[u8],
            range: std::ops::RangeInclusive<u8>,
        ) -> RfcResult<()> {
            if let Some(v) = values.iter().find(|&&v| !range.contains(&v)) {
                return Err(RfcError::RuleError(format!(
                    "{name} value {v} is outside {}..{}",
                    range.start(),
                    range.end()
                )));
            }
            Ok(())
        }

        if self.is_empty() {
            return Err(RfcError::RuleError(format!("{} has no values", self.name())));
        }
        match self {
            Self::Month(v) => unsigned("BYMONTH", v, 1..=12),
            Self::WeekNo(v) => signed("BYWEEKNO", v.iter().map(|&x| i16::from(x)), 53),
            Self::YearDay(v) => signed("BYYEARDAY", v.iter().copied(), 366),
            Self::MonthDay(v) => signed("BYMONTHDAY", v.iter().map(|&x| i16::from(x)), 31),
            Self::Day(v) => signed(
                "BYDAY ordinal",
                v.iter().filter_map(|d| d.ordinal).map(i16::from),
                53,
            ),
            Self::Hour(v) => unsigned("BYHOUR", v, 0..=23),
            Self::Minute(v) => unsigned("BYMINUTE", v, 0..=59),
            Self::Second(v) => unsigned("BYSECOND", v, 0..=60),
            Self::SetPos(v) => signed("BYSETPOS", v.iter().copied(), 366),
        }
    }
}

fn join<T: fmt::Display>(f: &mut fmt::Formatter<'_>, values: &[T]) -> fmt::Result {
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        write!(f, "{v}")?;
    }
    Ok(())
}

impl fmt::Display for ByRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=", self.name())?;
        match self {
            Self::Month(v) | Self::Hour(v) | Self::Minute(v) | Self::Second(v) => join(f, v),
            Self::WeekNo(v) | Self::MonthDay(v) => join(f, v),
            Self::YearDay(v) | Self::SetPos(v) => join(f, v),
            Self::Day(v) => join(f, v),
        }
    }
}

/// One `NAME=VALUE` part of a RECUR value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RulePart {
    /// Position of `FREQ`; the frequency itself lives on [`RRule`].
    Freq,
    Interval(u32),
    Count(u32),
    Until(Temporal),
    WeekStart(Weekday),
    By(ByRule),
    /// Unrecognized `X-` parts, kept verbatim.
    Extension { name: String, value: String },
}

impl RulePart {
    fn same_slot(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::By(a), Self::By(b)) => a.name() == b.name(),
            (Self::Extension { name: a, .. }, Self::Extension { name: b, .. }) => a == b,
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

/// Recurrence rule (RFC 5545 §3.3.10).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RRule {
    freq: Frequency,
    parts: Vec<RulePart>,
}

macro_rules! by_accessor {
    ($fn_name:ident, $variant:ident, $ty:ty) => {
        #[must_use]
        pub fn $fn_name(&self) -> &[$ty] {
            self.parts
                .iter()
                .find_map(|p| match p {
                    RulePart::By(ByRule::$variant(v)) => Some(v.as_slice()),
                    _ => None,
                })
                .unwrap_or(&[])
        }
    };
}

impl RRule {
    /// Creates a rule with only a frequency.
    #[must_use]
    pub fn new(freq: Frequency) -> Self {
        Self {
            freq,
            parts: vec![RulePart::Freq],
        }
    }

    /// Builds a rule from parts already in declaration order.
    ///
    /// `parts` must contain [`RulePart::Freq`] exactly once.
    pub(crate) fn from_parts(freq: Frequency, parts: Vec<RulePart>) -> Self {
        Self { freq, parts }
    }

    #[must_use]
    pub const fn freq(&self) -> Frequency {
        self.freq
    }

    #[must_use]
    pub fn parts(&self) -> &[RulePart] {
        &self.parts
    }

    /// Returns INTERVAL, defaulting to 1.
    #[must_use]
    pub fn interval(&self) -> u32 {
        self.parts
            .iter()
            .find_map(|p| match p {
                RulePart::Interval(n) => Some(*n),
                _ => None,
            })
            .unwrap_or(1)
    }

    #[must_use]
    pub fn count(&self) -> Option<u32> {
        self.parts.iter().find_map(|p| match p {
            RulePart::Count(n) => Some(*n),
            _ => None,
        })
    }

    #[must_use]
    pub fn until(&self) -> Option<&Temporal> {
        self.parts.iter().find_map(|p| match p {
            RulePart::Until(t) => Some(t),
            _ => None,
        })
    }

    /// Returns WKST, defaulting to Monday.
    #[must_use]
    pub fn week_start(&self) -> Weekday {
        self.parts
            .iter()
            .find_map(|p| match p {
                RulePart::WeekStart(w) => Some(*w),
                _ => None,
            })
            .unwrap_or(Weekday::Monday)
    }

    /// Returns the BYxxx parts in declaration order.
    pub fn by_rules(&self) -> impl Iterator<Item = &ByRule> {
        self.parts.iter().filter_map(|p| match p {
            RulePart::By(rule) => Some(rule),
            _ => None,
        })
    }

    by_accessor!(by_month, Month, u8);
    by_accessor!(by_week_no, WeekNo, i8);
    by_accessor!(by_year_day, YearDay, i16);
    by_accessor!(by_month_day, MonthDay, i8);
    by_accessor!(by_day, Day, WeekdayNum);
    by_accessor!(by_hour, Hour, u8);
    by_accessor!(by_minute, Minute, u8);
    by_accessor!(by_second, Second, u8);
    by_accessor!(by_set_pos, SetPos, i16);

    /// Sets a part, replacing an existing part of the same name in place.
    #[must_use]
    pub fn with_part(mut self, part: RulePart) -> Self {
        if matches!(part, RulePart::Freq) {
            return self;
        }
        if let Some(slot) = self.parts.iter_mut().find(|p| p.same_slot(&part)) {
            *slot = part;
        } else {
            self.parts.push(part);
        }
        self
    }

    #[must_use]
    pub fn with_interval(self, interval: u32) -> Self {
        self.with_part(RulePart::Interval(interval))
    }

    #[must_use]
    pub fn with_count(self, count: u32) -> Self {
        self.with_part(RulePart::Count(count))
    }

    #[must_use]
    pub fn with_until(self, until: Temporal) -> Self {
        self.with_part(RulePart::Until(until))
    }

    #[must_use]
    pub fn with_by(self, rule: ByRule) -> Self {
        self.with_part(RulePart::By(rule))
    }

    /// ## Summary
    /// Checks rule-part domains and frequency compatibility.
    ///
    /// ## Errors
    /// Returns `RfcError::RuleError` for the first violated constraint.
    pub fn validate(&self) -> RfcResult<()> {
        if self.interval() == 0 {
            return Err(RfcError::RuleError("INTERVAL must be at least 1".into()));
        }
        if self.count() == Some(0) {
            return Err(RfcError::RuleError("COUNT must be at least 1".into()));
        }
        if self.count().is_some() && self.until().is_some() {
            return Err(RfcError::RuleError(
                "UNTIL and COUNT are mutually exclusive".into(),
            ));
        }

        let mut seen_set_pos = false;
        let mut other_by = false;
        for rule in self.by_rules() {
            rule.check_domain()?;
            match rule {
                ByRule::SetPos(_) => seen_set_pos = true,
                _ => other_by = true,
            }
        }
        if seen_set_pos && !other_by {
            return Err(RfcError::RuleError(
                "BYSETPOS requires another BYxxx rule part".into(),
            ));
        }

        let freq = self.freq;
        if !self.by_week_no().is_empty() && freq != Frequency::Yearly {
            return Err(incompatible("BYWEEKNO", freq));
        }
        if !self.by_year_day().is_empty()
            && matches!(
                freq,
                Frequency::Daily | Frequency::Weekly | Frequency::Monthly
            )
        {
            return Err(incompatible("BYYEARDAY", freq));
        }
        if !self.by_month_day().is_empty() && freq == Frequency::Weekly {
            return Err(incompatible("BYMONTHDAY", freq));
        }
        if self.by_day().iter().any(|d| d.ordinal.is_some()) {
            if !matches!(freq, Frequency::Monthly | Frequency::Yearly) {
                return Err(incompatible("BYDAY with an ordinal", freq));
            }
            if !self.by_week_no().is_empty() {
                return Err(RfcError::RuleError(
                    "BYDAY ordinals cannot be combined with BYWEEKNO".into(),
                ));
            }
        }
        Ok(())
    }

    /// ## Summary
    /// Checks the rule against the DTSTART it recurs from.
    ///
    /// ## Errors
    /// Returns `RfcError::RuleError` when the rule is invalid or sub-daily over a
    /// DATE start, and `RfcError::TypeError` when UNTIL's kind conflicts with
    /// the start's kind.
    pub fn validate_for_start(&self, start: &Temporal) -> RfcResult<()> {
        self.validate()?;
        if start.kind() == TemporalKind::Date && self.freq.is_sub_daily() {
            return Err(RfcError::RuleError(format!(
                "FREQ={} requires a DATE-TIME start, got DATE {start}",
                self.freq
            )));
        }
        if let Some(until) = self.until() {
            let compatible = match (start.kind(), until.kind()) {
                (TemporalKind::Date, TemporalKind::Date)
                | (TemporalKind::Local, TemporalKind::Local) => true,
                (TemporalKind::Zoned, TemporalKind::Zoned) => {
                    until.as_datetime().is_some_and(super::DateTime::is_utc)
                }
                _ => false,
            };
            if !compatible {
                return Err(RfcError::TypeError(format!(
                    "UNTIL value type ({until}, {}) must match DTSTART value type ({start}, {})",
                    until.kind(),
                    start.kind()
                )));
            }
        }
        Ok(())
    }
}

fn incompatible(part: &str, freq: Frequency) -> RfcError {
    RfcError::RuleError(format!("{part} is not allowed with FREQ={freq}"))
}

impl fmt::Display for RRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            match part {
                RulePart::Freq => write!(f, "FREQ={}", self.freq)?,
                RulePart::Interval(n) => write!(f, "INTERVAL={n}")?,
                RulePart::Count(n) => write!(f, "COUNT={n}")?,
                RulePart::Until(t) => write!(f, "UNTIL={t}")?,
                RulePart::WeekStart(w) => write!(f, "WKST={w}")?,
                RulePart::By(rule) => write!(f, "{rule}")?,
                RulePart::Extension { name, value } => write!(f, "{name}={value}")?,
            }
        }
        Ok(())
    }
}

impl std::str::FromStr for RRule {
    type Err = RfcError;

    /// ## Summary
    /// Parses RECUR text such as `FREQ=WEEKLY;BYDAY=MO` and validates it.
    ///
    /// ## Errors
    /// Returns `RfcError::SyntaxError` for malformed text and
    /// `RfcError::RuleError` for a part outside its domain.
    fn from_str(s: &str) -> RfcResult<Self> {
        let rule = crate::rfc::ical::parse::values::parse_rrule(s, 1, 1)?;
        rule.validate()?;
        Ok(rule)
    }
}
