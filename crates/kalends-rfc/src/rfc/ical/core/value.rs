//! iCalendar PERIOD value type and the typed property value (RFC 5545 §3.3).

use std::fmt;

use chrono::NaiveDate;

use super::{DateTime, Duration, RRule, Temporal, Time, UtcOffset};

/// PERIOD value (RFC 5545 §3.3.9).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Period {
    Explicit { start: DateTime, end: DateTime },
    Duration { start: DateTime, duration: Duration },
}

impl Period {
    /// Returns the start of the period.
    #[must_use]
    pub fn start(&self) -> &DateTime {
        match self {
            Self::Explicit { start, .. } | Self::Duration { start, .. } => start,
        }
    }

    /// Returns the end of the period, computing it for the duration form.
    /// `None` when that end is out of range.
    #[must_use]
    pub fn end(&self) -> Option<DateTime> {
        match self {
            Self::Explicit { end, .. } => Some(end.clone()),
            Self::Duration { start, duration } => {
                duration.after(start.local).map(|local| start.with_local(local))
            }
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit { start, end } => write!(f, "{start}/{end}"),
            Self::Duration { start, duration } => write!(f, "{start}/{duration}"),
        }
    }
}

/// A decoded property value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// BINARY value, decoded from base64.
    Binary(Vec<u8>),
    Boolean(bool),
    /// CAL-ADDRESS value (typically a `mailto:` URI).
    CalAddress(String),
    Date(NaiveDate),
    DateTime(DateTime),
    Duration(Duration),
    Float(f64),
    Integer(i32),
    Period(Period),
    Recur(Box<RRule>),
    /// TEXT value (unescaped).
    Text(String),
    /// Comma-separated TEXT values (CATEGORIES, RESOURCES).
    TextList(Vec<String>),
    Time(Time),
    Uri(String),
    UtcOffset(UtcOffset),
    /// Comma-separated non-text values (EXDATE, RDATE, FREEBUSY).
    List(Vec<Value>),
    /// Value that could not be decoded; kept verbatim.
    Unknown(String),
}

impl Value {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::CalAddress(s) | Self::Uri(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_integer(&self) -> Option<i32> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_duration(&self) -> Option<&Duration> {
        match self {
            Self::Duration(d) => Some(d),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_recur(&self) -> Option<&RRule> {
        match self {
            Self::Recur(rule) => Some(rule),
            _ => None,
        }
    }

    /// Returns a DATE or DATE-TIME value as a [`Temporal`].
    #[must_use]
    pub fn as_temporal(&self) -> Option<Temporal> {
        match self {
            Self::Date(d) => Some(Temporal::Date(*d)),
            Self::DateTime(dt) => Some(Temporal::DateTime(dt.clone())),
            Self::List(values) if values.len() == 1 => values[0].as_temporal(),
            _ => None,
        }
    }

    /// Returns every DATE, DATE-TIME, or PERIOD start in a (possibly list) value.
    #[must_use]
    pub fn temporals(&self) -> Vec<Temporal> {
        match self {
            Self::List(values) => values.iter().flat_map(Self::temporals).collect(),
            Self::Period(p) => vec![Temporal::DateTime(p.start().clone())],
            other => other.as_temporal().into_iter().collect(),
        }
    }

    #[must_use]
    pub fn as_text_list(&self) -> Option<&[String]> {
        match self {
            Self::TextList(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown(_))
    }
}

impl From<Temporal> for Value {
    fn from(t: Temporal) -> Self {
        match t {
            Temporal::Date(d) => Self::Date(d),
            Temporal::DateTime(dt) => Self::DateTime(dt),
        }
    }
}

impl From<RRule> for Value {
    fn from(rule: RRule) -> Self {
        Self::Recur(Box::new(rule))
    }
}
