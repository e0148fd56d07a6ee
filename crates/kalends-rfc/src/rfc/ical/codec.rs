//! Value codecs (RFC 5545 §3.3).
//!
//! Each value kind has a codec converting between value text and [`Value`].
//! Codecs are looked up through [`ValueKind::codec`], a static dispatch table.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::{RfcError, RfcResult};
use crate::rfc::ical::build::{escape_text, escape_text_list};
use crate::rfc::ical::core::{DateTime, Period, TemporalKind, Value, names};
use crate::rfc::ical::parse::values::{
    parse_binary, parse_boolean, parse_date, parse_datetime, parse_duration, parse_float,
    parse_integer, parse_period, parse_rrule, parse_time, parse_utc_offset, split_text_list,
    unescape_text,
};

/// Value data types (RFC 5545 §3.3), as named by the `VALUE` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Binary,
    Boolean,
    CalAddress,
    Date,
    DateTime,
    Duration,
    Float,
    Integer,
    Period,
    Recur,
    Text,
    Time,
    Uri,
    UtcOffset,
    /// Opaque value kept verbatim (unknown and `X-` properties).
    Unknown,
}

impl ValueKind {
    /// Parses a `VALUE` parameter value (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s.to_ascii_uppercase().as_str() {
            "BINARY" => Self::Binary,
            "BOOLEAN" => Self::Boolean,
            "CAL-ADDRESS" => Self::CalAddress,
            "DATE" => Self::Date,
            "DATE-TIME" => Self::DateTime,
            "DURATION" => Self::Duration,
            "FLOAT" => Self::Float,
            "INTEGER" => Self::Integer,
            "PERIOD" => Self::Period,
            "RECUR" => Self::Recur,
            "TEXT" => Self::Text,
            "TIME" => Self::Time,
            "URI" => Self::Uri,
            "UTC-OFFSET" => Self::UtcOffset,
            _ => return None,
        })
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Binary => "BINARY",
            Self::Boolean => "BOOLEAN",
            Self::CalAddress => "CAL-ADDRESS",
            Self::Date => "DATE",
            Self::DateTime => "DATE-TIME",
            Self::Duration => "DURATION",
            Self::Float => "FLOAT",
            Self::Integer => "INTEGER",
            Self::Period => "PERIOD",
            Self::Recur => "RECUR",
            Self::Text => "TEXT",
            Self::Time => "TIME",
            Self::Uri => "URI",
            Self::UtcOffset => "UTC-OFFSET",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Returns the default value kind of a property.
    #[must_use]
    pub fn default_for(property: &str) -> Self {
        match property.to_ascii_uppercase().as_str() {
            names::DTSTART
            | names::DTEND
            | names::DTSTAMP
            | names::CREATED
            | names::LAST_MODIFIED
            | names::COMPLETED
            | names::DUE
            | names::RECURRENCE_ID
            | names::EXDATE
            | names::RDATE => Self::DateTime,
            names::DURATION | names::TRIGGER => Self::Duration,
            names::PERCENT_COMPLETE | names::PRIORITY | names::REPEAT | names::SEQUENCE => {
                Self::Integer
            }
            names::RRULE | names::EXRULE => Self::Recur,
            names::TZOFFSETFROM | names::TZOFFSETTO => Self::UtcOffset,
            names::URL
            | names::TZURL
            | names::SOURCE
            | names::ATTACH
            | names::CONFERENCE
            | names::IMAGE => Self::Uri,
            names::FREEBUSY => Self::Period,
            names::ATTENDEE | names::ORGANIZER => Self::CalAddress,
            names::CALSCALE
            | names::METHOD
            | names::PRODID
            | names::VERSION
            | names::CATEGORIES
            | names::CLASS
            | names::COMMENT
            | names::DESCRIPTION
            | names::LOCATION
            | names::RESOURCES
            | names::STATUS
            | names::SUMMARY
            | names::TRANSP
            | names::TZID
            | names::TZNAME
            | names::CONTACT
            | names::RELATED_TO
            | names::UID
            | names::ACTION
            | names::COLOR
            | names::NAME => Self::Text,
            _ => Self::Unknown,
        }
    }

    /// ## Summary
    /// Chooses the kind used to decode a property value.
    ///
    /// An explicit `VALUE` parameter wins. Otherwise the property default
    /// applies, except that an 8-digit value of a date-time property reads
    /// as a DATE and a `/`-separated RDATE reads as a PERIOD.
    #[must_use]
    pub fn resolve(property: &str, value_param: Option<&str>, raw: &str) -> Self {
        if let Some(param) = value_param {
            return Self::parse(param).unwrap_or(Self::Unknown);
        }
        let default = Self::default_for(property);
        match default {
            Self::DateTime => {
                let first = raw.split(',').next().unwrap_or(raw);
                if first.len() == 8 && first.bytes().all(|b| b.is_ascii_digit()) {
                    Self::Date
                } else if first.contains('/') && property.eq_ignore_ascii_case(names::RDATE) {
                    Self::Period
                } else {
                    Self::DateTime
                }
            }
            Self::Duration if !raw.starts_with(['P', '+', '-']) => Self::DateTime,
            other => other,
        }
    }

    /// Returns the kind naturally describing a decoded value.
    #[must_use]
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Binary(_) => Self::Binary,
            Value::Boolean(_) => Self::Boolean,
            Value::CalAddress(_) => Self::CalAddress,
            Value::Date(_) => Self::Date,
            Value::DateTime(_) => Self::DateTime,
            Value::Duration(_) => Self::Duration,
            Value::Float(_) => Self::Float,
            Value::Integer(_) => Self::Integer,
            Value::Period(_) => Self::Period,
            Value::Recur(_) => Self::Recur,
            Value::Text(_) | Value::TextList(_) => Self::Text,
            Value::Time(_) => Self::Time,
            Value::Uri(_) => Self::Uri,
            Value::UtcOffset(_) => Self::UtcOffset,
            Value::List(items) => items.first().map_or(Self::Unknown, Self::of),
            Value::Unknown(_) => Self::Unknown,
        }
    }

    /// Returns the codec for this kind.
    #[must_use]
    pub fn codec(self) -> &'static dyn ValueCodec {
        match self {
            Self::Binary => &BinaryCodec,
            Self::Boolean => &BooleanCodec,
            Self::CalAddress => &CalAddressCodec,
            Self::Date => &DateCodec,
            Self::DateTime => &DateTimeCodec,
            Self::Duration => &DurationCodec,
            Self::Float => &FloatCodec,
            Self::Integer => &IntegerCodec,
            Self::Period => &PeriodCodec,
            Self::Recur => &RecurCodec,
            Self::Text => &TextCodec,
            Self::Time => &TimeCodec,
            Self::Uri => &UriCodec,
            Self::UtcOffset => &UtcOffsetCodec,
            Self::Unknown => &UnknownCodec,
        }
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a codec needs to know about the property being decoded.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeContext<'a> {
    /// The property's TZID parameter.
    pub tzid: Option<&'a str>,
    /// Temporal kind the caller requires; a mismatch is a `TypeError`.
    pub expected: Option<TemporalKind>,
    /// Physical line for error positions.
    pub line: usize,
}

impl<'a> DecodeContext<'a> {
    #[must_use]
    pub fn with_tzid(tzid: Option<&'a str>) -> Self {
        Self {
            tzid,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn expecting(mut self, kind: TemporalKind) -> Self {
        self.expected = Some(kind);
        self
    }

    #[must_use]
    pub const fn at_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }
}

/// Bidirectional converter between value text and a typed [`Value`].
pub trait ValueCodec: Sync {
    fn kind(&self) -> ValueKind;

    /// ## Errors
    /// `SyntaxError` for malformed text, `TypeError` for a temporal-kind mismatch.
    fn decode(&self, raw: &str, ctx: &DecodeContext<'_>) -> RfcResult<Value>;

    /// ## Errors
    /// `TypeError` when the value is of another kind, `ValueError` when it is
    /// outside the kind's domain.
    fn encode(&self, value: &Value) -> RfcResult<String>;
}

fn mismatch(kind: ValueKind, value: &Value) -> RfcError {
    RfcError::TypeError(format!(
        "{kind} codec cannot encode a {} value",
        ValueKind::of(value)
    ))
}

fn check_expected(ctx: &DecodeContext<'_>, found: TemporalKind, raw: &str) -> RfcResult<()> {
    match ctx.expected {
        Some(expected) if expected != found => Err(RfcError::TypeError(format!(
            "expected {expected} value, found {found} value {raw:?}"
        ))),
        _ => Ok(()),
    }
}

struct BinaryCodec;
struct BooleanCodec;
struct CalAddressCodec;
struct DateCodec;
struct DateTimeCodec;
struct DurationCodec;
struct FloatCodec;
struct IntegerCodec;
struct PeriodCodec;
struct RecurCodec;
struct TextCodec;
struct TimeCodec;
struct UriCodec;
struct UtcOffsetCodec;
struct UnknownCodec;

impl ValueCodec for BinaryCodec {
    fn kind(&self) -> ValueKind {
        ValueKind::Binary
    }

    fn decode(&self, raw: &str, ctx: &DecodeContext<'_>) -> RfcResult<Value> {
        Ok(Value::Binary(parse_binary(raw, ctx.line, 1)?))
    }

    fn encode(&self, value: &Value) -> RfcResult<String> {
        match value {
            Value::Binary(bytes) => Ok(STANDARD.encode(bytes)),
            other => Err(mismatch(self.kind(), other)),
        }
    }
}

impl ValueCodec for BooleanCodec {
    fn kind(&self) -> ValueKind {
        ValueKind::Boolean
    }

    fn decode(&self, raw: &str, ctx: &DecodeContext<'_>) -> RfcResult<Value> {
        Ok(Value::Boolean(parse_boolean(raw, ctx.line, 1)?))
    }

    fn encode(&self, value: &Value) -> RfcResult<String> {
        match value {
            Value::Boolean(true) => Ok("TRUE".to_string()),
            Value::Boolean(false) => Ok("FALSE".to_string()),
            other => Err(mismatch(self.kind(), other)),
        }
    }
}

impl ValueCodec for CalAddressCodec {
    fn kind(&self) -> ValueKind {
        ValueKind::CalAddress
    }

    fn decode(&self, raw: &str, _ctx: &DecodeContext<'_>) -> RfcResult<Value> {
        Ok(Value::CalAddress(raw.to_string()))
    }

    fn encode(&self, value: &Value) -> RfcResult<String> {
        match value {
            Value::CalAddress(addr) | Value::Uri(addr) => {
                if addr.contains(['\r', '\n']) {
                    return Err(RfcError::ValueError(format!(
                        "CAL-ADDRESS {addr:?} contains a line break"
                    )));
                }
                Ok(addr.clone())
            }
            other => Err(mismatch(self.kind(), other)),
        }
    }
}

impl ValueCodec for DateCodec {
    fn kind(&self) -> ValueKind {
        ValueKind::Date
    }

    fn decode(&self, raw: &str, ctx: &DecodeContext<'_>) -> RfcResult<Value> {
        if raw.contains(['T', 't']) {
            return Err(RfcError::TypeError(format!(
                "expected DATE value, found DATE-TIME value {raw:?}"
            )));
        }
        check_expected(ctx, TemporalKind::Date, raw)?;
        Ok(Value::Date(parse_date(raw, ctx.line, 1)?))
    }

    fn encode(&self, value: &Value) -> RfcResult<String> {
        match value {
            Value::Date(d) => Ok(crate::rfc::ical::core::format_date(*d)),
            other => Err(mismatch(self.kind(), other)),
        }
    }
}

impl ValueCodec for DateTimeCodec {
    fn kind(&self) -> ValueKind {
        ValueKind::DateTime
    }

    fn decode(&self, raw: &str, ctx: &DecodeContext<'_>) -> RfcResult<Value> {
        if !raw.contains(['T', 't']) {
            return Err(RfcError::TypeError(format!(
                "expected DATE-TIME value, found DATE value {raw:?}"
            )));
        }
        let is_utc = raw.ends_with('Z');
        if is_utc && ctx.tzid.is_some() {
            return Err(RfcError::TypeError(format!(
                "UTC value {raw:?} must not carry a TZID"
            )));
        }
        let found = if is_utc || ctx.tzid.is_some() {
            TemporalKind::Zoned
        } else {
            TemporalKind::Local
        };
        check_expected(ctx, found, raw)?;
        Ok(Value::DateTime(parse_datetime(raw, ctx.tzid, ctx.line, 1)?))
    }

    fn encode(&self, value: &Value) -> RfcResult<String> {
        match value {
            Value::DateTime(dt) => {
                check_zoned(dt)?;
                Ok(dt.to_string())
            }
            other => Err(mismatch(self.kind(), other)),
        }
    }
}

fn check_zoned(dt: &DateTime) -> RfcResult<()> {
    match dt.tzid() {
        Some(tzid) if tzid.trim().is_empty() => {
            Err(RfcError::ValueError("zoned DATE-TIME has an empty TZID".into()))
        }
        _ => Ok(()),
    }
}

impl ValueCodec for DurationCodec {
    fn kind(&self) -> ValueKind {
        ValueKind::Duration
    }

    fn decode(&self, raw: &str, ctx: &DecodeContext<'_>) -> RfcResult<Value> {
        Ok(Value::Duration(parse_duration(raw, ctx.line, 1)?))
    }

    fn encode(&self, value: &Value) -> RfcResult<String> {
        match value {
            Value::Duration(d) => {
                if d.weeks > 0 && (d.days > 0 || d.has_time()) {
                    return Err(RfcError::ValueError(
                        "a DURATION cannot mix weeks with days or time".into(),
                    ));
                }
                Ok(d.to_string())
            }
            other => Err(mismatch(self.kind(), other)),
        }
    }
}

impl ValueCodec for FloatCodec {
    fn kind(&self) -> ValueKind {
        ValueKind::Float
    }

    fn decode(&self, raw: &str, ctx: &DecodeContext<'_>) -> RfcResult<Value> {
        Ok(Value::Float(parse_float(raw, ctx.line, 1)?))
    }

    fn encode(&self, value: &Value) -> RfcResult<String> {
        match value {
            Value::Float(f) if f.is_finite() => Ok(f.to_string()),
            Value::Float(f) => Err(RfcError::ValueError(format!("FLOAT {f} is not finite"))),
            other => Err(mismatch(self.kind(), other)),
        }
    }
}

impl ValueCodec for IntegerCodec {
    fn kind(&self) -> ValueKind {
        ValueKind::Integer
    }

    fn decode(&self, raw: &str, ctx: &DecodeContext<'_>) -> RfcResult<Value> {
        Ok(Value::Integer(parse_integer(raw, ctx.line, 1)?))
    }

    fn encode(&self, value: &Value) -> RfcResult<String> {
        match value {
            Value::Integer(n) => Ok(n.to_string()),
            other => Err(mismatch(self.kind(), other)),
        }
    }
}

impl ValueCodec for PeriodCodec {
    fn kind(&self) -> ValueKind {
        ValueKind::Period
    }

    fn decode(&self, raw: &str, ctx: &DecodeContext<'_>) -> RfcResult<Value> {
        Ok(Value::Period(parse_period(raw, ctx.tzid, ctx.line, 1)?))
    }

    fn encode(&self, value: &Value) -> RfcResult<String> {
        match value {
            Value::Period(period) => {
                if let Period::Explicit { start, end } = period
                    && end.local < start.local
                {
                    return Err(RfcError::ValueError(format!(
                        "PERIOD end {end} precedes its start {start}"
                    )));
                }
                check_zoned(period.start())?;
                Ok(period.to_string())
            }
            other => Err(mismatch(self.kind(), other)),
        }
    }
}

impl ValueCodec for RecurCodec {
    fn kind(&self) -> ValueKind {
        ValueKind::Recur
    }

    fn decode(&self, raw: &str, ctx: &DecodeContext<'_>) -> RfcResult<Value> {
        Ok(Value::Recur(Box::new(parse_rrule(raw, ctx.line, 1)?)))
    }

    fn encode(&self, value: &Value) -> RfcResult<String> {
        match value {
            Value::Recur(rule) => {
                rule.validate()
                    .map_err(|e| RfcError::ValueError(e.to_string()))?;
                Ok(rule.to_string())
            }
            other => Err(mismatch(self.kind(), other)),
        }
    }
}

impl ValueCodec for TextCodec {
    fn kind(&self) -> ValueKind {
        ValueKind::Text
    }

    fn decode(&self, raw: &str, ctx: &DecodeContext<'_>) -> RfcResult<Value> {
        Ok(Value::Text(unescape_text(raw, ctx.line, 1)?))
    }

    fn encode(&self, value: &Value) -> RfcResult<String> {
        match value {
            Value::Text(s) => Ok(escape_text(s)),
            Value::TextList(items) => Ok(escape_text_list(items)),
            other => Err(mismatch(self.kind(), other)),
        }
    }
}

impl ValueCodec for TimeCodec {
    fn kind(&self) -> ValueKind {
        ValueKind::Time
    }

    fn decode(&self, raw: &str, ctx: &DecodeContext<'_>) -> RfcResult<Value> {
        Ok(Value::Time(parse_time(raw, ctx.line, 1)?))
    }

    fn encode(&self, value: &Value) -> RfcResult<String> {
        match value {
            Value::Time(t) => Ok(t.to_string()),
            other => Err(mismatch(self.kind(), other)),
        }
    }
}

impl ValueCodec for UriCodec {
    fn kind(&self) -> ValueKind {
        ValueKind::Uri
    }

    fn decode(&self, raw: &str, _ctx: &DecodeContext<'_>) -> RfcResult<Value> {
        Ok(Value::Uri(raw.to_string()))
    }

    fn encode(&self, value: &Value) -> RfcResult<String> {
        match value {
            Value::Uri(uri) => {
                if uri.contains(['\r', '\n', ' ']) {
                    return Err(RfcError::ValueError(format!(
                        "URI {uri:?} contains whitespace"
                    )));
                }
                Ok(uri.clone())
            }
            other => Err(mismatch(self.kind(), other)),
        }
    }
}

impl ValueCodec for UtcOffsetCodec {
    fn kind(&self) -> ValueKind {
        ValueKind::UtcOffset
    }

    fn decode(&self, raw: &str, ctx: &DecodeContext<'_>) -> RfcResult<Value> {
        Ok(Value::UtcOffset(parse_utc_offset(raw, ctx.line, 1)?))
    }

    fn encode(&self, value: &Value) -> RfcResult<String> {
        match value {
            Value::UtcOffset(offset) if offset.as_seconds().abs() < 24 * 3600 => {
                Ok(offset.to_string())
            }
            Value::UtcOffset(offset) => Err(RfcError::ValueError(format!(
                "UTC-OFFSET {offset} exceeds 24 hours"
            ))),
            other => Err(mismatch(self.kind(), other)),
        }
    }
}

impl ValueCodec for UnknownCodec {
    fn kind(&self) -> ValueKind {
        ValueKind::Unknown
    }

    fn decode(&self, raw: &str, _ctx: &DecodeContext<'_>) -> RfcResult<Value> {
        Ok(Value::Unknown(raw.to_string()))
    }

    fn encode(&self, value: &Value) -> RfcResult<String> {
        match value {
            Value::Unknown(raw) => {
                if raw.contains(['\r', '\n']) {
                    return Err(RfcError::ValueError(
                        "raw value contains a line break".into(),
                    ));
                }
                Ok(raw.clone())
            }
            other => Err(mismatch(self.kind(), other)),
        }
    }
}

/// Returns whether a property carries a comma-separated list of values.
#[must_use]
pub fn is_list_property(property: &str) -> bool {
    matches!(
        property.to_ascii_uppercase().as_str(),
        names::EXDATE | names::RDATE | names::FREEBUSY | names::CATEGORIES | names::RESOURCES
    )
}

/// ## Summary
/// Decodes a property value, splitting list-valued properties.
///
/// Text lists split on unescaped commas into [`Value::TextList`]; other
/// lists split on every comma into [`Value::List`]. A single-item
/// EXDATE/RDATE/FREEBUSY value is still a one-element list.
///
/// ## Errors
/// Propagates the first codec failure.
pub fn decode_property_value(
    property: &str,
    kind: ValueKind,
    raw: &str,
    ctx: &DecodeContext<'_>,
) -> RfcResult<Value> {
    if kind == ValueKind::Unknown || !is_list_property(property) {
        return kind.codec().decode(raw, ctx);
    }
    if kind == ValueKind::Text {
        let items = split_text_list(raw)
            .into_iter()
            .map(|item| unescape_text(item, ctx.line, 1))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Value::TextList(items));
    }
    let codec = kind.codec();
    raw.split(',')
        .map(|item| codec.decode(item.trim(), ctx))
        .collect::<RfcResult<Vec<_>>>()
        .map(Value::List)
}

/// ## Summary
/// Encodes a value with the codec of `kind`, joining lists with commas.
///
/// ## Errors
/// Propagates the first codec failure; an empty list is a `ValueError`.
pub fn encode_value(kind: ValueKind, value: &Value) -> RfcResult<String> {
    let codec = kind.codec();
    match value {
        Value::List(items) if items.is_empty() => {
            Err(RfcError::ValueError("a value list cannot be empty".into()))
        }
        Value::List(items) => Ok(items
            .iter()
            .map(|item| codec.encode(item))
            .collect::<RfcResult<Vec<_>>>()?
            .join(",")),
        other => codec.encode(other),
    }
}
