//! Value type parsers for iCalendar (RFC 5545 §3.3).
//!
//! Error sources are discarded (`map_err_ignore`): every failure here is
//! reported positionally through [`ParseError`] instead.
#![expect(
    clippy::map_err_ignore,
    reason = "Value parsers report positional ParseErrors instead of the std parse errors"
)]

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{NaiveDate, NaiveTime};

use super::error::{ParseError, ParseErrorKind, ParseResult};
use crate::rfc::ical::core::{
    ByRule, DateTime, DateTimeForm, Duration, Frequency, Period, RRule, RulePart, Temporal, Time,
    UtcOffset, Weekday, WeekdayNum,
};

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Parses a DATE value (RFC 5545 §3.3.4).
///
/// Format: YYYYMMDD (e.g., "19970714")
///
/// ## Errors
/// Returns an error if the string is not a valid calendar date.
pub fn parse_date(s: &str, line: usize, col: usize) -> ParseResult<NaiveDate> {
    let err = || ParseError::new(ParseErrorKind::InvalidDate, line, col).with_context(s.to_string());
    if s.len() != 8 || !all_digits(s) {
        return Err(err());
    }

    let year = s[0..4].parse::<i32>().map_err(|_| err())?;
    let month = s[4..6].parse::<u32>().map_err(|_| err())?;
    let day = s[6..8].parse::<u32>().map_err(|_| err())?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(err)
}

/// Parses a TIME value (RFC 5545 §3.3.12).
///
/// Format: HHMMSS[Z] (e.g., "133000", "133000Z")
///
/// ## Errors
/// Returns an error if the string is not a valid 6-digit time.
pub fn parse_time(s: &str, line: usize, col: usize) -> ParseResult<Time> {
    let err = || ParseError::new(ParseErrorKind::InvalidTime, line, col).with_context(s.to_string());
    let (time_str, is_utc) = match s.strip_suffix('Z') {
        Some(stripped) => (stripped, true),
        None => (s, false),
    };

    if time_str.len() != 6 || !all_digits(time_str) {
        return Err(err());
    }

    let hour = time_str[0..2].parse::<u32>().map_err(|_| err())?;
    let minute = time_str[2..4].parse::<u32>().map_err(|_| err())?;
    let second = time_str[4..6].parse::<u32>().map_err(|_| err())?;

    let time = NaiveTime::from_hms_opt(hour, minute, second).ok_or_else(err)?;
    Ok(Time { time, is_utc })
}

/// Parses a DATE-TIME value (RFC 5545 §3.3.5).
///
/// Format: YYYYMMDD"T"HHMMSS[Z] (e.g., "19970714T133000Z")
///
/// TZID comes from the property's parameters, not from the value itself.
///
/// ## Errors
/// Returns an error if the string is not a valid date-time.
pub fn parse_datetime(
    s: &str,
    tzid: Option<&str>,
    line: usize,
    col: usize,
) -> ParseResult<DateTime> {
    let t_pos = s.find(['T', 't']).ok_or_else(|| {
        ParseError::new(ParseErrorKind::InvalidDateTime, line, col).with_context(s.to_string())
    })?;

    let date = parse_date(&s[..t_pos], line, col)?;
    let time = parse_time(&s[t_pos + 1..], line, col + t_pos + 1)?;

    let form = if time.is_utc {
        DateTimeForm::Utc
    } else if let Some(tz) = tzid {
        DateTimeForm::Zoned {
            tzid: tz.to_string(),
        }
    } else {
        DateTimeForm::Floating
    };

    Ok(DateTime {
        local: date.and_time(time.time),
        form,
    })
}

/// Parses a UTC-OFFSET value (RFC 5545 §3.3.14).
///
/// Format: (+|-)HHMM[SS] (e.g., "+0530", "-0800")
///
/// ## Errors
/// Returns an error if the string is not a valid UTC offset.
pub fn parse_utc_offset(s: &str, line: usize, col: usize) -> ParseResult<UtcOffset> {
    let err = || ParseError::new(ParseErrorKind::InvalidUtcOffset, line, col);
    let (sign, digits) = match s.split_at_checked(1) {
        Some(("+", rest)) => (1, rest),
        Some(("-", rest)) => (-1, rest),
        _ => return Err(err()),
    };
    if !(digits.len() == 4 || digits.len() == 6) || !all_digits(digits) {
        return Err(err());
    }

    let hours = digits[0..2].parse::<i32>().map_err(|_| err())?;
    let minutes = digits[2..4].parse::<i32>().map_err(|_| err())?;
    let seconds = if digits.len() == 6 {
        digits[4..6].parse::<i32>().map_err(|_| err())?
    } else {
        0
    };
    if hours > 23 || minutes > 59 || seconds > 59 {
        return Err(err());
    }
    // -0000 is not a valid offset
    if sign < 0 && hours == 0 && minutes == 0 && seconds == 0 {
        return Err(err());
    }

    Ok(UtcOffset::from_seconds(
        sign * (hours * 3600 + minutes * 60 + seconds),
    ))
}

/// Parses a DURATION value (RFC 5545 §3.3.6).
///
/// Format: [+|-]P[nW] or [+|-]P[nD][T[nH][nM][nS]]
///
/// ## Errors
/// Returns an error if the string is not a valid duration.
pub fn parse_duration(s: &str, line: usize, col: usize) -> ParseResult<Duration> {
    let err = || ParseError::new(ParseErrorKind::InvalidDuration, line, col).with_context(s.to_string());
    let mut dur = Duration::zero();

    let body = if let Some(rest) = s.strip_prefix('-') {
        dur.negative = true;
        rest
    } else {
        s.strip_prefix('+').unwrap_or(s)
    };
    let body = body.strip_prefix('P').ok_or_else(err)?;
    if body.is_empty() {
        return Err(err());
    }

    if let Some(weeks) = body.strip_suffix('W') {
        if !all_digits(weeks) {
            return Err(err());
        }
        dur.weeks = weeks.parse().map_err(|_| err())?;
        return Ok(dur);
    }

    let (date_part, time_part) = match body.split_once('T') {
        Some((d, t)) if !t.is_empty() => (d, Some(t)),
        Some(_) => return Err(err()),
        None => (body, None),
    };

    if !date_part.is_empty() {
        let days = date_part.strip_suffix('D').ok_or_else(err)?;
        if !all_digits(days) {
            return Err(err());
        }
        dur.days = days.parse().map_err(|_| err())?;
    }

    if let Some(mut rest) = time_part {
        // Designators must appear in H, M, S order
        let mut last = 0;
        while !rest.is_empty() {
            let pos = rest.find(['H', 'M', 'S']).ok_or_else(err)?;
            let num = &rest[..pos];
            if !all_digits(num) {
                return Err(err());
            }
            let n: u32 = num.parse().map_err(|_| err())?;
            let (rank, slot) = match &rest[pos..=pos] {
                "H" => (1, &mut dur.hours),
                "M" => (2, &mut dur.minutes),
                _ => (3, &mut dur.seconds),
            };
            if rank <= last {
                return Err(err());
            }
            last = rank;
            *slot = n;
            rest = &rest[pos + 1..];
        }
    }

    Ok(dur)
}

/// Parses a PERIOD value (RFC 5545 §3.3.9).
///
/// Format: start"/"end or start"/"duration
///
/// ## Errors
/// Returns an error if the string is not a valid period.
pub fn parse_period(s: &str, tzid: Option<&str>, line: usize, col: usize) -> ParseResult<Period> {
    let (start_str, end_str) = s
        .split_once('/')
        .ok_or_else(|| ParseError::new(ParseErrorKind::InvalidPeriod, line, col))?;

    let start = parse_datetime(start_str, tzid, line, col)?;
    let end_col = col + start_str.len() + 1;

    if end_str.starts_with(['P', '+', '-']) {
        let duration = parse_duration(end_str, line, end_col)?;
        Ok(Period::Duration { start, duration })
    } else {
        let end = parse_datetime(end_str, tzid, line, end_col)?;
        Ok(Period::Explicit { start, end })
    }
}

/// Parses a RECUR value (RFC 5545 §3.3.10), keeping parts in declaration order.
///
/// Numeric domains and frequency compatibility are not checked here; see
/// [`RRule::validate`].
///
/// ## Errors
/// Returns an error on malformed parts, a missing or repeated part, or
/// UNTIL combined with COUNT.
pub fn parse_rrule(s: &str, line: usize, col: usize) -> ParseResult<RRule> {
    let err = |ctx: String| ParseError::new(ParseErrorKind::InvalidRRule, line, col).with_context(ctx);
    let mut freq = None;
    let mut parts: Vec<RulePart> = Vec::new();
    let mut seen: Vec<String> = Vec::new();

    for part in s.split(';') {
        let (key, value) = part
            .split_once('=')
            .ok_or_else(|| err(format!("rule part {part:?} lacks '='")))?;
        let key = key.to_ascii_uppercase();
        if seen.contains(&key) {
            return Err(err(format!("{key} appears more than once")));
        }

        let parsed = match key.as_str() {
            "FREQ" => {
                freq = Some(Frequency::parse(value).ok_or_else(|| {
                    ParseError::new(ParseErrorKind::InvalidFrequency, line, col)
                        .with_context(value.to_string())
                })?);
                RulePart::Freq
            }
            "INTERVAL" => RulePart::Interval(parse_number(value, line, col)?),
            "COUNT" => {
                if seen.iter().any(|k| k == "UNTIL") {
                    return Err(ParseError::new(ParseErrorKind::UntilCountConflict, line, col));
                }
                RulePart::Count(parse_number(value, line, col)?)
            }
            "UNTIL" => {
                if seen.iter().any(|k| k == "COUNT") {
                    return Err(ParseError::new(ParseErrorKind::UntilCountConflict, line, col));
                }
                RulePart::Until(if value.contains(['T', 't']) {
                    Temporal::DateTime(parse_datetime(value, None, line, col)?)
                } else {
                    Temporal::Date(parse_date(value, line, col)?)
                })
            }
            "WKST" => RulePart::WeekStart(Weekday::parse(value).ok_or_else(|| {
                ParseError::new(ParseErrorKind::InvalidWeekday, line, col)
                    .with_context(value.to_string())
            })?),
            "BYSECOND" => RulePart::By(ByRule::Second(parse_list(value, line, col)?)),
            "BYMINUTE" => RulePart::By(ByRule::Minute(parse_list(value, line, col)?)),
            "BYHOUR" => RulePart::By(ByRule::Hour(parse_list(value, line, col)?)),
            "BYDAY" => RulePart::By(ByRule::Day(parse_byday(value, line, col)?)),
            "BYMONTHDAY" => RulePart::By(ByRule::MonthDay(parse_list(value, line, col)?)),
            "BYYEARDAY" => RulePart::By(ByRule::YearDay(parse_list(value, line, col)?)),
            "BYWEEKNO" => RulePart::By(ByRule::WeekNo(parse_list(value, line, col)?)),
            "BYMONTH" => RulePart::By(ByRule::Month(parse_list(value, line, col)?)),
            "BYSETPOS" => RulePart::By(ByRule::SetPos(parse_list(value, line, col)?)),
            _ if key.starts_with("X-") => RulePart::Extension {
                name: key.clone(),
                value: value.to_string(),
            },
            _ => return Err(err(format!("unknown rule part {key}"))),
        };
        parts.push(parsed);
        seen.push(key);
    }

    let freq = freq.ok_or_else(|| err("FREQ is required".to_string()))?;
    Ok(RRule::from_parts(freq, parts))
}

fn parse_number<T: std::str::FromStr>(s: &str, line: usize, col: usize) -> ParseResult<T> {
    s.parse()
        .map_err(|_| ParseError::new(ParseErrorKind::InvalidRRule, line, col).with_context(s.to_string()))
}

/// Parses a comma-separated list of integers.
fn parse_list<T: std::str::FromStr>(s: &str, line: usize, col: usize) -> ParseResult<Vec<T>> {
    s.split(',').map(|v| parse_number(v.trim(), line, col)).collect()
}

/// Parses a BYDAY value (weekdays with optional ordinals).
fn parse_byday(s: &str, line: usize, col: usize) -> ParseResult<Vec<WeekdayNum>> {
    s.split(',')
        .map(|v| parse_weekday_num(v.trim(), line, col))
        .collect()
}

/// Parses a single weekday with optional ordinal (e.g., "MO", "1MO", "-1FR").
fn parse_weekday_num(s: &str, line: usize, col: usize) -> ParseResult<WeekdayNum> {
    let err = || ParseError::new(ParseErrorKind::InvalidWeekday, line, col).with_context(s.to_string());
    let split = s.len().checked_sub(2).ok_or_else(err)?;
    let (ordinal_str, weekday_str) = s.split_at_checked(split).ok_or_else(err)?;

    let weekday = Weekday::parse(weekday_str).ok_or_else(err)?;
    let ordinal = if ordinal_str.is_empty() {
        None
    } else {
        Some(parse_number(ordinal_str, line, col)?)
    };

    Ok(WeekdayNum { ordinal, weekday })
}

/// Unescapes a TEXT value (RFC 5545 §3.3.11).
///
/// Escape sequences: `\\` `\,` `\;` `\n` `\N`
///
/// ## Errors
/// Returns [`ParseErrorKind::InvalidEscape`] for any other backslash sequence,
/// including a trailing lone backslash.
pub fn unescape_text(s: &str, line: usize, col: usize) -> ParseResult<String> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.char_indices();

    while let Some((i, c)) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some((_, 'n' | 'N')) => result.push('\n'),
            Some((_, ',')) => result.push(','),
            Some((_, ';')) => result.push(';'),
            Some((_, '\\')) => result.push('\\'),
            other => {
                let found = other.map_or_else(|| "end of value".to_string(), |(_, c)| format!("'{c}'"));
                return Err(
                    ParseError::new(ParseErrorKind::InvalidEscape, line, col + i)
                        .with_context(format!("backslash followed by {found}")),
                );
            }
        }
    }

    Ok(result)
}

/// Splits a TEXT list on commas that are not escaped.
#[must_use]
pub fn split_text_list(s: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            ',' => {
                items.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    items.push(&s[start..]);
    items
}

/// Parses a BOOLEAN value (RFC 5545 §3.3.2).
///
/// ## Errors
/// Returns an error if the string is not "TRUE" or "FALSE".
pub fn parse_boolean(s: &str, line: usize, col: usize) -> ParseResult<bool> {
    match s.to_ascii_uppercase().as_str() {
        "TRUE" => Ok(true),
        "FALSE" => Ok(false),
        _ => Err(ParseError::new(ParseErrorKind::InvalidBoolean, line, col)),
    }
}

/// Parses an INTEGER value (RFC 5545 §3.3.8).
///
/// ## Errors
/// Returns an error if the string is not a valid integer.
pub fn parse_integer(s: &str, line: usize, col: usize) -> ParseResult<i32> {
    s.parse()
        .map_err(|_| ParseError::new(ParseErrorKind::InvalidInteger, line, col))
}

/// Parses a FLOAT value (RFC 5545 §3.3.7).
///
/// ## Errors
/// Returns an error if the string is not a plain decimal number.
pub fn parse_float(s: &str, line: usize, col: usize) -> ParseResult<f64> {
    let err = || ParseError::new(ParseErrorKind::InvalidFloat, line, col);
    let unsigned = s.strip_prefix(['+', '-']).unwrap_or(s);
    let plain = !unsigned.is_empty()
        && unsigned.bytes().all(|b| b.is_ascii_digit() || b == b'.')
        && unsigned.bytes().filter(|&b| b == b'.').count() <= 1;
    if !plain {
        return Err(err());
    }
    s.parse().map_err(|_| err())
}

/// Parses a BINARY value (RFC 5545 §3.3.1), base64 encoded.
///
/// ## Errors
/// Returns an error if the string is not valid base64.
pub fn parse_binary(s: &str, line: usize, col: usize) -> ParseResult<Vec<u8>> {
    STANDARD
        .decode(s)
        .map_err(|e| ParseError::new(ParseErrorKind::InvalidBinary, line, col).with_context(e.to_string()))
}
