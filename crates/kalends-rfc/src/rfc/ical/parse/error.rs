//! Positioned errors raised while reading iCalendar text.

use std::fmt;

use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

/// ## Summary
/// A parse failure with its 1-based position.
///
/// `line` is the physical line where the logical content line began, so a
/// problem in a folded continuation reports the first segment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at line {line}, column {column}{}", suffix(.context))]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub line: usize,
    pub column: usize,
    pub context: Option<String>,
}

fn suffix(context: &Option<String>) -> String {
    context
        .as_deref()
        .map(|ctx| format!(": {ctx}"))
        .unwrap_or_default()
}

impl ParseError {
    #[must_use]
    pub fn new(kind: ParseErrorKind, line: usize, column: usize) -> Self {
        Self {
            kind,
            line,
            column,
            context: None,
        }
    }

    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Returns whether the whole document is rejected rather than one line.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        self.kind.is_structural()
    }
}

/// What went wrong, grouped by the layer that noticed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    // Content line grammar
    MissingPropertyName,
    InvalidPropertyName,
    MissingColon,
    InvalidParameter,
    UnclosedQuote,

    // Value text
    InvalidEscape,
    InvalidDate,
    InvalidTime,
    InvalidDateTime,
    InvalidDuration,
    InvalidUtcOffset,
    InvalidPeriod,
    InvalidBoolean,
    InvalidInteger,
    InvalidFloat,
    InvalidBinary,

    // RECUR text
    InvalidRRule,
    InvalidFrequency,
    InvalidWeekday,
    UntilCountConflict,

    // Component nesting
    MissingBegin,
    MissingEnd,
    MismatchedComponent,
}

impl ParseErrorKind {
    /// Unbalanced quotes and broken BEGIN/END nesting cannot be skipped
    /// line by line.
    #[must_use]
    pub const fn is_structural(self) -> bool {
        matches!(
            self,
            Self::UnclosedQuote | Self::MissingBegin | Self::MissingEnd | Self::MismatchedComponent
        )
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::MissingPropertyName => "content line has no property name",
            Self::InvalidPropertyName => "property name has characters outside A-Z, 0-9 and '-'",
            Self::MissingColon => "content line has no ':' before its value",
            Self::InvalidParameter => "parameter is not NAME=VALUE",
            Self::UnclosedQuote => "quoted parameter value is not closed",
            Self::InvalidEscape => "TEXT value has an unknown backslash escape",
            Self::InvalidDate => "DATE is not YYYYMMDD",
            Self::InvalidTime => "TIME is not HHMMSS[Z]",
            Self::InvalidDateTime => "DATE-TIME is not YYYYMMDDTHHMMSS[Z]",
            Self::InvalidDuration => "DURATION is malformed",
            Self::InvalidUtcOffset => "UTC-OFFSET is not +HHMM[SS]",
            Self::InvalidPeriod => "PERIOD is not start/end or start/duration",
            Self::InvalidBoolean => "BOOLEAN is not TRUE or FALSE",
            Self::InvalidInteger => "INTEGER is malformed",
            Self::InvalidFloat => "FLOAT is malformed",
            Self::InvalidBinary => "BINARY is not base64",
            Self::InvalidRRule => "RECUR value is malformed",
            Self::InvalidFrequency => "FREQ is unknown",
            Self::InvalidWeekday => "weekday is unknown",
            Self::UntilCountConflict => "UNTIL and COUNT cannot both be given",
            Self::MissingBegin => "no BEGIN:VCALENDAR",
            Self::MissingEnd => "component has no END line",
            Self::MismatchedComponent => "END does not match the open BEGIN",
        }
    }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
