use thiserror::Error;

use crate::rfc::ical::parse::ParseError;

#[derive(Error, Debug)]
pub enum RfcError {
    /// Malformed content line, escape sequence, or component nesting.
    #[error("Syntax error: {0}")]
    SyntaxError(#[from] ParseError),

    /// A value failed its codec's domain check.
    #[error("Value error: {0}")]
    ValueError(String),

    /// Temporal kind mismatch, e.g. a DATE end against a DATE-TIME start.
    #[error("Type error: {0}")]
    TypeError(String),

    /// A recurrence rule part is out of range or incompatible with the frequency.
    #[error("Rule error: {0}")]
    RuleError(String),

    #[error("Sequence error: incoming SEQUENCE {new} does not supersede existing SEQUENCE {old}")]
    SequenceError { new: i32, old: i32 },

    #[error("Unsupported: {0}")]
    UnsupportedError(String),

    #[error(transparent)]
    CoreError(#[from] kalends_core::error::CoreError),
}

pub type RfcResult<T> = std::result::Result<T, RfcError>;
