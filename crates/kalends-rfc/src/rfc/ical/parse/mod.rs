//! iCalendar parsing (RFC 5545).
//!
//! - Lexer: unfolding and content-line grammar
//! - Values: typed value grammars (dates, durations, recurrence rules, text)
//! - Parser: documents into a [`Calendar`](crate::rfc::ical::core::Calendar)

mod error;
pub mod lexer;
mod parser;
pub mod values;

pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use parser::{Diagnostic, parse};
pub(crate) use parser::{Fragment, parse_fragment};
