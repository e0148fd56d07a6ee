//! kalends - integration test support.
//!
//! Re-exports the workspace crates under one path and provides the small
//! helpers the integration suites share.

pub use kalends_core as core;
pub use kalends_rfc as rfc;

use kalends_rfc::error::RfcResult;
use kalends_rfc::rfc::ical::{Calendar, parse};

/// Wraps component text in a minimal VCALENDAR.
#[must_use]
pub fn wrap_calendar(body: &str) -> String {
    format!(
        "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//kalends//tests//EN\r\n{body}END:VCALENDAR\r\n"
    )
}

/// Wraps component text in a scheduling message with the given METHOD.
#[must_use]
pub fn wrap_message(method: &str, body: &str) -> String {
    format!(
        "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//kalends//tests//EN\r\nMETHOD:{method}\r\n{body}END:VCALENDAR\r\n"
    )
}

/// ## Summary
/// Parses newline-separated content lines as one VEVENT inside a calendar.
///
/// Lines may be separated by `\n` or `\r\n`.
///
/// ## Errors
/// Returns the parse error of the assembled calendar.
pub fn event_calendar(uid: &str, lines: &str) -> RfcResult<Calendar> {
    let body: String = lines
        .lines()
        .map(|line| format!("{}\r\n", line.trim_end_matches('\r')))
        .collect();
    parse(&wrap_calendar(&format!(
        "BEGIN:VEVENT\r\nUID:{uid}\r\n{body}END:VEVENT\r\n"
    )))
}
