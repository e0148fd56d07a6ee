//! iCalendar document parser (RFC 5545).
//!
//! Parses complete documents into a [`Calendar`]. A line that fails the
//! content-line grammar, or whose value its codec rejects, is recorded as a
//! [`Diagnostic`] and the document keeps parsing; unbalanced `BEGIN`/`END`
//! blocks and unterminated quotes abort.

use std::fmt;
use std::iter::Peekable;

use super::error::{ParseError, ParseErrorKind, ParseResult};
use super::lexer::{parse_content_line, split_lines};
use crate::error::{RfcError, RfcResult};
use crate::rfc::ical::core::{Calendar, Component, ComponentKind, ContentLine, Property};

/// A non-fatal problem found while parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Physical line (1-based) of the offending content line.
    pub line: usize,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// A piece of text parsed outside a full document.
#[derive(Debug, Clone)]
pub enum Fragment {
    Property(Property),
    Component(Component),
}

type Lines = Peekable<std::vec::IntoIter<(usize, String)>>;

/// Walks unfolded lines, building components.
struct Builder {
    /// When set, every recoverable problem is an error instead of a diagnostic.
    strict: bool,
    diagnostics: Vec<Diagnostic>,
}

impl Builder {
    const fn new(strict: bool) -> Self {
        Self {
            strict,
            diagnostics: Vec::new(),
        }
    }

    /// Lexes one line, recording or returning recoverable failures.
    fn content_line(&mut self, line: &str, line_num: usize) -> ParseResult<Option<ContentLine>> {
        match parse_content_line(line, line_num) {
            Ok(cl) => Ok(Some(cl)),
            Err(e) if e.is_fatal() || self.strict => Err(e),
            Err(e) => {
                tracing::warn!(line = line_num, error = %e, "Ignoring unknown line");
                self.diagnostics.push(Diagnostic {
                    line: line_num,
                    message: format!("unknown line ignored: {e}"),
                });
                Ok(None)
            }
        }
    }

    /// Decodes a property, keeping undecodable values verbatim.
    fn property(&mut self, cl: ContentLine, line_num: usize) -> RfcResult<Property> {
        let name = cl.name.clone();
        let (prop, rejection) = Property::from_content_line(cl, line_num);
        if let Some(e) = rejection {
            if self.strict {
                return Err(e);
            }
            tracing::warn!(line = line_num, property = %name, error = %e, "Keeping undecodable value verbatim");
            self.diagnostics.push(Diagnostic {
                line: line_num,
                message: format!("{name} value kept verbatim: {e}"),
            });
        }
        Ok(prop)
    }

    /// Parses the body of a component whose `BEGIN` line was consumed.
    fn component(&mut self, lines: &mut Lines, name: &str, begin_line: usize) -> RfcResult<Component> {
        let mut component = Component::new(name);
        let mut last_line = begin_line;

        loop {
            let Some((line_num, line)) = lines.next() else {
                return Err(ParseError::new(ParseErrorKind::MissingEnd, last_line, 1)
                    .with_context(format!("missing END:{name}"))
                    .into());
            };
            last_line = line_num;

            let Some(cl) = self.content_line(&line, line_num)? else {
                continue;
            };

            match cl.name.as_str() {
                "BEGIN" => {
                    let nested_name = cl.raw_value.to_ascii_uppercase();
                    let nested = self.component(lines, &nested_name, line_num)?;
                    component.add_child(nested);
                }
                "END" => {
                    let end_name = cl.raw_value.to_ascii_uppercase();
                    if end_name != name {
                        return Err(ParseError::new(
                            ParseErrorKind::MismatchedComponent,
                            line_num,
                            1,
                        )
                        .with_context(format!("expected END:{name}, got END:{end_name}"))
                        .into());
                    }
                    return Ok(component);
                }
                _ => {
                    let prop = self.property(cl, line_num)?;
                    component.push_property(prop);
                }
            }
        }
    }
}

/// Parses an iCalendar document from a string.
///
/// ## Errors
///
/// Returns `RfcError::SyntaxError` if the document has no `VCALENDAR`, has
/// unbalanced `BEGIN`/`END` blocks, or contains an unterminated quoted
/// parameter value. Other malformed lines become diagnostics.
#[tracing::instrument(skip(input), fields(input_len = input.len()))]
pub fn parse(input: &str) -> RfcResult<Calendar> {
    tracing::debug!("Parsing iCalendar document");

    let lines = split_lines(input);
    if lines.is_empty() {
        tracing::warn!("Empty iCalendar input");
        return Err(ParseError::new(ParseErrorKind::MissingBegin, 1, 1).into());
    }
    tracing::trace!(count = lines.len(), "Split lines");

    let mut builder = Builder::new(false);
    let mut lines = lines.into_iter().peekable();

    // Skip leading noise up to BEGIN:VCALENDAR
    let begin_line = loop {
        let Some((line_num, line)) = lines.next() else {
            return Err(ParseError::new(ParseErrorKind::MissingBegin, 1, 1)
                .with_context("expected BEGIN:VCALENDAR")
                .into());
        };
        match builder.content_line(&line, line_num)? {
            Some(cl) if cl.name == "BEGIN" && cl.raw_value.eq_ignore_ascii_case("VCALENDAR") => {
                break line_num;
            }
            Some(cl) if cl.name == "BEGIN" => {
                return Err(ParseError::new(ParseErrorKind::MissingBegin, line_num, 1)
                    .with_context(format!("expected VCALENDAR, got {}", cl.raw_value))
                    .into());
            }
            _ => {
                tracing::warn!(line = line_num, "Ignoring line before BEGIN:VCALENDAR");
                builder.diagnostics.push(Diagnostic {
                    line: line_num,
                    message: "unknown line ignored: content before BEGIN:VCALENDAR".into(),
                });
            }
        }
    };

    let root = builder.component(&mut lines, "VCALENDAR", begin_line)?;

    for (line_num, line) in lines {
        tracing::warn!(line = line_num, "Ignoring content after END:VCALENDAR");
        builder.diagnostics.push(Diagnostic {
            line: line_num,
            message: format!("unknown line ignored: {line:?} after END:VCALENDAR"),
        });
    }

    let calendar = Calendar::from_root(root, builder.diagnostics);
    tracing::debug!(
        components = calendar.components().count(),
        diagnostics = calendar.diagnostics().len(),
        "iCalendar document parsed"
    );
    Ok(calendar)
}

/// ## Summary
/// Parses standalone content: property lines and complete `BEGIN`/`END`
/// blocks, in order.
///
/// ## Errors
/// Unlike [`parse`], every malformed line and undecodable value is an error.
pub fn parse_fragment(text: &str) -> RfcResult<Vec<Fragment>> {
    let mut builder = Builder::new(true);
    let mut lines = split_lines(text).into_iter().peekable();
    let mut fragments = Vec::new();

    while let Some((line_num, line)) = lines.next() {
        let Some(cl) = builder.content_line(&line, line_num)? else {
            continue;
        };
        match cl.name.as_str() {
            "BEGIN" => {
                let name = cl.raw_value.to_ascii_uppercase();
                if ComponentKind::parse(&name) == ComponentKind::Calendar {
                    return Err(RfcError::UnsupportedError(
                        "a VCALENDAR cannot be nested inside a component".into(),
                    ));
                }
                fragments.push(Fragment::Component(
                    builder.component(&mut lines, &name, line_num)?,
                ));
            }
            "END" => {
                return Err(
                    ParseError::new(ParseErrorKind::MismatchedComponent, line_num, 1)
                        .with_context(format!("END:{} without BEGIN", cl.raw_value))
                        .into(),
                );
            }
            _ => fragments.push(Fragment::Property(builder.property(cl, line_num)?)),
        }
    }

    Ok(fragments)
}
