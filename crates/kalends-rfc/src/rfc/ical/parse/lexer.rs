//! Content line lexer (RFC 5545 §3.1): unfolding and the
//! `name *(";" param) ":" value` grammar.

use super::error::{ParseError, ParseErrorKind, ParseResult};
use crate::rfc::ical::core::{ContentLine, ParamValue, Parameter};

const LINE_BREAKS: [char; 5] = ['\r', '\n', '\u{85}', '\u{2028}', '\u{2029}'];

/// ## Summary
/// Splits input into logical content lines, merging folded continuations.
///
/// CRLF, bare LF, bare CR and the Unicode line separators all end a physical
/// line. A physical line starting with SP or HTAB continues the previous
/// logical line without its first character. Blank lines are skipped, also
/// between a line and its continuation.
///
/// Each entry carries the 1-based physical line number of its first segment.
#[must_use]
pub fn split_lines(input: &str) -> Vec<(usize, String)> {
    let mut logical: Vec<(usize, String)> = Vec::new();
    for (index, segment) in PhysicalLines::new(input).enumerate() {
        if segment.is_empty() {
            continue;
        }
        match (segment.strip_prefix([' ', '\t']), logical.last_mut()) {
            (Some(rest), Some((_, text))) => text.push_str(rest),
            (Some(""), None) => {}
            (Some(rest), None) => logical.push((index + 1, rest.to_owned())),
            (None, _) => logical.push((index + 1, segment.to_owned())),
        }
    }
    logical
}

/// Physical lines of a document; CRLF counts as one break.
struct PhysicalLines<'a> {
    rest: Option<&'a str>,
}

impl<'a> PhysicalLines<'a> {
    const fn new(input: &'a str) -> Self {
        Self { rest: Some(input) }
    }
}

impl<'a> Iterator for PhysicalLines<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let text = self.rest.take()?;
        let Some(at) = text.find(LINE_BREAKS) else {
            return (!text.is_empty()).then_some(text);
        };
        let tail = &text[at..];
        let width = if tail.starts_with("\r\n") {
            2
        } else {
            tail.chars().next().map_or(1, char::len_utf8)
        };
        self.rest = Some(&tail[width..]);
        Some(&text[..at])
    }
}

/// ## Summary
/// Parses one logical content line.
///
/// Names are upper-cased; the raw value is kept as written.
///
/// ## Errors
/// Returns a [`ParseError`] whose column is the 1-based byte offset of the
/// offending character. An unterminated quoted parameter value is
/// [`ParseErrorKind::UnclosedQuote`].
pub fn parse_content_line(line: &str, line_num: usize) -> ParseResult<ContentLine> {
    let mut scanner = Scanner {
        line,
        pos: 0,
        line_num,
    };

    let name = scanner.take_name();
    match scanner.peek() {
        None => return Err(scanner.error(ParseErrorKind::MissingColon, line.len())),
        Some(':' | ';') if name.is_empty() => {
            return Err(scanner.error(ParseErrorKind::MissingPropertyName, 1));
        }
        Some(':' | ';') => {}
        Some(_) => return Err(scanner.error(ParseErrorKind::InvalidPropertyName, scanner.pos + 1)),
    }

    let mut params = Vec::new();
    while scanner.eat(';') {
        params.push(scanner.parameter()?);
    }
    if !scanner.eat(':') {
        return Err(scanner.error(ParseErrorKind::MissingColon, line.len()));
    }

    Ok(ContentLine {
        name: name.to_ascii_uppercase(),
        params,
        raw_value: line[scanner.pos..].to_string(),
    })
}

/// Byte cursor over a single content line.
struct Scanner<'a> {
    line: &'a str,
    pos: usize,
    line_num: usize,
}

impl<'a> Scanner<'a> {
    fn peek(&self) -> Option<char> {
        self.line[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        let hit = self.peek() == Some(expected);
        if hit {
            self.pos += expected.len_utf8();
        }
        hit
    }

    fn error(&self, kind: ParseErrorKind, column: usize) -> ParseError {
        ParseError::new(kind, self.line_num, column)
    }

    /// Consumes an iana-token or x-name.
    fn take_name(&mut self) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_alphanumeric() || c == '-') {
            self.pos += 1;
        }
        &self.line[start..self.pos]
    }

    /// Parses `name=value *("," value)`, stopping before the `;` or `:`
    /// that follows.
    fn parameter(&mut self) -> ParseResult<Parameter> {
        let start = self.pos;
        let name = self.take_name();
        match self.peek() {
            Some('=') if !name.is_empty() => self.pos += 1,
            Some('=') | None => return Err(self.error(ParseErrorKind::InvalidParameter, start + 1)),
            Some(_) => return Err(self.error(ParseErrorKind::InvalidParameter, self.pos + 1)),
        }

        let mut values = vec![self.param_value()?];
        loop {
            match self.peek() {
                Some(',') => {
                    self.pos += 1;
                    values.push(self.param_value()?);
                }
                Some(';' | ':') => return Ok(Parameter::with_values(name, values)),
                Some(c) => {
                    return Err(self
                        .error(ParseErrorKind::InvalidParameter, self.pos + 1)
                        .with_context(format!("unexpected character '{c}'")));
                }
                None => return Err(self.error(ParseErrorKind::MissingColon, self.line.len())),
            }
        }
    }

    fn param_value(&mut self) -> ParseResult<ParamValue> {
        match self.peek() {
            None => Err(self.error(ParseErrorKind::MissingColon, self.line.len())),
            Some('"') => self.quoted_value(),
            Some(_) => {
                let start = self.pos;
                while self.peek().is_some_and(|c| !matches!(c, ',' | ';' | ':')) {
                    self.bump();
                }
                Ok(ParamValue {
                    text: self.line[start..self.pos].to_string(),
                    quoted: false,
                })
            }
        }
    }

    /// Reads a DQUOTE-delimited value, resolving RFC 6868 caret escapes.
    fn quoted_value(&mut self) -> ParseResult<ParamValue> {
        let open = self.pos;
        self.pos += 1;
        let mut text = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error(ParseErrorKind::UnclosedQuote, open + 1)),
                Some('"') => return Ok(ParamValue { text, quoted: true }),
                Some('^') => {
                    let decoded = match self.peek() {
                        Some('^') => Some('^'),
                        Some('n') => Some('\n'),
                        Some('\'') => Some('"'),
                        _ => None,
                    };
                    if let Some(c) = decoded {
                        self.pos += 1;
                        text.push(c);
                    } else {
                        text.push('^');
                    }
                }
                Some(c) => text.push(c),
            }
        }
    }
}
