//! iCalendar parameter types (RFC 5545 §3.2).

use std::fmt;

use crate::error::{RfcError, RfcResult};
use crate::rfc::ical::codec::ValueKind;

/// One value of a parameter, remembering whether it was written quoted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParamValue {
    /// Decoded text (caret escapes already resolved).
    pub text: String,
    pub quoted: bool,
}

impl ParamValue {
    /// Creates a value, quoting it only when its characters require it.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let quoted = needs_quoting(&text);
        Self { text, quoted }
    }

    #[must_use]
    pub fn quoted(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quoted: true,
        }
    }
}

/// A single iCalendar property parameter.
///
/// For example `DTSTART;TZID=America/New_York:20260123T120000` carries a
/// parameter named `TZID` with value `America/New_York`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Parameter {
    /// Parameter name (normalized to uppercase).
    pub name: String,
    /// Most parameters have one value; MEMBER, DELEGATED-TO and friends may have several.
    pub values: Vec<ParamValue>,
}

impl Parameter {
    /// Creates a new parameter with a single value.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            values: vec![ParamValue::new(value)],
        }
    }

    #[must_use]
    pub fn with_values(name: impl Into<String>, values: Vec<ParamValue>) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            values,
        }
    }

    /// Returns the first (and usually only) value.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.values.first().map(|v| v.text.as_str())
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|v| v.text.as_str())
    }

    /// Returns whether the parameter has the specified value (case-insensitive).
    #[must_use]
    pub fn has_value(&self, value: &str) -> bool {
        self.values.iter().any(|v| v.text.eq_ignore_ascii_case(value))
    }

    #[must_use]
    pub fn tzid(tzid: impl Into<String>) -> Self {
        Self::new(names::TZID, tzid)
    }

    #[must_use]
    pub fn value_type(kind: ValueKind) -> Self {
        Self::new(names::VALUE, kind.as_str())
    }

    #[must_use]
    pub fn cn(name: impl Into<String>) -> Self {
        Self::new(names::CN, name)
    }

    #[must_use]
    pub fn range_this_and_future() -> Self {
        Self::new(names::RANGE, "THISANDFUTURE")
    }

    /// ## Summary
    /// Checks a known parameter's value against its allowed domain.
    ///
    /// Unknown and `X-` parameters are accepted verbatim.
    ///
    /// ## Errors
    /// Returns `RfcError::ValueError` naming the parameter and the rejected value.
    pub fn validate(&self) -> RfcResult<()> {
        if self.values.is_empty() {
            return Err(RfcError::ValueError(format!(
                "parameter {} has no value",
                self.name
            )));
        }
        let allowed: &[&str] = match self.name.as_str() {
            names::RANGE => &["THISANDFUTURE"],
            names::RELATED => &["START", "END"],
            names::RSVP => &["TRUE", "FALSE"],
            names::ENCODING => &["8BIT", "BASE64"],
            names::FBTYPE => &["FREE", "BUSY", "BUSY-UNAVAILABLE", "BUSY-TENTATIVE"],
            names::CUTYPE => &["INDIVIDUAL", "GROUP", "RESOURCE", "ROOM", "UNKNOWN"],
            names::ROLE => &[
                "CHAIR",
                "REQ-PARTICIPANT",
                "OPT-PARTICIPANT",
                "NON-PARTICIPANT",
            ],
            names::PARTSTAT => &[
                "NEEDS-ACTION",
                "ACCEPTED",
                "DECLINED",
                "TENTATIVE",
                "DELEGATED",
                "COMPLETED",
                "IN-PROCESS",
            ],
            names::VALUE => {
                return match self.value().map(ValueKind::parse) {
                    Some(Some(_)) => Ok(()),
                    _ if self.value().is_some_and(is_extension_token) => Ok(()),
                    _ => Err(self.rejected()),
                };
            }
            names::TZID => {
                return if self.value().is_some_and(|v| !v.trim().is_empty()) {
                    Ok(())
                } else {
                    Err(self.rejected())
                };
            }
            _ => return Ok(()),
        };

        // Open enumerations also admit x-name and iana-token values
        let extensible = !matches!(
            self.name.as_str(),
            names::RANGE | names::RELATED | names::RSVP | names::ENCODING
        );
        for value in self.texts() {
            let known = allowed.iter().any(|a| a.eq_ignore_ascii_case(value));
            if !known && !(extensible && is_extension_token(value)) {
                return Err(self.rejected());
            }
        }
        Ok(())
    }

    fn rejected(&self) -> RfcError {
        RfcError::ValueError(format!(
            "invalid value for parameter {}: {:?}",
            self.name,
            self.texts().collect::<Vec<_>>().join(",")
        ))
    }
}

fn is_extension_token(value: &str) -> bool {
    let upper = value.to_ascii_uppercase();
    upper.starts_with("X-") && upper.len() > 2
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=", self.name)?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            if value.quoted || needs_quoting(&value.text) {
                write!(f, "\"{}\"", caret_encode(&value.text))?;
            } else {
                f.write_str(&value.text)?;
            }
        }
        Ok(())
    }
}

/// Checks if a parameter value needs quoting.
fn needs_quoting(s: &str) -> bool {
    s.chars().any(|c| matches!(c, ':' | ';' | ',' | '"' | '\n'))
}

/// Applies RFC 6868 caret encoding for a quoted parameter value.
///
/// A caret is doubled only where the decoder would otherwise read it as the
/// start of an escape, so a lone `^` in `a^b` is written back unchanged.
fn caret_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '^' if matches!(chars.peek(), Some('^' | 'n' | '\'' | '\n' | '"')) => {
                out.push_str("^^");
            }
            '\n' => out.push_str("^n"),
            '"' => out.push_str("^'"),
            _ => out.push(c),
        }
    }
    out
}

/// Common parameter names as constants.
pub mod names {
    pub const ALTREP: &str = "ALTREP";
    pub const CN: &str = "CN";
    pub const CUTYPE: &str = "CUTYPE";
    pub const ENCODING: &str = "ENCODING";
    pub const FBTYPE: &str = "FBTYPE";
    pub const LANGUAGE: &str = "LANGUAGE";
    pub const PARTSTAT: &str = "PARTSTAT";
    pub const RANGE: &str = "RANGE";
    pub const RELATED: &str = "RELATED";
    pub const ROLE: &str = "ROLE";
    pub const RSVP: &str = "RSVP";
    pub const TZID: &str = "TZID";
    pub const VALUE: &str = "VALUE";
}
