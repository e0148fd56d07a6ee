//! iCalendar property and content line types (RFC 5545 §3.1, §3.8).

use std::fmt;

use super::{
    Duration, HasParameters, HasValue, Parameter, RRule, Temporal, Value, parameter,
};
use crate::error::{RfcError, RfcResult};
use crate::rfc::ical::build::escape_text;
use crate::rfc::ical::codec::{
    DecodeContext, ValueKind, decode_property_value, encode_value, is_list_property,
};

/// A raw content line as produced by the lexer.
///
/// Only lives between lexing and property construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentLine {
    /// Property name (normalized to uppercase).
    pub name: String,
    /// Parameters in order of appearance.
    pub params: Vec<Parameter>,
    /// Raw value string (after unfolding, before unescaping).
    pub raw_value: String,
}

impl ContentLine {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            params: Vec::new(),
            raw_value: value.into(),
        }
    }

    #[must_use]
    pub fn with_params(
        name: impl Into<String>,
        params: Vec<Parameter>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            params,
            raw_value: value.into(),
        }
    }
}

impl HasParameters for ContentLine {
    fn parameters(&self) -> &[Parameter] {
        &self.params
    }
}

/// A decoded iCalendar property.
///
/// The value text is kept next to the decoded value: for parsed properties
/// it is the text exactly as read, so serialization reproduces the input.
/// Mutators re-encode and re-validate, and leave the property untouched on
/// failure.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    name: String,
    params: Vec<Parameter>,
    value: Value,
    raw_value: String,
}

impl Property {
    fn build(name: &str, params: Vec<Parameter>, value: Value, raw_value: String) -> Self {
        Self {
            name: name.to_ascii_uppercase(),
            params,
            value,
            raw_value,
        }
    }

    /// Creates a property with a TEXT value.
    #[must_use]
    pub fn text(name: impl AsRef<str>, value: impl Into<String>) -> Self {
        let value = value.into();
        let raw = escape_text(&value);
        Self::build(name.as_ref(), Vec::new(), Value::Text(value), raw)
    }

    #[must_use]
    pub fn integer(name: impl AsRef<str>, value: i32) -> Self {
        Self::build(
            name.as_ref(),
            Vec::new(),
            Value::Integer(value),
            value.to_string(),
        )
    }

    /// Creates a property with a CAL-ADDRESS value (e.g. `mailto:a@example.com`).
    #[must_use]
    pub fn cal_address(name: impl AsRef<str>, address: impl Into<String>) -> Self {
        let address = address.into();
        let raw = address.clone();
        Self::build(name.as_ref(), Vec::new(), Value::CalAddress(address), raw)
    }

    #[must_use]
    pub fn duration(name: impl AsRef<str>, duration: Duration) -> Self {
        Self::build(
            name.as_ref(),
            Vec::new(),
            Value::Duration(duration),
            duration.to_string(),
        )
    }

    /// Creates a DATE or DATE-TIME property.
    ///
    /// A zoned value gets a TZID parameter, a date gets `VALUE=DATE`, and
    /// list-valued properties (EXDATE, RDATE) hold a one-element list.
    #[must_use]
    pub fn temporal(name: impl AsRef<str>, value: &Temporal) -> Self {
        let name = name.as_ref();
        let mut params = Vec::new();
        if let Some(tzid) = value.tzid() {
            params.push(Parameter::tzid(tzid));
        }
        if matches!(value, Temporal::Date(_)) && ValueKind::default_for(name) != ValueKind::Date
        {
            params.push(Parameter::value_type(ValueKind::Date));
        }
        let decoded = Value::from(value.clone());
        let decoded = if is_list_property(name) {
            Value::List(vec![decoded])
        } else {
            decoded
        };
        Self::build(name, params, decoded, value.to_string())
    }

    /// Creates an RRULE property.
    #[must_use]
    pub fn recur(rule: RRule) -> Self {
        let raw = rule.to_string();
        Self::build(names::RRULE, Vec::new(), Value::from(rule), raw)
    }

    /// Creates a property whose value is kept verbatim.
    #[must_use]
    pub fn unknown(name: impl AsRef<str>, raw: impl Into<String>) -> Self {
        let raw = raw.into();
        Self::build(name.as_ref(), Vec::new(), Value::Unknown(raw.clone()), raw)
    }

    /// ## Summary
    /// Builds a property from a lexed content line.
    ///
    /// The value kind comes from the `VALUE` parameter or the property's
    /// default. A value the codec rejects is kept as [`Value::Unknown`] with
    /// its text intact, and the rejection is returned alongside.
    #[must_use]
    pub fn from_content_line(cl: ContentLine, line: usize) -> (Self, Option<RfcError>) {
        let decoded = {
            let kind = ValueKind::resolve(
                &cl.name,
                cl.parameter_value(parameter::names::VALUE),
                &cl.raw_value,
            );
            let ctx = DecodeContext::with_tzid(cl.parameter_value(parameter::names::TZID))
                .at_line(line);
            decode_property_value(&cl.name, kind, &cl.raw_value, &ctx)
        };
        let (value, rejection) = match decoded {
            Ok(value) => (value, None),
            Err(e) => (Value::Unknown(cl.raw_value.clone()), Some(e)),
        };
        (
            Self {
                name: cl.name,
                params: cl.params,
                value,
                raw_value: cl.raw_value,
            },
            rejection,
        )
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the value text as it will be serialized.
    #[must_use]
    pub fn raw_value(&self) -> &str {
        &self.raw_value
    }

    /// ## Summary
    /// Replaces the value, re-encoding it and syncing the TZID and VALUE
    /// parameters.
    ///
    /// ## Errors
    /// Returns `RfcError::ValueError` if the value's codec rejects it; the
    /// property is unchanged.
    pub fn set_value(&mut self, value: impl Into<Value>) -> RfcResult<()> {
        let value = value.into();
        let kind = ValueKind::of(&value);
        let raw_value = encode_value(kind, &value).map_err(into_value_error)?;

        let mut params = self.params.clone();
        if matches!(
            kind,
            ValueKind::Date | ValueKind::DateTime | ValueKind::Period
        ) {
            let temporals = value.temporals();
            let tzid = temporals.first().and_then(Temporal::tzid);
            if temporals.iter().any(|t| t.tzid() != tzid) {
                return Err(RfcError::ValueError(format!(
                    "{} values must share one TZID",
                    self.name
                )));
            }
            match tzid {
                Some(tzid) => upsert(&mut params, Parameter::tzid(tzid)),
                None => params.retain(|p| p.name != parameter::names::TZID),
            }
        }
        if kind != ValueKind::Unknown {
            if kind == ValueKind::default_for(&self.name) {
                params.retain(|p| p.name != parameter::names::VALUE);
            } else {
                upsert(&mut params, Parameter::value_type(kind));
            }
        }

        self.params = params;
        self.value = value;
        self.raw_value = raw_value;
        Ok(())
    }

    /// ## Summary
    /// Appends a parameter, keeping insertion order.
    ///
    /// ## Errors
    /// Returns `RfcError::ValueError` if the parameter's value is outside its
    /// domain, the parameter is already present, or the value no longer
    /// decodes with it (e.g. `VALUE=INTEGER` on a date).
    pub fn add_parameter(&mut self, param: Parameter) -> RfcResult<()> {
        param.validate()?;
        if self.has_parameter(&param.name) {
            return Err(RfcError::ValueError(format!(
                "parameter {} is already present on {}",
                param.name, self.name
            )));
        }
        let mut params = self.params.clone();
        params.push(param);
        self.apply_params(params)
    }

    /// ## Summary
    /// Sets a parameter, replacing an existing one of the same name in place.
    ///
    /// ## Errors
    /// Same as [`Property::add_parameter`], except that replacing is allowed.
    pub fn set_parameter(&mut self, param: Parameter) -> RfcResult<()> {
        param.validate()?;
        let mut params = self.params.clone();
        upsert(&mut params, param);
        self.apply_params(params)
    }

    /// ## Summary
    /// Removes a parameter.
    ///
    /// ## Errors
    /// Returns `RfcError::ValueError` if the value no longer decodes without it.
    pub fn remove_parameter(&mut self, name: &str) -> RfcResult<Option<Parameter>> {
        let Some(pos) = self
            .params
            .iter()
            .position(|p| p.name.eq_ignore_ascii_case(name))
        else {
            return Ok(None);
        };
        let mut params = self.params.clone();
        let removed = params.remove(pos);
        self.apply_params(params)?;
        Ok(Some(removed))
    }

    /// Re-decodes the value text under a new parameter list, then commits both.
    fn apply_params(&mut self, params: Vec<Parameter>) -> RfcResult<()> {
        if !self.value.is_unknown() {
            let candidate = ContentLine::with_params(&self.name, params.clone(), &self.raw_value);
            let (reparsed, rejection) = Self::from_content_line(candidate, 0);
            if let Some(e) = rejection {
                return Err(into_value_error(e));
            }
            self.value = reparsed.value;
        }
        self.params = params;
        Ok(())
    }

    /// Returns the unfolded content line, without the trailing CRLF.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.to_string()
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        self.value.as_text()
    }

    #[must_use]
    pub fn as_integer(&self) -> Option<i32> {
        self.value.as_integer()
    }

    #[must_use]
    pub fn as_temporal(&self) -> Option<Temporal> {
        self.value.as_temporal()
    }

    #[must_use]
    pub fn as_duration(&self) -> Option<&Duration> {
        self.value.as_duration()
    }

    #[must_use]
    pub fn as_recur(&self) -> Option<&RRule> {
        self.value.as_recur()
    }

    #[must_use]
    pub fn tzid(&self) -> Option<&str> {
        self.parameter_value(parameter::names::TZID)
    }
}

fn into_value_error(e: RfcError) -> RfcError {
    match e {
        RfcError::TypeError(msg) => RfcError::ValueError(msg),
        RfcError::SyntaxError(err) => RfcError::ValueError(err.to_string()),
        other => other,
    }
}

fn upsert(params: &mut Vec<Parameter>, param: Parameter) {
    if let Some(slot) = params.iter_mut().find(|p| p.name == param.name) {
        *slot = param;
    } else {
        params.push(param);
    }
}

impl HasParameters for Property {
    fn parameters(&self) -> &[Parameter] {
        &self.params
    }
}

impl HasValue for Property {
    fn value(&self) -> &Value {
        &self.value
    }

    fn value_kind(&self) -> ValueKind {
        ValueKind::of(&self.value)
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        for param in &self.params {
            write!(f, ";{param}")?;
        }
        write!(f, ":{}", self.raw_value)
    }
}

/// ## Summary
/// Returns whether a property may appear at most once per component.
///
/// Setting a singular property replaces the existing instance; repeatable
/// properties accumulate in insertion order.
#[must_use]
pub fn is_singular(name: &str) -> bool {
    matches!(
        name.to_ascii_uppercase().as_str(),
        names::CALSCALE
            | names::METHOD
            | names::PRODID
            | names::VERSION
            | names::CLASS
            | names::CREATED
            | names::DESCRIPTION
            | names::DTSTART
            | names::GEO
            | names::LAST_MODIFIED
            | names::LOCATION
            | names::ORGANIZER
            | names::PRIORITY
            | names::DTSTAMP
            | names::SEQUENCE
            | names::STATUS
            | names::SUMMARY
            | names::TRANSP
            | names::UID
            | names::URL
            | names::RECURRENCE_ID
            | names::DTEND
            | names::DURATION
            | names::DUE
            | names::COMPLETED
            | names::PERCENT_COMPLETE
            | names::RRULE
            | names::TZID
            | names::TZURL
            | names::TZOFFSETFROM
            | names::TZOFFSETTO
            | names::ACTION
            | names::TRIGGER
            | names::REPEAT
            | names::COLOR
    )
}

/// Common property names as constants.
pub mod names {
    // Calendar properties
    pub const CALSCALE: &str = "CALSCALE";
    pub const METHOD: &str = "METHOD";
    pub const PRODID: &str = "PRODID";
    pub const VERSION: &str = "VERSION";

    // Descriptive properties
    pub const ATTACH: &str = "ATTACH";
    pub const CATEGORIES: &str = "CATEGORIES";
    pub const CLASS: &str = "CLASS";
    pub const COMMENT: &str = "COMMENT";
    pub const DESCRIPTION: &str = "DESCRIPTION";
    pub const GEO: &str = "GEO";
    pub const LOCATION: &str = "LOCATION";
    pub const PERCENT_COMPLETE: &str = "PERCENT-COMPLETE";
    pub const PRIORITY: &str = "PRIORITY";
    pub const RESOURCES: &str = "RESOURCES";
    pub const STATUS: &str = "STATUS";
    pub const SUMMARY: &str = "SUMMARY";

    // Date and time properties
    pub const COMPLETED: &str = "COMPLETED";
    pub const DTEND: &str = "DTEND";
    pub const DUE: &str = "DUE";
    pub const DTSTART: &str = "DTSTART";
    pub const DURATION: &str = "DURATION";
    pub const FREEBUSY: &str = "FREEBUSY";
    pub const TRANSP: &str = "TRANSP";

    // Timezone properties
    pub const TZID: &str = "TZID";
    pub const TZNAME: &str = "TZNAME";
    pub const TZOFFSETFROM: &str = "TZOFFSETFROM";
    pub const TZOFFSETTO: &str = "TZOFFSETTO";
    pub const TZURL: &str = "TZURL";

    // Relationship properties
    pub const ATTENDEE: &str = "ATTENDEE";
    pub const CONTACT: &str = "CONTACT";
    pub const ORGANIZER: &str = "ORGANIZER";
    pub const RECURRENCE_ID: &str = "RECURRENCE-ID";
    pub const RELATED_TO: &str = "RELATED-TO";
    pub const URL: &str = "URL";
    pub const UID: &str = "UID";

    // Recurrence properties
    pub const EXDATE: &str = "EXDATE";
    pub const EXRULE: &str = "EXRULE";
    pub const RDATE: &str = "RDATE";
    pub const RRULE: &str = "RRULE";

    // Alarm properties
    pub const ACTION: &str = "ACTION";
    pub const REPEAT: &str = "REPEAT";
    pub const TRIGGER: &str = "TRIGGER";

    // Change management properties
    pub const CREATED: &str = "CREATED";
    pub const DTSTAMP: &str = "DTSTAMP";
    pub const LAST_MODIFIED: &str = "LAST-MODIFIED";
    pub const SEQUENCE: &str = "SEQUENCE";

    // RFC 7986 extensions
    pub const COLOR: &str = "COLOR";
    pub const CONFERENCE: &str = "CONFERENCE";
    pub const IMAGE: &str = "IMAGE";
    pub const NAME: &str = "NAME";
    pub const SOURCE: &str = "SOURCE";
}
