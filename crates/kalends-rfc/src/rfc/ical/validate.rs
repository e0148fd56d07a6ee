//! ## Summary
//! Cross-property and cross-component validation for iCalendar data.
//!
//! Queries collect every failure as a [`ValidationError`] and never fail
//! themselves. The `check_*` helpers are the fail-fast forms used by the
//! typed setters.

use std::fmt;

use crate::error::{RfcError, RfcResult};
use crate::rfc::ical::core::{
    Calendar, Component, HasParameters, Property, Temporal, TemporalKind, Validate, is_singular,
    names, resolve_tz,
};

/// One validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Where the failure was found, e.g. `VEVENT UID:abc` or `VCALENDAR`.
    pub component: String,
    /// The offending property, when one is to blame.
    pub property: Option<String>,
    pub message: String,
}

impl ValidationError {
    fn new(component: &str, property: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            component: component.to_string(),
            property: property.map(str::to_string),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.property {
            Some(prop) => write!(f, "{} {}: {}", self.component, prop, self.message),
            None => write!(f, "{}: {}", self.component, self.message),
        }
    }
}

/// ## Summary
/// Checks an end marker (DTEND or DUE) against DTSTART.
///
/// ## Errors
/// Returns `RfcError::TypeError` when the temporal kinds differ and
/// `RfcError::ValueError` when the end precedes the start.
pub(crate) fn check_end(start: &Temporal, end: &Temporal, name: &str) -> RfcResult<()> {
    if start.kind() != end.kind() {
        return Err(RfcError::TypeError(format!(
            "{name} value {end} ({}) must have the same value type as DTSTART value {start} ({})",
            end.kind(),
            start.kind()
        )));
    }
    if end.instant_key() < start.instant_key() {
        return Err(RfcError::ValueError(format!(
            "{name} value {end} must not precede DTSTART value {start}"
        )));
    }
    Ok(())
}

/// ## Summary
/// Checks that a value related to DTSTART shares its temporal kind.
///
/// ## Errors
/// Returns `RfcError::TypeError` on a mismatch.
pub(crate) fn check_same_kind(start: &Temporal, value: &Temporal, name: &str) -> RfcResult<()> {
    if start.kind() == value.kind() {
        return Ok(());
    }
    Err(RfcError::TypeError(format!(
        "{name} value {value} ({}) must have the same value type as DTSTART value {start} ({})",
        value.kind(),
        start.kind()
    )))
}

/// Strips the "Type error: " style prefix for use in a validation message.
fn message_of(e: &RfcError) -> String {
    match e {
        RfcError::ValueError(msg)
        | RfcError::TypeError(msg)
        | RfcError::RuleError(msg)
        | RfcError::UnsupportedError(msg) => msg.clone(),
        other => other.to_string(),
    }
}

fn label(component: &Component) -> String {
    match component.uid() {
        Some(uid) => format!("{} UID:{uid}", component.name()),
        None => component.name().to_string(),
    }
}

/// Validates a whole calendar.
pub(crate) fn validate_calendar(calendar: &Calendar) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for required in [names::VERSION, names::PRODID] {
        if calendar.property(required).is_none() {
            errors.push(ValidationError::new(
                "VCALENDAR",
                Some(required),
                format!("{required} is required"),
            ));
        }
    }
    check_properties("VCALENDAR", calendar.properties(), &mut errors);

    for (id, component) in calendar.components() {
        let family_start = calendar
            .recurrence_parent(id)
            .and_then(|parent| calendar.get(parent))
            .and_then(Component::dtstart);
        validate_component(component, family_start.as_ref(), &mut errors);

        for prop in component.properties() {
            if let Some(tzid) = prop.tzid()
                && resolve_tz(tzid).is_none()
                && calendar.timezone(tzid).is_none()
            {
                errors.push(ValidationError::new(
                    &label(component),
                    Some(prop.name()),
                    format!("TZID {tzid} is neither a known zone nor defined by a VTIMEZONE"),
                ));
            }
        }
    }

    errors
}

/// ## Summary
/// Validates one component and its sub-components.
///
/// `family_start` is the DTSTART of the recurrence parent, which a child's
/// RECURRENCE-ID must agree with.
fn validate_component(
    component: &Component,
    family_start: Option<&Temporal>,
    errors: &mut Vec<ValidationError>,
) {
    let at = label(component);
    check_properties(&at, component.properties(), errors);

    let start = component.dtstart();

    for name in [names::DTEND, names::DUE] {
        let Some(end) = component.property(name).and_then(Property::as_temporal) else {
            continue;
        };
        if let Some(start) = &start
            && let Err(e) = check_end(start, &end, name)
        {
            errors.push(ValidationError::new(&at, Some(name), message_of(&e)));
        }
        if component.property(names::DURATION).is_some() {
            errors.push(ValidationError::new(
                &at,
                Some(name),
                format!("{name} cannot be combined with DURATION"),
            ));
        }
    }

    if let Some(start) = &start {
        for (name, values) in [
            (names::EXDATE, component.exdates()),
            (names::RDATE, component.rdates()),
        ] {
            for value in &values {
                if let Err(e) = check_same_kind(start, value, name) {
                    errors.push(ValidationError::new(&at, Some(name), message_of(&e)));
                }
            }
        }
    }

    if let Some(rid) = component.recurrence_id()
        && let Some(reference) = family_start.or(start.as_ref())
        && let Err(e) = check_same_kind(reference, &rid, names::RECURRENCE_ID)
    {
        errors.push(ValidationError::new(
            &at,
            Some(names::RECURRENCE_ID),
            message_of(&e),
        ));
    }

    if let Some(rule) = component.rrule() {
        let checked = match &start {
            Some(start) => rule.validate_for_start(start),
            None => rule.validate(),
        };
        if let Err(e) = checked {
            errors.push(ValidationError::new(&at, Some(names::RRULE), message_of(&e)));
        }
    }

    if start
        .as_ref()
        .is_some_and(|s| s.kind() == TemporalKind::Date)
        && component
            .duration()
            .is_some_and(|d| d.has_time())
    {
        errors.push(ValidationError::new(
            &at,
            Some(names::DURATION),
            "DURATION of a DATE start must be in days or weeks",
        ));
    }

    for child in component.children() {
        validate_component(child, None, errors);
    }
}

/// Duplicate singular properties and parameter domains.
fn check_properties(at: &str, properties: &[Property], errors: &mut Vec<ValidationError>) {
    let mut seen: Vec<&str> = Vec::new();
    for prop in properties {
        let name = prop.name();
        if is_singular(name) {
            if seen.contains(&name) {
                errors.push(ValidationError::new(
                    at,
                    Some(name),
                    format!("{name} must not occur more than once"),
                ));
            } else {
                seen.push(name);
            }
        }
        for param in prop.parameters() {
            if let Err(e) = param.validate() {
                errors.push(ValidationError::new(at, Some(name), message_of(&e)));
            }
        }
    }
}

impl Validate for Component {
    fn validation_errors(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        validate_component(self, None, &mut errors);
        errors
    }
}
