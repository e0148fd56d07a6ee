//! Capability traits shared by content lines, properties, components and
//! calendars.

use super::{Parameter, Value};
use crate::rfc::ical::codec::ValueKind;
use crate::rfc::ical::validate::ValidationError;

/// Anything carrying an ordered parameter list.
pub trait HasParameters {
    fn parameters(&self) -> &[Parameter];

    /// Returns the first parameter with the given name (case-insensitive).
    fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters()
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Returns the first value of the named parameter.
    fn parameter_value(&self, name: &str) -> Option<&str> {
        self.parameter(name)?.value()
    }

    fn has_parameter(&self, name: &str) -> bool {
        self.parameter(name).is_some()
    }
}

/// Anything carrying a decoded value.
pub trait HasValue {
    fn value(&self) -> &Value;

    /// Returns the kind the value is encoded with.
    fn value_kind(&self) -> ValueKind;
}

/// Anything that can report validation failures without failing.
pub trait Validate {
    /// Returns every validation failure found; empty when valid.
    fn validation_errors(&self) -> Vec<ValidationError>;

    fn is_valid(&self) -> bool {
        self.validation_errors().is_empty()
    }
}
