//! Document serializer.
//!
//! Emits components and properties in the order they were read or added,
//! one folded content line per property, CRLF-terminated.

use kalends_core::config::Settings;
use kalends_core::constants::DEFAULT_FOLD_WIDTH;

use super::fold::fold_line;
use crate::rfc::ical::core::{Calendar, Component, Property};

/// Serializer with a configurable fold width.
#[derive(Debug, Clone, Copy)]
pub struct Serializer {
    fold_width: usize,
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new(DEFAULT_FOLD_WIDTH)
    }
}

impl Serializer {
    #[must_use]
    pub const fn new(fold_width: usize) -> Self {
        Self { fold_width }
    }

    #[must_use]
    pub const fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.serializer.fold_width)
    }

    #[must_use]
    pub const fn fold_width(&self) -> usize {
        self.fold_width
    }

    /// Serializes a whole calendar.
    #[must_use]
    #[tracing::instrument(skip_all, fields(fold_width = self.fold_width))]
    pub fn serialize(&self, calendar: &Calendar) -> String {
        let mut out = String::new();
        self.begin(&mut out, "VCALENDAR");
        for prop in calendar.properties() {
            self.write_property(&mut out, prop);
        }
        for (_, component) in calendar.components() {
            self.write_component(&mut out, component);
        }
        self.end(&mut out, "VCALENDAR");
        tracing::trace!(bytes = out.len(), "Serialized calendar");
        out
    }

    /// Serializes one component and its sub-components.
    #[must_use]
    pub fn serialize_component(&self, component: &Component) -> String {
        let mut out = String::new();
        self.write_component(&mut out, component);
        out
    }

    /// Serializes one property as a folded, CRLF-terminated content line.
    #[must_use]
    pub fn serialize_property(&self, prop: &Property) -> String {
        let mut out = String::new();
        self.write_property(&mut out, prop);
        out
    }

    fn write_component(&self, out: &mut String, component: &Component) {
        self.begin(out, component.name());
        for prop in component.properties() {
            self.write_property(out, prop);
        }
        for child in component.children() {
            self.write_component(out, child);
        }
        self.end(out, component.name());
    }

    fn write_property(&self, out: &mut String, prop: &Property) {
        out.push_str(&fold_line(&prop.to_text(), self.fold_width));
        out.push_str("\r\n");
    }

    fn begin(&self, out: &mut String, name: &str) {
        self.write_line(out, &format!("BEGIN:{name}"));
    }

    fn end(&self, out: &mut String, name: &str) {
        self.write_line(out, &format!("END:{name}"));
    }

    fn write_line(&self, out: &mut String, line: &str) {
        out.push_str(&fold_line(line, self.fold_width));
        out.push_str("\r\n");
    }
}

/// Serializes a calendar with the default fold width.
#[must_use]
pub fn serialize(calendar: &Calendar) -> String {
    Serializer::default().serialize(calendar)
}

/// Serializes a component with the default fold width.
#[must_use]
pub fn serialize_component(component: &Component) -> String {
    Serializer::default().serialize_component(component)
}

/// Serializes a property with the default fold width.
#[must_use]
pub fn serialize_property(prop: &Property) -> String {
    Serializer::default().serialize_property(prop)
}
