//! iCalendar RFC 5545 implementation.
//!
//! - `core`: the calendar arena, components, properties and values
//! - `parse`: lenient document parsing and strict fragment parsing
//! - `build`: escaping, folding and serialization
//! - `codec`: the value type registry
//! - `recur`: recurrence sets and the lazy occurrence stream
//! - `validate`: cross-property checks
//! - `itip`: PUBLISH and REQUEST scheduling messages
//!
//! ## Example
//!
//! ```rust
//! use kalends_rfc::rfc::ical::{Calendar, Component, core::ComponentKind};
//!
//! let mut calendar = Calendar::new();
//! let mut event = Component::new_displayable(ComponentKind::Event).unwrap();
//! event.set_summary("Team Meeting");
//! let id = calendar.add_component(event);
//!
//! let text = calendar.to_text();
//! assert!(text.contains("SUMMARY:Team Meeting\r\n"));
//! assert!(calendar.get(id).is_some());
//! ```

pub mod build;
pub mod codec;
pub mod core;
pub mod itip;
pub mod parse;
pub mod recur;
pub mod validate;

#[cfg(test)]
mod tests;

pub use build::serialize;
pub use core::{Calendar, Component, ComponentId, ComponentKind, Parameter, Property};
pub use itip::apply_schedule_message;
pub use parse::{Diagnostic, ParseError, ParseResult, parse};
pub use recur::{CountPolicy, OccurrenceStream, RecurrenceSet};
pub use validate::ValidationError;
