//! iCalendar (RFC 5545) parsing, modelling, recurrence expansion, and iTIP
//! (RFC 5546) publish/request processing.

pub mod error;
pub mod rfc;

pub use rfc::ical::{
    Calendar, Component, ComponentId, Property, apply_schedule_message, parse, serialize,
};
