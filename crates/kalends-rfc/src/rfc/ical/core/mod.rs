//! iCalendar core models (RFC 5545).
//!
//! This module defines the data structures for iCalendar content:
//! - Round-trip fidelity: parameters, unknown properties and value text are
//!   preserved as read
//! - Components live in a [`Calendar`] arena addressed by [`ComponentId`]
//! - Capability traits ([`HasParameters`], [`HasValue`], [`Validate`]) instead
//!   of a type hierarchy

mod calendar;
mod component;
mod datetime;
mod duration;
mod parameter;
mod property;
mod rrule;
mod traits;
mod value;

pub use calendar::{Calendar, ComponentId};
pub use component::{Component, ComponentKind};
pub(crate) use datetime::format_date;
pub use datetime::{
    DateTime, DateTimeForm, Temporal, TemporalKind, Time, UtcOffset, local_to_utc, resolve_tz,
};
pub use duration::Duration;
pub use parameter::{ParamValue, Parameter, names as param_names};
pub use property::{ContentLine, Property, is_singular, names};
pub use rrule::{ByRule, Frequency, RRule, RulePart, Weekday, WeekdayNum};
pub use traits::{HasParameters, HasValue, Validate};
pub use value::{Period, Value};
